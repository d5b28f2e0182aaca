use std::fmt;

/// Published state of the single web resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Standby,
    /// A load is underway; the fraction is in `[0, 1)`.
    Progressing(f64),
    /// The most recent load reached full progress.
    Finished,
    /// The most recent load failed with a human-readable reason.
    Failure(String),
    /// Connectivity was reported unavailable.
    NoConnection,
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Progressing(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, LoadStatus::Finished)
    }

    /// Progress fraction while loading.
    pub fn progress(&self) -> Option<f64> {
        match self {
            LoadStatus::Progressing(fraction) => Some(*fraction),
            _ => None,
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Standby => write!(f, "standby"),
            LoadStatus::Progressing(fraction) => write!(f, "progressing {:.0}%", fraction * 100.0),
            LoadStatus::Finished => write!(f, "finished"),
            LoadStatus::Failure(reason) => write!(f, "failure: {reason}"),
            LoadStatus::NoConnection => write!(f, "no connection"),
        }
    }
}
