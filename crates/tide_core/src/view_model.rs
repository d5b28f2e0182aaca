use crate::LoadStatus;

/// Opacity of the page while it is not fully loaded.
pub const DIMMED_OPACITY: f32 = 0.5;

/// What the presentation layer draws above the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Progress { percent: u8 },
    Error { message: String },
    Offline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub overlay: Overlay,
    pub content_opacity: f32,
}

impl OverlayView {
    pub fn from_status(status: &LoadStatus) -> Self {
        let overlay = match status {
            LoadStatus::Progressing(fraction) => Overlay::Progress {
                percent: percent_of(*fraction),
            },
            LoadStatus::Failure(message) => Overlay::Error {
                message: message.clone(),
            },
            LoadStatus::NoConnection => Overlay::Offline,
            LoadStatus::Standby | LoadStatus::Finished => Overlay::None,
        };
        let content_opacity = if status.is_finished() {
            1.0
        } else {
            DIMMED_OPACITY
        };
        Self {
            overlay,
            content_opacity,
        }
    }
}

/// Truncating, so 99.9% still reads as 99 until the load finishes.
fn percent_of(fraction: f64) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0) as u8
}
