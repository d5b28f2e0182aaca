use std::time::Duration;

use crate::resolver::resolve;
use crate::status::LoadStatus;
use crate::view_model::OverlayView;

/// Request timeout attached to every load.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(12);

/// Two progress samples closer than this are treated as duplicates.
pub const PROGRESS_EPSILON: f64 = 1e-6;

/// State owned by one reactor for the lifetime of a web session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorState {
    status: LoadStatus,
    base_resource: String,
    current_resource: String,
    token: Option<String>,
    load_timeout: Duration,
    renderer_bound: bool,
    renderer_subscribed: bool,
    last_sample: Option<f64>,
    loads_started: u64,
    dirty: bool,
}

impl ReactorState {
    /// `token` is whatever the token cache knew when the session started.
    pub fn new(base_resource: impl Into<String>, token: Option<String>) -> Self {
        let base_resource = base_resource.into();
        let token = token.filter(|token| !token.is_empty());
        let current_resource = resolve(&base_resource, token.as_deref());
        Self {
            status: LoadStatus::Standby,
            base_resource,
            current_resource,
            token,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            renderer_bound: false,
            renderer_subscribed: false,
            last_sample: None,
            loads_started: 0,
            dirty: false,
        }
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn base_resource(&self) -> &str {
        &self.base_resource
    }

    pub fn current_resource(&self) -> &str {
        &self.current_resource
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
    }

    pub fn renderer_bound(&self) -> bool {
        self.renderer_bound
    }

    /// Number of loads issued so far.
    pub fn loads_started(&self) -> u64 {
        self.loads_started
    }

    pub fn view(&self) -> OverlayView {
        OverlayView::from_status(&self.status)
    }

    /// Returns whether the published status changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_status(&mut self, status: LoadStatus) {
        if self.status != status {
            self.status = status;
            self.dirty = true;
        }
    }

    /// A new renderer has no progress subscription yet.
    pub(crate) fn bind_renderer(&mut self) {
        self.renderer_bound = true;
        self.renderer_subscribed = false;
    }

    /// Records the token and returns whether the resolved URL changed.
    pub(crate) fn apply_token(&mut self, token: String) -> bool {
        let resolved = resolve(&self.base_resource, Some(&token));
        self.token = Some(token).filter(|token| !token.is_empty());
        if resolved == self.current_resource {
            return false;
        }
        self.current_resource = resolved;
        true
    }

    /// Optimistic start of a load: status becomes `Progressing(0)` before
    /// the renderer reports anything.
    pub(crate) fn begin_load(&mut self) {
        self.loads_started += 1;
        self.last_sample = None;
        self.set_status(LoadStatus::Progressing(0.0));
    }

    /// Returns true exactly once per bound renderer.
    pub(crate) fn take_subscription_request(&mut self) -> bool {
        if self.renderer_subscribed {
            return false;
        }
        self.renderer_subscribed = true;
        true
    }

    pub(crate) fn apply_progress(&mut self, sample: f64) {
        if sample.is_nan() {
            return;
        }
        let sample = sample.clamp(0.0, 1.0);
        if sample >= 1.0 {
            self.last_sample = Some(sample);
            self.set_status(LoadStatus::Finished);
            return;
        }
        let duplicate = self
            .last_sample
            .is_some_and(|previous| (previous - sample).abs() < PROGRESS_EPSILON);
        self.last_sample = Some(sample);
        if !duplicate {
            self.set_status(LoadStatus::Progressing(sample));
        }
    }
}
