//! Tide core: pure load-state reactor, resource resolver and view-model helpers.
mod effect;
mod msg;
mod resolver;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use resolver::{resolve, TOKEN_QUERY_KEY};
pub use state::{ReactorState, DEFAULT_LOAD_TIMEOUT, PROGRESS_EPSILON};
pub use status::LoadStatus;
pub use update::update;
pub use view_model::{Overlay, OverlayView, DIMMED_OPACITY};
