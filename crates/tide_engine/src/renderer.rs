use std::sync::Arc;

use crate::{LoadRequest, RenderEvent};

/// Receives progress and navigation failures from a renderer.
pub trait RenderSink: Send + Sync {
    fn emit(&self, event: RenderEvent);
}

/// The web-rendering surface the reactor drives.
///
/// Implementations own cancellation: a new `load` supersedes the previous
/// one, and events belonging to a superseded load must not reach the sink.
pub trait Renderer: Send + Sync {
    /// Begin loading `request`.
    fn load(&self, request: LoadRequest);

    /// Route this renderer's events into `sink`. The reactor calls this once
    /// per renderer, after the first load has been issued.
    fn subscribe(&self, sink: Arc<dyn RenderSink>);
}
