use std::time::Duration;

/// Work the runtime performs against the bound renderer, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue a load for `url`, superseding any load in flight.
    Load { url: String, timeout: Duration },
    /// Route the renderer's progress and failure events back into the reactor.
    /// Emitted once per renderer lifetime.
    SubscribeRenderer,
}
