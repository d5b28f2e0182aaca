#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A renderer was bound (or re-bound) to the reactor.
    RendererAttached,
    /// Connectivity source reported availability.
    ConnectivityChanged(bool),
    /// Token source delivered a (possibly unchanged) device token.
    TokenReceived(String),
    /// Renderer progress sample in `[0, 1]`.
    Progress(f64),
    /// Renderer reported that the current navigation failed.
    NavigationFailed(String),
    /// Fallback for placeholder wiring.
    NoOp,
}
