//! Tide engine: reactor runtime, renderers and the IO around the web shell.
mod attachment;
mod connectivity;
mod http_renderer;
mod persist;
mod publisher;
mod reactor;
mod renderer;
mod token;
mod types;

pub use attachment::{
    Attachment, AttachmentError, AttachmentFetcher, AttachmentSettings, NotificationContent,
    ATTACHMENT_IDENTIFIER, IMAGE_KEY,
};
pub use connectivity::{ConnectivityMonitor, ConnectivityProbe, ConnectivityTracker, TcpProbe};
pub use http_renderer::{HttpRenderer, RendererSettings};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use publisher::{StatusPublisher, StatusSubscription};
pub use reactor::{ReactorHandle, ReactorSender};
pub use renderer::{RenderSink, Renderer};
pub use token::{TokenRegistry, TokenStore, TokenStoreError, TOKEN_FILENAME};
pub use types::{LoadRequest, RenderError, RenderEvent};
