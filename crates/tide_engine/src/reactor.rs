use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use tide_core::{update, Effect, Msg, ReactorState};
use tide_logging::{tide_debug, tide_info, tide_trace, tide_warn};

use crate::publisher::{StatusPublisher, StatusSubscription};
use crate::{LoadRequest, RenderEvent, RenderSink, Renderer};

enum ReactorCommand {
    Attach(Arc<dyn Renderer>),
    Dispatch(Msg),
    Shutdown,
}

/// Owns one reactor on a dedicated thread.
///
/// Every state mutation happens on that thread, in the order commands
/// arrive, so observers never see interleaved writes. Dropping the handle
/// stops the thread and releases the bound renderer.
pub struct ReactorHandle {
    sender: ReactorSender,
    publisher: Arc<StatusPublisher>,
    thread: Option<JoinHandle<()>>,
}

impl ReactorHandle {
    pub fn spawn(state: ReactorState) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let publisher = Arc::new(StatusPublisher::new(state.status().clone()));
        tide_info!(
            "Reactor starting base={} current={}",
            state.base_resource(),
            state.current_resource()
        );

        let thread = {
            let publisher = publisher.clone();
            let cmd_tx = cmd_tx.clone();
            thread::Builder::new()
                .name("tide-reactor".to_string())
                .spawn(move || run(state, cmd_rx, cmd_tx, &publisher))
        };
        let thread = match thread {
            Ok(thread) => Some(thread),
            Err(err) => {
                tide_warn!("Failed to spawn reactor thread: {}", err);
                None
            }
        };

        Self {
            sender: ReactorSender { tx: cmd_tx },
            publisher,
            thread,
        }
    }

    /// Binds a renderer and starts loading the current resource.
    ///
    /// `factory` is called exactly once, on the caller's thread.
    pub fn attach<F>(&self, factory: F)
    where
        F: FnOnce() -> Arc<dyn Renderer>,
    {
        self.sender.send(ReactorCommand::Attach(factory()));
    }

    pub fn set_connectivity(&self, available: bool) {
        self.sender.set_connectivity(available);
    }

    pub fn apply_token(&self, token: impl Into<String>) {
        self.sender.apply_token(token);
    }

    /// A cloneable entry point for event sources on other threads.
    pub fn sender(&self) -> ReactorSender {
        self.sender.clone()
    }

    pub fn subscribe(&self) -> StatusSubscription {
        self.publisher.subscribe()
    }

    pub fn status(&self) -> tide_core::LoadStatus {
        self.publisher.current()
    }

    /// Forwards tokens from a token source until it closes, dropping
    /// consecutive repeats.
    pub fn follow_tokens(&self, tokens: mpsc::Receiver<String>) -> Option<JoinHandle<()>> {
        let sender = self.sender();
        let spawned = thread::Builder::new()
            .name("tide-token-follower".to_string())
            .spawn(move || {
                let mut last: Option<String> = None;
                for token in tokens {
                    if last.as_deref() == Some(token.as_str()) {
                        tide_trace!("Dropping repeated token");
                        continue;
                    }
                    last = Some(token.clone());
                    sender.apply_token(token);
                }
                tide_debug!("Token source closed");
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                tide_warn!("Failed to spawn token follower: {}", err);
                None
            }
        }
    }
}

impl Drop for ReactorHandle {
    fn drop(&mut self) {
        self.sender.send(ReactorCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Sends events into a running reactor. Sends after shutdown are dropped.
#[derive(Clone)]
pub struct ReactorSender {
    tx: mpsc::Sender<ReactorCommand>,
}

impl ReactorSender {
    pub fn dispatch(&self, msg: Msg) {
        self.send(ReactorCommand::Dispatch(msg));
    }

    pub fn set_connectivity(&self, available: bool) {
        self.dispatch(Msg::ConnectivityChanged(available));
    }

    pub fn apply_token(&self, token: impl Into<String>) {
        self.dispatch(Msg::TokenReceived(token.into()));
    }

    fn send(&self, command: ReactorCommand) {
        if self.tx.send(command).is_err() {
            tide_trace!("Reactor stopped; dropping command");
        }
    }
}

impl RenderSink for ReactorSender {
    fn emit(&self, event: RenderEvent) {
        let msg = match event {
            RenderEvent::Progress(sample) => Msg::Progress(sample),
            RenderEvent::NavigationFailed(reason) => Msg::NavigationFailed(reason),
        };
        self.dispatch(msg);
    }
}

fn run(
    mut state: ReactorState,
    cmd_rx: mpsc::Receiver<ReactorCommand>,
    cmd_tx: mpsc::Sender<ReactorCommand>,
    publisher: &StatusPublisher,
) {
    let sink: Arc<dyn RenderSink> = Arc::new(ReactorSender { tx: cmd_tx });
    let mut renderer: Option<Arc<dyn Renderer>> = None;

    while let Ok(command) = cmd_rx.recv() {
        let msg = match command {
            ReactorCommand::Attach(next) => {
                renderer = Some(next);
                Msg::RendererAttached
            }
            ReactorCommand::Dispatch(msg) => msg,
            ReactorCommand::Shutdown => break,
        };
        state = step(state, msg, renderer.as_deref(), &sink, publisher);
    }
    tide_debug!("Reactor stopped");
}

fn step(
    state: ReactorState,
    msg: Msg,
    renderer: Option<&dyn Renderer>,
    sink: &Arc<dyn RenderSink>,
    publisher: &StatusPublisher,
) -> ReactorState {
    tide_trace!("Reactor msg {:?}", msg);
    let (mut state, effects) = update(state, msg);
    // Published before effects run so Progressing(0) precedes the load.
    if state.consume_dirty() {
        tide_debug!("Status -> {}", state.status());
        publisher.publish(state.status().clone());
    }

    for effect in effects {
        let Some(renderer) = renderer else {
            tide_warn!("Dropping {:?}: no renderer bound", effect);
            continue;
        };
        match effect {
            Effect::Load { url, timeout } => {
                tide_info!("Load url={} timeout={:?}", url, timeout);
                renderer.load(LoadRequest::new(url, timeout));
            }
            Effect::SubscribeRenderer => {
                tide_debug!("Subscribing to renderer events");
                renderer.subscribe(sink.clone());
            }
        }
    }
    state
}
