use std::sync::{mpsc, Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use futures_util::StreamExt;
use tide_logging::{tide_debug, tide_warn};
use tokio_util::sync::CancellationToken;

use crate::{LoadRequest, RenderError, RenderEvent, RenderSink, Renderer};

/// Progress reported as soon as response headers arrive.
const HEADERS_PROGRESS: f64 = 0.1;
/// Upper bound for body progress; the final step to 1.0 marks completion.
const BODY_PROGRESS_CEILING: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub connect_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

enum RendererCommand {
    Load(LoadRequest),
    Subscribe(Arc<dyn RenderSink>),
}

type SinkSlot = Arc<RwLock<Option<Arc<dyn RenderSink>>>>;

/// Headless renderer that fetches the page over HTTP and reports download
/// progress as page-load progress.
pub struct HttpRenderer {
    cmd_tx: mpsc::Sender<RendererCommand>,
}

impl HttpRenderer {
    pub fn new(settings: RendererSettings) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| RenderError::Network(err.to_string()))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|err| RenderError::Network(err.to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        thread::Builder::new()
            .name("tide-http-renderer".to_string())
            .spawn(move || {
                let slot: SinkSlot = Arc::new(RwLock::new(None));
                let mut in_flight: Option<CancellationToken> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        RendererCommand::Load(request) => {
                            if let Some(previous) = in_flight.take() {
                                previous.cancel();
                            }
                            let cancel = CancellationToken::new();
                            in_flight = Some(cancel.clone());
                            let emitter = Emitter {
                                slot: slot.clone(),
                                cancel,
                            };
                            let client = client.clone();
                            let max_bytes = settings.max_bytes;
                            runtime.spawn(async move {
                                run_load(&client, request, max_bytes, emitter).await;
                            });
                        }
                        RendererCommand::Subscribe(sink) => {
                            *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
                        }
                    }
                }
                if let Some(previous) = in_flight.take() {
                    previous.cancel();
                }
            })
            .map_err(|err| RenderError::Network(err.to_string()))?;

        Ok(Self { cmd_tx })
    }
}

impl Renderer for HttpRenderer {
    fn load(&self, request: LoadRequest) {
        let _ = self.cmd_tx.send(RendererCommand::Load(request));
    }

    fn subscribe(&self, sink: Arc<dyn RenderSink>) {
        let _ = self.cmd_tx.send(RendererCommand::Subscribe(sink));
    }
}

/// Delivers events for one load until it is superseded.
struct Emitter {
    slot: SinkSlot,
    cancel: CancellationToken,
}

impl Emitter {
    fn emit(&self, event: RenderEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(sink) = guard.as_ref() {
            sink.emit(event);
        }
    }
}

async fn run_load(client: &reqwest::Client, request: LoadRequest, max_bytes: u64, emitter: Emitter) {
    let url = request.url.clone();
    let cancel = emitter.cancel.clone();
    tokio::select! {
        _ = cancel.cancelled() => {
            tide_debug!("Load superseded url={}", url);
        }
        result = navigate(client, &request, max_bytes, &emitter) => match result {
            Ok(bytes) => {
                tide_debug!("Load finished url={} bytes={}", url, bytes);
                emitter.emit(RenderEvent::Progress(1.0));
            }
            Err(err) => {
                tide_warn!("Load failed url={}: {}", url, err);
                emitter.emit(RenderEvent::NavigationFailed(err.to_string()));
            }
        }
    }
}

/// Returns the number of body bytes received.
async fn navigate(
    client: &reqwest::Client,
    request: &LoadRequest,
    max_bytes: u64,
    emitter: &Emitter,
) -> Result<u64, RenderError> {
    let parsed = reqwest::Url::parse(&request.url)
        .map_err(|err| RenderError::InvalidUrl(err.to_string()))?;
    let response = client.get(parsed).timeout(request.timeout).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RenderError::HttpStatus(status.as_u16()));
    }
    let expected = response.content_length();
    if expected.is_some_and(|len| len > max_bytes) {
        return Err(RenderError::TooLarge { max_bytes });
    }

    emitter.emit(RenderEvent::Progress(HEADERS_PROGRESS));

    let mut received: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        received += chunk.len() as u64;
        if received > max_bytes {
            return Err(RenderError::TooLarge { max_bytes });
        }
        if let Some(fraction) = body_progress(received, expected) {
            emitter.emit(RenderEvent::Progress(fraction));
        }
    }
    Ok(received)
}

/// Body progress scaled into `[HEADERS_PROGRESS, BODY_PROGRESS_CEILING]`;
/// unknown lengths report nothing until completion.
fn body_progress(received: u64, expected: Option<u64>) -> Option<f64> {
    let expected = expected.filter(|len| *len > 0)?;
    let ratio = (received as f64 / expected as f64).min(1.0);
    Some(HEADERS_PROGRESS + ratio * (BODY_PROGRESS_CEILING - HEADERS_PROGRESS))
}

#[cfg(test)]
mod tests {
    use super::body_progress;

    #[test]
    fn unknown_length_has_no_body_progress() {
        assert_eq!(body_progress(10, None), None);
        assert_eq!(body_progress(10, Some(0)), None);
    }

    #[test]
    fn body_progress_stays_below_completion() {
        assert_eq!(body_progress(0, Some(100)), Some(0.1));
        let halfway = body_progress(50, Some(100)).unwrap();
        assert!((halfway - 0.5).abs() < 1e-9);
        let overshoot = body_progress(150, Some(100)).unwrap();
        assert!((overshoot - 0.9).abs() < 1e-9);
    }
}
