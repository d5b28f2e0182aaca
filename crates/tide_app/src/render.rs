use tide_core::{Overlay, OverlayView};

const BAR_WIDTH: usize = 20;

/// One terminal line per overlay state.
pub fn render(view: &OverlayView) -> String {
    match &view.overlay {
        Overlay::Progress { percent } => {
            let filled = usize::from(*percent) * BAR_WIDTH / 100;
            format!(
                "Loading [{}{}] {:>3}%",
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                percent
            )
        }
        Overlay::Error { message } => format!("Error: {message}"),
        Overlay::Offline => "No connection".to_string(),
        Overlay::None if view.content_opacity >= 1.0 => "Page ready".to_string(),
        Overlay::None => "Waiting for page".to_string(),
    }
}
