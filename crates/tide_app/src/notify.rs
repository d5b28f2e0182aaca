use std::fs;
use std::path::Path;

use anyhow::Context;
use tide_engine::{AttachmentFetcher, NotificationContent};
use tide_logging::tide_info;

use crate::config::ShellConfig;

/// Reads a notification payload, attaches its image if it has one and
/// returns the resulting payload as pretty JSON.
pub fn enrich_payload(config: &ShellConfig, payload_path: &Path) -> anyhow::Result<String> {
    let raw = fs::read_to_string(payload_path)
        .with_context(|| format!("reading payload {}", payload_path.display()))?;
    let content: NotificationContent = serde_json::from_str(&raw)
        .with_context(|| format!("parsing payload {}", payload_path.display()))?;

    let fetcher =
        AttachmentFetcher::new(config.attachment_dir.clone(), config.attachment_settings())
            .context("building attachment client")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let enriched =
        runtime.block_on(fetcher.enrich_within(content, config.notification_deadline()));
    tide_info!(
        "Notification enriched with {} attachment(s)",
        enriched.attachments.len()
    );

    serde_json::to_string_pretty(&enriched).context("encoding payload")
}
