use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use tide_core::{OverlayView, ReactorState};
use tide_engine::{
    ConnectivityMonitor, HttpRenderer, ReactorHandle, Renderer, StatusSubscription, TcpProbe,
    TokenRegistry, TokenStore,
};
use tide_logging::{tide_debug, tide_info};

use crate::config::ShellConfig;
use crate::render::render;

/// Runs the shell until Ctrl-C: loads the configured page, follows
/// connectivity, and treats every line on stdin as a fresh device token.
pub fn run(config: &ShellConfig) -> anyhow::Result<()> {
    let registry = Arc::new(TokenRegistry::new(TokenStore::new(config.cache_dir.clone())));
    let state = ReactorState::new(config.base_url.clone(), registry.cached())
        .with_load_timeout(config.load_timeout());
    let reactor = ReactorHandle::spawn(state);
    reactor.follow_tokens(registry.subscribe());
    spawn_stdin_tokens(registry.clone());

    let sender = reactor.sender();
    let _monitor = ConnectivityMonitor::spawn(
        TcpProbe::new(config.probe_addr.clone(), config.probe_timeout()),
        config.probe_interval(),
        move |available| sender.set_connectivity(available),
    )
    .context("starting connectivity monitor")?;

    let renderer: Arc<dyn Renderer> =
        Arc::new(HttpRenderer::new(config.renderer_settings()).context("starting renderer")?);
    reactor.attach(move || renderer);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(present(reactor.subscribe()));
    tide_info!("Shutting down");
    Ok(())
}

async fn present(mut status: StatusSubscription) {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = status.recv() => match next {
                Some(next) => {
                    tide_debug!("Presenting {}", next);
                    println!("{}", render(&OverlayView::from_status(&next)));
                }
                None => break,
            },
        }
    }
}

fn spawn_stdin_tokens(registry: Arc<TokenRegistry>) {
    let _ = thread::Builder::new()
        .name("tide-stdin-tokens".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let token = line.trim();
                if !token.is_empty() {
                    registry.receive(token);
                }
            }
        });
}
