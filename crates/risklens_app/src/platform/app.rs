use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use risklens_core::DashboardViewModel;
use risklens_engine::{spawn_poller, FeedEndpoints, ReqwestFetcher};
use risklens_logging::{lens_info, lens_warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::config::AppConfig;
use super::{logging, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Refresh,
    Quit,
    Unknown,
}

impl Command {
    fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "r" | "refresh" => Command::Refresh,
            "q" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown,
        }
    }
}

pub async fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    logging::initialize(config.log_destination);

    let endpoints = FeedEndpoints::from_base(&config.api_base)
        .with_context(|| format!("invalid RISKLENS_API_URL {:?}", config.api_base))?;
    let fetcher =
        Arc::new(ReqwestFetcher::new(config.fetch_settings()).context("building http client")?);
    lens_info!(
        "Starting RiskLens api_base={} refresh={:?} tags={:?}",
        config.api_base,
        config.refresh_interval,
        config.source_tags
    );

    let handle = spawn_poller(fetcher, endpoints, config.poller_config());
    let mut views = handle.subscribe();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let initial = views.borrow_and_update().clone();
    draw(&initial)?;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = views.changed() => {
                if changed.is_err() {
                    lens_warn!("Poller stopped publishing; exiting");
                    break;
                }
                let view = views.borrow_and_update().clone();
                draw(&view)?;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(input)) => match Command::parse(&input) {
                    Command::Refresh => handle.refresh(),
                    Command::Quit => break,
                    Command::Unknown => println!("Unknown command {:?}; use r or q", input.trim()),
                },
                // Without stdin the dashboard keeps running until Ctrl-C.
                Ok(None) => stdin_open = false,
                Err(err) => {
                    lens_warn!("Reading stdin failed: {}", err);
                    stdin_open = false;
                }
            },
        }
    }

    handle.shutdown().await;
    lens_info!("RiskLens stopped");
    Ok(())
}

fn draw(view: &DashboardViewModel) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if stdout.is_terminal() {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    for line in render::render(view, &Local) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}
