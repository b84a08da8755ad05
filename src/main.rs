#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::style)]

use std::io::IsTerminal;

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use proxylink::cli::{Args, Input};
use proxylink::output::{OutputOptions, OutputTarget};
use proxylink::parser;
use proxylink::settings::Settings;
use proxylink::subscription::Converter;
use tokio::io::AsyncReadExt;
use tracing::Level;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let is_verbose = args.verbose;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if is_verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            Settings::from_file(path).await?
        }
        None => Settings::default(),
    };
    let settings = args.apply(settings);
    let options = Args::output_options(&settings);
    let target = args.output_target();

    match args.input() {
        Input::Link(link) => {
            let profile = parser::parse(&link)?;
            target.emit_single(&profile, &options).await
        }
        Input::File(path) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            handle_batch(&content, &target, &options).await
        }
        Input::Subscription(url) => {
            let converter = Converter::new(settings.fetcher());
            let result = converter.convert(&url).await?;
            if result.success == 0 {
                bail!("subscription parsing failed");
            }
            tracing::info!(
                "Subscription parsed: {} succeeded, {} failed",
                result.success,
                result.failed
            );
            target.emit_batch(&result.profiles, &options).await
        }
        Input::Stdin => {
            if std::io::stdin().is_terminal() {
                Args::command().print_help()?;
                return Ok(());
            }
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .context("Failed to read stdin")?;
            if content.trim().is_empty() {
                bail!("no input");
            }
            handle_batch(&content, &target, &options).await
        }
    }
}

async fn handle_batch(
    content: &str,
    target: &OutputTarget,
    options: &OutputOptions,
) -> anyhow::Result<()> {
    let batch = parser::parse_document(content);
    if batch.failed() > 0 {
        tracing::warn!("{} links failed to parse", batch.failed());
    }
    tracing::info!(
        "Parsed: {} succeeded, {} failed",
        batch.success(),
        batch.failed()
    );
    let profiles = batch.into_profiles()?;
    target.emit_batch(&profiles, options).await
}
