//! # Harbour Tides Application Entry Point
//!
//! This binary runs the whole report once: fetch, filter, render, write,
//! publish. It is meant to be run from cron a few times a day.
//! Development mode (`--stdout`) prints the page and touches nothing else.


mod cli;

use anyhow::Context;
use chrono::Utc;
use cli::{CliArgs, USAGE};
use harbour_tides_lib::config::Config;
use harbour_tides_lib::publish::{publish_report, write_report, SftpPublisher};
use harbour_tides_lib::tide_data::AdmiraltyClient;
use harbour_tides_lib::weather::OpenWeatherClient;
use harbour_tides_lib::{pipeline, report};
use std::env;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Upload the written report. Failures are logged, never fatal.
fn publish(config: &Config) {
    match SftpPublisher::from_config(&config.publish, config.http_timeout()) {
        Ok(publisher) => {
            publish_report(&publisher, &config.report.output_path);
        }
        Err(e) => warn!("Skipping upload: {}", e),
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse(env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = match &args.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .with_env_overrides();
    config.validate().context("invalid configuration")?;

    if let Some(path) = &args.write_config {
        config.clone().without_secrets().save_to_path(path)?;
        return Ok(());
    }

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let now = Utc::now();
    let report = rt.block_on(async {
        let tides = AdmiraltyClient::new(&config)?;
        let weather = OpenWeatherClient::new(&config)?;
        Ok::<_, anyhow::Error>(pipeline::assemble_report(&config, &tides, &weather, now).await)
    })?;
    let html = report::render_html(&report);

    // Development mode: print the page and stop
    if args.stdout {
        println!("{html}");
        return Ok(());
    }

    write_report(&config.report.output_path, &html)
        .with_context(|| format!("writing {}", config.report.output_path.display()))?;
    info!("The HTML file has been generated");

    if args.no_publish {
        info!("--no-publish given, not uploading");
        return Ok(());
    }

    publish(&config);
    Ok(())
}
