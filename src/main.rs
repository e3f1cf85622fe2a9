use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use snapshot_upload::cli::Args;
use snapshot_upload::cloud::client::HttpClient;
use snapshot_upload::cloud::upload_file;
use snapshot_upload::config::{load_config, UploadConfig};
use snapshot_upload::models::{ProgressCallback, ProgressEvent, UploadTarget};
use snapshot_upload::security::{scrub_credentials, scrub_secrets};

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.verbose)?;

    let config = build_config(&args)?;
    let secrets: Vec<String> = config
        .auth_token
        .iter()
        .chain(config.encryption.iter().map(|enc| &enc.key))
        .cloned()
        .collect();

    run_upload(&args, &config).map_err(|e| {
        let secrets: Vec<&str> = secrets.iter().map(String::as_str).collect();
        let message = scrub_secrets(&format!("{:#}", e), &secrets);
        error!("{}", message);
        anyhow!(message)
    })
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Layer command-line values over the config file and environment
fn build_config(args: &Args) -> Result<UploadConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(token) = &args.token {
        config.auth_token = Some(token.clone());
    }
    config.set_encryption(args.cipher.clone(), args.encryption_key.clone());
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(threshold) = args.multipart_threshold {
        config.multipart_threshold_mb = threshold;
    }

    config.validate().context("Invalid upload configuration")?;
    Ok(config)
}

/// Log one line per reported percentage and keep the latest event
fn log_progress(latest: Arc<Mutex<Option<ProgressEvent>>>) -> ProgressCallback {
    Arc::new(move |event: ProgressEvent| {
        info!("Upload progress: {}% ({}/{} bytes, {:.2} MB/s){}",
              event.percent, event.bytes_transferred, event.total_bytes,
              event.throughput_mb_per_sec(),
              if event.done { ", all data sent" } else { "" });
        if let Ok(mut slot) = latest.lock() {
            *slot = Some(event);
        }
    })
}

fn run_upload(args: &Args, config: &UploadConfig) -> Result<()> {
    let client = HttpClient::new(&config.endpoint, config.auth_token.clone(), config.timeout())
        .context("Failed to create HTTP client")?;

    let mut target = UploadTarget::new(&args.file);
    target.encryption = config.encryption();

    let strategy = args.mode.strategy(config.multipart_threshold_bytes());
    info!("Uploading {} to {}", args.file.display(), scrub_credentials(client.base_url()));

    let start = std::time::Instant::now();
    let latest = Arc::new(Mutex::new(None));
    let used = upload_file(&client, &target, strategy, log_progress(Arc::clone(&latest)))
        .context(format!("Failed to upload {}", args.file.display()))?;

    let elapsed = start.elapsed();
    let sent = latest
        .lock()
        .ok()
        .and_then(|slot| *slot)
        .map(|event| event.total_bytes)
        .unwrap_or(0);
    let summary = ProgressEvent {
        percent: 100,
        bytes_transferred: sent,
        total_bytes: sent,
        elapsed,
        done: true,
    };
    info!("Upload completed using {:?}: {} bytes in {:.2?} ({:.2} MB/s)",
          used, sent, elapsed, summary.throughput_mb_per_sec());
    Ok(())
}
