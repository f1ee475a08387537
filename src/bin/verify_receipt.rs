use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use fractic_iap_client::{
    config::IapClientConfig, constants::SANDBOX_VERIFY_RECEIPT_URL, secrets::SecretValues,
    workflow::receipt_validator::ReceiptValidator,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Validates a local App Store receipt against the verification endpoint.
///
/// The shared secret is read from APP_STORE_SHARED_SECRET; other settings
/// come from IAP_* variables unless overridden here.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Receipt file to validate.
    #[arg(long)]
    receipt: Option<PathBuf>,

    /// Also write the base64 receipt text to this file.
    #[arg(long)]
    encoded_out: Option<PathBuf>,

    /// Verify against the sandbox endpoint only.
    #[arg(long)]
    sandbox: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "receipt validation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), fractic_iap_client::errors::IapClientError> {
    let mut config = IapClientConfig::from_env()?;
    if let Some(receipt) = args.receipt {
        config.receipt_path = receipt;
    }
    if let Some(encoded_out) = args.encoded_out {
        config.encoded_receipt_path = Some(encoded_out);
    }
    if args.sandbox {
        config.verify_receipt_url = SANDBOX_VERIFY_RECEIPT_URL.to_owned();
        config.sandbox_verify_receipt_url = None;
    }

    let validator = ReceiptValidator::from_config(&config, &SecretValues::from_env())?;
    let Some(result) = validator.validate_receipt().await? else {
        println!("no receipt at {}", config.receipt_path.display());
        return Ok(());
    };
    if result.used_raw_fallback {
        println!("unexpected response: {}", result.transaction_ids.join(""));
        return Ok(());
    }
    for transaction_id in &result.transaction_ids {
        println!("{transaction_id}");
    }
    if let Some(expiration_time) = result.expiration_time {
        println!("expires {}", expiration_time.to_rfc3339());
    }
    Ok(())
}
