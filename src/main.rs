use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use kleinanzeigen_links::traits::{DEFAULT_MAX_PAGES, DEFAULT_USER_AGENT};
use kleinanzeigen_links::{ExportOutcome, MarketplaceConfig, SellerExport};

#[derive(Parser, Debug)]
#[command(name = "kleinanzeigen-links")]
#[command(about = "Collects all listing links of a Kleinanzeigen seller and exports them")]
#[command(version)]
struct Args {
    /// Seller profile URL, e.g. https://www.kleinanzeigen.de/pro/ff-wheels-by-felgenforum
    seller_url: String,

    /// Export format: txt, csv, xlsx or docx
    #[arg(short, long, env = "KLEINANZEIGEN_FORMAT", default_value = "txt")]
    format: String,

    /// Output file (defaults to seller-links.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Never request more than this many seller pages
    #[arg(long, env = "KLEINANZEIGEN_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "KLEINANZEIGEN_TIMEOUT_SECS", default_value_t = 15)]
    timeout_secs: u64,

    /// User agent sent with every request
    #[arg(long, env = "KLEINANZEIGEN_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

impl Args {
    fn marketplace_config(&self) -> MarketplaceConfig {
        MarketplaceConfig {
            max_pages: self.max_pages,
            request_timeout: std::time::Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            ..MarketplaceConfig::kleinanzeigen()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if args.seller_url.trim().is_empty() {
        bail!("Please enter a seller URL");
    }

    info!("Starting listing export for {}", args.seller_url);

    let exporter = SellerExport::new(args.marketplace_config());
    let outcome = exporter
        .run(&args.seller_url, &args.format)
        .await
        .context("Export failed")?;

    match outcome {
        ExportOutcome::Empty => {
            println!("No listings found.");
        }
        ExportOutcome::Exported { link_count, file } => {
            let path = args
                .output
                .unwrap_or_else(|| PathBuf::from(format!("seller-links.{}", file.extension)));

            tokio::fs::write(&path, &file.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!(
                "Found {} listing links, saved to {} ({})",
                link_count,
                path.display(),
                file.content_type
            );
        }
    }

    Ok(())
}
