use anyhow::Result;
use tracing::info;

use crate::export::ExportFormat;
use crate::models::ExportOutcome;
use crate::scrapers::kleinanzeigen::scrape_seller_listings;
use crate::traits::MarketplaceConfig;

#[derive(Clone)]
pub struct SellerExport {
    config: MarketplaceConfig,
}

impl SellerExport {
    pub fn new(config: MarketplaceConfig) -> Self {
        Self { config }
    }

    /// Scrape every listing of the seller at `seller_url` and encode them as `file_type`
    ///
    /// The format is checked before any request goes out, so an unsupported
    /// type or a missing document backend fails without touching the network.
    pub async fn run(&self, seller_url: &str, file_type: &str) -> Result<ExportOutcome> {
        let format: ExportFormat = file_type.parse()?;
        format.ensure_available()?;

        let links = scrape_seller_listings(seller_url, &self.config).await?;

        package(links, format)
    }
}

fn package(links: Vec<String>, format: ExportFormat) -> Result<ExportOutcome> {
    if links.is_empty() {
        info!("No listings found, nothing to export");
        return Ok(ExportOutcome::Empty);
    }

    let file = format.encode(&links)?;
    info!(
        "Exported {} listing links as {} ({} bytes)",
        links.len(),
        format,
        file.bytes.len()
    );

    Ok(ExportOutcome::Exported {
        link_count: links.len(),
        file,
    })
}
