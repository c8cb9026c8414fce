//! Collects every listing link a seller publishes on Kleinanzeigen and
//! exports them as text, CSV, spreadsheet or document files.

pub mod error;
pub mod export;
pub mod models;
pub mod scraper;
pub mod scrapers;
pub mod seller_export;
pub mod traits;

pub use error::{ExportError, ScrapeError};
pub use export::{ExportFile, ExportFormat, create_download_file};
pub use models::ExportOutcome;
pub use self::scraper::{ListingExtractor, extract_listing_links, extract_total_count};
pub use scrapers::kleinanzeigen::{HttpFetcher, SellerScraper, scrape_seller_listings};
pub use seller_export::SellerExport;
pub use traits::{FetchedPage, MarketplaceConfig, PageFetcher};
