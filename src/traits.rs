//! Marketplace configuration and the page-fetching seam

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Hard cap on seller pages, independent of the ad count printed on page 1
pub const DEFAULT_MAX_PAGES: u32 = 400;

/// Per-request timeout used by the HTTP session
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

/// Everything that ties the scraper to one marketplace's markup and URL scheme
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Display name for the marketplace
    pub name: String,
    /// Origin that relative listing links are resolved against
    pub origin: String,
    /// Path segment every listing URL contains
    pub listing_path_marker: String,
    /// Regex whose first capture group is the seller's active ad count
    pub count_pattern: String,
    /// Listings shown per seller page
    pub page_size: u32,
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Last page number that will ever be requested
    pub max_pages: u32,
    /// User agent for the HTTP session
    pub user_agent: String,
    /// Timeout applied to each individual request
    pub request_timeout: Duration,
}

impl MarketplaceConfig {
    /// Configuration for seller profiles on kleinanzeigen.de
    pub fn kleinanzeigen() -> Self {
        Self {
            name: "Kleinanzeigen".to_string(),
            origin: "https://www.kleinanzeigen.de".to_string(),
            listing_path_marker: "/s-anzeige/".to_string(),
            count_pattern: r"(\d{1,5})\s+Anzeigen\s+online".to_string(),
            page_size: 25,
            page_param: "seite".to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Number of seller pages implied by an ad count, rounded up
    pub fn expected_pages(&self, total_ads: u32) -> u32 {
        total_ads.div_ceil(self.page_size.max(1))
    }

    /// URL of page `page` for a seller base URL that has no query string
    pub fn page_url(&self, base_url: &str, page: u32) -> String {
        format!("{base_url}?{}={page}", self.page_param)
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self::kleinanzeigen()
    }
}

/// Status and body of one fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub body: String,
}

/// Source of seller pages
///
/// One value is owned by a single scrape and reused for every page it
/// requests, so headers and connections are shared across those requests
/// only.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`
    ///
    /// # Returns
    /// * `Result<FetchedPage>` - The response status and body, or a transport error.
    ///   Non-success statuses are returned as pages, not errors.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}
