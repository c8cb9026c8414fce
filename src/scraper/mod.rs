use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::ScrapeError;
use crate::traits::MarketplaceConfig;

/// Pulls listing links and the active ad count out of seller page markup
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    anchor_selector: Selector,
    count_pattern: Regex,
    origin: Url,
    listing_path_marker: String,
}

impl ListingExtractor {
    pub fn new(config: &MarketplaceConfig) -> Result<Self, ScrapeError> {
        let anchor_selector =
            Selector::parse("a[href]").map_err(|e| ScrapeError::Selector(format!("{e:?}")))?;
        let count_pattern = Regex::new(&config.count_pattern)?;
        let origin = Url::parse(&config.origin)?;

        Ok(Self {
            anchor_selector,
            count_pattern,
            origin,
            listing_path_marker: config.listing_path_marker.clone(),
        })
    }

    /// Absolute listing URLs on the page, without duplicates, in document order
    pub fn listing_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if href.is_empty() || !href.contains(&self.listing_path_marker) {
                continue;
            }

            let Some(url) = self.absolute_url(href) else {
                continue;
            };

            if seen.insert(url.clone()) {
                links.push(url);
            }
        }

        debug!("Extracted {} listing links", links.len());
        links
    }

    /// Active ad count printed on the page, if present
    pub fn total_count(&self, html: &str) -> Option<u32> {
        self.count_pattern
            .captures(html)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Resolves `href` against the origin and serializes it in normalized form
    ///
    /// Absolute hrefs go through the same parser as relative ones, so both
    /// spellings of a listing end up percent-encoded identically.
    fn absolute_url(&self, href: &str) -> Option<String> {
        let url = self.origin.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        // Joining can rewrite dot segments away from the marker
        let url = url.to_string();
        url.contains(&self.listing_path_marker).then_some(url)
    }
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new(&MarketplaceConfig::kleinanzeigen())
            .expect("built-in marketplace config is valid")
    }
}

static KLEINANZEIGEN: LazyLock<ListingExtractor> = LazyLock::new(ListingExtractor::default);

/// Listing links on a Kleinanzeigen page
pub fn extract_listing_links(html: &str) -> Vec<String> {
    KLEINANZEIGEN.listing_links(html)
}

/// Active ad count on a Kleinanzeigen seller page
pub fn extract_total_count(html: &str) -> Option<u32> {
    KLEINANZEIGEN.total_count(html)
}
