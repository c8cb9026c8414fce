//! Seller profile pagination for kleinanzeigen.de

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::scraper::ListingExtractor;
use crate::traits::{FetchedPage, MarketplaceConfig, PageFetcher};

/// HTTP session shared by all page requests of one scrape
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &MarketplaceConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(FetchedPage { status, body })
    }
}

/// Walks a seller's profile pages and collects every listing link
pub struct SellerScraper<F> {
    fetcher: F,
    config: MarketplaceConfig,
    extractor: ListingExtractor,
}

impl<F: PageFetcher> SellerScraper<F> {
    pub fn new(fetcher: F, config: MarketplaceConfig) -> Result<Self, ScrapeError> {
        let extractor = ListingExtractor::new(&config)?;

        Ok(Self {
            fetcher,
            config,
            extractor,
        })
    }

    /// Collect all listing URLs of the seller at `base_url`
    ///
    /// Any query string on `base_url` is dropped. Page 1 must load; later
    /// pages end the walk when they answer with a non-success status, add no
    /// unseen links, or lie beyond the page count implied by the ad count.
    ///
    /// # Returns
    /// * `Result<Vec<String>, ScrapeError>` - Unique listing URLs in first-seen order
    pub async fn scrape(&self, base_url: &str) -> Result<Vec<String>, ScrapeError> {
        let base_url = strip_query(base_url.trim());
        if base_url.is_empty() {
            return Err(ScrapeError::EmptyUrl);
        }

        info!("Fetching seller page 1 on {}: {}", self.config.name, base_url);

        let first_page = self.fetch(base_url).await?;
        if !first_page.status.is_success() {
            return Err(ScrapeError::Status {
                url: base_url.to_string(),
                status: first_page.status,
            });
        }

        let mut all_links = self.extractor.listing_links(&first_page.body);
        let mut seen: HashSet<String> = all_links.iter().cloned().collect();

        // A count of zero carries no information about pagination depth
        let expected_pages = self
            .extractor
            .total_count(&first_page.body)
            .filter(|&total| total > 0)
            .map(|total| {
                let pages = self.config.expected_pages(total);
                info!("Seller reports {} active ads, expecting {} pages", total, pages);
                pages
            });

        let mut page = 2;
        loop {
            if expected_pages.is_some_and(|expected| page > expected) {
                debug!("Reached expected page count at page {}", page - 1);
                break;
            }

            if page > self.config.max_pages {
                warn!(
                    "Reached maximum page limit ({}) for seller {}",
                    self.config.max_pages, base_url
                );
                break;
            }

            let page_url = self.config.page_url(base_url, page);
            info!("Fetching seller page {}: {}", page, page_url);

            let response = self.fetch(&page_url).await?;
            if !response.status.is_success() {
                // Also covers transient server failures; results so far are kept
                warn!(
                    "Seller page {} answered HTTP {}, stopping pagination",
                    page, response.status
                );
                break;
            }

            let new_links: Vec<String> = self
                .extractor
                .listing_links(&response.body)
                .into_iter()
                .filter(|link| !seen.contains(link))
                .collect();

            if new_links.is_empty() {
                info!("No new listings on page {}, stopping pagination", page);
                break;
            }

            debug!("Page {} added {} new listings", page, new_links.len());
            seen.extend(new_links.iter().cloned());
            all_links.extend(new_links);
            page += 1;
        }

        info!(
            "Found {} unique listings for seller {} on {}",
            all_links.len(),
            base_url,
            self.config.name
        );
        Ok(all_links)
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|source| ScrapeError::Fetch {
                url: url.to_string(),
                source,
            })
    }
}

/// Scrape a seller profile over HTTP with a session owned by this call
pub async fn scrape_seller_listings(
    base_url: &str,
    config: &MarketplaceConfig,
) -> Result<Vec<String>, ScrapeError> {
    let fetcher = HttpFetcher::new(config)?;
    let scraper = SellerScraper::new(fetcher, config.clone())?;

    scraper.scrape(base_url).await
}

fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const BASE: &str = "https://www.kleinanzeigen.de/pro/ff-wheels";

    /// In-memory fetcher serving canned pages and recording every request
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, Result<FetchedPage, String>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedFetcher {
        fn page(mut self, url: &str, status: StatusCode, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Ok(FetchedPage {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        fn failure(mut self, url: &str, message: &str) -> Self {
            self.pages.insert(url.to_string(), Err(message.to_string()));
            self
        }

        /// Handle on the request log that outlives the fetcher
        fn request_log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.requested)
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(page)) => Ok(page.clone()),
                Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
                None => Ok(FetchedPage {
                    status: StatusCode::NOT_FOUND,
                    body: String::new(),
                }),
            }
        }
    }

    fn listing_page(ids: &[&str], extra: &str) -> String {
        let anchors: String = ids
            .iter()
            .map(|id| format!(r#"<a href="/s-anzeige/item/{id}">{id}</a>"#))
            .collect();
        format!("<html><body>{extra}{anchors}</body></html>")
    }

    fn listing(id: &str) -> String {
        format!("https://www.kleinanzeigen.de/s-anzeige/item/{id}")
    }

    fn page_url(page: u32) -> String {
        format!("{BASE}?seite={page}")
    }

    async fn run_with(
        fetcher: ScriptedFetcher,
        config: MarketplaceConfig,
        base_url: &str,
    ) -> (Result<Vec<String>, ScrapeError>, Vec<String>) {
        let log = fetcher.request_log();
        let result = SellerScraper::new(fetcher, config)
            .unwrap()
            .scrape(base_url)
            .await;
        let requested = log.lock().unwrap().clone();
        (result, requested)
    }

    async fn run(
        fetcher: ScriptedFetcher,
        base_url: &str,
    ) -> (Result<Vec<String>, ScrapeError>, Vec<String>) {
        run_with(fetcher, MarketplaceConfig::kleinanzeigen(), base_url).await
    }

    #[tokio::test]
    async fn stops_when_page_adds_nothing_new() {
        let fetcher = ScriptedFetcher::default()
            .page(BASE, StatusCode::OK, &listing_page(&["1", "2"], ""))
            .page(&page_url(2), StatusCode::OK, &listing_page(&["2", "3"], ""))
            .page(&page_url(3), StatusCode::OK, &listing_page(&["1", "3"], ""))
            .page(&page_url(4), StatusCode::OK, &listing_page(&["4"], ""));

        let (result, requested) = run(fetcher, BASE).await;

        assert_eq!(result.unwrap(), vec![listing("1"), listing("2"), listing("3")]);
        assert_eq!(requested, vec![BASE.to_string(), page_url(2), page_url(3)]);
    }

    #[tokio::test]
    async fn count_hint_bounds_pagination() {
        let fetcher = ScriptedFetcher::default()
            .page(
                BASE,
                StatusCode::OK,
                &listing_page(&["1", "2"], "<span>30 Anzeigen online</span>"),
            )
            .page(&page_url(2), StatusCode::OK, &listing_page(&["3"], ""))
            .page(&page_url(3), StatusCode::OK, &listing_page(&["4"], ""));

        let (result, requested) = run(fetcher, BASE).await;

        assert_eq!(result.unwrap(), vec![listing("1"), listing("2"), listing("3")]);
        assert_eq!(requested, vec![BASE.to_string(), page_url(2)]);
    }

    #[tokio::test]
    async fn failing_status_after_first_page_returns_partial_results() {
        let fetcher = ScriptedFetcher::default()
            .page(BASE, StatusCode::OK, &listing_page(&["1"], "30 Anzeigen online"))
            .page(&page_url(2), StatusCode::INTERNAL_SERVER_ERROR, "");

        let (result, requested) = run(fetcher, BASE).await;

        assert_eq!(result.unwrap(), vec![listing("1")]);
        assert_eq!(requested, vec![BASE.to_string(), page_url(2)]);
    }

    #[tokio::test]
    async fn first_page_transport_failure_aborts() {
        let fetcher = ScriptedFetcher::default().failure(BASE, "connection reset");

        let (result, requested) = run(fetcher, BASE).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { ref url, .. } if url == BASE));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(requested, vec![BASE.to_string()]);
    }

    #[tokio::test]
    async fn first_page_error_status_aborts() {
        let fetcher = ScriptedFetcher::default().page(BASE, StatusCode::FORBIDDEN, "blocked");

        let (result, requested) = run(fetcher, BASE).await;

        assert!(matches!(
            result,
            Err(ScrapeError::Status { status, .. }) if status == StatusCode::FORBIDDEN
        ));
        assert_eq!(requested, vec![BASE.to_string()]);
    }

    #[tokio::test]
    async fn later_transport_failure_aborts() {
        let fetcher = ScriptedFetcher::default()
            .page(BASE, StatusCode::OK, &listing_page(&["1"], ""))
            .failure(&page_url(2), "timed out");

        let (result, _) = run(fetcher, BASE).await;

        assert!(matches!(
            result,
            Err(ScrapeError::Fetch { ref url, .. }) if *url == page_url(2)
        ));
    }

    #[tokio::test]
    async fn query_string_is_stripped_before_paging() {
        let fetcher = ScriptedFetcher::default()
            .page(BASE, StatusCode::OK, &listing_page(&["1"], ""))
            .page(&page_url(2), StatusCode::OK, &listing_page(&["2"], ""));

        let (result, requested) = run(fetcher, &format!("{BASE}?seite=7&sort=new")).await;

        assert_eq!(result.unwrap(), vec![listing("1"), listing("2")]);
        assert_eq!(
            requested,
            vec![BASE.to_string(), page_url(2), page_url(3)]
        );
    }

    #[tokio::test]
    async fn empty_seller_is_not_an_error() {
        let fetcher =
            ScriptedFetcher::default().page(BASE, StatusCode::OK, "<p>Keine Anzeigen</p>");

        let (result, requested) = run(fetcher, BASE).await;

        assert!(result.unwrap().is_empty());
        assert_eq!(requested, vec![BASE.to_string(), page_url(2)]);
    }

    #[tokio::test]
    async fn zero_ad_count_does_not_bound_pagination() {
        let fetcher = ScriptedFetcher::default()
            .page(BASE, StatusCode::OK, &listing_page(&["1"], "0 Anzeigen online"))
            .page(&page_url(2), StatusCode::OK, &listing_page(&["2"], ""));

        let (result, _) = run(fetcher, BASE).await;

        assert_eq!(result.unwrap(), vec![listing("1"), listing("2")]);
    }

    #[tokio::test]
    async fn hard_cap_stops_endless_pagination() {
        let mut fetcher =
            ScriptedFetcher::default().page(BASE, StatusCode::OK, &listing_page(&["1"], ""));
        for page in 2..=10u32 {
            let id = page.to_string();
            fetcher = fetcher.page(
                &page_url(page),
                StatusCode::OK,
                &listing_page(&[id.as_str()], ""),
            );
        }
        let config = MarketplaceConfig {
            max_pages: 3,
            ..MarketplaceConfig::kleinanzeigen()
        };

        let (result, requested) = run_with(fetcher, config, BASE).await;

        assert_eq!(result.unwrap(), vec![listing("1"), listing("2"), listing("3")]);
        assert_eq!(requested.len(), 3);
    }

    #[tokio::test]
    async fn blank_url_is_rejected_without_fetching() {
        let (result, requested) = run(ScriptedFetcher::default(), "   ").await;

        assert!(matches!(result, Err(ScrapeError::EmptyUrl)));
        assert!(requested.is_empty());
    }

    #[test]
    fn strip_query_keeps_path() {
        assert_eq!(strip_query(&format!("{BASE}?a=1?b=2")), BASE);
        assert_eq!(strip_query(BASE), BASE);
    }
}
