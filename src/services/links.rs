// src/services/links.rs

//! Airline discovery from the directory page.

use std::collections::HashSet;

use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{AirlineLink, Config, DirectoryLink, SourceConfig};
use crate::services::cache::TtlCache;
use crate::utils::{http, resolve};

/// Collect airline anchors from a directory page.
///
/// Keeps anchors whose `href` is non-empty and contains `filter`. Labels are
/// the anchor text with surrounding whitespace trimmed. Repeated `(url, label)` pairs are
/// reported once, in page order.
pub fn extract_links(html: &str, base_url: &str, filter: &str) -> Result<Vec<DirectoryLink>> {
    let document = Html::parse_document(html);
    let anchor_sel = parse_selector("a")?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.is_empty() || !href.contains(filter) {
            continue;
        }

        let link = DirectoryLink {
            url: resolve(base_url, href),
            label: anchor.text().collect::<String>().trim().to_string(),
        };
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    Ok(links)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Airlines found on the directory page.
#[derive(Debug, Default)]
pub struct Discovery {
    pub airlines: Vec<AirlineLink>,
    /// Links whose label did not split into date, country and name
    pub rejected: Vec<(DirectoryLink, AppError)>,
}

/// Fetches and parses the airline directory, caching the link list.
pub struct AirlineDirectory {
    source: SourceConfig,
    client: Client,
    cache: TtlCache<String, Vec<DirectoryLink>>,
}

impl AirlineDirectory {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            source: config.source.clone(),
            client,
            cache: TtlCache::from_config(&config.cache),
        }
    }

    /// Fetch the directory page and extract airline links.
    ///
    /// A failure here means no airline can be scraped, so it is returned
    /// to the caller rather than recorded.
    pub async fn fetch_links(&self) -> Result<Vec<DirectoryLink>> {
        let base_url = &self.source.base_url;
        if let Some(links) = self.cache.get(base_url) {
            log::debug!("Directory cache hit for {}", base_url);
            return Ok(links);
        }

        let html = http::fetch_html(&self.client, base_url).await?;
        let links = extract_links(&html, base_url, &self.source.link_filter)?;
        self.cache.insert(base_url.clone(), links.clone());
        Ok(links)
    }

    /// Fetch links and split every label into an airline identity.
    pub async fn discover(&self) -> Result<Discovery> {
        let links = self.fetch_links().await?;
        let mut discovery = Discovery::default();

        for link in links {
            match AirlineLink::parse(link.clone()) {
                Ok(airline) => discovery.airlines.push(airline),
                Err(error) => {
                    log::warn!("Skipping airline link {}: {}", link.url, error);
                    discovery.rejected.push((link, error));
                }
            }
        }

        log::info!(
            "Discovered {} airlines ({} links rejected)",
            discovery.airlines.len(),
            discovery.rejected.len()
        );
        Ok(discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const BASE: &str = "https://www.pilotjobsnetwork.com/";

    const DIRECTORY: &str = r#"
        <html><body>
          <a href="jobs/air-acme">
            2024-01-05 - France - Air Acme </a>
          <a href="about">About</a>
          <a>No href at all</a>
          <a href="">Empty href</a>
          <a href="jobs/broken">Broken label</a>
          <a href="jobs/air-acme">2024-01-05 - France - Air Acme</a>
          <a href="/jobs/root-relative">2023-12-01 - Chile - LATAM</a>
        </body></html>
    "#;

    #[test]
    fn test_extract_links_filters_on_href() {
        let links = extract_links(DIRECTORY, BASE, "jobs/").unwrap();

        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.url.contains("jobs/")));
        assert!(links.iter().all(|l| !l.label.contains("href")));
    }

    #[test]
    fn test_extract_links_builds_absolute_urls_and_trims_labels() {
        let links = extract_links(DIRECTORY, BASE, "jobs/").unwrap();

        assert_eq!(links[0].url, "https://www.pilotjobsnetwork.com/jobs/air-acme");
        assert_eq!(links[0].label, "2024-01-05 - France - Air Acme");
        assert_eq!(
            links[2].url,
            "https://www.pilotjobsnetwork.com/jobs/root-relative"
        );
    }

    #[test]
    fn test_extract_links_keeps_inner_spacing() {
        let html = r#"<a href="jobs/x"> 2024-01-05 -  France - Air  Acme </a>"#;
        let links = extract_links(html, BASE, "jobs/").unwrap();

        assert_eq!(links[0].label, "2024-01-05 -  France - Air  Acme");
        let airline = AirlineLink::parse(links[0].clone()).unwrap();
        assert_eq!(airline.country, " France");
        assert_eq!(airline.name, "Air  Acme");
    }

    #[test]
    fn test_extract_links_empty_document() {
        assert!(extract_links("", BASE, "jobs/").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_isolates_bad_labels() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(DIRECTORY)
            .expect(1)
            .create_async()
            .await;

        let mut config = Config::default();
        config.source.base_url = format!("{}/", server.url());
        let directory = AirlineDirectory::new(&config, Client::new());

        let discovery = directory.discover().await.unwrap();
        assert_eq!(discovery.airlines.len(), 2);
        assert_eq!(discovery.rejected.len(), 1);
        assert_eq!(discovery.rejected[0].0.label, "Broken label");
        assert!(matches!(discovery.rejected[0].1, AppError::Parse(_)));

        // Second call is served from the cache.
        let again = directory.discover().await.unwrap();
        assert_eq!(again.airlines, discovery.airlines);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_directory_failure_is_fatal() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let mut config = Config::default();
        config.source.base_url = format!("{}/", server.url());
        let directory = AirlineDirectory::new(&config, Client::new());

        assert!(matches!(
            directory.discover().await,
            Err(AppError::Fetch { .. })
        ));
    }
}
