//! Page retrieval with retries and location URL discovery.

use std::{thread::sleep, time::Duration};

use bon::bon;
use ureq::Agent;

use crate::prelude::*;

pub struct Fetcher {
    client: Agent,
    max_retries: u32,
    retry_delay: Duration,
}

#[bon]
impl Fetcher {
    #[builder]
    pub fn new(max_retries: u32, retry_delay: Duration, timeout: Duration) -> Self {
        let client = Agent::config_builder().timeout_global(Some(timeout)).build().into();
        Self { client, max_retries, retry_delay }
    }

    /// Fetches the page, backing off linearly between the attempts.
    #[instrument(skip_all, fields(url = url))]
    pub fn fetch_html(&self, url: &str) -> Result<String> {
        for attempt in 1..=self.max_retries {
            info!(attempt, max_retries = self.max_retries, "fetching…");
            match self.try_fetch(url) {
                Ok(html) => {
                    info!(n_bytes = html.len(), "fetched");
                    return Ok(html);
                }
                Err(error) => {
                    warn!("attempt #{attempt} failed: {error:#}");
                    if attempt < self.max_retries {
                        sleep(self.retry_delay * attempt);
                    }
                }
            }
        }
        bail!("all {} attempts to fetch `{url}` failed", self.max_retries)
    }

    /// Probes the usual page addresses for the location and falls back to
    /// the configured URL when none of them mentions solar radiation.
    #[instrument(skip_all, fields(location = location))]
    pub fn find_url(&self, location: &str, base_url: &str, fallback_url: &str) -> String {
        let slug = location.to_lowercase().replace(' ', "-");
        let candidates = [
            format!("{base_url}/solar-radiation/{slug}.html"),
            format!("{base_url}/solar-radiation/{}.html", slug.replace('-', "_")),
            format!("{base_url}/solar-radiation/{}.html", slug.replace('-', "")),
        ];
        for url in candidates {
            match self.probe(&url) {
                Ok(true) => {
                    info!(url, "found the forecast page");
                    return url;
                }
                Ok(false) => debug!(url, "the page does not mention solar radiation"),
                Err(error) => debug!(url, "probe failed: {error:#}"),
            }
        }
        warn!(fallback_url, "falling back to the configured page address");
        fallback_url.to_string()
    }

    /// One plain attempt, and a sniff that the page is about solar radiation
    /// rather than a location landing page.
    fn probe(&self, url: &str) -> Result<bool> {
        let html = self.try_fetch(url)?.to_lowercase();
        Ok(html.contains("solar") || html.contains("radiation"))
    }

    fn try_fetch(&self, url: &str) -> Result<String> {
        Ok(self
            .client
            .get(url)
            .header("User-Agent", "Mozilla/5.0")
            .call()?
            .body_mut()
            .read_to_string()?)
    }
}
