//! ufcstats.com event source
//!
//! Scrapes the completed-events listing and individual event pages. Every
//! request has a timeout and is retried with exponential backoff.

use crate::config::AppConfig;
use crate::error::{RatingError, Result};
use crate::fetch::source::EventSource;
use crate::types::{Bout, EventId, EventResults, EventYear, ResultKind};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Event titles that count as UFC events
const EVENT_TITLE_MARKERS: [&str; 2] = ["UFC", "The Ultimate Fighter"];

/// CSS selectors for ufcstats.com pages
#[derive(Debug, Clone)]
pub struct UfcStatsParser {
    event_link: Selector,
    result_flag: Selector,
    fighter_link: Selector,
    event_info: Selector,
}

impl UfcStatsParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            event_link: selector("a[href*='event-details']")?,
            result_flag: selector("i.b-flag__text")?,
            fighter_link: selector("a.b-link.b-link_style_black")?,
            event_info: selector("li.b-list__box-list-item")?,
        })
    }

    /// Extract event page links from the completed-events listing
    ///
    /// Links keep the page order (most recent first); duplicates are dropped.
    pub fn parse_event_list(&self, html: &str) -> Vec<EventId> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        document
            .select(&self.event_link)
            .filter(|link| {
                let title = link.text().collect::<String>();
                EVENT_TITLE_MARKERS.iter().any(|marker| title.contains(marker))
            })
            .filter_map(|link| link.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| seen.insert(href.clone()))
            .collect()
    }

    /// Extract bout results from an event page
    ///
    /// The page lists the main event first and names the winner before the
    /// loser, so both lists are reversed to get chronological order with the
    /// loser first in every pair.
    pub fn parse_event_page(&self, event_id: &str, html: &str) -> Result<Option<EventResults>> {
        let document = Html::parse_document(html);

        let flags: Vec<String> = document
            .select(&self.result_flag)
            .map(|flag| flag.text().collect::<String>().trim().to_string())
            .collect();

        let happened = flags
            .first()
            .map(|flag| flag.parse::<ResultKind>().is_ok())
            .unwrap_or(false);
        if !happened {
            debug!("Event {} has no results yet", event_id);
            return Ok(None);
        }

        let mut names: Vec<String> = document
            .select(&self.fighter_link)
            .map(|link| link.text().collect::<String>().trim().to_string())
            .collect();
        names.reverse();

        // Each bout carries one flag per fighter; the first one holds the result
        let mut kinds: Vec<ResultKind> = flags
            .iter()
            .step_by(2)
            .filter_map(|flag| flag.parse().ok())
            .collect();
        kinds.reverse();

        if names.len() != kinds.len() * 2 {
            return Err(RatingError::FetchFailure {
                event_id: event_id.to_string(),
                reason: format!(
                    "found {} fighter names for {} results",
                    names.len(),
                    kinds.len()
                ),
            }
            .into());
        }

        let event_year = self.parse_event_year(&document).ok_or_else(|| {
            anyhow::Error::from(RatingError::FetchFailure {
                event_id: event_id.to_string(),
                reason: "event date not found".to_string(),
            })
        })?;

        let bouts = names
            .chunks_exact(2)
            .zip(kinds)
            .map(|(pair, kind)| Bout::new(pair[0].clone(), pair[1].clone(), kind))
            .collect();

        Ok(Some(EventResults {
            event_id: event_id.to_string(),
            event_year,
            bouts,
        }))
    }

    fn parse_event_year(&self, document: &Html) -> Option<EventYear> {
        let item = document.select(&self.event_info).next()?;
        let text = item
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        parse_event_date(&text)
    }
}

/// Parse "Date: March 09, 2024" style labels, falling back to a trailing year
pub fn parse_event_date(text: &str) -> Option<EventYear> {
    let date = text.trim().trim_start_matches("Date:").trim();

    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%B %d, %Y") {
        return Some(parsed.year());
    }

    let tail = date.get(date.len().saturating_sub(4)..)?;
    if tail.len() == 4 && tail.chars().all(|c| c.is_ascii_digit()) {
        tail.parse().ok()
    } else {
        None
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {}: {}", css, e))
}

/// Event source backed by ufcstats.com
#[derive(Debug, Clone)]
pub struct UfcStatsSource {
    client: Client,
    parser: UfcStatsParser,
    events_url: String,
    max_retries: u32,
    retry_delay: Duration,
    request_delay: Duration,
}

impl UfcStatsSource {
    /// Create a new source from the fetch settings
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.fetch.user_agent.clone())
            .timeout(config.fetch_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            parser: UfcStatsParser::new()?,
            events_url: config.fetch.events_url.clone(),
            max_retries: config.fetch.max_retry_attempts,
            retry_delay: config.fetch_retry_delay(),
            request_delay: config.fetch_request_delay(),
        })
    }

    /// Fetch a page body, retrying with exponential backoff
    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut retry_count = 0;
        let mut delay = self.retry_delay;

        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    retry_count += 1;
                    if retry_count > self.max_retries {
                        return Err(e.context(format!(
                            "Giving up on {} after {} attempts",
                            url, retry_count
                        )));
                    }

                    warn!(
                        "Request {} attempt {} failed: {}. Retrying in {:?}",
                        url, retry_count, e, delay
                    );

                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                }
            }
        }
    }

    /// Single request attempt
    async fn try_fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }
}

#[async_trait]
impl EventSource for UfcStatsSource {
    async fn list_events(&self) -> Result<Vec<EventId>> {
        let body = self.fetch_with_retry(&self.events_url).await?;
        let events = self.parser.parse_event_list(&body);

        info!("Found {} completed events on {}", events.len(), self.events_url);
        Ok(events)
    }

    async fn fetch_event(&self, event_id: &str) -> Result<Option<EventResults>> {
        let body = self
            .fetch_with_retry(event_id)
            .await
            .map_err(|e| RatingError::FetchFailure {
                event_id: event_id.to_string(),
                reason: format!("{:#}", e),
            })?;

        self.parser.parse_event_page(event_id, &body)
    }

    fn request_delay(&self) -> Duration {
        self.request_delay
    }
}
