//! Web page reader.

use super::Extraction;
use crate::config::WebSettings;
use crate::error::{DocentError, Result};
use crate::http::create_client_with_agent;
use scraper::{Html, Node};
use tracing::{info, instrument, warn};

/// Elements whose text is never visible.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetches pages and reduces them to visible text.
pub struct WebReader {
    client: reqwest::Client,
}

impl WebReader {
    /// Create a reader from web settings.
    pub fn new(settings: &WebSettings) -> Result<Self> {
        Ok(Self {
            client: create_client_with_agent(settings.timeout_seconds, &settings.user_agent)?,
        })
    }

    /// Fetch a URL and return its visible text.
    ///
    /// Any failure (bad URL, network error, non-success status) becomes a
    /// warning naming the URL and an empty text. There is no retry.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Extraction {
        match self.try_fetch(url).await {
            Ok(text) => {
                info!("Fetched {} chars of text", text.len());
                Extraction::text(text)
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                Extraction::failed(url, e)
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url.trim())
            .map_err(|e| DocentError::InvalidInput(format!("Invalid URL: {}", e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DocentError::InvalidInput(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DocentError::extraction(url, format!("HTTP {}", status)));
        }

        let html = response.text().await?;
        Ok(visible_text(&html))
    }
}

/// Strip hidden markup and return whitespace-normalized visible text.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut parts: Vec<String> = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !normalized.is_empty() {
            parts.push(normalized);
        }
    }

    parts.join(" ")
}
