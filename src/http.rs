//! HTTP client construction with sensible defaults.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Timeout for OpenAI audio requests (5 minutes).
const OPENAI_TIMEOUT_SECS: u64 = 300;

/// Connect timeout applied to every client, even when the request timeout is disabled.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Create a reqwest client. A zero `timeout_secs` disables the request timeout.
pub fn create_client(timeout_secs: u64) -> Result<reqwest::Client> {
    create_client_with_agent(timeout_secs, concat!("docent/", env!("CARGO_PKG_VERSION")))
}

/// Create a reqwest client with a custom user agent.
pub fn create_client_with_agent(timeout_secs: u64, user_agent: &str) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent);

    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }

    Ok(builder.build()?)
}

/// Create an OpenAI client for the speech endpoints.
pub fn create_openai_client() -> Result<Client<OpenAIConfig>> {
    let http_client = create_client(OPENAI_TIMEOUT_SECS)?;
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Check if the OpenAI API key is configured.
pub fn is_openai_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_build() {
        assert!(create_client(0).is_ok());
        assert!(create_client_with_agent(5, "test-agent").is_ok());
        assert!(create_openai_client().is_ok());
    }
}
