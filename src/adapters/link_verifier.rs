use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{DomainError, LinkSettings, VerificationOutcome};
use crate::ports::LinkVerifier;

/// Redirect hops followed before the link counts as unreachable.
const MAX_REDIRECTS: usize = 5;

/// Verifies links with a single HTTP HEAD request.
///
/// Each instance owns its own client; nothing is shared between requests
/// unless the caller shares the instance.
pub struct HttpLinkVerifier {
    client: Client,
}

impl HttpLinkVerifier {
    /// Create a verifier whose probes are bounded by `settings.verify_timeout`.
    pub fn new(settings: &LinkSettings) -> Result<Self, DomainError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.verify_timeout)
            .connect_timeout(settings.verify_timeout)
            .redirect(Policy::limited(MAX_REDIRECTS));

        if !settings.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| DomainError::HttpClient(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            timeout = ?settings.verify_timeout,
            use_system_proxy = settings.use_system_proxy,
            "HttpLinkVerifier initialized"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl LinkVerifier for HttpLinkVerifier {
    async fn check(&self, url: &str) -> VerificationOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return VerificationOutcome::NetworkError {
                    detail: format!("invalid URL: {}", e),
                }
            }
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return VerificationOutcome::NetworkError {
                detail: format!("unsupported scheme '{}'", parsed.scheme()),
            };
        }

        debug!(url = url, "Sending HEAD probe");

        let outcome = match self.client.head(parsed).send().await {
            Ok(response) => analyze_response(url, &response),
            Err(e) => categorize_error(e),
        };

        match &outcome {
            VerificationOutcome::Verified { .. } => info!(url = url, "Link verified"),
            VerificationOutcome::Unreachable { status, reason } => {
                warn!(url = url, status = ?status, reason = %reason, "Link unreachable")
            }
            VerificationOutcome::NetworkError { detail } => {
                warn!(url = url, detail = %detail, "Link verification failed")
            }
        }

        outcome
    }
}

fn analyze_response(url: &str, response: &Response) -> VerificationOutcome {
    let status = response.status();

    if status.is_success() {
        VerificationOutcome::Verified {
            url: url.to_string(),
        }
    } else {
        VerificationOutcome::Unreachable {
            status: Some(status.as_u16()),
            reason: format!("HTTP {}", status),
        }
    }
}

fn categorize_error(error: reqwest::Error) -> VerificationOutcome {
    // Builder errors say nothing about the target
    if error.is_builder() {
        return VerificationOutcome::NetworkError {
            detail: error.to_string(),
        };
    }

    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    VerificationOutcome::Unreachable {
        status: error.status().map(|s| s.as_u16()),
        reason,
    }
}
