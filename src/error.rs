//! Error kinds surfaced by API calls and offline transforms.

use std::error::Error as StdError;
use std::fmt;

/// Errors that can emerge while talking to the MediaWiki API or validating
/// caller input.
///
/// Every failure mode keeps its own variant so callers can decide per kind
/// whether to retry, skip, or abort; nothing collapses into an opaque
/// catch-all.
#[derive(Debug)]
pub enum Error {
    /// Connection-level failure that survived all retries.
    Network {
        /// Description of the underlying transport failure.
        message: String,
        /// Underlying client error, when one is available.
        source: Option<reqwest::Error>,
    },
    /// The server kept answering HTTP 429 until the retry budget ran out.
    RateLimited,
    /// Non-retryable HTTP status (4xx/5xx other than retried 429).
    HttpStatus {
        /// Numeric HTTP status code.
        status: u16,
    },
    /// The MediaWiki API returned an `error` envelope.
    Api {
        /// Machine-readable error code from the envelope.
        code: String,
        /// Human-readable description from the envelope.
        info: String,
    },
    /// The requested page does not exist.
    PageNotFound {
        /// Title as requested by the caller.
        title: String,
        /// Language code of the wiki queried.
        lang: String,
    },
    /// The caller supplied invalid parameters; no request was issued.
    Validation(String),
    /// A redirect table loops; the chain chase gave up after `hops` hops.
    RedirectCycle {
        /// Title whose resolution entered the cycle.
        title: String,
        /// Number of hops taken before giving up.
        hops: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { message, .. } => write!(f, "network error: {message}"),
            Self::RateLimited => write!(f, "rate limited (HTTP 429) after all retries"),
            Self::HttpStatus { status } => write!(f, "HTTP {status}"),
            Self::Api { code, info } => write!(f, "API error '{code}': {info}"),
            Self::PageNotFound { title, lang } => {
                write!(f, "page not found: '{title}' (lang={lang})")
            }
            Self::Validation(message) => write!(f, "invalid parameters: {message}"),
            Self::RedirectCycle { title, hops } => {
                write!(f, "redirect chain for '{title}' did not terminate after {hops} hops")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Network {
                source: Some(err), ..
            } => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_not_found_names_title_and_lang() {
        let err = Error::PageNotFound {
            title: "Missing Page".to_string(),
            lang: "de".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("Missing Page"));
        assert!(text.contains("de"));
    }

    #[test]
    fn api_error_carries_code_and_info() {
        let err = Error::Api {
            code: "badvalue".to_string(),
            info: "Unrecognized value".to_string(),
        };
        assert!(err.to_string().contains("badvalue"));
        assert!(err.to_string().contains("Unrecognized value"));
    }
}
