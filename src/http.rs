//! MediaWiki API transport: retrying GET requests and cursor pagination.
//!
//! One [`WikiClient`] talks to one wiki (one language edition). All endpoint
//! operations in [`crate::api`] funnel through [`WikiClient::api_get`], which
//! owns rate limiting, retry with exponential backoff, and error
//! classification.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::error::Error;
use crate::limiter::RateLimiter;

/// Identifying User-Agent sent with every request, per Wikimedia etiquette.
pub const USER_AGENT: &str =
    "wikicorpus/0.1.0 (https://github.com/wikicorpus/wikicorpus-rs; reqwest)";

const MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Query parameters for one API request.
pub(crate) type Params = Vec<(&'static str, String)>;

/// Starting parameter set shared by every `action=query` operation.
pub(crate) fn query_params() -> Params {
    vec![
        ("action", "query".to_string()),
        ("format", "json".to_string()),
    ]
}

/// Inserts or replaces a query parameter in place.
pub(crate) fn set_param(params: &mut Params, key: &'static str, value: String) {
    if let Some(entry) = params.iter_mut().find(|(k, _)| *k == key) {
        entry.1 = value;
    } else {
        params.push((key, value));
    }
}

/// Classified result of one physical HTTP round-trip.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// 2xx with a well-formed, error-free JSON body.
    Success(Value),
    /// Connection-level or body-level failure worth retrying.
    Transient {
        message: String,
        source: Option<reqwest::Error>,
    },
    /// HTTP 429, with the `Retry-After` delay when the server sent one.
    RateLimited(Option<f64>),
    /// Any other status >= 400.
    ClientError(u16),
    /// 2xx carrying a MediaWiki `error` envelope.
    ApiError { code: String, info: String },
}

/// Maps status, `Retry-After`, and body text to an [`Outcome`].
pub(crate) fn classify_response(status: u16, retry_after: Option<f64>, body: &str) -> Outcome {
    if status == 429 {
        return Outcome::RateLimited(retry_after);
    }
    if status >= 400 {
        return Outcome::ClientError(status);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            return Outcome::Transient {
                message: format!("invalid JSON body: {err}"),
                source: None,
            }
        }
    };

    if let Some(envelope) = value.get("error") {
        let code = envelope
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let info = envelope
            .get("info")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        return Outcome::ApiError { code, info };
    }

    Outcome::Success(value)
}

/// Fails with [`Error::PageNotFound`] when the response's sole page entry
/// carries a `missing` marker.
pub(crate) fn check_missing(data: &Value, title: &str, lang: &str) -> Result<(), Error> {
    let page = data
        .pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next());
    if let Some(page) = page {
        if page.get("missing").is_some() {
            return Err(Error::PageNotFound {
                title: title.to_string(),
                lang: lang.to_string(),
            });
        }
    }
    Ok(())
}

/// Asynchronous MediaWiki API client for one language edition.
///
/// Construct with [`WikiClient::new`] for defaults, or through
/// [`WikiClient::builder`] to share a rate limiter, reuse a connection pool,
/// or point at a non-Wikipedia endpoint.
pub struct WikiClient {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    lang: String,
    api_url: Url,
    max_retries: u32,
    base_delay: Duration,
    max_concurrency: usize,
}

impl WikiClient {
    /// Creates a client for `https://{lang}.wikipedia.org` with defaults.
    pub fn new(lang: &str) -> Result<Self, Error> {
        Self::builder(lang).build()
    }

    /// Starts building a client for the given language edition.
    pub fn builder(lang: &str) -> WikiClientBuilder {
        WikiClientBuilder::new(lang)
    }

    /// Language code this client queries.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Rate limiter gating this client's requests.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub(crate) fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    async fn round_trip(&self, params: &Params) -> Outcome {
        let request = self.http.get(self.api_url.clone()).query(params);
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                return Outcome::Transient {
                    message: format!("request failed: {err}"),
                    source: Some(err),
                }
            }
        };

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0);
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return Outcome::Transient {
                    message: format!("failed to read body: {err}"),
                    source: Some(err),
                }
            }
        };

        classify_response(status, retry_after, &body)
    }

    /// Issues one logical GET, retrying transient failures and 429s.
    ///
    /// At most `max_retries + 1` physical attempts are made; exhausting the
    /// budget surfaces the last classified error.
    pub(crate) async fn api_get(&self, params: &Params) -> Result<Value, Error> {
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire_async().await;
            match self.round_trip(params).await {
                Outcome::Success(value) => return Ok(value),
                Outcome::Transient { message, source } => {
                    if attempt == self.max_retries {
                        return Err(Error::Network { message, source });
                    }
                    let delay = self.backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_s = delay.as_secs_f64(),
                        error = %message,
                        "transient error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Outcome::RateLimited(retry_after) => {
                    if attempt == self.max_retries {
                        return Err(Error::RateLimited);
                    }
                    let delay = retry_after
                        .map(Duration::from_secs_f64)
                        .unwrap_or_else(|| self.backoff(attempt));
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_s = delay.as_secs_f64(),
                        "rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Outcome::ClientError(status) => return Err(Error::HttpStatus { status }),
                Outcome::ApiError { code, info } => return Err(Error::Api { code, info }),
            }
            attempt += 1;
        }
    }

    /// Like [`Self::api_get`], additionally failing with
    /// [`Error::PageNotFound`] when the response marks the page missing.
    pub(crate) async fn api_get_checked(
        &self,
        params: &Params,
        title: &str,
    ) -> Result<Value, Error> {
        let data = self.api_get(params).await?;
        check_missing(&data, title, &self.lang)?;
        Ok(data)
    }

    /// Fetches every page of a cursor-paginated listing in server order.
    ///
    /// `parse` extracts this endpoint's items from one response body. The
    /// loop feeds the `continue_key` token back into the next request and
    /// stops when the response has no `continue` block, or has one lacking
    /// `continue_key` (malformed continuation data ends the listing rather
    /// than erroring).
    pub(crate) async fn collect_paginated<T, F>(
        &self,
        mut params: Params,
        continue_key: &'static str,
        parse: F,
    ) -> Result<Vec<T>, Error>
    where
        F: Fn(&Value) -> Vec<T>,
    {
        let mut items = Vec::new();
        loop {
            let data = self.api_get(&params).await?;
            items.extend(parse(&data));

            let token = data
                .get("continue")
                .and_then(|block| block.get(continue_key))
                .and_then(Value::as_str)
                .map(str::to_string);
            match token {
                Some(token) => set_param(&mut params, continue_key, token),
                None => return Ok(items),
            }
        }
    }
}

/// Builder for [`WikiClient`].
pub struct WikiClientBuilder {
    lang: String,
    user_agent: String,
    timeout: Duration,
    limiter: Option<Arc<RateLimiter>>,
    base_url: Option<Url>,
    max_retries: u32,
    base_delay: Duration,
    max_concurrency: usize,
    http: Option<reqwest::Client>,
}

impl WikiClientBuilder {
    fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            limiter: None,
            base_url: None,
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            http: None,
        }
    }

    /// Overrides the User-Agent header.
    pub fn user_agent(mut self, value: &str) -> Self {
        self.user_agent = value.to_string();
        self
    }

    /// Overrides the per-request timeout (default 30 s).
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Shares a rate limiter instead of constructing a private one.
    pub fn limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Points the client at an explicit `api.php` URL instead of
    /// `https://{lang}.wikipedia.org/w/api.php` (mirrors, test servers).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Overrides the retry budget (default 3 retries, 4 total attempts).
    pub fn max_retries(mut self, value: u32) -> Self {
        self.max_retries = value;
        self
    }

    /// Overrides the base backoff delay (default 1 s).
    pub fn base_delay(mut self, value: Duration) -> Self {
        self.base_delay = value;
        self
    }

    /// Overrides the concurrent-request bound for batch operations
    /// (default 4).
    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.max_concurrency = value.max(1);
        self
    }

    /// Supplies a reusable connection pool instead of building one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Finalizes the client.
    pub fn build(self) -> Result<WikiClient, Error> {
        let api_url = match self.base_url {
            Some(url) => url,
            None => {
                let endpoint = format!("https://{}.wikipedia.org/w/api.php", self.lang);
                Url::parse(&endpoint).map_err(|err| {
                    Error::Validation(format!("invalid language code '{}': {err}", self.lang))
                })?
            }
        };

        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()
                .map_err(|err| Error::Network {
                    message: format!("failed to build HTTP client: {err}"),
                    source: Some(err),
                })?,
        };

        Ok(WikiClient {
            http,
            limiter: self.limiter.unwrap_or_default(),
            lang: self.lang,
            api_url,
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            max_concurrency: self.max_concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_rate_limit_with_retry_after() {
        match classify_response(429, Some(2.5), "") {
            Outcome::RateLimited(Some(delay)) => assert_eq!(delay, 2.5),
            other => panic!("expected rate limited, got {other:?}"),
        }
    }

    #[test]
    fn classifies_client_errors() {
        match classify_response(500, None, "Internal Server Error") {
            Outcome::ClientError(500) => {}
            other => panic!("expected client error, got {other:?}"),
        }
        match classify_response(403, None, "") {
            Outcome::ClientError(403) => {}
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[test]
    fn classifies_api_error_envelope() {
        let body = json!({
            "error": {"code": "badvalue", "info": "Unrecognized value for parameter"}
        })
        .to_string();
        match classify_response(200, None, &body) {
            Outcome::ApiError { code, info } => {
                assert_eq!(code, "badvalue");
                assert!(info.starts_with("Unrecognized"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn api_error_defaults_when_fields_absent() {
        let body = json!({"error": {}}).to_string();
        match classify_response(200, None, &body) {
            Outcome::ApiError { code, info } => {
                assert_eq!(code, "unknown");
                assert_eq!(info, "");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_transient() {
        match classify_response(200, None, "<html>not json</html>") {
            Outcome::Transient { .. } => {}
            other => panic!("expected transient, got {other:?}"),
        }
    }

    #[test]
    fn missing_page_is_detected() {
        let data = json!({
            "query": {"pages": {"-1": {"title": "Nope", "missing": ""}}}
        });
        let err = check_missing(&data, "Nope", "en").expect_err("missing page");
        match err {
            Error::PageNotFound { title, lang } => {
                assert_eq!(title, "Nope");
                assert_eq!(lang, "en");
            }
            other => panic!("expected page not found, got {other:?}"),
        }
    }

    #[test]
    fn present_page_passes_missing_check() {
        let data = json!({
            "query": {"pages": {"42": {"title": "Real", "extract": "text"}}}
        });
        assert!(check_missing(&data, "Real", "en").is_ok());
    }

    #[test]
    fn set_param_replaces_existing_key() {
        let mut params = query_params();
        set_param(&mut params, "cmcontinue", "page|a".to_string());
        set_param(&mut params, "cmcontinue", "page|b".to_string());
        let values: Vec<_> = params.iter().filter(|(k, _)| *k == "cmcontinue").collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].1, "page|b");
    }
}
