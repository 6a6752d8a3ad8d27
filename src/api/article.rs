//! Retrieve Wikipedia article text.

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Error;
use crate::http::{query_params, Params, WikiClient};
use crate::models::{Article, ArticleBatch};

fn article_params(title: &str) -> Params {
    let mut params = query_params();
    params.push(("prop", "extracts|info".to_string()));
    params.push(("explaintext", "1".to_string()));
    params.push(("titles", title.to_string()));
    params
}

/// Heuristic truncation signal: trailing ellipsis, or an extract shorter
/// than half the reported wikitext length. Informational only.
fn looks_truncated(text: &str, wikitext_length: Option<u64>) -> bool {
    let trimmed = text.trim_end();
    if trimmed.ends_with('…') || trimmed.ends_with("...") {
        return true;
    }
    match wikitext_length {
        Some(length) if length > 0 => (text.len() as f64) < 0.5 * length as f64,
        _ => false,
    }
}

fn parse_article(data: &Value, requested: &str, lang: &str) -> Article {
    let page = data
        .pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next());

    let title = page
        .and_then(|p| p.get("title"))
        .and_then(Value::as_str)
        .unwrap_or(requested)
        .to_string();
    let text = page
        .and_then(|p| p.get("extract"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let pageid = page
        .and_then(|p| p.get("pageid"))
        .and_then(Value::as_i64)
        .unwrap_or(-1);
    let wikitext_length = page.and_then(|p| p.get("length")).and_then(Value::as_u64);
    let possibly_truncated = looks_truncated(&text, wikitext_length);

    Article {
        title,
        text,
        pageid,
        lang: lang.to_string(),
        possibly_truncated,
        wikitext_length,
    }
}

impl WikiClient {
    /// Retrieves the plaintext extract of a single article.
    ///
    /// Fails with [`Error::PageNotFound`] when the page does not exist.
    pub async fn article(&self, title: &str) -> Result<Article, Error> {
        info!(title, "retrieving article text");
        let params = article_params(title);
        let data = self.api_get_checked(&params, title).await?;
        Ok(parse_article(&data, title, self.lang()))
    }

    /// Retrieves many articles under the client's concurrency bound.
    ///
    /// Missing pages are collected into [`ArticleBatch::missing`] instead of
    /// failing the batch; any other error aborts the whole batch and drops
    /// the in-flight siblings. An empty title list performs no requests.
    pub async fn articles<S: AsRef<str>>(&self, titles: &[S]) -> Result<ArticleBatch, Error> {
        if titles.is_empty() {
            return Ok(ArticleBatch::default());
        }

        let mut pending = stream::iter(titles.iter().map(|title| {
            let title = title.as_ref().to_string();
            async move {
                let result = self.article(&title).await;
                (title, result)
            }
        }))
        .buffer_unordered(self.max_concurrency());

        let mut batch = ArticleBatch::default();
        while let Some((title, result)) = pending.next().await {
            match result {
                Ok(article) => batch.articles.push(article),
                Err(Error::PageNotFound { .. }) => {
                    warn!(title = %title, lang = self.lang(), "skipping missing page");
                    batch.missing.push(title);
                }
                Err(err) => return Err(err),
            }
        }

        if !batch.missing.is_empty() {
            warn!(
                skipped = batch.missing.len(),
                requested = titles.len(),
                "skipped missing pages"
            );
        }
        Ok(batch)
    }
}
