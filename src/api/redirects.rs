//! Resolve page redirects, singly and in server-side batches.

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::info;

use crate::error::Error;
use crate::http::{query_params, Params, WikiClient};

/// Titles per physical request; the ceiling the MediaWiki API enforces.
const BATCH_SIZE: usize = 50;

/// Defensive cap on redirect-chain hops. A chain longer than this means the
/// redirect table loops.
const MAX_REDIRECT_HOPS: usize = 20;

fn redirect_params(title: &str) -> Params {
    let mut params = query_params();
    params.push(("titles", title.to_string()));
    params.push(("redirects", String::new()));
    params
}

fn batch_redirect_params(titles: &[String]) -> Params {
    let mut params = query_params();
    params.push(("titles", titles.join("|")));
    params.push(("redirects", String::new()));
    params
}

fn parse_redirect(data: &Value) -> Option<String> {
    data.pointer("/query/redirects")
        .and_then(Value::as_array)
        .and_then(|redirects| redirects.last())
        .and_then(|entry| entry.get("to"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn string_pairs(data: &Value, pointer: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for entry in data
        .pointer(pointer)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let from = entry.get("from").and_then(Value::as_str);
        let to = entry.get("to").and_then(Value::as_str);
        if let (Some(from), Some(to)) = (from, to) {
            map.insert(from.to_string(), to.to_string());
        }
    }
    map
}

/// Resolves one batch response into a title → destination mapping.
///
/// Titles are first mapped through the response's `normalized` list, then
/// chased through the flat `redirects` table until no further hop exists.
/// A chain that is still hopping after [`MAX_REDIRECT_HOPS`] hops is a
/// cyclic redirect table and fails with [`Error::RedirectCycle`].
pub(crate) fn parse_batch_redirects(
    data: &Value,
    titles: &[String],
) -> Result<HashMap<String, Option<String>>, Error> {
    let redirect_map = string_pairs(data, "/query/redirects");
    let normalize_map = string_pairs(data, "/query/normalized");

    let mut result = HashMap::with_capacity(titles.len());
    for title in titles {
        let canonical = normalize_map
            .get(title)
            .map(String::as_str)
            .unwrap_or(title);
        let mut destination = redirect_map.get(canonical);
        let mut hops = 0usize;
        while let Some(next) = destination.and_then(|current| redirect_map.get(current)) {
            hops += 1;
            if hops >= MAX_REDIRECT_HOPS {
                return Err(Error::RedirectCycle {
                    title: title.clone(),
                    hops,
                });
            }
            destination = Some(next);
        }
        result.insert(title.clone(), destination.cloned());
    }
    Ok(result)
}

fn redirects_to_params(page: &str) -> Params {
    let mut params = query_params();
    params.push(("prop", "redirects".to_string()));
    params.push(("titles", page.to_string()));
    params.push(("rdlimit", "max".to_string()));
    params
}

fn parse_redirects_to(data: &Value) -> Vec<String> {
    data.pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .and_then(|page| page.get("redirects"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("title").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

impl WikiClient {
    /// Checks whether a title is a redirect and returns its destination.
    ///
    /// The server follows the chain; the last entry of the returned
    /// redirect list is the final destination. `None` means the title is
    /// not a redirect.
    pub async fn resolve_redirect(&self, title: &str) -> Result<Option<String>, Error> {
        info!(title, "checking redirect status");
        let data = self.api_get(&redirect_params(title)).await?;
        Ok(parse_redirect(&data))
    }

    /// Resolves redirects for many titles.
    ///
    /// Titles are partitioned into chunks of 50 (the server ceiling) and
    /// fetched under the client's concurrency bound. Every requested title
    /// appears exactly once in the result; non-redirects map to `None`.
    /// An empty title list performs no requests.
    pub async fn resolve_redirects<S: AsRef<str>>(
        &self,
        titles: &[S],
    ) -> Result<HashMap<String, Option<String>>, Error> {
        if titles.is_empty() {
            return Ok(HashMap::new());
        }

        let chunks: Vec<Vec<String>> = titles
            .chunks(BATCH_SIZE)
            .map(|chunk| chunk.iter().map(|t| t.as_ref().to_string()).collect())
            .collect();
        info!(
            titles = titles.len(),
            requests = chunks.len(),
            "resolving redirects"
        );

        let mut pending = stream::iter(chunks.into_iter().map(|chunk| async move {
            let data = self.api_get(&batch_redirect_params(&chunk)).await?;
            parse_batch_redirects(&data, &chunk)
        }))
        .buffer_unordered(self.max_concurrency());

        let mut result = HashMap::new();
        while let Some(chunk_result) = pending.next().await {
            result.extend(chunk_result?);
        }
        Ok(result)
    }

    /// Finds every page that redirects to the given page.
    pub async fn redirects_to(&self, page: &str) -> Result<Vec<String>, Error> {
        info!(page, "retrieving redirects to page");
        self.collect_paginated(redirects_to_params(page), "rdcontinue", parse_redirects_to)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn single_redirect_takes_last_entry() {
        let data = json!({
            "query": {"redirects": [
                {"from": "Morals", "to": "Moral"},
                {"from": "Moral", "to": "Morality"}
            ]}
        });
        assert_eq!(parse_redirect(&data), Some("Morality".to_string()));
    }

    #[test]
    fn non_redirect_resolves_to_none() {
        let data = json!({"query": {"pages": {"1": {"title": "Morality"}}}});
        assert_eq!(parse_redirect(&data), None);
    }

    #[test]
    fn batch_chases_chains() {
        let data = json!({
            "query": {"redirects": [
                {"from": "A", "to": "B"},
                {"from": "B", "to": "C"}
            ]}
        });
        let resolved = parse_batch_redirects(&data, &titles(&["A", "B", "C"])).expect("resolves");
        assert_eq!(resolved["A"], Some("C".to_string()));
        assert_eq!(resolved["B"], Some("C".to_string()));
        assert_eq!(resolved["C"], None);
    }

    #[test]
    fn batch_applies_normalization() {
        let data = json!({
            "query": {
                "normalized": [{"from": "morals", "to": "Morals"}],
                "redirects": [{"from": "Morals", "to": "Morality"}]
            }
        });
        let resolved = parse_batch_redirects(&data, &titles(&["morals"])).expect("resolves");
        assert_eq!(resolved["morals"], Some("Morality".to_string()));
    }

    #[test]
    fn cyclic_table_fails_distinctly() {
        let data = json!({
            "query": {"redirects": [
                {"from": "A", "to": "B"},
                {"from": "B", "to": "A"}
            ]}
        });
        match parse_batch_redirects(&data, &titles(&["A"])) {
            Err(Error::RedirectCycle { title, hops }) => {
                assert_eq!(title, "A");
                assert_eq!(hops, MAX_REDIRECT_HOPS);
            }
            other => panic!("expected redirect cycle, got {other:?}"),
        }
    }

    #[test]
    fn parses_redirects_to_list() {
        let data = json!({
            "query": {"pages": {"9397": {
                "title": "Morality",
                "redirects": [
                    {"pageid": 100, "ns": 0, "title": "Morals"},
                    {"pageid": 101, "ns": 0, "title": "Moral code"}
                ]
            }}}
        });
        assert_eq!(parse_redirects_to(&data), vec!["Morals", "Moral code"]);
    }
}
