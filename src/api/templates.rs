//! Retrieve templates transcluded on a page.

use serde_json::Value;
use tracing::info;

use crate::error::Error;
use crate::http::{query_params, Params, WikiClient};

fn template_params(page: &str) -> Params {
    let mut params = query_params();
    params.push(("prop", "templates".to_string()));
    params.push(("titles", page.to_string()));
    params.push(("tlnamespace", "10".to_string()));
    params.push(("tllimit", "max".to_string()));
    params
}

fn parse_templates(data: &Value) -> Vec<String> {
    data.pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .and_then(|page| page.get("templates"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("title").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

impl WikiClient {
    /// Retrieves the templates transcluded on a page.
    ///
    /// Only templates in namespace 10 (`Template:`) are returned; titles
    /// keep their prefix.
    pub async fn templates(&self, page: &str) -> Result<Vec<String>, Error> {
        info!(page, "retrieving templates");
        self.collect_paginated(template_params(page), "tlcontinue", parse_templates)
            .await
    }
}
