//! Retrieve incoming or outgoing links for a page.

use serde_json::Value;
use tracing::info;

use crate::error::Error;
use crate::http::{query_params, Params, WikiClient};
use crate::models::{LinkDirection, WikiLink};

fn link_params(page: &str, direction: LinkDirection, namespaces: &[u32]) -> Params {
    let mut params = query_params();
    params.push(("titles", page.to_string()));
    let ns = namespaces
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join("|");

    match direction {
        LinkDirection::Incoming => {
            params.push(("prop", "linkshere".to_string()));
            params.push(("lhprop", "pageid|title".to_string()));
            params.push(("lhlimit", "max".to_string()));
            params.push(("lhnamespace", ns));
        }
        LinkDirection::Outgoing => {
            params.push(("prop", "links".to_string()));
            params.push(("plnamespace", ns));
            params.push(("pllimit", "max".to_string()));
        }
    }
    params
}

fn list_key(direction: LinkDirection) -> &'static str {
    match direction {
        LinkDirection::Incoming => "linkshere",
        LinkDirection::Outgoing => "links",
    }
}

fn continue_key(direction: LinkDirection) -> &'static str {
    match direction {
        LinkDirection::Incoming => "lhcontinue",
        LinkDirection::Outgoing => "plcontinue",
    }
}

fn parse_links(data: &Value, direction: LinkDirection) -> Vec<WikiLink> {
    data.pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .and_then(|page| page.get(list_key(direction)))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|link| {
            let title = link.get("title").and_then(Value::as_str)?;
            Some(WikiLink {
                pageid: link.get("pageid").and_then(Value::as_i64).unwrap_or(0),
                ns: link.get("ns").and_then(Value::as_i64).unwrap_or(0),
                title: title.to_string(),
            })
        })
        .collect()
}

impl WikiClient {
    /// Retrieves the links of a page in the given direction, restricted to
    /// the given namespaces (the main namespace is `&[0]`).
    pub async fn links(
        &self,
        page: &str,
        direction: LinkDirection,
        namespaces: &[u32],
    ) -> Result<Vec<WikiLink>, Error> {
        info!(page, ?direction, "retrieving links");
        self.collect_paginated(
            link_params(page, direction, namespaces),
            continue_key(direction),
            move |data| parse_links(data, direction),
        )
        .await
    }
}
