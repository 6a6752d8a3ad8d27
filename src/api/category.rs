//! Retrieve category members and the categories a page belongs to.

use serde_json::Value;
use tracing::info;

use crate::error::Error;
use crate::http::{query_params, Params, WikiClient};
use crate::models::{CategoryMember, Namespace};

/// Ensures a category title carries the `Category:` namespace prefix.
///
/// Already-prefixed titles pass through unchanged, so the function is
/// idempotent.
pub fn normalize_category(category: &str) -> String {
    if category.starts_with("Category:") {
        category.to_string()
    } else {
        format!("Category:{category}")
    }
}

fn cmtype(namespace: Namespace) -> &'static str {
    match namespace {
        Namespace::Main => "page",
        Namespace::Category => "subcat",
    }
}

fn member_params(category: &str, namespace: Namespace) -> Params {
    let mut params = query_params();
    params.push(("list", "categorymembers".to_string()));
    params.push(("cmtitle", normalize_category(category)));
    params.push(("cmtype", cmtype(namespace).to_string()));
    params.push(("cmlimit", "max".to_string()));
    params.push(("cmnamespace", namespace.id().to_string()));
    params
}

fn parse_members(data: &Value) -> Vec<CategoryMember> {
    data.pointer("/query/categorymembers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|member| {
            let title = member.get("title").and_then(Value::as_str)?;
            Some(CategoryMember {
                pageid: member.get("pageid").and_then(Value::as_i64).unwrap_or(0),
                ns: member.get("ns").and_then(Value::as_i64).unwrap_or(0),
                title: title.to_string(),
            })
        })
        .collect()
}

fn page_categories_params(page: &str, hidden: bool) -> Params {
    let mut params = query_params();
    params.push(("prop", "categories".to_string()));
    params.push(("titles", page.to_string()));
    params.push(("cllimit", "max".to_string()));
    if !hidden {
        params.push(("clshow", "!hidden".to_string()));
    }
    params
}

fn parse_page_categories(data: &Value) -> Vec<String> {
    let mut categories = Vec::new();
    if let Some(pages) = data.pointer("/query/pages").and_then(Value::as_object) {
        for page in pages.values() {
            for category in page
                .get("categories")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                if let Some(title) = category.get("title").and_then(Value::as_str) {
                    categories.push(title.to_string());
                }
            }
        }
    }
    categories
}

impl WikiClient {
    /// Retrieves the pages or subcategories within a category.
    ///
    /// `namespace` selects what to list: [`Namespace::Main`] for pages,
    /// [`Namespace::Category`] for subcategories. The category name may be
    /// given with or without its `Category:` prefix.
    pub async fn category_members(
        &self,
        category: &str,
        namespace: Namespace,
    ) -> Result<Vec<CategoryMember>, Error> {
        let cmtitle = normalize_category(category);
        info!(category = %cmtitle, kind = cmtype(namespace), "retrieving category members");
        self.collect_paginated(member_params(category, namespace), "cmcontinue", parse_members)
            .await
    }

    /// Retrieves the categories a page belongs to.
    ///
    /// Hidden maintenance categories are excluded unless `hidden` is set.
    /// Returned titles keep their `Category:` prefix.
    pub async fn page_categories(&self, page: &str, hidden: bool) -> Result<Vec<String>, Error> {
        info!(page, "retrieving page categories");
        self.collect_paginated(
            page_categories_params(page, hidden),
            "clcontinue",
            parse_page_categories,
        )
        .await
    }
}
