//! Blocking facade over the asynchronous client.
//!
//! Every operation delegates to its async counterpart on an owned
//! current-thread runtime, so the two modes produce identical results for
//! identical inputs. Do not use this facade from inside an async context;
//! call the async [`crate::WikiClient`] directly there.

use std::collections::HashMap;

use tokio::runtime::{Builder, Runtime};

use crate::error::Error;
use crate::models::{
    Article, ArticleBatch, CategoryMatrix, CategoryMember, LinkDirection, Namespace, WikiLink,
};

/// Synchronous MediaWiki API client for one language edition.
pub struct WikiClient {
    inner: crate::WikiClient,
    runtime: Runtime,
}

impl WikiClient {
    /// Creates a blocking client for `https://{lang}.wikipedia.org` with
    /// defaults.
    pub fn new(lang: &str) -> Result<Self, Error> {
        Self::from_async(crate::WikiClient::new(lang)?)
    }

    /// Wraps an already-configured async client.
    pub fn from_async(inner: crate::WikiClient) -> Result<Self, Error> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::Network {
                message: format!("failed to build blocking runtime: {err}"),
                source: None,
            })?;
        Ok(Self { inner, runtime })
    }

    /// Language code this client queries.
    pub fn lang(&self) -> &str {
        self.inner.lang()
    }

    /// See [`crate::WikiClient::article`].
    pub fn article(&self, title: &str) -> Result<Article, Error> {
        self.runtime.block_on(self.inner.article(title))
    }

    /// See [`crate::WikiClient::articles`].
    pub fn articles<S: AsRef<str>>(&self, titles: &[S]) -> Result<ArticleBatch, Error> {
        self.runtime.block_on(self.inner.articles(titles))
    }

    /// See [`crate::WikiClient::category_members`].
    pub fn category_members(
        &self,
        category: &str,
        namespace: Namespace,
    ) -> Result<Vec<CategoryMember>, Error> {
        self.runtime
            .block_on(self.inner.category_members(category, namespace))
    }

    /// See [`crate::WikiClient::page_categories`].
    pub fn page_categories(&self, page: &str, hidden: bool) -> Result<Vec<String>, Error> {
        self.runtime
            .block_on(self.inner.page_categories(page, hidden))
    }

    /// See [`crate::WikiClient::links`].
    pub fn links(
        &self,
        page: &str,
        direction: LinkDirection,
        namespaces: &[u32],
    ) -> Result<Vec<WikiLink>, Error> {
        self.runtime
            .block_on(self.inner.links(page, direction, namespaces))
    }

    /// See [`crate::WikiClient::resolve_redirect`].
    pub fn resolve_redirect(&self, title: &str) -> Result<Option<String>, Error> {
        self.runtime.block_on(self.inner.resolve_redirect(title))
    }

    /// See [`crate::WikiClient::resolve_redirects`].
    pub fn resolve_redirects<S: AsRef<str>>(
        &self,
        titles: &[S],
    ) -> Result<HashMap<String, Option<String>>, Error> {
        self.runtime.block_on(self.inner.resolve_redirects(titles))
    }

    /// See [`crate::WikiClient::redirects_to`].
    pub fn redirects_to(&self, page: &str) -> Result<Vec<String>, Error> {
        self.runtime.block_on(self.inner.redirects_to(page))
    }

    /// See [`crate::WikiClient::templates`].
    pub fn templates(&self, page: &str) -> Result<Vec<String>, Error> {
        self.runtime.block_on(self.inner.templates(page))
    }

    /// See [`crate::WikiClient::category_members_matrix`].
    pub fn category_members_matrix<S: AsRef<str>>(
        &self,
        categories: &[S],
        depth: u32,
        namespace: Namespace,
    ) -> Result<CategoryMatrix, Error> {
        self.runtime
            .block_on(self.inner.category_members_matrix(categories, depth, namespace))
    }
}
