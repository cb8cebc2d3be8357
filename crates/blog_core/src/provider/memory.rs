use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    content::article::{ArticleDetail, ArticleId, PageResult, PageToken},
    Error, FetchFailure, Result,
};

use super::ContentProvider;

/// Provider serving pre-paginated content from memory.
///
/// It deserializes from a JSON fixture of the form
/// `{ "firstPage": {..}, "pages": { "<token>": {..} }, "articles": [..] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryProvider {
    first_page: PageResult,
    #[serde(default)]
    pages: HashMap<PageToken, PageResult>,
    #[serde(default)]
    articles: Vec<ArticleDetail>,
    #[serde(skip)]
    failing: Mutex<Failing>,
    #[serde(skip)]
    fetched: Mutex<Vec<PageToken>>,
}

#[derive(Debug, Default)]
struct Failing {
    tokens: HashSet<PageToken>,
    articles: HashSet<ArticleId>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryProvider {
    pub fn new(first_page: PageResult) -> Self {
        Self {
            first_page,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_page(mut self, token: PageToken, page: PageResult) -> Self {
        self.pages.insert(token, page);
        self
    }

    pub fn with_article(mut self, article: ArticleDetail) -> Self {
        self.articles.push(article);
        self
    }

    /// Makes every fetch of `token` fail until [`MemoryProvider::recover`] is called.
    pub fn fail_on(&self, token: PageToken) {
        lock(&self.failing).tokens.insert(token);
    }

    pub fn fail_article(&self, id: ArticleId) {
        lock(&self.failing).articles.insert(id);
    }

    pub fn recover(&self) {
        let mut failing = lock(&self.failing);
        failing.tokens.clear();
        failing.articles.clear();
    }

    /// Tokens passed to [`ContentProvider::fetch_page`] so far, in call order.
    pub fn fetched_tokens(&self) -> Vec<PageToken> {
        lock(&self.fetched).clone()
    }
}

#[async_trait]
impl ContentProvider for MemoryProvider {
    async fn query_first_page(&self, page_size: usize) -> Result<PageResult> {
        tracing::trace!(
            "Serving first page of {} items from memory (requested {}).",
            self.first_page.items.len(),
            page_size
        );
        Ok(self.first_page.clone())
    }

    async fn fetch_page(&self, token: &PageToken) -> Result<PageResult> {
        lock(&self.fetched).push(token.clone());

        if lock(&self.failing).tokens.contains(token) {
            return Err(FetchFailure::Unavailable(format!("page '{token}' is failing")).into());
        }

        match self.pages.get(token) {
            Some(page) => Ok(page.clone()),
            None => Err(FetchFailure::Malformed(format!("unknown page token '{token}'")).into()),
        }
    }

    async fn get_article_by_identifier(&self, id: &ArticleId) -> Result<ArticleDetail> {
        if lock(&self.failing).articles.contains(id) {
            return Err(FetchFailure::Unavailable(format!("article '{id}' is failing")).into());
        }

        self.articles
            .iter()
            .find(|article| &article.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.clone()))
    }
}
