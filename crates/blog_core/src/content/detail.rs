use serde::{Deserialize, Serialize};

use crate::{provider::ContentProvider, Error, Result};

use super::{
    article::{ArticleDetail, ArticleId},
    word_counter,
};

/// Everything the article view needs to display one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub article: ArticleDetail,
    pub word_count: u64,
    pub minutes_to_read: u64,
}

impl ArticlePage {
    pub fn new(article: ArticleDetail) -> Self {
        let word_count = word_counter::count_article_words(&article.sections);
        Self {
            word_count,
            minutes_to_read: word_counter::read_time_for(word_count),
            article,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DetailView {
    /// The page was not generated ahead of time and its lookup is still running.
    Loading,
    NotFound { id: ArticleId },
    Ready(ArticlePage),
}

impl DetailView {
    /// Turns a lookup outcome into a view state. `NotFound` becomes a state of
    /// its own, fetch failures are handed back to the caller.
    pub fn from_lookup(id: &ArticleId, lookup: Result<ArticleDetail>) -> Result<Self> {
        match lookup {
            Ok(article) => Ok(DetailView::Ready(ArticlePage::new(article))),
            Err(Error::NotFound(_)) => Ok(DetailView::NotFound { id: id.clone() }),
            Err(error) => Err(error),
        }
    }

    pub async fn load<P>(provider: &P, id: &ArticleId) -> Result<Self>
    where
        P: ContentProvider + ?Sized,
    {
        tracing::debug!("Looking up article '{}'.", id);
        Self::from_lookup(id, provider.get_article_by_identifier(id).await)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DetailView::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content::article::{PageResult, Section},
        provider::MemoryProvider,
        FetchFailure,
    };

    fn article(id: &str, sections: Vec<Section>) -> ArticleDetail {
        ArticleDetail {
            id: ArticleId::new(id),
            published_at: None,
            title: "Title".to_owned(),
            subtitle: "Subtitle".to_owned(),
            author: "Author".to_owned(),
            banner_url: "https://images.example/banner.png".to_owned(),
            sections,
        }
    }

    #[test]
    fn test_page_carries_read_time() {
        let page = ArticlePage::new(article(
            "a",
            vec![Section::new("Intro", ["one two three"])],
        ));

        assert_eq!(page.word_count, 4);
        assert_eq!(page.minutes_to_read, 1);
    }

    #[tokio::test]
    async fn test_missing_article_renders_not_found() {
        let provider = MemoryProvider::new(PageResult::default()).with_article(article("a", vec![]));

        let ready = DetailView::load(&provider, &ArticleId::new("a")).await.unwrap();
        assert!(ready.is_ready());

        let missing = DetailView::load(&provider, &ArticleId::new("b")).await.unwrap();
        assert_eq!(
            missing,
            DetailView::NotFound {
                id: ArticleId::new("b")
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_hidden() {
        let provider = MemoryProvider::new(PageResult::default()).with_article(article("a", vec![]));
        provider.fail_article(ArticleId::new("a"));

        let error = DetailView::load(&provider, &ArticleId::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::FetchFailure(FetchFailure::Unavailable(_))));
    }

    #[test]
    fn test_view_state_is_tagged() {
        let json = serde_json::to_value(DetailView::Loading).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "loading" }));

        let json = serde_json::to_value(DetailView::NotFound {
            id: ArticleId::new("x"),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "state": "notFound", "id": "x" }));
    }
}
