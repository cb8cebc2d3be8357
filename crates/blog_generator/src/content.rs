use std::{collections::HashSet, path::Path, sync::Arc};

use blog_core::content::{
    AccumulatedListing, ArticleDetail, ArticleId, ArticlePage, DetailView, ListingSession,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt, task::JoinSet};

use crate::{cache::Cache, Context};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub written: usize,
    pub not_found: usize,
    pub failed: usize,
}

enum ArticleOutcome {
    Written { fetched: Option<ArticleDetail> },
    NotFound,
}

pub async fn process_content(context: &Arc<Context>, cache: &mut Cache) -> anyhow::Result<Report> {
    let listing = build_listing(context).await?;
    write_json(&context.args.output_path("index.json"), &listing).await?;
    tracing::info!("Listing has {} articles.", listing.items.len());

    let now = Utc::now();
    let max_age = Duration::seconds(context.args.revalidate.min(u32::MAX as u64) as i64);

    let mut set = JoinSet::new();
    let mut seen = HashSet::new();
    for item in &listing.items {
        if !seen.insert(item.id.clone()) {
            tracing::debug!("Article '{}' is listed more than once.", item.id);
            continue;
        }

        let context = context.clone();
        let id = item.id.clone();
        let cached = cache.get_fresh(&id, max_age, now).cloned();
        set.spawn(async move { process_article(context, id, cached).await });
    }

    let mut report = Report::default();
    while let Some(result) = set.join_next().await {
        let result = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!("Error in processing article: {}", error);
                report.failed += 1;
                continue;
            }
        };

        match result {
            Ok(ArticleOutcome::Written { fetched }) => {
                report.written += 1;
                if let Some(article) = fetched {
                    cache.insert(article, now);
                }
            }
            Ok(ArticleOutcome::NotFound) => report.not_found += 1,
            Err(error) => {
                tracing::error!("Error in processing article: {:#}", error);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Seeds the listing with the first page and, with `--load-all`, keeps loading
/// until the provider runs out of pages. A failed page ends the walk early.
async fn build_listing(context: &Context) -> anyhow::Result<AccumulatedListing> {
    let seed = context
        .provider
        .query_first_page(context.args.page_size)
        .await?;

    let mut session = ListingSession::new();
    session.initialize(seed);

    if context.args.load_all {
        loop {
            match session.load_more(context.provider.as_ref()).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    tracing::warn!("Stopped loading more articles: {}", error);
                    break;
                }
            }
        }
    }

    session
        .into_listing()
        .ok_or_else(|| anyhow::anyhow!("Listing was not initialized."))
}

async fn process_article(
    context: Arc<Context>,
    id: ArticleId,
    cached: Option<ArticleDetail>,
) -> anyhow::Result<ArticleOutcome> {
    tracing::trace!("Processing article '{}'.", id);
    let file_name = get_file_name_from_id(&id)?;

    let (view, fetched) = match cached {
        Some(article) => {
            tracing::trace!("Using cached article '{}'.", id);
            (DetailView::Ready(ArticlePage::new(article)), false)
        }
        None => (DetailView::load(context.provider.as_ref(), &id).await?, true),
    };

    let page = match view {
        DetailView::Ready(page) => page,
        DetailView::NotFound { .. } | DetailView::Loading => {
            tracing::warn!("Article '{}' is listed but was not found.", id);
            return Ok(ArticleOutcome::NotFound);
        }
    };

    write_json(
        &context.args.output_path("post").join(file_name),
        &page,
    )
    .await?;

    Ok(ArticleOutcome::Written {
        fetched: fetched.then_some(page.article),
    })
}

/// File name for an article's page, refusing ids that would leave the output directory.
pub fn get_file_name_from_id(id: &ArticleId) -> anyhow::Result<String> {
    let name = id.as_str();
    if name.is_empty()
        || name.starts_with('.')
        || name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        anyhow::bail!("Article id '{}' cannot be used as a file name.", name);
    }

    Ok(format!("{name}.json"))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::File::create(path).await?.write_all(&json).await?;

    tracing::trace!("Wrote '{}'.", path.display());
    Ok(())
}
