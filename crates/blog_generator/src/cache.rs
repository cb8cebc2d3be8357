use std::{
    collections::HashMap,
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
};

use anyhow::Context as _;
use blog_core::content::{ArticleDetail, ArticleId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Articles fetched by earlier runs, reused while younger than the revalidation window.
#[derive(Debug)]
pub struct Cache {
    path: PathBuf,
    inner: CacheInner,
    changed: bool,
}

impl Cache {
    #[tracing::instrument]
    pub fn load_or_new(path: PathBuf) -> anyhow::Result<Self> {
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(error) => {
                if error.kind() == std::io::ErrorKind::NotFound {
                    return Ok(Self::new(path));
                }

                return Err(error.into());
            }
        };

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let inner = match flexbuffers::Reader::get_root(buffer.as_slice())
            .map_err(anyhow::Error::from)
            .and_then(|reader| CacheInner::deserialize(reader).map_err(anyhow::Error::from))
        {
            Ok(inner) => {
                tracing::trace!("Loaded cache from file `{}`.", path.display());
                inner
            }
            Err(error) => {
                tracing::warn!("Unable to deserialize cache: {}.", error);
                CacheInner::new()
            }
        };

        Ok(Self {
            path,
            inner,
            changed: false,
        })
    }

    fn new(path: PathBuf) -> Self {
        Self {
            path,
            inner: CacheInner::new(),
            changed: false,
        }
    }

    /// Returns the cached article if it was fetched less than `max_age` before `now`.
    pub fn get_fresh(
        &self,
        id: &ArticleId,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<&ArticleDetail> {
        let entry = self.inner.articles.get(&key(id))?;
        let fetched_at = DateTime::<Utc>::from_timestamp(entry.fetched_at, 0)?;

        if now - fetched_at >= max_age {
            tracing::trace!("Cached article '{}' is stale.", id);
            return None;
        }

        Some(&entry.article)
    }

    pub fn insert(&mut self, article: ArticleDetail, fetched_at: DateTime<Utc>) {
        self.inner.articles.insert(
            key(&article.id),
            CachedArticle {
                fetched_at: fetched_at.timestamp(),
                article,
            },
        );
        self.changed = true;
    }

    pub fn len(&self) -> usize {
        self.inner.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.articles.is_empty()
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&mut self) -> anyhow::Result<()> {
        let mut serializer = flexbuffers::FlexbufferSerializer::new();
        self.inner.serialize(&mut serializer)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Unable to create cache directory")?;
        }

        File::create(&self.path)
            .and_then(|mut file| file.write_all(serializer.view()))
            .context("Unable to save cache file")?;

        self.changed = false;
        tracing::trace!("Saved cache file.");
        Ok(())
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        if !self.changed {
            return;
        }

        if let Err(error) = self.save() {
            tracing::error!("Failed to save cache: {:#}", error);
        }
    }
}

fn key(id: &ArticleId) -> String {
    format!("{:x}", Sha256::digest(id.as_str().as_bytes()))
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheInner {
    articles: HashMap<String, CachedArticle>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedArticle {
    fetched_at: i64,
    article: ArticleDetail,
}

impl CacheInner {
    #[tracing::instrument]
    pub fn new() -> Self {
        tracing::trace!("Creating default cache.");
        Self {
            articles: HashMap::new(),
        }
    }
}
