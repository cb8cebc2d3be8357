pub mod cache;
pub mod content;
pub mod provider;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use blog_core::provider::ContentProvider;
use cache::Cache;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Repository API endpoint, e.g. https://<repository>.cdn.prismic.io/api/v2
    #[arg(short, long, env = "PRISMIC_API_ENDPOINT")]
    endpoint: Option<String>,
    /// Access token for private repositories
    #[arg(long, env = "PRISMIC_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
    /// Custom type of the blog posts
    #[arg(long, default_value = "posts")]
    document_type: String,
    /// Number of articles on the first page of the listing
    #[arg(long, default_value = "20")]
    page_size: usize,
    /// Keep loading pages until the listing is complete
    #[arg(long)]
    load_all: bool,
    /// Serve content from a JSON fixture instead of the API
    #[arg(long)]
    fixture: Option<String>,
    /// Path to the output directory
    #[arg(short, long, default_value = "./output")]
    output: String,
    /// Path to the article cache file
    #[arg(long, default_value = ".cache/articles.bin")]
    cache: String,
    /// Seconds a cached article is reused before being fetched again
    #[arg(long, default_value = "60")]
    revalidate: u64,
}

impl Args {
    pub fn output_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        Path::new(&self.output).join(relative)
    }
}

pub struct Context {
    args: Args,
    provider: Box<dyn ContentProvider>,
}

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(debug_assertions)]
    let mut logger;
    #[cfg(not(debug_assertions))]
    let logger;

    logger = tracing_subscriber::fmt();
    #[cfg(debug_assertions)]
    {
        logger = logger.with_max_level(tracing::Level::TRACE);
    }
    logger.init();

    let args = Args::parse();

    let provider = match provider::from_args(&args).await {
        Ok(provider) => provider,
        Err(err) => {
            tracing::error!("Failed to create content provider: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut cache = match Cache::load_or_new(PathBuf::from(&args.cache)) {
        Ok(cache) => cache,
        Err(err) => {
            tracing::error!("Failed to load cache: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if !cache.is_empty() {
        tracing::debug!("Cache holds {} articles.", cache.len());
    }

    let context = Arc::new(Context { args, provider });
    match content::process_content(&context, &mut cache).await {
        Ok(report) => {
            tracing::info!(
                "Generated website: {} articles written, {} not found, {} failed.",
                report.written,
                report.not_found,
                report.failed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Failed to process content: {}", err);
            ExitCode::FAILURE
        }
    }
}
