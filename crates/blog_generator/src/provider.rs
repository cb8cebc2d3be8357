use anyhow::Context as _;
use blog_core::provider::{ContentProvider, MemoryProvider};
use tokio::fs;

use crate::Args;

pub mod prismic;

pub use prismic::PrismicProvider;

pub async fn from_args(args: &Args) -> anyhow::Result<Box<dyn ContentProvider>> {
    if let Some(fixture) = &args.fixture {
        tracing::info!("Serving content from fixture '{}'.", fixture);
        let json = fs::read_to_string(fixture)
            .await
            .with_context(|| format!("Unable to read fixture '{fixture}'"))?;
        return Ok(Box::new(MemoryProvider::from_json(&json)?));
    }

    let Some(endpoint) = &args.endpoint else {
        anyhow::bail!("Either an API endpoint or a fixture is required.");
    };

    tracing::info!("Serving content from '{}'.", endpoint);
    Ok(Box::new(PrismicProvider::new(
        endpoint,
        args.access_token.clone(),
        args.document_type.clone(),
    )?))
}
