use async_trait::async_trait;
use blog_core::{
    content::{
        document::parse_search_response, ArticleDetail, ArticleId, PageResult, PageToken,
    },
    provider::ContentProvider,
    Error, FetchFailure, Result,
};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

/// Client for a Prismic repository's REST API (v2).
#[derive(Debug)]
pub struct PrismicProvider {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    document_type: String,
    master_ref: OnceCell<String>,
}

#[derive(Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    is_master_ref: bool,
}

fn http_error(error: reqwest::Error) -> Error {
    FetchFailure::Http(error.to_string()).into()
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl PrismicProvider {
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        document_type: String,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("API endpoint '{}' is not a base URL.", endpoint);
        }

        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("blog_generator/", env!("CARGO_PKG_VERSION")))
                .build()?,
            endpoint,
            access_token,
            document_type,
            master_ref: OnceCell::new(),
        })
    }

    /// Adds the access token unless the URL already carries one. URLs outside
    /// the repository's origin never receive it.
    fn authorize(&self, url: &mut Url) {
        let Some(token) = &self.access_token else {
            return;
        };

        if url.origin() != self.endpoint.origin() {
            tracing::warn!(
                "Not sending the access token to '{}'.",
                url.origin().ascii_serialization()
            );
            return;
        }

        if url.query_pairs().any(|(key, _)| key == "access_token") {
            return;
        }

        url.query_pairs_mut().append_pair("access_token", token);
    }

    fn search_url(&self, reference: &str, predicate: &str, page_size: usize) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["documents", "search"]);
        }

        url.query_pairs_mut()
            .append_pair("ref", reference)
            .append_pair("q", predicate)
            .append_pair("pageSize", &page_size.to_string());
        self.authorize(&mut url);
        url
    }

    fn type_predicate(&self) -> String {
        format!("[[at(document.type,{})]]", quote(&self.document_type))
    }

    fn uid_predicate(&self, id: &ArticleId) -> String {
        format!(
            "[[at(my.{}.uid,{})]]",
            self.document_type,
            quote(id.as_str())
        )
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        tracing::trace!("GET {}", url.path());
        self.client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?
            .text()
            .await
            .map_err(http_error)
    }

    async fn master_ref(&self) -> Result<&str> {
        self.master_ref
            .get_or_try_init(|| async {
                let mut url = self.endpoint.clone();
                self.authorize(&mut url);

                let info: ApiInfo = serde_json::from_str(&self.get_text(url).await?)?;
                let reference = info
                    .refs
                    .into_iter()
                    .find(|reference| reference.is_master_ref)
                    .map(|reference| reference.reference)
                    .ok_or_else(|| FetchFailure::Malformed("no master ref".to_owned()))?;

                tracing::debug!("Using master ref '{}'.", reference);
                Ok::<_, Error>(reference)
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl ContentProvider for PrismicProvider {
    #[tracing::instrument(skip(self))]
    async fn query_first_page(&self, page_size: usize) -> Result<PageResult> {
        let reference = self.master_ref().await?;
        let url = self.search_url(reference, &self.type_predicate(), page_size);

        parse_search_response(&self.get_text(url).await?)?.into_page()
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_page(&self, token: &PageToken) -> Result<PageResult> {
        let mut url = Url::parse(token.as_str()).map_err(|error| {
            FetchFailure::Malformed(format!("page token is not a URL: {error}"))
        })?;
        if url.origin() != self.endpoint.origin() {
            return Err(FetchFailure::Malformed(format!(
                "page token points outside the repository: {}",
                url.origin().ascii_serialization()
            ))
            .into());
        }
        self.authorize(&mut url);

        parse_search_response(&self.get_text(url).await?)?.into_page()
    }

    #[tracing::instrument(skip(self))]
    async fn get_article_by_identifier(&self, id: &ArticleId) -> Result<ArticleDetail> {
        let reference = self.master_ref().await?;
        let url = self.search_url(reference, &self.uid_predicate(id), 1);

        match parse_search_response(&self.get_text(url).await?)?.into_first_document() {
            Some(document) => document.into_detail(),
            None => Err(Error::NotFound(id.clone())),
        }
    }
}
