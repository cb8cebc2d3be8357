//! Wire shapes of the headless CMS and their validation into the data model.
//!
//! Anything that does not fit the model is rejected here as
//! [`FetchFailure::Malformed`], so the rest of the crate can rely on
//! well-formed values.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{FetchFailure, Result};

use super::article::{
    ArticleDetail, ArticleId, ArticleSummary, PageResult, PageToken, Paragraph, Section,
};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub next_page: Option<String>,
    pub results: Vec<Document>,
}

#[derive(Debug, Deserialize)]
pub struct Document {
    pub uid: Option<String>,
    pub first_publication_date: Option<String>,
    pub data: DocumentData,
}

#[derive(Debug, Deserialize)]
pub struct DocumentData {
    pub title: String,
    /// Empty Key Text fields come back as `null`.
    #[serde(default)]
    pub subtitle: Option<String>,
    pub author: String,
    pub banner: Option<Banner>,
    #[serde(default)]
    pub content: Vec<DocumentSection>,
}

#[derive(Debug, Deserialize)]
pub struct Banner {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentSection {
    pub heading: String,
    pub body: Vec<DocumentParagraph>,
}

/// Rich text block; only its plain text is kept.
#[derive(Debug, Deserialize)]
pub struct DocumentParagraph {
    pub text: String,
}

pub fn parse_search_response(json: &str) -> Result<SearchResponse> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, FetchFailure> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|error| FetchFailure::Malformed(format!("invalid timestamp '{value}': {error}")))
}

impl Document {
    fn id(&self) -> std::result::Result<ArticleId, FetchFailure> {
        match self.uid.as_deref().map(str::trim) {
            Some(uid) if !uid.is_empty() => Ok(ArticleId::new(uid)),
            _ => Err(FetchFailure::Malformed(
                "document without an identifier".to_owned(),
            )),
        }
    }

    fn published_at(&self) -> std::result::Result<Option<DateTime<Utc>>, FetchFailure> {
        self.first_publication_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()
    }

    pub fn into_summary(self) -> Result<ArticleSummary> {
        Ok(ArticleSummary {
            id: self.id()?,
            published_at: self.published_at()?,
            title: self.data.title,
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author,
        })
    }

    pub fn into_detail(self) -> Result<ArticleDetail> {
        let id = self.id()?;
        let published_at = self.published_at()?;
        let Some(banner) = self.data.banner else {
            return Err(FetchFailure::Malformed(format!("article '{id}' has no banner")).into());
        };

        let sections = self
            .data
            .content
            .into_iter()
            .map(|section| Section {
                heading: section.heading,
                body: section
                    .body
                    .into_iter()
                    .map(|paragraph| Paragraph {
                        text: paragraph.text,
                    })
                    .collect(),
            })
            .collect();

        Ok(ArticleDetail {
            id,
            published_at,
            title: self.data.title,
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author,
            banner_url: banner.url,
            sections,
        })
    }
}

impl SearchResponse {
    pub fn into_page(self) -> Result<PageResult> {
        let items = self
            .results
            .into_iter()
            .map(Document::into_summary)
            .collect::<Result<Vec<_>>>()?;

        Ok(PageResult::new(items, self.next_page.map(PageToken::new)))
    }

    /// The single document of a lookup by identifier, if any.
    pub fn into_first_document(self) -> Option<Document> {
        self.results.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const PAGE: &str = r#"{
        "page": 1,
        "results_per_page": 2,
        "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2&pageSize=2",
        "results": [
            {
                "uid": "como-utilizar-hooks",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "data": { "title": "Como utilizar Hooks", "subtitle": "Pensando em sincronização", "author": "Joseph Oliveira" }
            },
            {
                "uid": "criando-um-app-cra-do-zero",
                "first_publication_date": null,
                "data": { "title": "Criando um app CRA do zero", "subtitle": "Tudo sobre como criar", "author": "Danilo Vieira" }
            }
        ]
    }"#;

    const DETAIL: &str = r#"{
        "next_page": null,
        "results": [{
            "uid": "como-utilizar-hooks",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização",
                "author": "Joseph Oliveira",
                "banner": { "url": "https://images.prismic.io/banner.png" },
                "content": [
                    { "heading": "Proin et varius", "body": [{ "type": "paragraph", "text": "Lorem ipsum dolor", "spans": [] }] },
                    { "heading": "Cras laoreet", "body": [{ "type": "paragraph", "text": "Nullam dolor sapien", "spans": [] }, { "type": "list-item", "text": "Ut venenatis", "spans": [] }] }
                ]
            }
        }]
    }"#;

    #[test]
    fn test_page_is_validated() {
        let page = parse_search_response(PAGE).unwrap().into_page().unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id.as_str(), "como-utilizar-hooks");
        assert_eq!(
            page.items[0].published_at.unwrap().to_rfc3339(),
            "2021-03-15T19:25:28+00:00"
        );
        assert!(page.items[1].published_at.is_none());
        assert_eq!(
            page.next_page_token.unwrap().as_str(),
            "https://blog.cdn.prismic.io/api/v2/documents/search?page=2&pageSize=2"
        );
    }

    #[test]
    fn test_detail_keeps_section_order() {
        let detail = parse_search_response(DETAIL)
            .unwrap()
            .into_first_document()
            .unwrap()
            .into_detail()
            .unwrap();

        assert_eq!(detail.banner_url, "https://images.prismic.io/banner.png");
        let headings: Vec<_> = detail.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Proin et varius", "Cras laoreet"]);
        assert_eq!(detail.sections[1].body[1].text, "Ut venenatis");
    }

    #[test]
    fn test_rfc3339_timestamps_are_accepted() {
        let date = parse_timestamp("2021-03-15T19:25:28Z").unwrap();
        assert_eq!(date, parse_timestamp("2021-03-15T19:25:28+0000").unwrap());
        assert!(parse_timestamp("15/03/2021").is_err());
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let json = r#"{ "next_page": null, "results": [
            { "uid": "a", "first_publication_date": null, "data": { "title": 42, "author": "x" } }
        ] }"#;

        assert!(matches!(
            parse_search_response(json),
            Err(Error::FetchFailure(FetchFailure::Malformed(_)))
        ));
    }

    #[test]
    fn test_missing_identifier_is_malformed() {
        let json = r#"{ "next_page": null, "results": [
            { "uid": null, "first_publication_date": null, "data": { "title": "t", "author": "x" } }
        ] }"#;

        let error = parse_search_response(json).unwrap().into_page().unwrap_err();
        assert!(matches!(error, Error::FetchFailure(FetchFailure::Malformed(_))));
    }

    #[test]
    fn test_detail_without_banner_is_malformed() {
        let json = r#"{ "next_page": null, "results": [
            { "uid": "a", "first_publication_date": null, "data": { "title": "t", "author": "x" } }
        ] }"#;

        let document = parse_search_response(json)
            .unwrap()
            .into_first_document()
            .unwrap();
        assert!(document.into_detail().is_err());
    }

    #[test]
    fn test_null_subtitle_is_empty() {
        let json = r#"{ "next_page": null, "results": [
            { "uid": "a", "first_publication_date": null, "data": { "title": "t", "subtitle": null, "author": "x" } },
            { "uid": "b", "first_publication_date": null, "data": { "title": "u", "author": "y" } },
            { "uid": "c", "first_publication_date": null, "data": { "title": "v", "subtitle": "Sub", "author": "z" } }
        ] }"#;

        let page = parse_search_response(json).unwrap().into_page().unwrap();

        let subtitles: Vec<_> = page.items.iter().map(|item| item.subtitle.as_str()).collect();
        assert_eq!(subtitles, vec!["", "", "Sub"]);
    }
}
