//! Remote label lookups: DOI metadata, ORCID person records and plain RDF
//! documents.

use crate::consts::*;
use crate::fetch::{fetch_json, FetchOptions};
use crate::label::LabelFetcher;
use crate::source::{HttpQuadSource, Location, QuadSource};
use crate::store::{GraphPattern, QuadStore};
use crate::term::{NamedNode, Term};
use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref DOI: Regex =
        Regex::new(r"^(?:https?://(?:dx\.)?doi\.org/|doi:)(10\.\d{4,9}/\S+)$").unwrap();
    static ref ORCID: Regex =
        Regex::new(r"^https?://orcid\.org/(\d{4}-\d{4}-\d{4}-\d{3}[\dX])/?$").unwrap();
}

const CSL_JSON: &str = "application/vnd.citationstyles.csl+json";

/// The `10.…` part of a DOI URI.
pub fn doi_of(uri: &str) -> Option<&str> {
    DOI.captures(uri)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The iD part of an ORCID URI.
pub fn orcid_of(uri: &str) -> Option<&str> {
    ORCID
        .captures(uri)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Picks the lookup strategy from the shape of the URI.
#[derive(Debug, Clone, Default)]
pub struct HttpLabelFetcher {
    options: FetchOptions,
    source: HttpQuadSource,
}

impl HttpLabelFetcher {
    pub fn new(options: FetchOptions) -> Self {
        HttpLabelFetcher {
            source: HttpQuadSource::new(options.clone()),
            options,
        }
    }

    async fn doi_title(&self, doi: &str) -> Result<Option<String>> {
        let url = format!("{}{}", DOI_NS, doi);
        let record = fetch_json(&url, CSL_JSON, &self.options).await?;
        Ok(csl_title(&record))
    }

    async fn orcid_name(&self, id: &str) -> Result<Option<String>> {
        let url = format!("https://pub.orcid.org/v3.0/{}/person", id);
        let record = fetch_json(&url, "application/json", &self.options).await?;
        Ok(orcid_person_name(&record))
    }

    async fn document_label(&self, uri: &str) -> Result<Option<String>> {
        let document = self.source.load(&Location::Url(uri.to_string())).await?;
        let store: QuadStore = document.quads.into_iter().collect();
        let subject = Term::named(uri)?;
        Ok(label_in(&store, &subject))
    }
}

#[async_trait]
impl LabelFetcher for HttpLabelFetcher {
    async fn fetch_label(&self, uri: &str) -> Result<Option<String>> {
        if let Some(doi) = doi_of(uri) {
            debug!("Looking up DOI {}", doi);
            return self.doi_title(doi).await;
        }
        if let Some(id) = orcid_of(uri) {
            debug!("Looking up ORCID {}", id);
            return self.orcid_name(id).await;
        }
        debug!("Looking up label in RDF document {}", uri);
        self.document_label(uri).await
    }
}

/// First label-like literal about `subject`, trying the predicates in
/// [`REMOTE_LABEL_PREDICATES`] order.
fn label_in(store: &QuadStore, subject: &Term) -> Option<String> {
    REMOTE_LABEL_PREDICATES.iter().find_map(|predicate| {
        let predicate = NamedNode::new_unchecked(*predicate);
        let found = store
            .objects(Some(subject), &predicate, GraphPattern::Any)
            .find(|o| o.is_literal())
            .map(|o| o.value().to_string());
        found
    })
}

fn csl_title(record: &Value) -> Option<String> {
    let title = match record.get("title")? {
        Value::String(title) => Some(title.clone()),
        // some registrars send a list of titles
        Value::Array(titles) => titles.first()?.as_str().map(|s| s.to_string()),
        _ => None,
    };
    title.filter(|title| !title.trim().is_empty())
}

fn orcid_person_name(record: &Value) -> Option<String> {
    let name = record.get("name")?;
    let value = |key: &str| {
        name.get(key)
            .and_then(|v| v.get("value"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    if let Some(credit) = value("credit-name") {
        return Some(credit);
    }
    match (value("given-names"), value("family-name")) {
        (Some(given), Some(family)) => Some(format!("{} {}", given, family)),
        (Some(given), None) => Some(given),
        (None, Some(family)) => Some(family),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OfflineRetrievalError;
    use crate::term::Quad;
    use serde_json::json;

    #[test]
    fn test_doi_of() {
        assert_eq!(doi_of("https://doi.org/10.1000/xyz123"), Some("10.1000/xyz123"));
        assert_eq!(doi_of("http://dx.doi.org/10.1000/xyz123"), Some("10.1000/xyz123"));
        assert_eq!(doi_of("doi:10.1000/xyz123"), Some("10.1000/xyz123"));
        assert_eq!(doi_of("https://example.org/10.1000/xyz123"), None);
    }

    #[test]
    fn test_orcid_of() {
        assert_eq!(
            orcid_of("https://orcid.org/0000-0002-1825-009X"),
            Some("0000-0002-1825-009X")
        );
        assert_eq!(orcid_of("https://orcid.org/0000-0002"), None);
    }

    #[test]
    fn test_csl_title() {
        assert_eq!(
            csl_title(&json!({"title": "Mosquitoes and malaria"})).as_deref(),
            Some("Mosquitoes and malaria")
        );
        assert_eq!(
            csl_title(&json!({"title": ["First", "Second"]})).as_deref(),
            Some("First")
        );
        assert_eq!(csl_title(&json!({"title": " "})), None);
        assert_eq!(csl_title(&json!({})), None);
    }

    #[test]
    fn test_orcid_person_name() {
        let record = json!({
            "name": {
                "given-names": {"value": "Josiah"},
                "family-name": {"value": "Carberry"},
                "credit-name": null
            }
        });
        assert_eq!(orcid_person_name(&record).as_deref(), Some("Josiah Carberry"));
        let credited = json!({"name": {"credit-name": {"value": "J. Carberry"}}});
        assert_eq!(orcid_person_name(&credited).as_deref(), Some("J. Carberry"));
        assert_eq!(orcid_person_name(&json!({"name": null})), None);
    }

    #[test]
    fn test_label_in_prefers_rdfs_label() {
        let subject = Term::named("http://example.org/malaria").unwrap();
        let store: QuadStore = vec![
            Quad::new(
                subject.clone(),
                NamedNode::new(SCHEMA_NAME).unwrap(),
                Term::literal("schema name"),
                None,
            )
            .unwrap(),
            Quad::new(
                subject.clone(),
                NamedNode::new(LABEL).unwrap(),
                Term::literal("malaria"),
                None,
            )
            .unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(label_in(&store, &subject).as_deref(), Some("malaria"));
    }

    #[tokio::test]
    async fn test_offline_fetch_fails() {
        let fetcher = HttpLabelFetcher::new(FetchOptions {
            offline: true,
            ..FetchOptions::default()
        });
        for uri in [
            "https://doi.org/10.1000/xyz123",
            "https://orcid.org/0000-0002-1825-0097",
            "http://example.org/thing",
        ] {
            let err = fetcher.fetch_label(uri).await.unwrap_err();
            assert!(err.downcast_ref::<OfflineRetrievalError>().is_some());
        }
    }
}
