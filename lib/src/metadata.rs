//! Descriptive fields read from the role graphs of a nanopublication.

use crate::consts::*;
use crate::label::LabelResolver;
use crate::roles::GraphRoles;
use crate::store::QuadStore;
use crate::term::{NamedNode, Term};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Lexical value of `dct:created` in the pubinfo graph.
    pub created: Option<String>,
    /// Labels of `dct:creator` (pubinfo) followed by `prov:wasAttributedTo`
    /// URIs (provenance), without repeats.
    pub creators: Vec<String>,
    pub title: Option<String>,
    /// Distinct subjects of the assertion graph, first seen first.
    pub assertion_subjects: Vec<String>,
    pub document_uri: Option<String>,
}

impl Metadata {
    /// Reads the metadata, labelling `dct:creator` values through `resolver`.
    /// Missing graphs leave the matching fields empty.
    pub fn extract(roles: &GraphRoles, store: &QuadStore, resolver: &LabelResolver) -> Self {
        Self::extract_with(roles, store, |term| resolver.label(store, term))
    }

    /// Same as [`Metadata::extract`] but creators are reported as raw values.
    pub fn extract_without_labels(roles: &GraphRoles, store: &QuadStore) -> Self {
        Self::extract_with(roles, store, |term| term.value().to_string())
    }

    /// Reads the metadata, labelling `dct:creator` values with `label`.
    pub fn extract_with<F>(roles: &GraphRoles, store: &QuadStore, label: F) -> Self
    where
        F: Fn(&Term) -> String,
    {
        let document = roles.nanopub.as_deref().and_then(|n| Term::named(n).ok());
        let pubinfo = roles.pubinfo_graph();
        let provenance = roles.provenance_graph();
        let assertion = roles.assertion_graph();

        let mut metadata = Metadata {
            document_uri: roles.nanopub.clone(),
            ..Metadata::default()
        };

        if let Some(pubinfo) = &pubinfo {
            let created = NamedNode::new_unchecked(CREATED);
            let statements = store.match_all(None, Some(&created), None, pubinfo.into());
            metadata.created = statements
                .iter()
                .find(|q| Some(&q.subject) == document.as_ref())
                .or_else(|| statements.first())
                .map(|q| q.object.value().to_string());

            let creator = NamedNode::new_unchecked(CREATOR);
            for object in store.objects(None, &creator, pubinfo.into()) {
                push_unique(&mut metadata.creators, label(object));
            }

            let title = NamedNode::new_unchecked(TITLE);
            let rdfs_label = NamedNode::new_unchecked(LABEL);
            metadata.title = store
                .objects(None, &title, pubinfo.into())
                .next()
                .or_else(|| {
                    document.as_ref().and_then(|doc| {
                        store.objects(Some(doc), &rdfs_label, pubinfo.into()).next()
                    })
                })
                .map(|o| o.value().to_string());
        }

        if let Some(provenance) = &provenance {
            let attributed = NamedNode::new_unchecked(WAS_ATTRIBUTED_TO);
            for object in store.objects(None, &attributed, provenance.into()) {
                push_unique(&mut metadata.creators, object.value().to_string());
            }
        }

        if let Some(assertion) = &assertion {
            for subject in store.subjects(None, None, assertion.into()) {
                push_unique(&mut metadata.assertion_subjects, subject.value().to_string());
            }
        }
        metadata
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_none()
            && self.creators.is_empty()
            && self.title.is_none()
            && self.assertion_subjects.is_empty()
            && self.document_uri.is_none()
    }

    /// `created` as a UTC timestamp. Accepts RFC 3339, a date-time without
    /// offset (read as UTC) and a bare date.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let created = self.created.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(created) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(created, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Utc.from_utc_datetime(&naive));
        }
        let date = NaiveDate::parse_from_str(created, "%Y-%m-%d").ok()?;
        Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
    }
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefixes::PrefixMap;
    use crate::term::{Literal, Quad};

    const NP: &str = "http://example.org/np1";

    fn g(local: &str) -> String {
        format!("{}#{}", NP, local)
    }

    fn literal_quad(s: &str, p: &str, value: Literal, graph: &str) -> Quad {
        Quad::new(
            Term::named(s).unwrap(),
            NamedNode::new(p).unwrap(),
            value,
            Some(Term::named(graph).unwrap()),
        )
        .unwrap()
    }

    fn sample() -> QuadStore {
        let head = g("Head");
        let mut store = QuadStore::new();
        store.add(Quad::from_uris(NP, TYPE, NANOPUBLICATION, Some(&head)).unwrap());
        store.add(Quad::from_uris(NP, HAS_ASSERTION, &g("assertion"), Some(&head)).unwrap());
        store.add(Quad::from_uris(NP, HAS_PROVENANCE, &g("provenance"), Some(&head)).unwrap());
        store.add(Quad::from_uris(NP, HAS_PUBLICATION_INFO, &g("pubinfo"), Some(&head)).unwrap());
        store.add(
            Quad::from_uris(
                "http://example.org/mosquito",
                "http://example.org/transmits",
                "http://example.org/malaria",
                Some(&g("assertion")),
            )
            .unwrap(),
        );
        store.add(
            Quad::from_uris(
                "http://example.org/mosquito",
                TYPE,
                "http://example.org/Insect",
                Some(&g("assertion")),
            )
            .unwrap(),
        );
        store.add(
            Quad::from_uris(
                &g("assertion"),
                WAS_ATTRIBUTED_TO,
                "https://orcid.org/0000-0002-1825-0097",
                Some(&g("provenance")),
            )
            .unwrap(),
        );
        store.add(
            Quad::from_uris(
                NP,
                CREATOR,
                "https://orcid.org/0000-0002-1825-0097",
                Some(&g("pubinfo")),
            )
            .unwrap(),
        );
        store.add(literal_quad(
            NP,
            CREATED,
            Literal::new_typed("2024-03-01T10:00:00+01:00", XSD_DATETIME).unwrap(),
            &g("pubinfo"),
        ));
        store.add(literal_quad(
            NP,
            LABEL,
            Literal::new_simple("Mosquitoes transmit malaria"),
            &g("pubinfo"),
        ));
        store
    }

    #[test]
    fn test_extract() {
        let store = sample();
        let roles = GraphRoles::extract(&store);
        let metadata = Metadata::extract_without_labels(&roles, &store);
        assert_eq!(metadata.document_uri.as_deref(), Some(NP));
        assert_eq!(metadata.created.as_deref(), Some("2024-03-01T10:00:00+01:00"));
        assert_eq!(
            metadata.created_at().unwrap().to_rfc3339(),
            "2024-03-01T09:00:00+00:00"
        );
        // dct:creator and prov:wasAttributedTo name the same person
        assert_eq!(
            metadata.creators,
            vec!["https://orcid.org/0000-0002-1825-0097".to_string()]
        );
        assert_eq!(metadata.title.as_deref(), Some("Mosquitoes transmit malaria"));
        assert_eq!(
            metadata.assertion_subjects,
            vec!["http://example.org/mosquito".to_string()]
        );
    }

    #[test]
    fn test_creator_labels_come_first() {
        let mut store = sample();
        store.add(literal_quad(
            "https://orcid.org/0000-0002-1825-0097",
            FOAF_NAME,
            Literal::new_simple("Josiah Carberry"),
            &g("pubinfo"),
        ));
        let roles = GraphRoles::extract(&store);
        let resolver = LabelResolver::offline(PrefixMap::with_defaults());
        let metadata = Metadata::extract(&roles, &store, &resolver);
        assert_eq!(
            metadata.creators,
            vec![
                "Josiah Carberry".to_string(),
                "https://orcid.org/0000-0002-1825-0097".to_string()
            ]
        );
    }

    #[test]
    fn test_title_prefers_dct_title() {
        let mut store = sample();
        store.add(literal_quad(
            NP,
            TITLE,
            Literal::new_simple("A title"),
            &g("pubinfo"),
        ));
        let roles = GraphRoles::extract(&store);
        let metadata = Metadata::extract_without_labels(&roles, &store);
        assert_eq!(metadata.title.as_deref(), Some("A title"));
    }

    #[test]
    fn test_missing_roles_give_empty_metadata() {
        let store: QuadStore = vec![Quad::from_uris(
            "http://example.org/a",
            "http://example.org/b",
            "http://example.org/c",
            None,
        )
        .unwrap()]
        .into_iter()
        .collect();
        let roles = GraphRoles::extract(&store);
        let metadata = Metadata::extract_without_labels(&roles, &store);
        assert!(metadata.is_empty());
        assert_eq!(metadata, Metadata::default());
        assert_eq!(metadata.created_at(), None);
    }

    #[test]
    fn test_created_at_formats() {
        let mut metadata = Metadata {
            created: Some("2024-03-01".to_string()),
            ..Metadata::default()
        };
        assert_eq!(
            metadata.created_at().unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
        metadata.created = Some("2024-03-01T10:00:00.5".to_string());
        assert!(metadata.created_at().is_some());
        metadata.created = Some("last tuesday".to_string());
        assert_eq!(metadata.created_at(), None);
    }
}
