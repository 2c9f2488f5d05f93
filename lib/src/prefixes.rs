//! Prefix ⇄ namespace mapping used to shorten URIs for display and to expand
//! compact URIs given on the command line.

use crate::consts::*;
use serde::{Deserialize, Serialize};

const DEFAULT_PREFIXES: [(&str, &str); 13] = [
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("owl", OWL_NS),
    ("np", NP_NS),
    ("dct", DCT_NS),
    ("prov", PROV_NS),
    ("foaf", FOAF_NS),
    ("pav", PAV_NS),
    ("skos", SKOS_NS),
    ("schema", SCHEMA_NS),
    ("orcid", ORCID_NS),
    ("doi", DOI_NS),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for (prefix, namespace) in DEFAULT_PREFIXES {
            map.insert(prefix, namespace);
        }
        map
    }

    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.entries.push((prefix, namespace)),
        }
    }

    /// Adds the entries of `other`, which win on conflicting prefixes.
    pub fn merge(&mut self, other: &PrefixMap) {
        for (prefix, namespace) in other.iter() {
            self.insert(prefix, namespace);
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites `uri` as `prefix:local` using the longest matching namespace.
    /// Returns the URI unchanged when no namespace matches.
    pub fn shorten(&self, uri: &str) -> String {
        let best = self
            .entries
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && uri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len());
        match best {
            Some((prefix, ns)) => format!("{}:{}", prefix, &uri[ns.len()..]),
            None => uri.to_string(),
        }
    }

    /// Expands `prefix:local` when the prefix is known.
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        if local.starts_with("//") {
            return None;
        }
        self.get(prefix).map(|ns| format!("{}{}", ns, local))
    }
}
