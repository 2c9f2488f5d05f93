//! Locates the four structural graphs of a nanopublication.
//!
//! The head graph is the graph holding `?np rdf:type np:Nanopublication`; the
//! other three roles are read from `np:hasAssertion`, `np:hasProvenance` and
//! `np:hasPublicationInfo` statements inside that head graph.

use crate::consts::*;
use crate::errors::RoleError;
use crate::options::RolePolicy;
use crate::store::{GraphPattern, QuadStore};
use crate::term::{NamedNode, Quad, Term};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRoles {
    /// Subject of the `np:Nanopublication` type statement.
    pub nanopub: Option<String>,
    pub head: Option<String>,
    pub assertion: Option<String>,
    pub provenance: Option<String>,
    pub pubinfo: Option<String>,
}

const ROLE_PREDICATES: [(&str, &str); 3] = [
    ("assertion", HAS_ASSERTION),
    ("provenance", HAS_PROVENANCE),
    ("pubinfo", HAS_PUBLICATION_INFO),
];

impl GraphRoles {
    /// Relaxed extraction: the first matching statement wins and anything
    /// missing is left as `None`, as is a role whose first statement names a
    /// literal or blank node. A head graph that is not a URI counts as no
    /// head. Never fails.
    pub fn extract(store: &QuadStore) -> Self {
        let mut roles = GraphRoles::default();
        let Some(head_quad) = head_candidates(store).into_iter().next() else {
            debug!("No np:Nanopublication declaration found");
            return roles;
        };
        let head = match head_quad.graph.as_ref() {
            Some(head @ Term::NamedNode(_)) => head,
            other => {
                warn!(
                    "Ignoring np:Nanopublication declaration in non-URI graph {:?}",
                    other.map(|g| g.to_string())
                );
                return roles;
            }
        };
        roles.head = Some(head.value().to_string());
        roles.nanopub = head_quad
            .subject
            .as_named_node()
            .map(|n| n.as_str().to_string());

        for (role, predicate) in ROLE_PREDICATES {
            let predicate = NamedNode::new_unchecked(predicate);
            let first = store
                .objects(None, &predicate, GraphPattern::Named(head))
                .next();
            let found = match first {
                Some(Term::NamedNode(n)) => Some(n.as_str().to_string()),
                Some(other) => {
                    debug!("Ignoring non-URI {} graph {} in head {}", role, other, head);
                    None
                }
                None => {
                    debug!("No {} graph declared in head {}", role, head);
                    None
                }
            };
            *roles.slot(role) = found;
        }
        roles
    }

    /// Extraction under the given policy. With [`RolePolicy::Strict`] every
    /// pattern must match exactly one distinct statement whose object is a
    /// URI; the relaxed policy never returns an error.
    pub fn extract_with_policy(store: &QuadStore, policy: RolePolicy) -> Result<Self, RoleError> {
        match policy {
            RolePolicy::Relaxed => Ok(Self::extract(store)),
            RolePolicy::Strict => Self::extract_strict(store),
        }
    }

    fn extract_strict(store: &QuadStore) -> Result<Self, RoleError> {
        let heads = head_candidates(store);
        let head_quad = exactly_one("head", heads)?;
        let head = match head_quad.graph.as_ref() {
            Some(Term::NamedNode(n)) => n.as_str().to_string(),
            Some(other) => {
                return Err(RoleError::NotANamedNode {
                    role: "head",
                    value: other.to_string(),
                })
            }
            None => return Err(RoleError::Missing { role: "head" }),
        };
        let nanopub = match &head_quad.subject {
            Term::NamedNode(n) => n.as_str().to_string(),
            other => {
                return Err(RoleError::NotANamedNode {
                    role: "nanopublication",
                    value: other.to_string(),
                })
            }
        };
        let head_graph = head_quad.graph.as_ref();

        let mut roles = GraphRoles {
            nanopub: Some(nanopub),
            head: Some(head),
            ..GraphRoles::default()
        };
        for (role, predicate) in ROLE_PREDICATES {
            let predicate = NamedNode::new_unchecked(predicate);
            let declared: Vec<&Quad> = store
                .match_pattern(None, Some(&predicate), None, head_graph.into())
                .collect();
            let quad = exactly_one(role, declared)?;
            match &quad.object {
                Term::NamedNode(n) => *roles.slot(role) = Some(n.as_str().to_string()),
                other => {
                    return Err(RoleError::NotANamedNode {
                        role,
                        value: other.to_string(),
                    })
                }
            }
        }
        Ok(roles)
    }

    fn slot(&mut self, role: &str) -> &mut Option<String> {
        match role {
            "assertion" => &mut self.assertion,
            "provenance" => &mut self.provenance,
            _ => &mut self.pubinfo,
        }
    }

    /// All four graphs are known: the document is a well-formed nanopublication.
    pub fn is_complete(&self) -> bool {
        self.head.is_some()
            && self.assertion.is_some()
            && self.provenance.is_some()
            && self.pubinfo.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
            && self.assertion.is_none()
            && self.provenance.is_none()
            && self.pubinfo.is_none()
    }

    pub fn head_graph(&self) -> Option<Term> {
        graph_term(&self.head)
    }

    pub fn assertion_graph(&self) -> Option<Term> {
        graph_term(&self.assertion)
    }

    pub fn provenance_graph(&self) -> Option<Term> {
        graph_term(&self.provenance)
    }

    pub fn pubinfo_graph(&self) -> Option<Term> {
        graph_term(&self.pubinfo)
    }
}

fn graph_term(uri: &Option<String>) -> Option<Term> {
    uri.as_deref().and_then(|u| Term::named(u).ok())
}

/// Type declarations that sit in a named graph, in insertion order.
fn head_candidates(store: &QuadStore) -> Vec<&Quad> {
    let rdf_type = NamedNode::new_unchecked(TYPE);
    let nanopub_class = Term::NamedNode(NamedNode::new_unchecked(NANOPUBLICATION));
    let found: Vec<&Quad> = store
        .match_pattern(None, Some(&rdf_type), Some(&nanopub_class), GraphPattern::Any)
        .collect();
    let (named, default): (Vec<&Quad>, Vec<&Quad>) =
        found.into_iter().partition(|q| q.graph.is_some());
    if !default.is_empty() {
        warn!(
            "Ignoring {} np:Nanopublication declaration(s) in the default graph",
            default.len()
        );
    }
    named
}

/// Counts distinct statements so that repeated inserts of one quad are not
/// reported as ambiguous.
fn exactly_one<'a>(role: &'static str, quads: Vec<&'a Quad>) -> Result<&'a Quad, RoleError> {
    let mut seen = HashSet::new();
    let distinct: Vec<&Quad> = quads.into_iter().filter(|q| seen.insert(*q)).collect();
    match distinct.len() {
        0 => Err(RoleError::Missing { role }),
        1 => Ok(distinct[0]),
        count => Err(RoleError::Ambiguous { role, count }),
    }
}
