//! In-memory quad store with pattern matching.
//!
//! Quads are kept in insertion order (the trusty hasher consumes that order)
//! and indexed by each position. Duplicate inserts are tolerated; callers that
//! need set semantics use [`QuadStore::distinct`] or [`QuadStore::contains`].

use crate::term::{NamedNode, Quad, Term};
use log::debug;
use std::collections::{HashMap, HashSet};

/// The graph position of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphPattern<'a> {
    /// Matches quads in any graph, including the default graph.
    Any,
    /// Matches only quads in the default graph.
    Default,
    /// Matches only quads in the given named graph.
    Named(&'a Term),
}

impl<'a> From<Option<&'a Term>> for GraphPattern<'a> {
    fn from(graph: Option<&'a Term>) -> Self {
        match graph {
            Some(g) => GraphPattern::Named(g),
            None => GraphPattern::Any,
        }
    }
}

impl<'a> From<&'a Term> for GraphPattern<'a> {
    fn from(graph: &'a Term) -> Self {
        GraphPattern::Named(graph)
    }
}

#[derive(Debug, Clone, Copy)]
struct QuadPattern<'a> {
    subject: Option<&'a Term>,
    predicate: Option<&'a NamedNode>,
    object: Option<&'a Term>,
    graph: GraphPattern<'a>,
}

impl QuadPattern<'_> {
    fn matches(&self, quad: &Quad) -> bool {
        if let Some(s) = self.subject {
            if &quad.subject != s {
                return false;
            }
        }
        if let Some(p) = self.predicate {
            if &quad.predicate != p {
                return false;
            }
        }
        if let Some(o) = self.object {
            if &quad.object != o {
                return false;
            }
        }
        match self.graph {
            GraphPattern::Any => true,
            GraphPattern::Default => quad.graph.is_none(),
            GraphPattern::Named(g) => quad.graph.as_ref() == Some(g),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct QuadStore {
    quads: Vec<Quad>,
    by_subject: HashMap<Term, Vec<usize>>,
    by_predicate: HashMap<NamedNode, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
    by_graph: HashMap<Option<Term>, Vec<usize>>,
}

impl QuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, quad: Quad) {
        let idx = self.quads.len();
        self.by_subject
            .entry(quad.subject.clone())
            .or_default()
            .push(idx);
        self.by_predicate
            .entry(quad.predicate.clone())
            .or_default()
            .push(idx);
        self.by_object
            .entry(quad.object.clone())
            .or_default()
            .push(idx);
        self.by_graph
            .entry(quad.graph.clone())
            .or_default()
            .push(idx);
        self.quads.push(quad);
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Number of structurally distinct quads.
    pub fn len_distinct(&self) -> usize {
        self.quads.iter().collect::<HashSet<_>>().len()
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.match_pattern(
            Some(&quad.subject),
            Some(&quad.predicate),
            Some(&quad.object),
            match &quad.graph {
                Some(g) => GraphPattern::Named(g),
                None => GraphPattern::Default,
            },
        )
        .next()
        .is_some()
    }

    /// All quads in insertion order, duplicates included.
    pub fn iter(&self) -> std::slice::Iter<'_, Quad> {
        self.quads.iter()
    }

    /// First occurrence of every distinct quad, in insertion order.
    pub fn distinct(&self) -> Vec<&Quad> {
        let mut seen: HashSet<&Quad> = HashSet::new();
        self.quads.iter().filter(|q| seen.insert(*q)).collect()
    }

    /// Distinct graph names in first-seen order; `None` is the default graph.
    pub fn graphs(&self) -> Vec<Option<&Term>> {
        let mut seen: HashSet<Option<&Term>> = HashSet::new();
        self.quads
            .iter()
            .map(|q| q.graph.as_ref())
            .filter(|g| seen.insert(*g))
            .collect()
    }

    /// Returns every quad whose bound positions equal the given terms, lazily
    /// and in insertion order.
    pub fn match_pattern<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: Option<&'p NamedNode>,
        object: Option<&'p Term>,
        graph: GraphPattern<'p>,
    ) -> impl Iterator<Item = &'a Quad> + 'p
    where
        'a: 'p,
    {
        let pattern = QuadPattern {
            subject,
            predicate,
            object,
            graph,
        };
        let candidates: Box<dyn Iterator<Item = usize> + 'a> = match self.candidates(&pattern) {
            Some(indexes) => Box::new(indexes.iter().copied()),
            None => Box::new(0..self.quads.len()),
        };
        candidates
            .map(move |idx| &self.quads[idx])
            .filter(move |quad| pattern.matches(quad))
    }

    /// The first matching quad in insertion order. Patterns that match several
    /// quads yield an arbitrary one of them as far as callers are concerned.
    pub fn match_one<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: Option<&'p NamedNode>,
        object: Option<&'p Term>,
        graph: GraphPattern<'p>,
    ) -> Option<&'a Quad>
    where
        'a: 'p,
    {
        self.match_pattern(subject, predicate, object, graph).next()
    }

    pub fn match_all<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: Option<&'p NamedNode>,
        object: Option<&'p Term>,
        graph: GraphPattern<'p>,
    ) -> Vec<&'a Quad>
    where
        'a: 'p,
    {
        self.match_pattern(subject, predicate, object, graph)
            .collect()
    }

    pub fn objects<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: &'p NamedNode,
        graph: GraphPattern<'p>,
    ) -> impl Iterator<Item = &'a Term> + 'p
    where
        'a: 'p,
    {
        self.match_pattern(subject, Some(predicate), None, graph)
            .map(|q| &q.object)
    }

    pub fn subjects<'a, 'p>(
        &'a self,
        predicate: Option<&'p NamedNode>,
        object: Option<&'p Term>,
        graph: GraphPattern<'p>,
    ) -> impl Iterator<Item = &'a Term> + 'p
    where
        'a: 'p,
    {
        self.match_pattern(None, predicate, object, graph)
            .map(|q| &q.subject)
    }

    /// Picks the shortest index list among the bound positions. `None` means
    /// nothing is bound and every quad is a candidate.
    fn candidates(&self, pattern: &QuadPattern<'_>) -> Option<&[usize]> {
        const EMPTY: &[usize] = &[];
        let mut lists: Vec<&[usize]> = Vec::with_capacity(4);
        if let Some(s) = pattern.subject {
            lists.push(self.by_subject.get(s).map_or(EMPTY, |l| l.as_slice()));
        }
        if let Some(p) = pattern.predicate {
            lists.push(self.by_predicate.get(p).map_or(EMPTY, |l| l.as_slice()));
        }
        if let Some(o) = pattern.object {
            lists.push(self.by_object.get(o).map_or(EMPTY, |l| l.as_slice()));
        }
        match pattern.graph {
            GraphPattern::Any => {}
            GraphPattern::Default => {
                lists.push(self.by_graph.get(&None).map_or(EMPTY, |l| l.as_slice()))
            }
            GraphPattern::Named(g) => {
                let key = Some(g.clone());
                lists.push(self.by_graph.get(&key).map_or(EMPTY, |l| l.as_slice()));
            }
        }
        lists.into_iter().min_by_key(|l| l.len())
    }
}

impl Extend<Quad> for QuadStore {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        let before = self.quads.len();
        for quad in iter {
            self.add(quad);
        }
        debug!("Added {} quads to store", self.quads.len() - before);
    }
}

impl FromIterator<Quad> for QuadStore {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        let mut store = QuadStore::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a QuadStore {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}
