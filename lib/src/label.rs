//! Human-readable labels for terms.
//!
//! Lookups are answered synchronously from the loaded document, the shared
//! [`LabelCache`] and a table of well-known vocabulary terms. When none of
//! those know the URI, the shortened URI is returned right away and a
//! background task asks a [`LabelFetcher`] for something better. The result
//! lands in the cache, so a later lookup picks it up.

use crate::consts::*;
use crate::options::RemoteLabels;
use crate::prefixes::PrefixMap;
use crate::store::{GraphPattern, QuadStore};
use crate::term::{NamedNode, Term};
use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, warn};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

lazy_static! {
    static ref COMMON_LABELS: HashMap<&'static str, &'static str> = HashMap::from([
        (TYPE, "is a"),
        (LABEL, "has label"),
        (COMMENT, "has comment"),
        (SEE_ALSO, "see also"),
        (NANOPUBLICATION, "nanopublication"),
        (HAS_ASSERTION, "has assertion"),
        (HAS_PROVENANCE, "has provenance"),
        (HAS_PUBLICATION_INFO, "has publication info"),
        (CREATED, "created on"),
        (CREATOR, "created by"),
        (TITLE, "has title"),
        (LICENSE, "has license"),
        (WAS_ATTRIBUTED_TO, "attributed to"),
        (WAS_DERIVED_FROM, "derived from"),
        (GENERATED_AT_TIME, "generated at"),
        (FOAF_NAME, "has name"),
        (PAV_AUTHORED_BY, "authored by"),
        (PAV_CREATED_BY, "created by"),
        (SKOS_PREF_LABEL, "has preferred label"),
        (SCHEMA_NAME, "has name"),
    ]);
}

/// Label from the table of well-known vocabulary terms.
pub fn common_label(uri: &str) -> Option<&'static str> {
    COMMON_LABELS.get(uri).copied()
}

/// Looks up a label for a URI somewhere outside the loaded document.
#[async_trait]
pub trait LabelFetcher: Send + Sync {
    /// `Ok(None)` means the lookup worked but nothing label-like was found.
    async fn fetch_label(&self, uri: &str) -> Result<Option<String>>;
}

/// A fetcher that never finds anything. Used when remote lookups are off.
#[derive(Debug, Default, Clone)]
pub struct NoLabelFetcher;

#[async_trait]
impl LabelFetcher for NoLabelFetcher {
    async fn fetch_label(&self, _uri: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

enum Claim<'a> {
    Cached(String),
    Waiting(watch::Receiver<Option<String>>),
    Started(InFlight<'a>),
}

/// The right to resolve one URI. Dropping it without completing (for example
/// when the owning task is aborted) frees the URI for a later attempt.
struct InFlight<'a> {
    cache: &'a LabelCache,
    uri: String,
    done: bool,
}

impl InFlight<'_> {
    fn complete(mut self, label: String) {
        self.cache.complete(&self.uri, label);
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.cache.release(&self.uri);
        }
    }
}

/// URI → label map shared by every consumer of a session, plus the set of
/// URIs with a resolution in progress.
#[derive(Debug, Default)]
pub struct LabelCache {
    labels: RwLock<HashMap<String, String>>,
    in_flight: Mutex<HashMap<String, watch::Sender<Option<String>>>>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &str) -> Option<String> {
        self.labels
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(uri)
            .cloned()
    }

    pub fn insert(&self, uri: impl Into<String>, label: impl Into<String>) {
        self.labels
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uri.into(), label.into());
    }

    pub fn len(&self) -> usize {
        self.labels.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_resolving(&self, uri: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(uri)
    }

    fn claim(&self, uri: &str) -> Claim<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // checked under the in-flight lock: `complete` writes the label before
        // it removes the in-flight entry
        if let Some(label) = self.get(uri) {
            return Claim::Cached(label);
        }
        if let Some(sender) = in_flight.get(uri) {
            return Claim::Waiting(sender.subscribe());
        }
        let (sender, _) = watch::channel(None);
        in_flight.insert(uri.to_string(), sender);
        Claim::Started(InFlight {
            cache: self,
            uri: uri.to_string(),
            done: false,
        })
    }

    fn complete(&self, uri: &str, label: String) {
        self.insert(uri, label.clone());
        let sender = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uri);
        if let Some(sender) = sender {
            sender.send_replace(Some(label));
        }
    }

    fn release(&self, uri: &str) {
        debug!("Releasing unfinished label resolution for {}", uri);
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uri);
    }

    /// Returns the cached label for `uri`, or runs `fetch` to find one. While
    /// a fetch for `uri` is outstanding, other callers wait for its result
    /// instead of starting their own, and `fetch` is dropped unpolled.
    ///
    /// A failed fetch, or one that finds nothing, caches the URI itself so the
    /// lookup is not retried.
    pub async fn resolve<F>(&self, uri: &str, fetch: F) -> String
    where
        F: Future<Output = Result<Option<String>>>,
    {
        match self.claim(uri) {
            Claim::Cached(label) => label,
            Claim::Waiting(mut rx) => {
                let waited = rx.wait_for(|label| label.is_some()).await.map(|l| l.clone());
                match waited {
                    Ok(Some(label)) => label,
                    // the resolving task went away without an answer
                    _ => self.get(uri).unwrap_or_else(|| uri.to_string()),
                }
            }
            Claim::Started(guard) => {
                let label = match fetch.await {
                    Ok(Some(label)) => label,
                    Ok(None) => {
                        debug!("No label found for {}", uri);
                        uri.to_string()
                    }
                    Err(e) => {
                        warn!("Failed to resolve label for {}: {}", uri, e);
                        uri.to_string()
                    }
                };
                guard.complete(label.clone());
                label
            }
        }
    }
}

/// Resolves display labels against one document, a shared cache and a remote
/// fetcher.
pub struct LabelResolver {
    cache: Arc<LabelCache>,
    fetcher: Arc<dyn LabelFetcher>,
    prefixes: PrefixMap,
    remote: RemoteLabels,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl LabelResolver {
    pub fn new(
        cache: Arc<LabelCache>,
        fetcher: Arc<dyn LabelFetcher>,
        prefixes: PrefixMap,
        remote: RemoteLabels,
    ) -> Self {
        LabelResolver {
            cache,
            fetcher,
            prefixes,
            remote,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// A resolver with its own cache and no remote lookups.
    pub fn offline(prefixes: PrefixMap) -> Self {
        Self::new(
            Arc::new(LabelCache::new()),
            Arc::new(NoLabelFetcher),
            prefixes,
            RemoteLabels::Disabled,
        )
    }

    pub fn cache(&self) -> &Arc<LabelCache> {
        &self.cache
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Best label available right now. May start a background lookup for
    /// `term`, whose result shows up in later calls.
    pub fn label(&self, store: &QuadStore, term: &Term) -> String {
        self.label_with(store, term, &self.prefixes)
    }

    /// Like [`LabelResolver::label`], shortening unlabelled URIs with
    /// `prefixes` (usually the ones the document declares).
    pub fn label_with(&self, store: &QuadStore, term: &Term, prefixes: &PrefixMap) -> String {
        if let Term::Literal(l) = term {
            return l.value().to_string();
        }
        if let Some(label) = self.store_label(store, term) {
            return label;
        }
        let uri = match term {
            Term::NamedNode(n) => n.as_str(),
            _ => return term.to_string(),
        };
        if let Some(label) = self.known_label(uri) {
            return label;
        }
        self.refine(uri);
        prefixes.shorten(uri)
    }

    /// Label of a URI that may not occur in any loaded document.
    pub fn label_uri(&self, uri: &str) -> String {
        if let Some(label) = self.known_label(uri) {
            return label;
        }
        self.refine(uri);
        self.prefixes.shorten(uri)
    }

    /// Like [`LabelResolver::label_uri`], but waits for the remote lookup
    /// instead of returning a placeholder.
    pub async fn resolve_uri(&self, uri: &str) -> String {
        self.resolve_uri_with(uri, &self.prefixes).await
    }

    pub async fn resolve_uri_with(&self, uri: &str, prefixes: &PrefixMap) -> String {
        if let Some(label) = self.known_label(uri) {
            return label;
        }
        if !self.remote.is_enabled() || !is_remote(uri) {
            return prefixes.shorten(uri);
        }
        let label = self.cache.resolve(uri, self.fetcher.fetch_label(uri)).await;
        if label == uri {
            prefixes.shorten(uri)
        } else {
            label
        }
    }

    /// `rdfs:label`, then `foaf:name`, of `term` in `store`.
    pub fn store_label(&self, store: &QuadStore, term: &Term) -> Option<String> {
        for predicate in [LABEL, FOAF_NAME] {
            let predicate = NamedNode::new_unchecked(predicate);
            let found = store
                .objects(Some(term), &predicate, GraphPattern::Any)
                .find(|o| o.is_literal())
                .map(|o| o.value().to_string());
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn known_label(&self, uri: &str) -> Option<String> {
        // a cached URI marks a lookup that found nothing
        if let Some(label) = self.cache.get(uri).filter(|label| label != uri) {
            return Some(label);
        }
        common_label(uri).map(|label| label.to_string())
    }

    fn refine(&self, uri: &str) {
        if !self.remote.is_enabled() || !is_remote(uri) {
            return;
        }
        if self.cache.get(uri).is_some() || self.cache.is_resolving(uri) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, not resolving {} remotely", uri);
            return;
        };
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if tasks.get(uri).is_some_and(|task| !task.is_finished()) {
            return;
        }
        tasks.retain(|_, task| !task.is_finished());
        debug!("Starting background label lookup for {}", uri);
        let cache = Arc::clone(&self.cache);
        let fetcher = Arc::clone(&self.fetcher);
        let owned = uri.to_string();
        let task = handle.spawn(async move {
            cache.resolve(&owned, fetcher.fetch_label(&owned)).await;
        });
        tasks.insert(uri.to_string(), task);
    }

    /// Number of background lookups that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Aborts the background lookup for `uri`. Nothing is cached for it, so a
    /// later lookup starts over. Returns whether a running task was aborted.
    pub fn cancel(&self, uri: &str) -> bool {
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uri);
        match task {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&self) {
        let tasks: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .map(|(_, task)| task)
            .collect();
        for task in tasks {
            task.abort();
        }
    }

    /// Waits until every background lookup started so far has finished.
    pub async fn wait_idle(&self) {
        loop {
            let tasks: Vec<JoinHandle<()>> = self
                .tasks
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .drain()
                .map(|(_, task)| task)
                .collect();
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    if !e.is_cancelled() {
                        warn!("Label lookup task failed: {}", e);
                    }
                }
            }
        }
    }
}

impl Drop for LabelResolver {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://") || uri.starts_with("doi:")
}
