//! Defines the main session API: one loaded document with its quad store,
//! graph roles, metadata and label resolver.

use crate::config::Config;
use crate::label::{LabelCache, LabelFetcher, LabelResolver, NoLabelFetcher};
use crate::metadata::Metadata;
use crate::prefixes::PrefixMap;
use crate::providers::HttpLabelFetcher;
use crate::roles::GraphRoles;
use crate::source::{AnySource, Location, QuadSource, SourceDocument};
use crate::store::QuadStore;
use crate::term::{Quad, Term};
use crate::trusty::{self, artifact_code, Verification};
use anyhow::{anyhow, Result};
use log::{debug, info};
use std::sync::Arc;

/// Initializes logging for the trustynp library.
///
/// This function checks for the `TRUSTYNP_LOG` environment variable. If it is
/// set, `RUST_LOG` is set to its value. `TRUSTYNP_LOG` takes precedence over
/// `RUST_LOG`. The logger initialization (e.g., `env_logger::init()`) must be
/// called after this function for the log level to take effect.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("TRUSTYNP_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}

/// Builds the label resolver a config asks for: remote lookups through
/// [`HttpLabelFetcher`] unless the config is offline or has them turned off.
pub fn label_resolver(config: &Config, cache: Arc<LabelCache>) -> LabelResolver {
    let remote = config.remote_labels();
    let fetcher: Arc<dyn LabelFetcher> = if remote.is_enabled() {
        Arc::new(HttpLabelFetcher::new(config.fetch_options()))
    } else {
        Arc::new(NoLabelFetcher)
    };
    LabelResolver::new(cache, fetcher, config.prefix_map(), remote)
}

/// One loaded document. Every load builds a fresh store; roles are computed
/// once all quads are in, metadata once the roles are known.
pub struct NanopubSession {
    uri: String,
    location: Option<Location>,
    config: Config,
    store: QuadStore,
    roles: GraphRoles,
    metadata: Metadata,
    prefixes: PrefixMap,
    resolver: Arc<LabelResolver>,
}

impl NanopubSession {
    /// Loads `location` through `source`. Fails only when the document cannot
    /// be retrieved or parsed, or when the strict role policy rejects it.
    pub async fn load(
        source: &dyn QuadSource,
        location: Location,
        resolver: Arc<LabelResolver>,
        config: Config,
    ) -> Result<Self> {
        info!("Loading {}", location);
        let document = source.load(&location).await?;
        Self::from_document(Some(location), document, resolver, config)
    }

    /// Loads a file path or URL with the default sources and a resolver built
    /// from `config`.
    pub async fn open(location: &str, config: Config) -> Result<Self> {
        let location: Location = location.parse()?;
        let source = AnySource::new(config.fetch_options());
        let resolver = Arc::new(label_resolver(&config, Arc::new(LabelCache::new())));
        Self::load(&source, location, resolver, config).await
    }

    /// Builds a session from quads that are already in memory.
    pub fn from_quads(
        uri: impl Into<String>,
        quads: Vec<Quad>,
        prefixes: PrefixMap,
        resolver: Arc<LabelResolver>,
        config: Config,
    ) -> Result<Self> {
        let document = SourceDocument {
            quads,
            prefixes,
            base: uri.into(),
        };
        Self::from_document(None, document, resolver, config)
    }

    fn from_document(
        location: Option<Location>,
        document: SourceDocument,
        resolver: Arc<LabelResolver>,
        config: Config,
    ) -> Result<Self> {
        let mut session = NanopubSession {
            uri: document.base.clone(),
            location,
            config,
            store: QuadStore::new(),
            roles: GraphRoles::default(),
            metadata: Metadata::default(),
            prefixes: PrefixMap::new(),
            resolver,
        };
        session.ingest(document)?;
        Ok(session)
    }

    fn ingest(&mut self, document: SourceDocument) -> Result<()> {
        let store: QuadStore = document.quads.into_iter().collect();
        let roles = GraphRoles::extract_with_policy(&store, self.config.role_policy())?;
        let mut prefixes = self.config.prefix_map();
        prefixes.merge(&document.prefixes);

        self.uri = document.base;
        self.store = store;
        self.roles = roles;
        self.prefixes = prefixes;
        self.refresh_metadata();
        info!(
            "Loaded {} quads from {} (nanopublication: {})",
            self.store.len(),
            self.uri,
            self.is_nanopublication()
        );
        Ok(())
    }

    /// Reads the document again into a fresh store and recomputes roles and
    /// metadata. Sessions built with [`NanopubSession::from_quads`] have
    /// nothing to reload from.
    pub async fn reload(&mut self, source: &dyn QuadSource) -> Result<()> {
        let location = self
            .location
            .clone()
            .ok_or_else(|| anyhow!("Session for {} has no location to reload from", self.uri))?;
        debug!("Reloading {}", location);
        let document = source.load(&location).await?;
        self.ingest(document)
    }

    /// Recomputes the metadata, picking up labels resolved since the last call.
    pub fn refresh_metadata(&mut self) {
        let metadata = Metadata::extract_with(&self.roles, &self.store, |term| self.label(term));
        self.metadata = metadata;
    }

    /// Waits for outstanding background label lookups, then refreshes the
    /// metadata with whatever they found.
    pub async fn wait_for_labels(&mut self) {
        self.resolver.wait_idle().await;
        self.refresh_metadata();
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &QuadStore {
        &self.store
    }

    pub fn roles(&self) -> &GraphRoles {
        &self.roles
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn resolver(&self) -> &Arc<LabelResolver> {
        &self.resolver
    }

    /// Display label of `term`; unlabelled URIs are shortened with the
    /// document's prefixes.
    pub fn label(&self, term: &Term) -> String {
        self.resolver.label_with(&self.store, term, &self.prefixes)
    }

    /// Like [`NanopubSession::label`], but waits for the remote lookup of a
    /// URI the document does not label.
    pub async fn resolve_label(&self, term: &Term) -> String {
        match term {
            Term::NamedNode(n) if self.resolver.store_label(&self.store, term).is_none() => {
                self.resolver
                    .resolve_uri_with(n.as_str(), &self.prefixes)
                    .await
            }
            _ => self.label(term),
        }
    }

    /// `uri` shortened with the document's own prefixes.
    pub fn shorten(&self, uri: &str) -> String {
        self.prefixes.shorten(uri)
    }

    pub fn is_nanopublication(&self) -> bool {
        self.roles.is_complete()
    }

    /// Trusty hash of the store, in the order set by the config.
    pub fn trusty_hash(&self) -> String {
        trusty::trusty_hash_with_order(self.store.iter(), self.config.hash_order())
    }

    /// Checks the content against the artifact code in the nanopublication
    /// URI, or failing that in the URI the document was read from.
    pub fn verify(&self) -> Verification {
        let expected = self
            .roles
            .nanopub
            .as_deref()
            .filter(|uri| artifact_code(uri).is_some())
            .unwrap_or(&self.uri);
        self.verify_against(expected)
    }

    /// Checks the content against a given code or trusty URI.
    pub fn verify_against(&self, expected: &str) -> Verification {
        trusty::verify(self.store.iter(), expected, self.config.hash_order())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn offline_session(quads: Vec<Quad>, config: Config) -> Result<NanopubSession> {
        let resolver = Arc::new(LabelResolver::offline(config.prefix_map()));
        NanopubSession::from_quads("http://example.org/np1", quads, PrefixMap::new(), resolver, config)
    }

    fn nanopub() -> Vec<Quad> {
        let np = "http://example.org/np1";
        let head = "http://example.org/np1#Head";
        vec![
            Quad::from_uris(np, TYPE, NANOPUBLICATION, Some(head)).unwrap(),
            Quad::from_uris(np, HAS_ASSERTION, "http://example.org/np1#assertion", Some(head)).unwrap(),
            Quad::from_uris(np, HAS_PROVENANCE, "http://example.org/np1#provenance", Some(head)).unwrap(),
            Quad::from_uris(np, HAS_PUBLICATION_INFO, "http://example.org/np1#pubinfo", Some(head)).unwrap(),
        ]
    }

    #[test]
    fn test_from_quads() {
        let session = offline_session(nanopub(), Config::new_offline()).unwrap();
        assert!(session.is_nanopublication());
        assert_eq!(session.store().len(), 4);
        assert_eq!(session.metadata().document_uri.as_deref(), Some("http://example.org/np1"));
        assert_eq!(session.shorten(HAS_ASSERTION), "np:hasAssertion");
        assert_eq!(session.trusty_hash(), trusty::trusty_hash(nanopub().iter()));
    }

    #[test]
    fn test_strict_rejects_partial() {
        let mut quads = nanopub();
        quads.pop();
        let config = Config {
            strict: true,
            ..Config::new_offline()
        };
        assert!(offline_session(quads.clone(), config).is_err());
        let relaxed = offline_session(quads, Config::new_offline()).unwrap();
        assert!(!relaxed.is_nanopublication());
        assert_eq!(relaxed.roles().pubinfo, None);
    }

    #[test]
    fn test_verify_without_code() {
        let session = offline_session(nanopub(), Config::new_offline()).unwrap();
        assert_eq!(session.verify(), Verification::NoArtifactCode);
        let code = session.trusty_hash();
        assert!(session.verify_against(&code).is_valid());
    }

    #[test]
    fn test_labels_use_document_prefixes() {
        let mut quads = nanopub();
        quads.push(
            Quad::from_uris(
                "http://example.org/np1",
                CREATOR,
                "http://example.org/people/alice",
                Some("http://example.org/np1#pubinfo"),
            )
            .unwrap(),
        );
        let mut prefixes = PrefixMap::new();
        prefixes.insert("people", "http://example.org/people/");
        let config = Config::new_offline();
        let resolver = Arc::new(LabelResolver::offline(config.prefix_map()));
        let session =
            NanopubSession::from_quads("http://example.org/np1", quads, prefixes, resolver, config)
                .unwrap();
        let alice = Term::named("http://example.org/people/alice").unwrap();
        assert_eq!(session.label(&alice), "people:alice");
        assert_eq!(session.label(&alice), session.shorten(alice.value()));
        assert_eq!(session.metadata().creators, vec!["people:alice".to_string()]);
    }

    #[tokio::test]
    async fn test_resolve_label_offline() {
        let session = offline_session(nanopub(), Config::new_offline()).unwrap();
        let assertion = Term::named(HAS_ASSERTION).unwrap();
        assert_eq!(session.resolve_label(&assertion).await, "has assertion");
        let unknown = Term::named("http://www.nanopub.org/nschema#other").unwrap();
        assert_eq!(session.resolve_label(&unknown).await, "np:other");
    }

    #[tokio::test]
    async fn test_reload_needs_location() {
        let mut session = offline_session(nanopub(), Config::new_offline()).unwrap();
        assert!(session.reload(&AnySource::default()).await.is_err());
    }
}
