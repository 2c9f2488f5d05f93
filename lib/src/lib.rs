//! Loads nanopublications, finds their head/assertion/provenance/pubinfo
//! graphs, reads their metadata, labels their terms and computes trusty-URI
//! content hashes.

extern crate derive_builder;

pub mod api;
pub mod config;
pub mod consts;
pub mod errors;
pub mod fetch;
pub mod label;
pub mod metadata;
pub mod options;
pub mod prefixes;
pub mod providers;
pub mod roles;
pub mod source;
pub mod store;
pub mod term;
pub mod trusty;
pub mod util;

pub use crate::api::{init_logging, label_resolver, NanopubSession};
pub use crate::config::Config;
pub use crate::label::{LabelCache, LabelFetcher, LabelResolver};
pub use crate::metadata::Metadata;
pub use crate::options::{HashOrder, RemoteLabels, RolePolicy};
pub use crate::prefixes::PrefixMap;
pub use crate::roles::GraphRoles;
pub use crate::source::{AnySource, Location, QuadSource};
pub use crate::store::{GraphPattern, QuadStore};
pub use crate::term::{BlankNode, Literal, NamedNode, Quad, Term};
pub use crate::trusty::{trusty_hash, trusty_hash_with_order, TrustyHasher, Verification};
