//! Trusty hashes: content-derived identifiers for a sequence of quads.
//!
//! Every quad is written as four lines (subject, predicate, object, graph):
//!
//! ```text
//! http://example.org/a
//! http://example.org/b
//! ^http://www.w3.org/2001/XMLSchema#string hello
//!
//! ```
//!
//! Named nodes are written as their URI, blank nodes as their bare id,
//! language-tagged literals as `@lang value` and all other literals as
//! `^datatype value`. The default graph is an empty line. A quad whose text
//! equals the one written just before it is skipped. The SHA-256 digest of the
//! text is encoded as unpadded URL-safe base64 and prefixed with `RA`.

use crate::consts::TRUSTY_MODULE_RA;
use crate::options::HashOrder;
use crate::term::{Quad, Term};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of an `RA` artifact code: the marker plus 43 base64 characters.
pub const ARTIFACT_CODE_LEN: usize = 45;

lazy_static! {
    static ref ARTIFACT_CODE: Regex = Regex::new(r"RA[A-Za-z0-9_-]{43}$").unwrap();
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Serializes a single term position. `None` is the default graph.
pub fn serialize_term(term: Option<&Term>) -> String {
    let mut out = String::new();
    write_term(&mut out, term);
    out
}

fn write_term(out: &mut String, term: Option<&Term>) {
    match term {
        Some(Term::NamedNode(n)) => out.push_str(n.as_str()),
        Some(Term::BlankNode(b)) => out.push_str(b.as_str()),
        Some(Term::Literal(l)) => match (l.language(), l.datatype()) {
            (Some(lang), _) => {
                out.push('@');
                out.push_str(&lang.to_ascii_lowercase());
                out.push(' ');
                out.push_str(&escape(l.value()));
            }
            (None, datatype) => {
                out.push('^');
                out.push_str(datatype.unwrap_or(crate::consts::XSD_STRING));
                out.push(' ');
                out.push_str(&escape(l.value()));
            }
        },
        None => {}
    }
    out.push('\n');
}

/// The four-line text of one quad.
pub fn serialize_quad(quad: &Quad) -> String {
    let mut out = String::new();
    write_term(&mut out, Some(&quad.subject));
    out.push_str(quad.predicate.as_str());
    out.push('\n');
    write_term(&mut out, Some(&quad.object));
    write_term(&mut out, quad.graph.as_ref());
    out
}

/// Incremental hasher. Feeding quads one by one gives the same result as
/// [`trusty_hash_with_order`] over the whole sequence.
pub struct TrustyHasher {
    order: HashOrder,
    digest: Sha256,
    previous: Option<String>,
    // canonical order needs every quad before anything can be digested
    pending: Vec<String>,
    count: usize,
}

impl Default for TrustyHasher {
    fn default() -> Self {
        Self::new(HashOrder::default())
    }
}

impl TrustyHasher {
    pub fn new(order: HashOrder) -> Self {
        TrustyHasher {
            order,
            digest: Sha256::new(),
            previous: None,
            pending: Vec::new(),
            count: 0,
        }
    }

    pub fn update(&mut self, quad: &Quad) {
        let text = serialize_quad(quad);
        match self.order {
            HashOrder::Presentation => self.push(text),
            HashOrder::Canonical => self.pending.push(text),
        }
    }

    fn push(&mut self, text: String) {
        if self.previous.as_deref() == Some(text.as_str()) {
            return;
        }
        self.digest.update(text.as_bytes());
        self.count += 1;
        self.previous = Some(text);
    }

    /// Number of quad texts digested so far (after collapsing).
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(mut self) -> String {
        if self.order.is_canonical() {
            let mut pending = std::mem::take(&mut self.pending);
            pending.sort_unstable();
            for text in pending {
                self.push(text);
            }
        }
        let digest = self.digest.finalize();
        format!("{}{}", TRUSTY_MODULE_RA, URL_SAFE_NO_PAD.encode(digest))
    }
}

impl Extend<Quad> for TrustyHasher {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        for quad in iter {
            self.update(&quad);
        }
    }
}

/// Hash of the quads in the order they are given.
pub fn trusty_hash<'a, I>(quads: I) -> String
where
    I: IntoIterator<Item = &'a Quad>,
{
    trusty_hash_with_order(quads, HashOrder::Presentation)
}

pub fn trusty_hash_with_order<'a, I>(quads: I, order: HashOrder) -> String
where
    I: IntoIterator<Item = &'a Quad>,
{
    let mut hasher = TrustyHasher::new(order);
    for quad in quads {
        hasher.update(quad);
    }
    hasher.finish()
}

/// The exact text that gets digested: quad texts in the given order with
/// adjacent repeats removed.
pub fn hash_input<'a, I>(quads: I, order: HashOrder) -> String
where
    I: IntoIterator<Item = &'a Quad>,
{
    let mut texts: Vec<String> = quads.into_iter().map(serialize_quad).collect();
    if order.is_canonical() {
        texts.sort_unstable();
    }
    texts.dedup();
    texts.concat()
}

/// The trailing `RA…` code of a trusty URI, or of a bare code. Fragments are
/// ignored, so `https://w3id.org/np/RA…#assertion` yields the code too.
pub fn artifact_code(uri: &str) -> Option<&str> {
    let uri = uri.split('#').next().unwrap_or(uri);
    ARTIFACT_CODE.find(uri).map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match(String),
    Mismatch { expected: String, actual: String },
    /// The reference carried no `RA` code to compare against.
    NoArtifactCode,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Match(_))
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Match(code) => write!(f, "OK {}", code),
            Verification::Mismatch { expected, actual } => {
                write!(f, "MISMATCH expected {} but content hashes to {}", expected, actual)
            }
            Verification::NoArtifactCode => write!(f, "no artifact code to verify against"),
        }
    }
}

/// Compares the hash of `quads` with the code in `expected`, which may be a
/// bare code or a trusty URI ending in one.
pub fn verify<'a, I>(quads: I, expected: &str, order: HashOrder) -> Verification
where
    I: IntoIterator<Item = &'a Quad>,
{
    let expected = match artifact_code(expected) {
        Some(code) => code.to_string(),
        None => return Verification::NoArtifactCode,
    };
    let actual = trusty_hash_with_order(quads, order);
    if actual == expected {
        Verification::Match(actual)
    } else {
        Verification::Mismatch { expected, actual }
    }
}
