//! RDF term model: named nodes, literals, blank nodes and quads.
//!
//! Terms validate their own invariants on construction so that every [`Quad`]
//! held by a [`QuadStore`](crate::store::QuadStore) is well formed. Documents
//! parsed by oxigraph are converted into this model with [`Quad::try_from`].

use crate::consts::XSD_STRING;
use crate::errors::TermError;
use oxigraph::model as ox;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedNode {
    uri: String,
}

impl NamedNode {
    pub fn new(uri: impl Into<String>) -> Result<Self, TermError> {
        let uri = uri.into();
        if uri.is_empty() {
            return Err(TermError::EmptyUri);
        }
        Ok(NamedNode { uri })
    }

    /// Skips validation. Meant for the vocabulary constants in [`crate::consts`].
    pub fn new_unchecked(uri: impl Into<String>) -> Self {
        NamedNode { uri: uri.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn into_string(self) -> String {
        self.uri
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.uri)
    }
}

/// A literal value with at most one of a language tag or an explicit datatype.
///
/// A literal typed as `xsd:string` is stored without an explicit datatype, so
/// `"a"` and `"a"^^xsd:string` compare equal. Language tags are lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    value: String,
    language: Option<String>,
    datatype: Option<String>,
}

impl Literal {
    pub fn new(
        value: impl Into<String>,
        language: Option<String>,
        datatype: Option<String>,
    ) -> Result<Self, TermError> {
        match (language, datatype) {
            (Some(language), Some(datatype)) => {
                Err(TermError::LanguageAndDatatype { language, datatype })
            }
            (Some(language), None) => Self::new_language_tagged(value, language),
            (None, Some(datatype)) => Self::new_typed(value, datatype),
            (None, None) => Ok(Self::new_simple(value)),
        }
    }

    pub fn new_simple(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    pub fn new_language_tagged(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, TermError> {
        let language = language.into();
        if language.is_empty() {
            return Err(TermError::EmptyLanguage);
        }
        Ok(Literal {
            value: value.into(),
            language: Some(language.to_ascii_lowercase()),
            datatype: None,
        })
    }

    pub fn new_typed(
        value: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Result<Self, TermError> {
        let datatype = datatype.into();
        if datatype.is_empty() {
            return Err(TermError::EmptyUri);
        }
        let datatype = if datatype == XSD_STRING {
            None
        } else {
            Some(datatype)
        };
        Ok(Literal {
            value: value.into(),
            language: None,
            datatype,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The effective datatype: the explicit one, or `xsd:string` when the
    /// literal is untagged. Language-tagged literals have no datatype here.
    pub fn datatype(&self) -> Option<&str> {
        match (&self.language, &self.datatype) {
            (Some(_), _) => None,
            (None, Some(dt)) => Some(dt.as_str()),
            (None, None) => Some(XSD_STRING),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.language.is_none() && self.datatype.is_none()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"")?;
        for c in self.value.chars() {
            match c {
                '"' => write!(f, "\\\"")?,
                '\\' => write!(f, "\\\\")?,
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                c => write!(f, "{}", c)?,
            }
        }
        write!(f, "\"")?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{}>", dt)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankNode {
    id: String,
}

impl BlankNode {
    /// Accepts the identifier with or without its `_:` prefix.
    pub fn new(id: impl Into<String>) -> Result<Self, TermError> {
        let id = id.into();
        let id = match id.strip_prefix("_:") {
            Some(stripped) => stripped.to_string(),
            None => id,
        };
        if id.is_empty() {
            return Err(TermError::EmptyBlankNodeId);
        }
        Ok(BlankNode { id })
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    NamedNode(NamedNode),
    Literal(Literal),
    BlankNode(BlankNode),
}

impl Term {
    pub fn named(uri: impl Into<String>) -> Result<Self, TermError> {
        Ok(Term::NamedNode(NamedNode::new(uri)?))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::new_simple(value))
    }

    pub fn blank(id: impl Into<String>) -> Result<Self, TermError> {
        Ok(Term::BlankNode(BlankNode::new(id)?))
    }

    /// The lexical content of the term: URI, literal value or blank node id.
    pub fn value(&self) -> &str {
        match self {
            Term::NamedNode(n) => n.as_str(),
            Term::Literal(l) => l.value(),
            Term::BlankNode(b) => b.as_str(),
        }
    }

    pub fn as_named_node(&self) -> Option<&NamedNode> {
        match self {
            Term::NamedNode(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(n) => n.fmt(f),
            Term::Literal(l) => l.fmt(f),
            Term::BlankNode(b) => b.fmt(f),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

/// A triple scoped to a graph. `graph == None` is the default graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    pub subject: Term,
    pub predicate: NamedNode,
    pub object: Term,
    pub graph: Option<Term>,
}

impl Quad {
    pub fn new(
        subject: impl Into<Term>,
        predicate: NamedNode,
        object: impl Into<Term>,
        graph: Option<Term>,
    ) -> Result<Self, TermError> {
        if let Some(Term::Literal(l)) = &graph {
            return Err(TermError::InvalidGraphName(l.to_string()));
        }
        Ok(Quad {
            subject: subject.into(),
            predicate,
            object: object.into(),
            graph,
        })
    }

    /// Builds a quad from plain URIs; the object is a named node.
    pub fn from_uris(
        subject: &str,
        predicate: &str,
        object: &str,
        graph: Option<&str>,
    ) -> Result<Self, TermError> {
        let graph = graph.map(Term::named).transpose()?;
        Quad::new(
            Term::named(subject)?,
            NamedNode::new(predicate)?,
            Term::named(object)?,
            graph,
        )
    }

    pub fn predicate_term(&self) -> Term {
        Term::NamedNode(self.predicate.clone())
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(g) = &self.graph {
            write!(f, " {}", g)?;
        }
        write!(f, " .")
    }
}

impl TryFrom<ox::Term> for Term {
    type Error = TermError;

    fn try_from(term: ox::Term) -> Result<Self, Self::Error> {
        match term {
            ox::Term::NamedNode(n) => Term::named(n.as_str()),
            ox::Term::BlankNode(b) => Term::blank(b.as_str()),
            ox::Term::Literal(l) => {
                let literal = match l.language() {
                    Some(lang) => Literal::new_language_tagged(l.value(), lang)?,
                    None => Literal::new_typed(l.value(), l.datatype().as_str())?,
                };
                Ok(Term::Literal(literal))
            }
            #[allow(unreachable_patterns)]
            other => Err(TermError::Unsupported(other.to_string())),
        }
    }
}

impl TryFrom<ox::Quad> for Quad {
    type Error = TermError;

    fn try_from(quad: ox::Quad) -> Result<Self, Self::Error> {
        let subject = Term::try_from(ox::Term::from(quad.subject))?;
        let predicate = NamedNode::new(quad.predicate.as_str())?;
        let object = Term::try_from(quad.object)?;
        let graph = match quad.graph_name {
            ox::GraphName::NamedNode(n) => Some(Term::named(n.as_str())?),
            ox::GraphName::BlankNode(b) => Some(Term::blank(b.as_str())?),
            ox::GraphName::DefaultGraph => None,
        };
        Ok(Quad {
            subject,
            predicate,
            object,
            graph,
        })
    }
}
