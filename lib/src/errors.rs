// Domain errors. I/O and parsing failures travel as anyhow::Error instead.

use std::fmt;

#[derive(Debug)]
pub struct OfflineRetrievalError {
    pub file: String,
}

impl fmt::Display for OfflineRetrievalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Refusing to fetch {} in offline mode", self.file)
    }
}

impl std::error::Error for OfflineRetrievalError {}

/// Rejected at term construction; a quad is never built from an invalid term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    EmptyUri,
    EmptyBlankNodeId,
    EmptyLanguage,
    LanguageAndDatatype { language: String, datatype: String },
    InvalidGraphName(String),
    Unsupported(String),
}

impl fmt::Display for TermError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TermError::EmptyUri => write!(f, "named node URI must not be empty"),
            TermError::EmptyBlankNodeId => write!(f, "blank node identifier must not be empty"),
            TermError::EmptyLanguage => write!(f, "literal language tag must not be empty"),
            TermError::LanguageAndDatatype { language, datatype } => write!(
                f,
                "literal cannot have both language tag @{} and datatype <{}>",
                language, datatype
            ),
            TermError::InvalidGraphName(t) => {
                write!(f, "{} cannot be used as a graph name", t)
            }
            TermError::Unsupported(t) => write!(f, "unsupported RDF term {}", t),
        }
    }
}

impl std::error::Error for TermError {}

/// Raised by the strict graph-role policy when a document is not a
/// well-formed nanopublication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    Missing { role: &'static str },
    Ambiguous { role: &'static str, count: usize },
    NotANamedNode { role: &'static str, value: String },
}

impl fmt::Display for RoleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoleError::Missing { role } => write!(f, "no {} graph declared", role),
            RoleError::Ambiguous { role, count } => write!(
                f,
                "expected exactly one {} declaration, found {}",
                role, count
            ),
            RoleError::NotANamedNode { role, value } => {
                write!(f, "{} graph must be a URI, found {}", role, value)
            }
        }
    }
}

impl std::error::Error for RoleError {}
