//! Quad sources: where the quads of a document come from. The session only
//! sees the [`QuadSource`] trait, so tests and embedders can supply their own.

use crate::fetch::{fetch_rdf, FetchOptions};
use crate::prefixes::PrefixMap;
use crate::term::Quad;
use crate::util::{parse_quads, read_file};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Hash, Clone, Eq, PartialEq, Debug)]
pub enum Location {
    #[serde(rename = "file")]
    File(PathBuf),
    #[serde(rename = "url")]
    Url(String),
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::File(p) => write!(f, "file://{}", p.to_str().unwrap_or_default()),
            Location::Url(u) => write!(f, "{}", u),
        }
    }
}

impl FromStr for Location {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_start_matches('<').trim_end_matches('>');
        if s.is_empty() {
            return Err(anyhow!("Empty location"));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Location::Url(s.to_string()))
        } else {
            // remove any leading file://
            let s = s.trim_start_matches("file://");
            let mut p = PathBuf::from(s);
            if !p.is_absolute() {
                p = std::env::current_dir()?.join(p);
            }
            Ok(Location::File(p))
        }
    }
}

impl Location {
    pub fn as_str(&self) -> &str {
        match self {
            Location::File(p) => p.to_str().unwrap_or_default(),
            Location::Url(u) => u.as_str(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Location::File(_))
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// The location as an IRI; files become `file://` IRIs.
    pub fn to_iri(&self) -> String {
        self.to_string()
    }
}

/// What a source hands back for one document.
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    pub quads: Vec<Quad>,
    pub prefixes: PrefixMap,
    /// IRI the document was actually read from (after redirects).
    pub base: String,
}

#[async_trait]
pub trait QuadSource: Send + Sync {
    async fn load(&self, location: &Location) -> Result<SourceDocument>;
}

#[derive(Debug, Clone, Default)]
pub struct FileQuadSource;

#[async_trait]
impl QuadSource for FileQuadSource {
    async fn load(&self, location: &Location) -> Result<SourceDocument> {
        let path = match location {
            Location::File(path) => path.clone(),
            Location::Url(url) => return Err(anyhow!("Not a file location: {}", url)),
        };
        let (quads, prefixes) = tokio::task::spawn_blocking({
            let path = path.clone();
            move || read_file(&path)
        })
        .await??;
        Ok(SourceDocument {
            quads,
            prefixes,
            base: location.to_iri(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpQuadSource {
    options: FetchOptions,
}

impl HttpQuadSource {
    pub fn new(options: FetchOptions) -> Self {
        HttpQuadSource { options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }
}

#[async_trait]
impl QuadSource for HttpQuadSource {
    async fn load(&self, location: &Location) -> Result<SourceDocument> {
        let url = match location {
            Location::Url(url) => url,
            Location::File(path) => {
                return Err(anyhow!("Not a URL location: {}", path.display()))
            }
        };
        let fetched = fetch_rdf(url, &self.options).await?;
        let format = fetched.format.ok_or_else(|| {
            anyhow!(
                "Unrecognized RDF format from {} (content type {})",
                fetched.final_url,
                fetched.content_type.as_deref().unwrap_or("unknown")
            )
        })?;
        debug!("Parsing {} as {}", fetched.final_url, format);
        let (quads, prefixes) =
            parse_quads(&fetched.bytes, Some(format), Some(&fetched.final_url))?;
        info!("Fetched {} quads from {}", quads.len(), fetched.final_url);
        Ok(SourceDocument {
            quads,
            prefixes,
            base: fetched.final_url,
        })
    }
}

/// Dispatches to the file or HTTP source depending on the location.
#[derive(Debug, Clone, Default)]
pub struct AnySource {
    file: FileQuadSource,
    http: HttpQuadSource,
}

impl AnySource {
    pub fn new(options: FetchOptions) -> Self {
        AnySource {
            file: FileQuadSource,
            http: HttpQuadSource::new(options),
        }
    }
}

#[async_trait]
impl QuadSource for AnySource {
    async fn load(&self, location: &Location) -> Result<SourceDocument> {
        match location {
            Location::File(_) => self.file.load(location).await,
            Location::Url(_) => self.http.load(location).await,
        }
    }
}
