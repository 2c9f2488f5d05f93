use crate::fetch::sniff_format;
use crate::prefixes::PrefixMap;
use crate::errors::TermError;
use crate::term::{Quad, Term};
use anyhow::{anyhow, Result};
use log::{debug, info};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model as ox;
use std::collections::HashMap;
use std::io::{BufReader, Read};
use std::path::Path;

/// Guesses the serialization of a local file from its extension.
pub fn format_from_path(path: &Path) -> Option<RdfFormat> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    match ext {
        "trig" => Some(RdfFormat::TriG),
        "nq" => Some(RdfFormat::NQuads),
        "ttl" | "n3" => Some(RdfFormat::Turtle),
        "nt" => Some(RdfFormat::NTriples),
        "xml" | "rdf" | "owl" => Some(RdfFormat::RdfXml),
        other => RdfFormat::from_extension(other),
    }
}

/// Gives the blank nodes a parser invents for `[ ]` and collections stable
/// ids (`b0`, `b1`, ...) in document order, so that loading a document twice
/// yields the same quads. Labels written in the document are kept.
struct BlankNodeLabels {
    text: String,
    // parser id -> stable id, `None` when the id is written in the document
    assigned: HashMap<String, Option<String>>,
    next: usize,
}

impl BlankNodeLabels {
    fn new(bytes: &[u8]) -> Self {
        BlankNodeLabels {
            text: String::from_utf8_lossy(bytes).into_owned(),
            assigned: HashMap::new(),
            next: 0,
        }
    }

    fn fresh_label(&mut self) -> String {
        loop {
            let candidate = format!("b{}", self.next);
            self.next += 1;
            let written = self.text.contains(&format!("_:{}", candidate))
                || self.text.contains(&format!("\"{}\"", candidate));
            if !written {
                return candidate;
            }
        }
    }

    fn relabel_term(&mut self, term: Term) -> Result<Term, TermError> {
        let id = match &term {
            Term::BlankNode(b) => b.as_str().to_string(),
            _ => return Ok(term),
        };
        let label = match self.assigned.get(&id) {
            Some(label) => label.clone(),
            None => {
                // written labels survive parsing verbatim; generated ids are random
                let label = if self.text.contains(id.as_str()) {
                    None
                } else {
                    Some(self.fresh_label())
                };
                self.assigned.insert(id, label.clone());
                label
            }
        };
        match label {
            Some(label) => Term::blank(label),
            None => Ok(term),
        }
    }

    fn relabel(&mut self, quad: Quad) -> Result<Quad, TermError> {
        let Quad {
            subject,
            predicate,
            object,
            graph,
        } = quad;
        Ok(Quad {
            subject: self.relabel_term(subject)?,
            predicate,
            object: self.relabel_term(object)?,
            graph: graph.map(|g| self.relabel_term(g)).transpose()?,
        })
    }
}

fn parse_with(
    bytes: &[u8],
    format: RdfFormat,
    base: Option<&str>,
) -> Result<(Vec<Quad>, PrefixMap)> {
    let parser = match base {
        Some(base) => RdfParser::from_format(format)
            .with_base_iri(base)
            .unwrap_or_else(|e| {
                debug!("Ignoring base IRI {}: {}", base, e);
                RdfParser::from_format(format)
            }),
        None => RdfParser::from_format(format),
    };
    let mut labels = BlankNodeLabels::new(bytes);
    let mut reader = parser.for_reader(BufReader::new(bytes));
    let mut quads = Vec::new();
    for quad in &mut reader {
        let quad: ox::Quad = quad?;
        quads.push(labels.relabel(Quad::try_from(quad)?)?);
    }
    let mut prefixes = PrefixMap::new();
    for (prefix, namespace) in reader.prefixes() {
        prefixes.insert(prefix, namespace);
    }
    Ok((quads, prefixes))
}

/// Parses RDF bytes into quads, keeping document order, plus the prefixes the
/// document declares. When `format` is not known, the payload is sniffed and
/// then the quad-capable formats are tried in turn.
pub fn parse_quads(
    bytes: &[u8],
    format: Option<RdfFormat>,
    base: Option<&str>,
) -> Result<(Vec<Quad>, PrefixMap)> {
    if let Some(format) = format.or_else(|| sniff_format(bytes)) {
        return parse_with(bytes, format, base);
    }
    for format in [RdfFormat::TriG, RdfFormat::NQuads, RdfFormat::RdfXml] {
        match parse_with(bytes, format, base) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => debug!("Not parseable as {}: {}", format, e),
        }
    }
    Err(anyhow!("Failed to parse RDF bytes in any supported format"))
}

/// Reads a local RDF file into quads plus the prefixes it declares.
pub fn read_file(file: &Path) -> Result<(Vec<Quad>, PrefixMap)> {
    debug!("Reading file: {}", file.display());
    let mut bytes = Vec::new();
    std::fs::File::open(file)?.read_to_end(&mut bytes)?;
    let base = std::fs::canonicalize(file)
        .ok()
        .map(|p| format!("file://{}", p.display()));
    let (quads, prefixes) = parse_quads(&bytes, format_from_path(file), base.as_deref())?;
    info!("Read {} quads from {}", quads.len(), file.display());
    Ok((quads, prefixes))
}
