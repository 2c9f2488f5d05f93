//! Facilities for retrieving remote RDF documents and JSON records.
//!
//! Nanopublication servers usually answer content negotiation for TriG or
//! N-Quads, but mirrors and generic web servers often do not. The helpers here
//! send a weighted `Accept` header, follow `Link: rel="alternate"` hints, try
//! the well-known `.trig`/`.nq` suffixes and finally sniff the payload.

use crate::errors::OfflineRetrievalError;
use anyhow::{anyhow, Result};
use log::debug;
use oxigraph::io::RdfFormat;
use reqwest::header::{HeaderName, ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, StatusCode};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Options that control how remote resources are fetched.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Fail immediately when `true`; callers use this to guard offline modes.
    pub offline: bool,
    /// Overall network timeout applied to individual HTTP requests.
    pub timeout: Duration,
    /// Ordered list of media types to negotiate, highest priority first.
    pub accept_order: Vec<&'static str>,
    /// Suffixes appended to the source URL when probing alternate locations.
    pub extension_candidates: Vec<&'static str>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        const DEFAULT_ACCEPT: &[&str] = &[
            "application/trig",
            "application/n-quads",
            "application/ld+json",
            "text/turtle",
            "application/rdf+xml",
            "application/n-triples",
        ];
        const DEFAULT_EXTENSION_CANDIDATES: &[&str] = &[".trig", ".nq", ".jsonld", ".ttl"];
        Self {
            offline: false,
            timeout: Duration::from_secs(30),
            accept_order: DEFAULT_ACCEPT.to_vec(),
            extension_candidates: DEFAULT_EXTENSION_CANDIDATES.to_vec(),
        }
    }
}

/// Successful network fetch including bytes and detected format metadata.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub bytes: Vec<u8>,
    pub format: Option<RdfFormat>,
    pub final_url: String,
    pub content_type: Option<String>,
}

fn offline_guard(url: &str, opts: &FetchOptions) -> Result<()> {
    if opts.offline {
        return Err(anyhow!(OfflineRetrievalError {
            file: url.to_string()
        }));
    }
    Ok(())
}

pub(crate) fn client(opts: &FetchOptions) -> Result<Client> {
    Ok(Client::builder().timeout(opts.timeout).build()?)
}

fn detect_format(ct: &str) -> Option<RdfFormat> {
    // strip parameters such as "; charset=utf-8"
    let media = ct.split(';').next().unwrap_or(ct);
    RdfFormat::from_media_type(media.trim())
}

/// Builds a weighted `Accept` header string honoring the provided priority order.
fn build_accept(accept_order: &[&'static str]) -> String {
    if accept_order.is_empty() {
        return "*/*".to_string();
    }
    let mut parts = Vec::new();
    let mut q = 1.0f32;
    for t in accept_order {
        parts.push(format!("{t}; q={:.1}", q));
        q = (q - 0.1f32).max(0.1f32);
    }
    parts.push("*/*; q=0.05".to_string());
    parts.join(", ")
}

/// Appends each suffix to the URL path, leaving any fragment out.
fn build_extension_candidates(orig: &str, exts: &[&str]) -> Vec<String> {
    let base = orig.split('#').next().unwrap_or(orig);
    if Path::new(base).extension().is_some() && detect_format_from_url(base).is_some() {
        return vec![];
    }
    exts.iter().map(|e| format!("{base}{e}")).collect()
}

/// Extracts `rel="alternate"` RDF targets from an HTTP `Link` header value.
fn parse_link_alternates(link: &str, accept_order: &[&'static str]) -> Vec<String> {
    let mut out = Vec::new();
    for part in link.split(',') {
        let part = part.trim();
        let lower = part.to_ascii_lowercase();
        if !lower.contains("rel=\"alternate\"") && !lower.contains("rel='alternate'") {
            continue;
        }
        if !accept_order.iter().any(|typ| lower.contains(*typ)) {
            continue;
        }
        if let (Some(start), Some(end)) = (part.find('<'), part.find('>')) {
            if start < end {
                out.push(part[start + 1..end].to_string());
            }
        }
    }
    out
}

fn detect_format_from_url(url: &str) -> Option<RdfFormat> {
    let trimmed = url.split('#').next().unwrap_or(url);
    let path = trimmed.split('?').next().unwrap_or(trimmed);
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(RdfFormat::from_extension)
}

/// Last-resort guess at the RDF serialization by peeking at the payload.
pub(crate) fn sniff_format(bytes: &[u8]) -> Option<RdfFormat> {
    let sample_len = bytes.len().min(4096);
    let sample = String::from_utf8_lossy(&bytes[..sample_len]);
    let trimmed = sample.trim_start();

    if (trimmed.starts_with('{') || trimmed.starts_with('[')) && sample.contains("\"@") {
        return detect_format("application/ld+json");
    }
    if trimmed.starts_with("<?xml") || sample.contains("<rdf:RDF") {
        return Some(RdfFormat::RdfXml);
    }
    if sample.contains("@prefix") || sample.contains("PREFIX ") || sample.contains("@base") {
        // named graph blocks make it TriG; TriG is a superset of Turtle anyway
        return Some(RdfFormat::TriG);
    }
    let first_line = trimmed.lines().next().unwrap_or("");
    if first_line.starts_with('<') || first_line.starts_with("_:") {
        // four terms per statement means N-Quads; N-Quads also accepts triples
        return Some(RdfFormat::NQuads);
    }
    None
}

/// Returns `true` when the response appears to be HTML instead of RDF.
fn looks_like_html(content_type: Option<&str>, bytes: &[u8]) -> bool {
    if let Some(ct) = content_type {
        let lc = ct.to_ascii_lowercase();
        if lc.contains("text/html") || lc.contains("application/xhtml") {
            return true;
        }
    }
    let prefix_len = bytes.len().min(512);
    let lower = String::from_utf8_lossy(&bytes[..prefix_len]).to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<!doctype html")
}

fn build_result(bytes: Vec<u8>, ct: Option<String>, final_url: String) -> FetchResult {
    let format = ct
        .as_deref()
        .and_then(detect_format)
        .or_else(|| detect_format_from_url(&final_url))
        .or_else(|| sniff_format(&bytes));
    FetchResult {
        bytes,
        format,
        final_url,
        content_type: ct,
    }
}

fn resolve_relative(base: &str, candidate: &str) -> String {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return candidate.to_string();
    }
    match Url::parse(base) {
        Ok(base_url) => base_url
            .join(candidate)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| candidate.to_string()),
        Err(_) => candidate.to_string(),
    }
}

struct Response {
    bytes: Vec<u8>,
    content_type: Option<String>,
    link: Option<String>,
    final_url: String,
    status: StatusCode,
}

async fn try_get(url: &str, client: &Client, accept: &str) -> Result<Response> {
    let resp = client.get(url).header(ACCEPT, accept).send().await?;
    let status = resp.status();
    let final_url = resp.url().to_string();
    let header = |name: HeaderName| {
        resp.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
    };
    let content_type = header(CONTENT_TYPE);
    let link = header(LINK);
    let bytes = resp.bytes().await?.to_vec();
    Ok(Response {
        bytes,
        content_type,
        link,
        final_url,
        status,
    })
}

/// Fetches an RDF document from `url`. The strategy is:
///
/// 1. One request with a weighted `Accept` header covering the RDF media types.
/// 2. If that does not yield a recognizable RDF payload, alternates advertised
///    in a `Link` header, then the URL with each well-known suffix appended.
/// 3. The first successful response is returned as a fallback, with whatever
///    format could be sniffed from it.
pub async fn fetch_rdf(url: &str, opts: &FetchOptions) -> Result<FetchResult> {
    offline_guard(url, opts)?;
    let client = client(opts)?;
    let accept = build_accept(&opts.accept_order);

    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(url.to_string());
    let mut visited: HashSet<String> = HashSet::new();
    let mut last_error: Option<anyhow::Error> = None;
    let mut best_success: Option<FetchResult> = None;

    while let Some(candidate) = queue.pop_front() {
        if !visited.insert(candidate.clone()) {
            continue;
        }
        debug!("Fetching RDF from {}", candidate);
        let response = match try_get(&candidate, &client, &accept).await {
            Ok(response) => response,
            Err(err) => {
                debug!("Request to {} failed: {}", candidate, err);
                if last_error.is_none() {
                    last_error = Some(err);
                }
                continue;
            }
        };

        let status = response.status;
        let link = response.link.clone();
        let result = build_result(
            response.bytes,
            response.content_type,
            response.final_url.clone(),
        );
        let is_html = looks_like_html(result.content_type.as_deref(), &result.bytes);

        if status.is_success() {
            if result.format.is_some() && !is_html {
                return Ok(result);
            }
            if best_success.is_none() && !is_html {
                best_success = Some(result.clone());
            }
        } else if last_error.is_none() {
            last_error = Some(anyhow!("{} returned HTTP {}", candidate, status));
        }

        if let Some(link) = link {
            for alt in parse_link_alternates(&link, &opts.accept_order) {
                queue.push_back(resolve_relative(&response.final_url, &alt));
            }
        }
        // only the original URL gets suffix rewrites
        if candidate == url {
            for alt in build_extension_candidates(&response.final_url, &opts.extension_candidates)
            {
                queue.push_back(alt);
            }
        }
    }

    if let Some(success) = best_success {
        return Ok(success);
    }
    Err(last_error.unwrap_or_else(|| anyhow!("Failed to retrieve RDF from {url}")))
}

/// GETs `url` with the given `Accept` header and decodes a JSON body.
pub async fn fetch_json(url: &str, accept: &str, opts: &FetchOptions) -> Result<serde_json::Value> {
    offline_guard(url, opts)?;
    let client = client(opts)?;
    let resp = client.get(url).header(ACCEPT, accept).send().await?;
    if !resp.status().is_success() {
        return Err(anyhow!("{} returned HTTP {}", url, resp.status()));
    }
    Ok(resp.json::<serde_json::Value>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_accept_weights() {
        let accept = build_accept(&["application/trig", "application/n-quads"]);
        assert_eq!(
            accept,
            "application/trig; q=1.0, application/n-quads; q=0.9, */*; q=0.05"
        );
        assert_eq!(build_accept(&[]), "*/*");
    }

    #[test]
    fn test_detect_format_with_parameters() {
        assert_eq!(
            detect_format("application/trig; charset=utf-8"),
            Some(RdfFormat::TriG)
        );
        assert_eq!(detect_format("text/html"), None);
    }

    #[test]
    fn test_extension_candidates() {
        let cands = build_extension_candidates(
            "https://w3id.org/np/RAabc#frag",
            &[".trig", ".nq"],
        );
        assert_eq!(
            cands,
            vec![
                "https://w3id.org/np/RAabc.trig".to_string(),
                "https://w3id.org/np/RAabc.nq".to_string()
            ]
        );
        assert!(build_extension_candidates("https://example.org/doc.trig", &[".trig"]).is_empty());
    }

    #[test]
    fn test_link_alternates() {
        let link = r#"<doc.trig>; rel="alternate"; type="application/trig", <doc.html>; rel="alternate"; type="text/html""#;
        let alts = parse_link_alternates(link, &FetchOptions::default().accept_order);
        assert_eq!(alts, vec!["doc.trig".to_string()]);
        assert_eq!(
            resolve_relative("https://example.org/np/RA1", "doc.trig"),
            "https://example.org/np/doc.trig"
        );
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(
            sniff_format(b"@prefix ex: <http://example.org/> .\nex:g { ex:a ex:b ex:c . }"),
            Some(RdfFormat::TriG)
        );
        assert_eq!(
            sniff_format(b"<http://ex/a> <http://ex/b> <http://ex/c> <http://ex/g> .\n"),
            Some(RdfFormat::NQuads)
        );
        assert_eq!(sniff_format(b"hello"), None);
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html(Some("text/html; charset=utf-8"), b""));
        assert!(looks_like_html(None, b"<!DOCTYPE html><html></html>"));
        assert!(!looks_like_html(Some("application/trig"), b"@prefix"));
    }

    #[tokio::test]
    async fn test_offline_refuses() {
        let opts = FetchOptions {
            offline: true,
            ..FetchOptions::default()
        };
        let err = fetch_rdf("https://example.org/np", &opts).await.unwrap_err();
        assert!(err.downcast_ref::<OfflineRetrievalError>().is_some());
    }
}
