//! Defines the configuration shared by the loader, the label resolver and the
//! hasher. Configs can be built in code through [`Config::builder`] or read
//! from a JSON file.

use crate::fetch::FetchOptions;
use crate::options::{HashOrder, RemoteLabels, RolePolicy};
use crate::prefixes::PrefixMap;
use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Duration;

#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct Config {
    // offline mode (never touches the network; labels fall back to URIs)
    pub offline: bool,
    // enforce exactly one declaration per graph role
    pub strict: bool,
    // sort quads before hashing instead of hashing them as presented
    pub canonical_hash: bool,
    // start background remote lookups for unresolved labels
    pub fetch_labels: bool,
    // network timeout in seconds for documents and label lookups
    pub timeout: u64,
    // extra prefixes used when shortening URIs, on top of the defaults
    pub prefixes: PrefixMap,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            offline: false,
            strict: false,
            canonical_hash: false,
            fetch_labels: true,
            timeout: 30,
            prefixes: PrefixMap::new(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// A config that never performs network access.
    pub fn new_offline() -> Self {
        Config {
            offline: true,
            fetch_labels: false,
            ..Config::default()
        }
    }

    pub fn role_policy(&self) -> RolePolicy {
        self.strict.into()
    }

    pub fn hash_order(&self) -> HashOrder {
        self.canonical_hash.into()
    }

    pub fn remote_labels(&self) -> RemoteLabels {
        (self.fetch_labels && !self.offline).into()
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            offline: self.offline,
            timeout: self.timeout_duration(),
            ..FetchOptions::default()
        }
    }

    /// Default prefixes overlaid with the configured ones.
    pub fn prefix_map(&self) -> PrefixMap {
        let mut map = PrefixMap::with_defaults();
        map.merge(&self.prefixes);
        map
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Prints out the current Config in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Offline: {}", self.offline);
        println!("  Strict: {}", self.strict);
        println!("  Canonical Hash: {}", self.canonical_hash);
        println!("  Fetch Labels: {}", self.fetch_labels);
        println!("  Timeout: {}s", self.timeout);
        if !self.prefixes.is_empty() {
            println!("  Prefixes:");
            for (prefix, namespace) in self.prefixes.iter() {
                println!("    - {}: {}", prefix, namespace);
            }
        }
    }
}
