use anyhow::{anyhow, Error, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use trustynp::api::{label_resolver, NanopubSession};
use trustynp::config::Config;
use trustynp::label::LabelCache;
use trustynp::metadata::Metadata;
use trustynp::roles::GraphRoles;
use trustynp::term::Term;
use trustynp::trusty::hash_input;

#[derive(Debug, Parser)]
#[command(name = "trustynp")]
#[command(about = "Inspect nanopublications and compute their trusty hashes")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// Offline mode - will not fetch documents or labels from the web
    #[clap(long, short, action, default_value = "false", global = true)]
    offline: bool,
    /// Strict mode - every graph role must be declared exactly once
    #[clap(long, action, default_value = "false", global = true)]
    strict: bool,
    /// Do not look up labels remotely
    #[clap(long, action, default_value = "false", global = true)]
    no_labels: bool,
    /// Network timeout in seconds
    #[clap(long, global = true)]
    timeout: Option<u64>,
    /// JSON configuration file; command line flags override its values
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the version of the trustynp binary
    Version,
    /// Prints the trusty hash of a document
    Hash {
        /// File path or URL of the document
        location: String,
        /// Sort quads before hashing (not compatible with presentation-order hashes)
        #[clap(long, action, default_value = "false")]
        canonical: bool,
    },
    /// Checks a document against the artifact code in its URI
    Verify {
        /// File path or URL of the document
        location: String,
        /// Artifact code or trusty URI to compare against instead of the document URI
        #[clap(long)]
        expected: Option<String>,
        /// Sort quads before hashing
        #[clap(long, action, default_value = "false")]
        canonical: bool,
    },
    /// Prints the head, assertion, provenance and pubinfo graphs
    Roles {
        /// File path or URL of the document
        location: String,
        /// Output JSON instead of text
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
    /// Prints creators, creation date, title and assertion subjects
    Metadata {
        /// File path or URL of the document
        location: String,
        /// Output JSON instead of text
        #[clap(long, action, default_value = "false")]
        json: bool,
        /// Wait for remote label lookups before printing
        #[clap(long, action, default_value = "false")]
        wait: bool,
    },
    /// Resolves a human-readable label for a URI or prefixed name
    Label {
        /// URI or prefixed name (e.g. dct:creator)
        uri: String,
        /// Document whose statements are consulted first
        #[clap(long)]
        location: Option<String>,
    },
    /// Prints the text that is hashed, one line per term
    Dump {
        /// File path or URL of the document
        location: String,
        /// Sort quads as the canonical hash does
        #[clap(long, action, default_value = "false")]
        canonical: bool,
    },
}

impl std::fmt::Display for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Commands::Version => write!(f, "Version"),
            Commands::Hash { .. } => write!(f, "Hash"),
            Commands::Verify { .. } => write!(f, "Verify"),
            Commands::Roles { .. } => write!(f, "Roles"),
            Commands::Metadata { .. } => write!(f, "Metadata"),
            Commands::Label { .. } => write!(f, "Label"),
            Commands::Dump { .. } => write!(f, "Dump"),
        }
    }
}

pub fn run() -> Result<()> {
    trustynp::api::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    trustynp::api::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn execute(cmd: Cli) -> Result<()> {
    // The RUST_LOG env var is set by `init_logging` if TRUSTYNP_LOG is present.
    // CLI flags for verbosity take precedence. If nothing is set, we default to "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let config = build_config(&cmd)?;
    if cmd.verbose || cmd.debug {
        config.print();
    }
    info!("Running command: {}", cmd.command);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_command(cmd.command, config))
}

fn build_config(cmd: &Cli) -> Result<Config> {
    let mut config = match &cmd.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.offline |= cmd.offline;
    config.strict |= cmd.strict;
    if cmd.no_labels {
        config.fetch_labels = false;
    }
    if let Some(timeout) = cmd.timeout {
        config.timeout = timeout;
    }
    match &cmd.command {
        Commands::Hash { canonical, .. }
        | Commands::Verify { canonical, .. }
        | Commands::Dump { canonical, .. } => config.canonical_hash |= *canonical,
        _ => {}
    }
    Ok(config)
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Version => {
            println!("trustynp {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Hash { location, .. } => {
            let session = NanopubSession::open(&location, config).await?;
            println!("{}", session.trusty_hash());
        }
        Commands::Verify {
            location, expected, ..
        } => {
            let session = NanopubSession::open(&location, config).await?;
            let verification = match expected {
                Some(expected) => session.verify_against(&expected),
                None => session.verify(),
            };
            if !verification.is_valid() {
                return Err(anyhow!("{}: {}", location, verification));
            }
            println!("{}", verification);
        }
        Commands::Roles { location, json } => {
            let session = NanopubSession::open(&location, config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(session.roles())?);
            } else {
                print_roles(session.roles(), session.is_nanopublication());
            }
        }
        Commands::Metadata {
            location,
            json,
            wait,
        } => {
            let mut session = NanopubSession::open(&location, config).await?;
            if wait {
                debug!("Waiting for {} label lookups", session.resolver().pending());
                session.wait_for_labels().await;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(session.metadata())?);
            } else {
                print_metadata(&session, session.metadata());
            }
        }
        Commands::Label { uri, location } => {
            let prefixes = config.prefix_map();
            let uri = if uri.contains("://") {
                uri
            } else {
                prefixes.expand(&uri).unwrap_or(uri)
            };
            let label = match location {
                Some(location) => {
                    let session = NanopubSession::open(&location, config).await?;
                    let term = Term::named(uri.as_str())?;
                    session.resolve_label(&term).await
                }
                None => {
                    let resolver = label_resolver(&config, Arc::new(LabelCache::new()));
                    resolver.resolve_uri(&uri).await
                }
            };
            println!("{}", label);
        }
        Commands::Dump { location, .. } => {
            let order = config.hash_order();
            let session = NanopubSession::open(&location, config).await?;
            print!("{}", hash_input(session.store().iter(), order));
        }
    }
    Ok(())
}

fn print_roles(roles: &GraphRoles, complete: bool) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("Nanopublication: {}", show(&roles.nanopub));
    println!("  Head:       {}", show(&roles.head));
    println!("  Assertion:  {}", show(&roles.assertion));
    println!("  Provenance: {}", show(&roles.provenance));
    println!("  Pubinfo:    {}", show(&roles.pubinfo));
    if !complete {
        println!("Not a well-formed nanopublication (missing graph roles)");
    }
}

fn print_metadata(session: &NanopubSession, metadata: &Metadata) {
    if metadata.is_empty() {
        println!("No nanopublication metadata found in {}", session.uri());
        return;
    }
    if let Some(uri) = &metadata.document_uri {
        println!("Document: {}", uri);
    }
    if let Some(title) = &metadata.title {
        println!("Title: {}", title);
    }
    match (&metadata.created, metadata.created_at()) {
        (Some(_), Some(created)) => println!("Created: {}", created.to_rfc3339()),
        (Some(raw), None) => println!("Created: {}", raw),
        _ => {}
    }
    if !metadata.creators.is_empty() {
        println!("Creators:");
        for creator in &metadata.creators {
            println!("  - {}", creator);
        }
    }
    if !metadata.assertion_subjects.is_empty() {
        println!("Assertion subjects:");
        for subject in &metadata.assertion_subjects {
            println!("  - {}", session.shorten(subject));
        }
    }
}
