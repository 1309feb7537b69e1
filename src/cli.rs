use clap::Parser;
use iiifman_config::{CacheBackend, CacheOverrides, ClassifierMode, Overrides};
use std::path::PathBuf;

/// IIIF presentation manifest service.
///
/// Every option can also be set in the configuration file or through
/// `IIIFMAN_*` environment variables; options given here take precedence.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file (YAML, TOML or JSON).
    #[arg(short, long, env = "IIIFMAN_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Public base URL of this service.
    #[arg(long)]
    pub service_url: Option<String>,
    /// Where PIDs are classified: `local` (database) or `remote` (TrackSys).
    #[arg(long, value_parser = parse_classifier)]
    pub classifier: Option<ClassifierMode>,
    /// TrackSys base URL.
    #[arg(long)]
    pub tracksys: Option<String>,
    /// Apollo base URL.
    #[arg(long)]
    pub apollo: Option<String>,
    /// Virgo Solr base URL.
    #[arg(long)]
    pub virgo: Option<String>,
    /// IIIF image server base URL.
    #[arg(long)]
    pub iiif: Option<String>,
    #[arg(long)]
    pub database_url: Option<String>,
    /// Manifest template.
    #[arg(long)]
    pub template: Option<PathBuf>,
    /// Manifest cache bucket.
    #[arg(long)]
    pub bucket: Option<String>,
    /// Public root URL of the manifest cache.
    #[arg(long = "rooturl")]
    pub root_url: Option<String>,
    /// Never read or write the manifest cache.
    #[arg(long)]
    pub nocache: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            port: self.port,
            service_url: self.service_url.clone(),
            classifier: self.classifier,
            tracksys_url: self.tracksys.clone(),
            apollo_url: self.apollo.clone(),
            virgo_solr_url: self.virgo.clone(),
            iiif_url: self.iiif.clone(),
            database_url: self.database_url.clone(),
            template: self.template.clone(),
            cache: CacheOverrides {
                backend: self.nocache.then_some(CacheBackend::Disabled),
                bucket: self.bucket.clone(),
                root_url: self.root_url.clone(),
            },
        }
    }
}

fn parse_classifier(value: &str) -> Result<ClassifierMode, String> {
    match value {
        "local" => Ok(ClassifierMode::Local),
        "remote" => Ok(ClassifierMode::Remote),
        other => Err(format!("unknown classifier `{other}`, expected `local` or `remote`")),
    }
}
