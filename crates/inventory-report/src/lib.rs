//! Network topology inventory report.
//!
//! Fetches sites and six device collections from an [`InventorySource`],
//! links them into a hierarchy and flattens that hierarchy into an 8-column
//! table in depth-first order. See [`ReportSession`] for the run lifecycle.

mod error;
mod flatten;
mod index;
mod order;
pub mod prelude;
mod report;
mod resolve;
mod session;
pub mod source;
mod store;

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use report_config::{ReportConfig, ServiceConfig};

use crate::prelude::{
    InventorySource, OutputFormat, RemoteSource, ReportDescriptor, ReportError, ReportSession,
    SnapshotSource,
};

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Directory holding one `<collection>.yaml` file per collection
    #[clap(short, long, conflicts_with = "url")]
    pub snapshot: Option<PathBuf>,
    /// Base URL of the inventory service
    #[clap(short, long)]
    pub url: Option<String>,
    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Where a run reads its inventory from.
#[derive(Debug, Clone)]
pub enum SourceSelection {
    Snapshot(PathBuf),
    Remote(ServiceConfig),
}

impl SourceSelection {
    /// Command line flags win over the config file. Within the config file a
    /// snapshot wins over the service.
    pub fn choose(args: &ReportArgs, config: &ReportConfig) -> Result<Self, ReportError> {
        if let Some(path) = &args.snapshot {
            return Ok(SourceSelection::Snapshot(path.clone()));
        }
        if let Some(url) = &args.url {
            let service = match &config.service {
                Some(service) => ServiceConfig {
                    url: url.clone(),
                    ..service.clone()
                },
                None => ServiceConfig::new(url.clone()),
            };
            return Ok(SourceSelection::Remote(service));
        }
        if let Some(snapshot) = &config.snapshot {
            return Ok(SourceSelection::Snapshot(snapshot.path.clone()));
        }
        if let Some(service) = &config.service {
            return Ok(SourceSelection::Remote(service.clone()));
        }
        Err(ReportError::MissingSource)
    }
}

pub fn descriptor_for(config: &ReportConfig) -> ReportDescriptor {
    match &config.report.display_name {
        Some(name) => ReportDescriptor::default().with_name(name.clone()),
        None => ReportDescriptor::default(),
    }
}

async fn execute_with<S: InventorySource>(
    source: S,
    descriptor: ReportDescriptor,
    format: OutputFormat,
) -> Result<String, ReportError> {
    let mut session = ReportSession::new(source, descriptor);
    session.execute().await?.render(format)
}

/// Runs one report against the selected source and renders it.
pub async fn generate_report(
    args: &ReportArgs,
    config: &ReportConfig,
) -> Result<String, ReportError> {
    let descriptor = descriptor_for(config);

    match SourceSelection::choose(args, config)? {
        SourceSelection::Snapshot(path) => {
            tracing::info!("reading inventory snapshot from {}", path.display());
            execute_with(SnapshotSource::open(&path)?, descriptor, args.format).await
        }
        SourceSelection::Remote(service) => {
            tracing::info!("fetching inventory from {}", service.url);
            execute_with(RemoteSource::connect(&service)?, descriptor, args.format).await
        }
    }
}

pub fn match_and_print(result: Result<String, ReportError>) -> ! {
    match result {
        Ok(output) => {
            println!("{output}");
            std::process::exit(0)
        }
        Err(e) => {
            eprintln!(
                "{}{}",
                "Error encountered: ".red().bold(),
                e.to_string().red()
            );
            std::process::exit(1);
        }
    }
}
