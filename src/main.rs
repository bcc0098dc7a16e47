use clap::{Parser, Subcommand};
use inventory_report::prelude::{ReportArgs, descriptor_for, generate_report, match_and_print};
use report_config::{DEFAULT_CONFIG_PATH, LoggingConfig, ReportConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "topology-report",
    author,
    version,
    about = "Network topology inventory report"
)]
struct Cli {
    /// Path to the YAML config file
    #[clap(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the inventory and print the report
    Run(ReportArgs),

    /// Print the report's id, name and version
    Describe,
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    let subscriber = tracing_subscriber::fmt::fmt()
        .with_max_level(logging.max_level)
        .with_writer(std::io::stderr);

    if let Some(output_file) = &logging.log_file {
        let file = std::fs::File::create(output_file)
            .map_err(|e| format!("couldn't open log file {output_file}: {e}"))?;
        let file = std::sync::Mutex::new(file);

        let subscriber = subscriber.with_writer(file).finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| format!("couldn't set up tracing: {e}"))
    } else {
        let subscriber = subscriber.finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| format!("couldn't set up tracing: {e}"))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match report_config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => match_and_print(Err(e.into())),
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("WARN: {e}, continuing without logs");
    }

    tracing::debug!("tracing has been started");

    match cli.command {
        Command::Run(args) => match_and_print(generate_report(&args, &config).await),
        Command::Describe => describe(&config),
    }
}

fn describe(config: &ReportConfig) {
    let descriptor = descriptor_for(config);
    println!("{} ({})", descriptor.name, descriptor.id);
    println!("version {}", descriptor.version);
    println!("{}", descriptor.description);
}
