//! # shelfcast
//!
//! Command-line entry point: forecast one store and print its briefing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sales_forecast::data::DataPreparer;
use sales_forecast::report::{ChatCompletionNarrator, TemplateNarrator};
use sales_forecast::{AppConfig, NarrativeGenerator, Pipeline};
use shelfcast::DEFAULT_CONFIG_PATH;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shelfcast")]
#[command(about = "52-week store sales forecasting", version, long_about = None)]
struct Cli {
    /// Log debug output from the forecasting stages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare, evaluate and forecast one store, then print its briefing
    Forecast {
        /// Raw store sales CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Store identifier
        #[arg(short, long)]
        store: String,

        /// Directory for cleaned data and plots (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Build the briefing from a local template instead of the chat API
        #[arg(long)]
        offline: bool,

        /// Also write the briefing to this file
        #[arg(long)]
        report_out: Option<PathBuf>,

        /// Print the numeric summary as JSON instead of the briefing
        #[arg(long)]
        json: bool,
    },

    /// List the store identifiers present in a dataset
    Stores {
        /// Raw store sales CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Model configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "shelfcast=debug,sales_forecast=debug"
    } else {
        "shelfcast=info,sales_forecast=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn select_narrator(offline: bool, config: &AppConfig) -> Result<Box<dyn NarrativeGenerator>> {
    if offline {
        return Ok(Box::new(TemplateNarrator::new()));
    }

    let chat = ChatCompletionNarrator::from_env(config.reporting_llm.clone())
        .context("narrative service is not configured; pass --offline to use the template")?;
    Ok(Box::new(chat))
}

fn forecast(
    data: PathBuf,
    store: String,
    output: Option<PathBuf>,
    config_path: PathBuf,
    offline: bool,
    report_out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = AppConfig::load_or_default(&config_path);
    if let Some(output) = output {
        config.forecast.output_dir = output;
    }

    let narrator = if json {
        Box::new(TemplateNarrator::new()) as Box<dyn NarrativeGenerator>
    } else {
        select_narrator(offline, &config)?
    };
    let pipeline = Pipeline::new(config.forecast.clone(), narrator)?;

    if json {
        let run = pipeline
            .run_forecast(&data, &store)
            .with_context(|| format!("forecast failed for store {}", store))?;
        println!("{}", serde_json::to_string_pretty(&run.bundle)?);
        return Ok(());
    }

    let output = pipeline
        .run(&data, &store)
        .with_context(|| format!("forecast failed for store {}", store))?;

    if let Some(path) = report_out {
        fs::write(&path, &output.report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report saved");
    }

    println!("{}", output.report);
    println!("Forecast plot: {}", output.run.bundle.forecast_plot_path.display());
    Ok(())
}

fn stores(data: PathBuf, config_path: PathBuf) -> Result<()> {
    let config = AppConfig::load_or_default(&config_path);
    let ids = DataPreparer::new(&config.forecast)
        .entity_ids(&data)
        .with_context(|| format!("failed to read {}", data.display()))?;

    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Forecast {
            data,
            store,
            output,
            config,
            offline,
            report_out,
            json,
        } => forecast(data, store, output, config, offline, report_out, json),
        Commands::Stores { data, config } => stores(data, config),
    }
}
