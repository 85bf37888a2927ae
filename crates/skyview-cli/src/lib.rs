//! Command line interface

use std::{
    fs::{self, File},
    io,
    path::PathBuf,
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use skyview::{Config, Criteria, Dashboard, Table, WeatherKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use clap;

pub trait Main {
    fn main(self) -> Result<()>;
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print summary statistics of the source and filtered tables
    Summary(Summary),
    /// Write the filtered table as CSV
    Export(Export),
    /// Print the full dashboard view as JSON
    Report(Report),
}

/// Dataset and selection shared by all commands.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Weather CSV file, defaults to the configured dataset
    dataset: Option<PathBuf>,
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Weather kinds to keep, defaults to the configured kinds
    #[arg(short, long, value_delimiter = ',')]
    weather: Option<Vec<WeatherKind>>,
    /// First date to keep (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last date to keep (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct Summary {
    #[command(flatten)]
    filter: FilterArgs,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct Export {
    #[command(flatten)]
    filter: FilterArgs,
    /// Export the unfiltered source table
    #[arg(long)]
    source: bool,
    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Debug, Args)]
pub struct Report {
    #[command(flatten)]
    filter: FilterArgs,
}

impl FilterArgs {
    fn config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Ok(Config::load(path)?),
            None => Ok(Config::default()),
        }
    }

    fn open(&self) -> Result<(Dashboard, Criteria)> {
        let config = self.config()?;
        let path = self
            .dataset
            .as_deref()
            .or_else(|| config.dataset())
            .context("No dataset given and none configured")?;
        let file =
            File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        let table = Table::read_csv(file)
            .with_context(|| format!("Cannot read weather table {}", path.display()))?;
        let dashboard = Dashboard::new(table, &config);
        let weathers = self
            .weather
            .clone()
            .unwrap_or_else(|| config.default_weather().to_vec());
        let criteria = dashboard.criteria(weathers, self.start, self.end)?;
        Ok((dashboard, criteria))
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

impl Main for Cli {
    fn main(self) -> Result<()> {
        init_tracing();
        match self.command {
            Commands::Summary(summary) => summary.main(),
            Commands::Export(export) => export.main(),
            Commands::Report(report) => report.main(),
        }
    }
}

impl Main for Summary {
    fn main(self) -> Result<()> {
        let (dashboard, criteria) = self.filter.open()?;
        let view = dashboard.render(&criteria)?;
        if self.json {
            let json = serde_json::json!({
                "criteria": view.criteria,
                "source": view.source_summary,
                "filtered": view.filtered_summary,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!(
                "Source data ({} rows)\n\n{}",
                dashboard.source().num_rows(),
                view.source_summary
            );
            println!(
                "Filtered data ({} rows, {})\n\n{}",
                view.filtered.num_rows(),
                view.criteria.range,
                view.filtered_summary
            );
        }
        Ok(())
    }
}

impl Main for Export {
    fn main(self) -> Result<()> {
        let (dashboard, criteria) = self.filter.open()?;
        let view = dashboard.render(&criteria)?;
        let download = if self.source {
            view.source_download
        } else {
            view.filtered_download
        };
        fs::create_dir_all(&self.output)
            .with_context(|| format!("Cannot create {}", self.output.display()))?;
        let path = self.output.join(download.file_name());
        fs::write(&path, download.artifact().bytes())
            .with_context(|| format!("Cannot write {}", path.display()))?;
        info!(
            path = %path.display(),
            bytes = download.artifact().byte_length(),
            "Exported CSV"
        );
        println!(
            "{} ({})",
            path.display(),
            download.artifact().human_size()
        );
        Ok(())
    }
}

impl Main for Report {
    fn main(self) -> Result<()> {
        let (dashboard, criteria) = self.filter.open()?;
        let view = dashboard.render(&criteria)?;
        println!("{}", serde_json::to_string_pretty(&view)?);
        Ok(())
    }
}
