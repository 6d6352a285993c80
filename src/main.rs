use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use probe_catalog::catalog::{self, CatalogEntry};
use probe_catalog::config::{self, ScanConfig, DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_PORT};
use probe_catalog::embedded;
use probe_catalog::logging;
use probe_catalog::report::{self, ScanReport, DEFAULT_MAX_TH};
use probe_catalog::request::RequestTemplate;
use probe_catalog::strength::{color_for_failure_rate, grade_for_failure_rate, strength};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Browse LLM vendor request templates and grade scan failure rates."
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "warn",
        help = "Log level (error, warn, info, debug, trace)"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the catalog in display order
    List {
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    /// Print one template by name or index
    Show {
        entry: String,
        #[arg(long, help = "Origin substituted into self-hosted templates")]
        base_url: Option<String>,
    },
    /// Parse a request template and describe it
    Inspect(InspectArgs),
    /// Map failure rates to strength, grade and color
    Grade {
        #[arg(required = true, allow_negative_numbers = true)]
        rates: Vec<f64>,
        #[arg(long, help = "Emit one JSON object per rate")]
        json: bool,
    },
    /// Summarise per-module failure rates from a scan
    Report {
        #[arg(long, help = "JSON object mapping module name to failure rate")]
        results: PathBuf,
        #[arg(long, help = "Maximum failure threshold as a fraction")]
        max_th: Option<f64>,
        #[arg(long, help = "Read max_th from this configuration file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
        #[arg(long, help = "Also write the JSON report to this path")]
        output: Option<PathBuf>,
    },
    /// Write a default scan configuration
    Init {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
    /// Print a configuration value by dotted key
    Config {
        key: String,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Print build metadata
    Info,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[arg(long, help = "Path to a request template file")]
    template: Option<PathBuf>,
    #[arg(long, help = "Use general.llmSpec from this configuration file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Catalog entry name or index")]
    entry: Option<String>,
    #[arg(long, help = "Origin substituted into self-hosted templates")]
    base_url: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Command::List { json } => list(json),
        Command::Show { entry, base_url } => {
            let entry = resolve_entry(&entry)?;
            print!("{}", entry.render_for(&base_url.unwrap_or_else(default_base_url)));
            Ok(())
        }
        Command::Inspect(args) => inspect(args),
        Command::Grade { rates, json } => {
            grade(&rates, json);
            Ok(())
        }
        Command::Report {
            results,
            max_th,
            config,
            json,
            output,
        } => run_report(&results, max_th, config.as_deref(), json, output.as_deref()),
        Command::Init {
            host,
            port,
            output,
            force,
        } => init(&host, port, &output, force),
        Command::Config { key, config: path } => {
            let document = config::load_value(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let value = config::require(&document, &key)?;
            match value.as_str() {
                Some(text) => println!("{}", text),
                None => println!("{}", value),
            }
            Ok(())
        }
        Command::Info => {
            println!("{}", embedded::build_info_json());
            Ok(())
        }
    }
}

fn default_base_url() -> String {
    format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT)
}

fn resolve_entry(key: &str) -> Result<&'static CatalogEntry> {
    let found = match key.parse::<usize>() {
        Ok(index) => catalog::get(index),
        Err(_) => catalog::find(key),
    };
    found.with_context(|| format!("no catalog entry named '{}'", key))
}

fn list(json: bool) -> Result<()> {
    let entries = catalog::entries();
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    let width = entries
        .iter()
        .map(|entry| entry.name().chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());
    println!(
        "{:>2}  {:<width$}  {:>7}  {:<8}  Notes",
        "#", "Name", "Prompts", "Modality"
    );
    for (index, entry) in entries.iter().enumerate() {
        let descriptor = &entry.descriptor;
        println!(
            "{:>2}  {:<width$}  {:>7}  {:<8}  {}",
            index,
            descriptor.name,
            descriptor.prompts,
            descriptor.modality.map(|m| m.as_str()).unwrap_or("-"),
            descriptor.custom_instructions.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let template = if let Some(path) = &args.template {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        RequestTemplate::parse(&text)
            .with_context(|| format!("{} is not a valid request template", path.display()))?
    } else if let Some(path) = &args.config {
        ScanConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?
            .request_template()?
    } else if let Some(key) = &args.entry {
        let base_url = args.base_url.clone().unwrap_or_else(default_base_url);
        resolve_entry(key)?.request(&base_url)?
    } else {
        bail!("one of --template, --config or --entry is required");
    };

    let view = json!({
        "method": template.method,
        "url": template.url,
        "headers": template.headers,
        "modality": template.modality(),
        "has_image": template.has_image,
        "has_audio": template.has_audio,
        "has_files": template.has_files,
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn grade(rates: &[f64], json: bool) {
    for &rate in rates {
        let grade = grade_for_failure_rate(rate);
        let color = color_for_failure_rate(rate);
        if json {
            let row = json!({
                "failure_rate": rate,
                "strength": strength(rate),
                "grade": grade,
                "color": color,
            });
            println!("{}", row);
        } else {
            println!(
                "failure_rate={} strength={} grade={} color={}",
                rate,
                strength(rate),
                grade,
                color
            );
        }
    }
}

fn run_report(
    results: &Path,
    max_th: Option<f64>,
    config: Option<&Path>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let max_th = match (max_th, config) {
        (Some(value), _) => value,
        (None, Some(path)) => {
            ScanConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?
                .general
                .max_th
        }
        (None, None) => DEFAULT_MAX_TH,
    };

    let rows = report::load_results(results)
        .with_context(|| format!("failed to load results from {}", results.display()))?;
    let summary =
        ScanReport::build(rows, max_th).context("failed to build the scan report")?;

    if let Some(path) = output {
        report::save_report(path, &summary)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
    }
    Ok(())
}

fn init(host: &str, port: u16, output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            output.display()
        );
    }
    std::fs::write(output, config::default_config_toml(host, port))
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("default configuration written to {}", output.display());
    println!("Wrote {}", output.display());
    Ok(())
}
