//! Définition et implémentation de la commande de conversion

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tiger_geojson::config::{AreaType, OutputConfig, Registry};
use tiger_geojson::pipeline::{self, RunOptions, DEFAULT_QUEUE_DEPTH, DEFAULT_WORKERS};
use tiger_geojson::report::RunReport;

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Also produce TopoJSON through the `topojson` CLI
    #[arg(long)]
    pub topo: bool,

    /// Convert records on a worker pool
    #[arg(short = 'm', long = "multi")]
    pub multi: bool,

    /// Worker pool size (with -m)
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub jobs: usize,

    /// Maximum number of submitted, unfinished records (with -m)
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH)]
    pub queue_depth: usize,

    /// Source file (.shp or .geojson). Default: <data-dir>/<area_type>/<source_file>
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory holding the Census downloads
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// JSON area configuration (défaut : preset Census 2014 embarqué)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// GeoJSON output root (défaut : env TIGER_GEOJSON_DIR / geojson)
    #[arg(long)]
    pub geojson_dir: Option<PathBuf>,

    /// TopoJSON output root (défaut : env TIGER_TOPOJSON_DIR / topojson)
    #[arg(long)]
    pub topojson_dir: Option<PathBuf>,

    /// topojson executable (défaut : env TOPOJSON_BIN / topojson)
    #[arg(long)]
    pub topojson_bin: Option<String>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Valide l'argument positionnel; retourne le diagnostic à afficher sinon
pub fn parse_area_type(arg: Option<&str>) -> Result<AreaType, String> {
    match arg {
        None => Err("Area type not found.".to_string()),
        Some(name) => name
            .parse()
            .map_err(|_| format!("Invalid area type {}.", name)),
    }
}

/// Exécute la conversion d'un type de zone
pub fn cmd_convert(area_type: AreaType, args: &ConvertArgs) -> Result<usize> {
    let registry = match args.config {
        Some(ref path) => Registry::load(path)
            .with_context(|| format!("Failed to load area config {}", path.display()))?,
        None => Registry::builtin()?,
    };

    let mut output = OutputConfig::from_env();
    apply_output_overrides(&mut output, args);

    let input = resolve_input(&registry, area_type, args)?;

    let options = RunOptions {
        emit_companion: args.topo,
        parallel: args.multi,
        workers: args.jobs,
        queue_depth: args.queue_depth,
    };

    info!(
        area_type = %area_type,
        input = %input.display(),
        geojson = %output.geojson_root.display(),
        "Converting"
    );

    println!("=== Convert {} ===", area_type);
    println!("Input: {}", input.display());
    println!("GeoJSON: {}", output.geojson_root.display());
    if options.emit_companion {
        println!(
            "TopoJSON: {} ({})",
            output.topojson_root.display(),
            output.topojson_bin
        );
    }
    if options.parallel {
        println!("Workers: {}", options.workers);
    }

    let mut source =
        cbf::open(&input).with_context(|| format!("Failed to open {}", input.display()))?;

    let mut report = RunReport::new(area_type, &options);
    let started_at = Instant::now();

    // Compté côté lecture: reste juste quand le lot s'arrête sur une erreur
    let read = Cell::new(0);
    let records = source.records().inspect(|record| {
        if record.is_ok() {
            read.set(read.get() + 1);
        }
    });

    let result = pipeline::run(area_type.as_str(), &registry, &output, records, &options);

    report.set_duration(started_at.elapsed());
    match result {
        Ok(count) => report.record_success(count),
        Err(ref e) => report.record_failure(read.get(), e),
    }

    report.display();
    info!("{}", report.summary());
    if let Some(ref path) = args.report {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    let count = result.with_context(|| format!("Conversion of {} failed", area_type))?;
    println!("{}", count);
    Ok(count)
}

fn apply_output_overrides(output: &mut OutputConfig, args: &ConvertArgs) {
    if let Some(ref dir) = args.geojson_dir {
        output.geojson_root = dir.clone();
    }
    if let Some(ref dir) = args.topojson_dir {
        output.topojson_root = dir.clone();
    }
    if let Some(ref bin) = args.topojson_bin {
        output.topojson_bin = bin.clone();
    }
}

/// Fichier source: `--input`, sinon `<data-dir>/<area_type>/<source_file>`
fn resolve_input(registry: &Registry, area_type: AreaType, args: &ConvertArgs) -> Result<PathBuf> {
    if let Some(ref input) = args.input {
        return Ok(input.clone());
    }

    let source_file = &registry.get(area_type).source_file;
    if source_file.is_empty() {
        anyhow::bail!(
            "No source_file configured for {}; pass --input",
            area_type
        );
    }

    Ok(default_input(&args.data_dir, area_type, source_file))
}

fn default_input(data_dir: &Path, area_type: AreaType, source_file: &str) -> PathBuf {
    data_dir.join(area_type.as_str()).join(source_file)
}
