//! Point d'entrée CLI pour tiger-geojson

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use tiger_geojson::config::AreaType;

// .env: répertoire courant (et parents), sinon à côté du binaire
fn load_env() {
    if dotenvy::dotenv().is_err() {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::ConvertArgs;

/// Convertir les Cartographic Boundary Files du Census en GeoJSON simplifié
#[derive(Parser)]
#[command(name = "tiger-geojson")]
#[command(author, version)]
#[command(about = "Convert Census cartographic boundaries to simplified per-feature GeoJSON (and TopoJSON)")]
struct Cli {
    /// Area type: zipcode, state, region or nation
    area_type: Option<String>,

    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    convert: ConvertArgs,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Type de zone validé avant toute écriture
    let area_type = match cli::parse_area_type(cli.area_type.as_deref()) {
        Ok(area_type) => area_type,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Valid values are {}", AreaType::valid_values());
            std::process::exit(1);
        }
    };

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    info!(area_type = %area_type, "Convert Census boundaries");
    cli::cmd_convert(area_type, &cli.convert)?;

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
