//! Command-line front end: check a map's ISOM data, regenerate it, or dump the pattern table.

use std::{fs, path::Path, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use isom_tool::config::ToolConfig;
use isom_tool::containers::{chk::Chk, SectionStore};
use isom_tool::isom::{patterns::describe_patterns, TerrainAnalysis, TilesetContext};
use isom_tool::render::write_overlay;
use isom_tool::report::{fingerprint, write_report, CheckReport};
use isom_tool::tileset::Tileset;
use isom_tool::IsomError;

#[derive(Parser)]
#[command(name = "isom_tool")]
#[command(about = "Validate and regenerate StarCraft terrain ISOM data", long_about = None)]
struct Cli {
    /// Directory containing tileset/<name>.cv5 and tileset/<name>/dddata.bin
    #[arg(long, global = true, default_value = ".")]
    tileset_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a map's ISOM data against its tiles
    Check {
        /// Scenario file (.chk)
        map: PathBuf,
        /// Write a JSON report
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write a PNG overlay of the tile flags
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Overlay pixels per tile
        #[arg(long, default_value = "4")]
        scale: u32,
        /// Skip oxipng on the overlay
        #[arg(long)]
        no_optimise: bool,
    },

    /// Regenerate a map's ISOM data
    Generate {
        /// Scenario file (.chk)
        map: PathBuf,
        /// Output scenario file
        #[arg(short, long)]
        output: PathBuf,
        /// Write a JSON report of the regenerated map
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the transition pattern table
    Patterns,
}

fn load_map(path: &Path) -> Result<Chk, IsomError> {
    let data = fs::read(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;
    Ok(Chk::from_bytes(&data)?)
}

fn load_context(chk: &Chk, config: &ToolConfig) -> Result<TilesetContext, IsomError> {
    let tileset = Tileset::load(&config.tileset_dir, chk.tileset())?;
    Ok(TilesetContext::new(tileset))
}

fn check(
    map: &Path,
    report: Option<&Path>,
    overlay: Option<&Path>,
    config: &ToolConfig,
) -> Result<bool, IsomError> {
    let chk = load_map(map)?;
    let ctx = load_context(&chk, config)?;
    let mut analysis = TerrainAnalysis::new(&ctx);
    let status = analysis.init_isom_data(&chk)?;
    println!("{}", status.summary);

    if let Some(path) = report {
        write_report(&CheckReport::new(map, &chk, &status, &ctx.tables), path)?;
    }
    if let Some(path) = overlay {
        write_overlay(&analysis, path, config)?;
    }
    Ok(status.valid)
}

fn generate(
    map: &Path,
    output: &Path,
    report: Option<&Path>,
    config: &ToolConfig,
) -> Result<bool, IsomError> {
    let mut chk = load_map(map)?;
    let ctx = load_context(&chk, config)?;
    let mut analysis = TerrainAnalysis::new(&ctx);
    let before = analysis.init_isom_data(&chk)?;
    if before.valid {
        log::info!("ISOM data already valid, regenerating anyway");
    }

    let isom = analysis.generate_isom_data(&mut chk)?;
    fs::write(output, chk.to_bytes())?;
    log::info!(
        "Wrote {} (ISOM fingerprint {:016x})",
        output.display(),
        fingerprint(&isom.to_bytes())
    );

    let status = analysis.init_isom_data(&chk)?;
    println!("{}", status.summary);
    if let Some(path) = report {
        write_report(&CheckReport::new(output, &chk, &status, &ctx.tables), path)?;
    }
    Ok(status.valid)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = ToolConfig {
        tileset_dir: cli.tileset_dir,
        ..ToolConfig::default()
    };

    let result = match cli.command {
        Commands::Check {
            map,
            report,
            overlay,
            scale,
            no_optimise,
        } => {
            config.overlay_scale = scale;
            config.optimise_png = !no_optimise;
            check(&map, report.as_deref(), overlay.as_deref(), &config)
        }
        Commands::Generate {
            map,
            output,
            report,
        } => generate(&map, &output, report.as_deref(), &config),
        Commands::Patterns => {
            print!("{}", describe_patterns());
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(2)
        }
    }
}
