//! sweepcad CLI - sweep profiles along paths into triangle meshes
//!
//! Reads a TOML sweep description and writes STL or OBJ.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod export;

use config::SweepConfig;

#[derive(Parser)]
#[command(name = "sweepcad")]
#[command(about = "Sweep 2D profiles along 3D paths into closed meshes", long_about = None)]
struct Cli {
    /// Log generation details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a mesh from a sweep description
    Generate {
        /// Input .toml sweep description
        config: PathBuf,
        /// Output file (format determined by extension: .stl, .obj)
        #[arg(short, long)]
        output: PathBuf,
        /// Override the number of rings along the path
        #[arg(long)]
        sweep_samples: Option<usize>,
        /// Override the number of points per ring
        #[arg(long)]
        profile_samples: Option<usize>,
    },
    /// Display information about a sweep description
    Info {
        /// Input .toml sweep description
        config: PathBuf,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            output,
            sweep_samples,
            profile_samples,
        } => generate(&config, &output, sweep_samples, profile_samples),
        Commands::Info { config, json } => show_info(&config, json),
    }
}

/// Info in debug builds and warn in release, unless `RUST_LOG` says otherwise.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "debug"
    } else if cfg!(debug_assertions) {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn generate(
    input: &Path,
    output: &Path,
    sweep_samples: Option<usize>,
    profile_samples: Option<usize>,
) -> Result<()> {
    let mut config = SweepConfig::load(input)?;
    if let Some(n) = sweep_samples {
        config.samples.sweep_line = n;
    }
    if let Some(n) = profile_samples {
        config.samples.cross_section = n;
    }

    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if ext != "stl" && ext != "obj" {
        bail!("Unknown output format: {}", ext);
    }

    let mesh = config
        .build()?
        .generate()
        .with_context(|| format!("failed to sweep {}", input.display()))?;
    log::info!(
        "generated {} triangles, {} vertices",
        mesh.num_triangles(),
        mesh.num_vertices()
    );

    match ext.as_str() {
        "stl" => fs::write(output, export::stl_bytes(&mesh))?,
        _ => fs::write(output, export::obj_string(&mesh))?,
    }
    println!("Exported {} to {}", ext.to_uppercase(), output.display());
    Ok(())
}

#[derive(Serialize)]
struct Info {
    sweep_line_segments: usize,
    sweep_line_length: f64,
    cross_sections: Vec<ProfileInfo>,
    sweep_line_samples: usize,
    cross_section_samples: usize,
    range: Option<(f64, f64)>,
    mesh: Option<MeshInfo>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ProfileInfo {
    segments: usize,
    position: f64,
    scale: f64,
    angle: f64,
}

#[derive(Serialize)]
struct MeshInfo {
    rings: usize,
    vertices: usize,
    triangles: usize,
    volume: f64,
}

fn show_info(file: &Path, json: bool) -> Result<()> {
    let object = SweepConfig::load(file)?.build()?;
    let samples = object.sample_count();

    let generated = object.rings().and_then(|rings| {
        let mesh = object.generate()?;
        Ok(MeshInfo {
            rings: rings.len(),
            vertices: mesh.num_vertices(),
            triangles: mesh.num_triangles(),
            volume: mesh.signed_volume(),
        })
    });

    let info = Info {
        sweep_line_segments: object.sweep_line().len(),
        sweep_line_length: object.sweep_line().length(),
        cross_sections: object
            .cross_sections()
            .iter()
            .map(|c| ProfileInfo {
                segments: c.len(),
                position: c.position(),
                scale: c.scale(),
                angle: c.angle(),
            })
            .collect(),
        sweep_line_samples: samples.sweep_line,
        cross_section_samples: samples.cross_section,
        range: object.range().map(|r| (r.start, r.end)),
        error: generated.as_ref().err().map(|e| e.to_string()),
        mesh: generated.ok(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("sweep: {}", file.display());
    println!(
        "  Sweep line: {} segment(s), length {:.3}",
        info.sweep_line_segments, info.sweep_line_length
    );
    println!(
        "  Samples: {} along path, {} per profile",
        info.sweep_line_samples, info.cross_section_samples
    );
    if let Some((start, end)) = info.range {
        println!("  Range: {start} .. {end}");
    }

    if !info.cross_sections.is_empty() {
        println!("\nCross-sections:");
        for (i, c) in info.cross_sections.iter().enumerate() {
            println!(
                "  {}: {} segment(s) at {} (scale {}, angle {})",
                i + 1,
                c.segments,
                c.position,
                c.scale,
                c.angle
            );
        }
    }

    match (&info.mesh, &info.error) {
        (Some(mesh), _) => {
            println!("\nMesh stats:");
            println!("  Rings: {}", mesh.rings);
            println!("  Total triangles: {}", mesh.triangles);
            println!("  Total vertices: {}", mesh.vertices);
            println!("  Volume: {:.3}", mesh.volume);
        }
        (None, Some(e)) => println!("\nFailed to generate: {}", e),
        (None, None) => {}
    }

    Ok(())
}
