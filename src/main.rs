use anyhow::Result;
use clap::Parser;
use electrostatics_common::{DomainConfig, FieldSnapshot, OutputConfig, OutputFormat, Preset, ScenarioConfig};
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

mod grid;
mod simulation;

use simulation::FieldSimulation;

/// Traces electric field lines for a set of point and line charges.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Use a built-in charge arrangement instead of the configured charges.
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Print the built-in presets and exit.
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_presets {
        for preset in Preset::ALL {
            println!("{:<16} {}", preset.name(), preset.description());
        }
        return Ok(());
    }

    info!("Starting Electrostatics Engine...");

    // --- Load Configuration ---
    let mut config = if args.config.exists() {
        ScenarioConfig::load(&args.config)?
    } else if let Some(preset) = args.preset {
        warn!(
            "Config file '{}' not found; running preset '{}' on an 800x600 screen.",
            args.config.display(),
            preset
        );
        ScenarioConfig::from_preset(
            preset,
            Some(DomainConfig { screen_width: 800, screen_height: 600, zoom: 1.0, x_offset: 0.0 }),
        )
    } else {
        anyhow::bail!("Config file '{}' not found and no --preset given.", args.config.display());
    };
    if let Some(preset) = args.preset {
        config.preset = Some(preset);
        config.charges.clear();
    }
    debug!("Scenario: {:#?}", config);

    info!("Using {} Rayon threads.", rayon::current_num_threads());

    let sim = FieldSimulation::new(config)?;
    info!("Scene initialized with {} charges.", sim.charges().len());
    match sim.domain() {
        Some(b) => info!("Tracing domain: x in [{}, {}], y in [{}, {}]", b.xmin, b.xmax, b.ymin, b.ymax),
        None => warn!("No [domain] configured; field lines cannot be traced."),
    }

    let start_time = Instant::now();
    let snapshot = match sim.record_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Error recording snapshot: {}", e);
            anyhow::bail!("Failed to record snapshot.");
        }
    };
    info!("Snapshot computed in {:.3} seconds.", start_time.elapsed().as_secs_f64());

    // --- Save Recorded Data ---
    let output = &sim.config().output;
    if output.save_snapshot {
        save_snapshot(&snapshot, output)?;
    } else {
        info!("Skipping saving snapshot as per config (save_snapshot is false).");
    }

    if output.save_field_lines_csv {
        let filename = format!("{}_field_lines.csv", output.base_filename);
        match csv::Writer::from_path(&filename) {
            Ok(mut writer) => {
                writer.write_record(["line", "x", "y"])?;
                for (i, traced) in snapshot.field_lines.iter().enumerate() {
                    for p in traced.line.points() {
                        writer.write_record(&[i.to_string(), format!("{:.4}", p.x), format!("{:.4}", p.y)])?;
                    }
                }
                writer.flush()?;
                info!("Field lines saved to {}", filename);
            }
            Err(e) => error!("Error saving CSV file '{}': {}", filename, e),
        }
    }

    info!("Done.");
    Ok(())
}

fn save_snapshot(snapshot: &FieldSnapshot, output: &OutputConfig) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            let filename = format!("{}_snapshot.json", output.base_filename);
            let json_string = serde_json::to_string(snapshot)?;
            let mut file = File::create(&filename)
                .map_err(|e| anyhow::anyhow!("Error creating snapshot file '{}': {}", filename, e))?;
            file.write_all(json_string.as_bytes())?;
            info!("Snapshot saved to {} ({} KB)", filename, json_string.len() / 1024);
        }
        OutputFormat::Bincode => {
            let filename = format!("{}_snapshot.bin", output.base_filename);
            let file = File::create(&filename)
                .map_err(|e| anyhow::anyhow!("Error creating snapshot file '{}': {}", filename, e))?;
            bincode::serialize_into(BufWriter::new(file), snapshot)?;
            info!("Snapshot saved to {} (binary format)", filename);
        }
        OutputFormat::Messagepack => {
            let filename = format!("{}_snapshot.msgpack", output.base_filename);
            let file = File::create(&filename)
                .map_err(|e| anyhow::anyhow!("Error creating snapshot file '{}': {}", filename, e))?;
            let mut writer = BufWriter::new(file);
            rmp_serde::encode::write(&mut writer, snapshot)?;
            writer.flush()?;
            info!("Snapshot saved to {} (MessagePack format)", filename);
        }
    }
    Ok(())
}
