use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use ifc_scene::export::{export_csv, export_json};
use ifc_scene::loader::load_file;

#[derive(Parser, Debug)]
#[command(name = "ifc-scene")]
#[command(about = "Extract positioned building elements from IFC files")]
#[command(version)]
struct Args {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Export the full scene to JSON (optional output path)
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Export the summary to CSV (optional output path)
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")?.start()?;
    let args = Args::parse();

    let scene = load_file(&args.file)?;

    if let Some(json_path) = &args.json {
        export_json(&scene, json_path)?;
        println!("Exported to JSON: {}", json_path.display());
    }

    if let Some(csv_path) = &args.csv {
        export_csv(&scene, csv_path)?;
        println!("Exported to CSV: {}", csv_path.display());
    }

    if args.json.is_some() || args.csv.is_some() {
        return Ok(());
    }

    if let Some(unit) = &scene.unit {
        println!("Unit: {unit}");
    }
    println!("Elements: {}", scene.total_elements());
    for item in &scene.summary {
        println!("  {:<8} {}", item.kind.label(), item.count);
    }
    for level in &scene.levels {
        println!(
            "Level {:<12} elev {:>10.2}  ({} elements)",
            level.name, level.elevation, level.element_count
        );
    }

    Ok(())
}
