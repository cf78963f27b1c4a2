use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wos_core::format::group_thousands;
use wos_data::{CatalogLoader, builtin_catalog};

/// Validate calculator catalog CSV files and print what they contain.
///
/// The items file has the columns:
/// - calculator: calculator code (e.g. armament, state-of-power)
/// - stage: stage key (stage1, stage2, ...)
/// - id: item id, unique within its stage
/// - label: display label
/// - category: chief, speedup, troops, beast or empty
/// - multiplier: points per unit
/// - levels: name:multiplier pairs joined by | (empty for none)
/// - help: help topic (empty for none)
///
/// The goals file has the columns calculator, stage, name, goal.
#[derive(Parser, Debug)]
#[command(name = "wos-catalog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Items CSV file; the built-in catalog is checked when omitted
    #[arg(short, long)]
    items: Option<PathBuf>,

    /// Goals CSV file
    #[arg(short, long, requires = "items")]
    goals: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let catalog = match &args.items {
        Some(items) => {
            println!("Loading catalog from: {}", items.display());
            CatalogLoader::load_files(items, args.goals.as_deref())
                .with_context(|| format!("Failed to load catalog: {}", items.display()))?
        }
        None => {
            println!("Checking built-in catalog");
            builtin_catalog().context("Built-in catalog is invalid")?
        }
    };

    for kind in catalog.kinds() {
        let Some(definition) = catalog.get(kind) else {
            continue;
        };
        println!("{} ({})", kind.display_name(), kind.code());
        for stage in &definition.stages {
            let goal = if stage.default_goal.is_empty() {
                "no default goal".to_string()
            } else {
                format!("goal {}", stage.default_goal)
            };
            println!("  {} {}: {} items, {}", stage.key, stage.name, stage.items.len(), goal);
            for item in &stage.items {
                println!(
                    "    {:<32} {:>10}{}",
                    item.label,
                    group_thousands(item.base_multiplier),
                    if item.has_levels() { " (levels)" } else { "" }
                );
            }
        }
    }

    println!("Catalog is valid.");

    Ok(())
}
