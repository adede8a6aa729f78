use clap::Args;

use crate::cli::OutputFormat;
use crate::core::panel::{multi_copy_count, MarkerPanel};
use crate::core::types::PanelSize;

#[derive(Args)]
pub struct PanelsArgs {
    /// Show only this panel (12, 37, 67 or 111)
    #[arg(short, long)]
    pub panel: Option<PanelSize>,
}

pub fn run(args: PanelsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let panels: Vec<MarkerPanel> = match args.panel {
        Some(size) => vec![MarkerPanel::for_size(size)],
        None => PanelSize::ALL.into_iter().map(MarkerPanel::for_size).collect(),
    };

    match format {
        OutputFormat::Text => print_text_panels(&panels, verbose || args.panel.is_some()),
        OutputFormat::Json => print_json_panels(&panels)?,
        OutputFormat::Tsv => print_tsv_panels(&panels),
    }

    Ok(())
}

fn print_text_panels(panels: &[MarkerPanel], show_markers: bool) {
    println!(
        "{:<6} {:>8} {:>10} {:>12}",
        "Panel", "Markers", "Loci", "Min. valid"
    );
    println!("{}", "-".repeat(40));
    for panel in panels {
        println!(
            "{:<6} {:>8} {:>10} {:>12}",
            panel.size.to_string(),
            panel.size.marker_count(),
            panel.len(),
            panel.min_valid_markers()
        );
    }

    if show_markers {
        for panel in panels {
            println!("\n{} markers:", panel.size);
            for (i, marker) in panel.markers().iter().enumerate() {
                match multi_copy_count(marker) {
                    Some(copies) => println!("  {:>3}. {marker} ({copies} copies)", i + 1),
                    None => println!("  {:>3}. {marker}", i + 1),
                }
            }
        }
    }
}

fn print_json_panels(panels: &[MarkerPanel]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = panels
        .iter()
        .map(|panel| {
            let markers: Vec<serde_json::Value> = panel
                .markers()
                .iter()
                .map(|&marker| {
                    serde_json::json!({
                        "name": marker,
                        "copies": multi_copy_count(marker).unwrap_or(1),
                    })
                })
                .collect();
            serde_json::json!({
                "panel_size": panel.size,
                "loci": panel.len(),
                "min_valid_markers": panel.min_valid_markers(),
                "default_max_distance": panel.size.default_max_distance(),
                "markers": markers,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_panels(panels: &[MarkerPanel]) {
    println!("panel_size\tposition\tmarker\tcopies");
    for panel in panels {
        for (i, marker) in panel.markers().iter().enumerate() {
            println!(
                "{}\t{}\t{}\t{}",
                panel.size.marker_count(),
                i + 1,
                marker,
                multi_copy_count(marker).unwrap_or(1)
            );
        }
    }
}
