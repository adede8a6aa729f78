use clap::Args;

use crate::cli::{find_kit, DatabaseArgs, OutputFormat};
use crate::core::panel::{is_multi_copy, MarkerPanel};
use crate::core::profile::StrProfile;
use crate::matching::distance::{compare, marker_difference, DistanceResult};

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// First kit number
    #[arg(required = true)]
    pub kit_a: String,

    /// Second kit number
    #[arg(required = true)]
    pub kit_b: String,

    /// Only list markers that differ (text output)
    #[arg(long)]
    pub differences_only: bool,
}

/// One panel marker as seen from both kits
struct MarkerRow {
    marker: &'static str,
    value_a: Option<String>,
    value_b: Option<String>,
    steps: Option<u32>,
}

pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let database = args.db.load(verbose)?;
    let kit_a = find_kit(&database, &args.kit_a)?;
    let kit_b = find_kit(&database, &args.kit_b)?;

    let result = compare(kit_a, kit_b, args.db.panel, args.db.mode);
    let rows = marker_rows(kit_a, kit_b, &args);

    match format {
        OutputFormat::Text => print_text_comparison(&args, &result, &rows),
        OutputFormat::Json => print_json_comparison(&args, &result, &rows)?,
        OutputFormat::Tsv => print_tsv_comparison(&args, &result),
    }

    Ok(())
}

fn marker_rows(kit_a: &StrProfile, kit_b: &StrProfile, args: &CompareArgs) -> Vec<MarkerRow> {
    MarkerPanel::for_size(args.db.panel)
        .markers()
        .iter()
        .map(|&marker| {
            let value_a = kit_a.marker_value(marker).map(|v| v.into_owned());
            let value_b = kit_b.marker_value(marker).map(|v| v.into_owned());
            let steps = match (&value_a, &value_b) {
                (Some(a), Some(b)) => marker_difference(a, b, marker, args.db.mode),
                _ => None,
            };
            MarkerRow {
                marker,
                value_a,
                value_b,
                steps,
            }
        })
        .collect()
}

fn print_text_comparison(args: &CompareArgs, result: &DistanceResult, rows: &[MarkerRow]) {
    println!("Comparison Results");
    println!("{}", "=".repeat(60));

    println!("\nKit A: {}", args.kit_a);
    println!("Kit B: {}", args.kit_b);
    println!("Panel: {} ({} mode)", args.db.panel, args.db.mode);

    println!("\nGenetic Distance: {}", result.distance);
    println!("  Compared markers: {}", result.compared_markers);
    println!("  Identical markers: {}", result.identical_markers);
    println!("  Identical: {:.1}%", result.percent_identical());
    println!(
        "  Enough markers for a match: {}",
        if result.has_all_required_markers { "yes" } else { "no" }
    );

    println!("\n{:<10} {:>14} {:>14} {:>5}", "Marker", "Kit A", "Kit B", "Diff");
    for row in rows {
        if args.differences_only && row.steps.unwrap_or(0) == 0 {
            continue;
        }
        let marker = if is_multi_copy(row.marker) {
            format!("{}*", row.marker)
        } else {
            row.marker.to_string()
        };
        let steps = row.steps.map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "{:<10} {:>14} {:>14} {:>5}",
            marker,
            row.value_a.as_deref().unwrap_or("-"),
            row.value_b.as_deref().unwrap_or("-"),
            steps
        );
    }
    println!("\n* multi-copy marker");
}

fn print_json_comparison(
    args: &CompareArgs,
    result: &DistanceResult,
    rows: &[MarkerRow],
) -> anyhow::Result<()> {
    let markers: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "marker": row.marker,
                "kit_a": row.value_a,
                "kit_b": row.value_b,
                "steps": row.steps,
            })
        })
        .collect();

    let output = serde_json::json!({
        "kit_a": args.kit_a,
        "kit_b": args.kit_b,
        "panel_size": args.db.panel,
        "calculation_mode": args.db.mode,
        "distance": result.distance,
        "compared_markers": result.compared_markers,
        "identical_markers": result.identical_markers,
        "percent_identical": result.percent_identical(),
        "has_all_required_markers": result.has_all_required_markers,
        "markers": markers,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_comparison(args: &CompareArgs, result: &DistanceResult) {
    println!(
        "kit_a\tkit_b\tpanel_size\tcalculation_mode\tdistance\tcompared_markers\tidentical_markers\tpercent_identical\thas_all_required_markers"
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
        args.kit_a,
        args.kit_b,
        args.db.panel.marker_count(),
        args.db.mode,
        result.distance,
        result.compared_markers,
        result.identical_markers,
        result.percent_identical(),
        result.has_all_required_markers,
    );
}
