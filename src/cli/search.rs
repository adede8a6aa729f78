use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use tracing::debug;

use crate::cli::{find_kit, DatabaseArgs, OutputFormat};
use crate::core::profile::StrProfile;
use crate::matching::engine::{BatchOrchestrator, MatchResult, MessageSink, SearchConfig};
use crate::matching::partition::search_partitioned;
use crate::matching::protocol::OutboundMessage;
use crate::parsing::profiles::load_profiles;

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Kit number of the query profile, looked up in the database
    #[arg(long, required_unless_present = "query", conflicts_with = "query")]
    pub query_kit: Option<String>,

    /// File holding the query profile (first profile in the file is used)
    #[arg(long)]
    pub query: Option<PathBuf>,

    /// Maximum genetic distance reported (defaults per panel: 5/25/35/50)
    #[arg(long)]
    pub max_distance: Option<u32>,

    /// Number of matches to show
    #[arg(short = 'n', long, default_value = "150")]
    pub max_matches: usize,

    /// Candidates handed to the engine per batch
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Search partitions in parallel on this many threads
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Logs engine progress instead of collecting it
struct ProgressLog;

impl MessageSink for ProgressLog {
    fn send(&mut self, message: OutboundMessage) {
        if let OutboundMessage::Progress {
            processed_count,
            found_count,
            percent,
        } = message
        {
            debug!(processed_count, found_count, percent, "Search progress");
        }
    }
}

pub fn run(args: SearchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let database = args.db.load(verbose)?;
    let query = resolve_query(&args, &database)?;

    let config = SearchConfig {
        panel_size: args.db.panel,
        max_distance: args
            .max_distance
            .unwrap_or_else(|| args.db.panel.default_max_distance()),
        max_matches: args.max_matches,
        calculation_mode: args.db.mode,
        expected_total: database.len(),
    };

    if verbose {
        eprintln!(
            "Searching {} profiles for kit {} ({} panel, {} mode, max distance {})",
            database.len(),
            query.kit_number,
            config.panel_size,
            config.calculation_mode,
            config.max_distance
        );
    }

    let start = Instant::now();
    let matches = match args.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build thread pool")?;
            pool.install(|| search_partitioned(&query, config, &database, threads))?
        }
        None => search_batched(&query, config, &database, args.batch_size)?,
    };

    if verbose {
        eprintln!(
            "Found {} matches in {:.2?}",
            matches.len(),
            start.elapsed()
        );
    }

    if matches.is_empty() && matches!(format, OutputFormat::Text) {
        eprintln!("No matches within distance {}.", config.max_distance);
        return Ok(());
    }

    match format {
        OutputFormat::Text => print_text_results(&matches),
        OutputFormat::Json => print_json_results(&query, &config, database.len(), &matches)?,
        OutputFormat::Tsv => print_tsv_results(&matches),
    }

    Ok(())
}

/// Drive one engine session over the database in `batch_size` slices
fn search_batched(
    query: &StrProfile,
    config: SearchConfig,
    database: &[StrProfile],
    batch_size: u64,
) -> anyhow::Result<Vec<MatchResult>> {
    let batch_size = usize::try_from(batch_size).unwrap_or(usize::MAX);
    let mut engine = BatchOrchestrator::new();
    let mut sink = ProgressLog;

    engine.init(query.clone(), config, &mut sink)?;
    for batch in database.chunks(batch_size) {
        engine.process_batch(batch, &mut sink)?;
    }
    Ok(engine.finalize(&mut sink)?)
}

fn resolve_query(args: &SearchArgs, database: &[StrProfile]) -> anyhow::Result<StrProfile> {
    if let Some(kit) = &args.query_kit {
        return Ok(find_kit(database, kit)?.clone());
    }

    let path = args
        .query
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Either --query-kit or --query is required"))?;
    let mut profiles = load_profiles(path)?.into_iter();
    let query = profiles
        .next()
        .ok_or_else(|| anyhow::anyhow!("No profile found in {}", path.display()))?;
    if profiles.next().is_some() {
        tracing::warn!(
            "{} holds several profiles; using kit {}",
            path.display(),
            query.kit_number
        );
    }
    Ok(query)
}

fn display_or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn print_text_results(matches: &[MatchResult]) {
    println!(
        "{:>4}  {:<12} {:<24} {:<16} {:<14} {:>3}  {:>8}  {:>7}",
        "#", "Kit", "Name", "Country", "Haplogroup", "GD", "Markers", "Ident%"
    );
    println!("{}", "─".repeat(100));

    for (i, m) in matches.iter().enumerate() {
        println!(
            "{:>4}  {:<12} {:<24} {:<16} {:<14} {:>3}  {:>8}  {:>6.1}%",
            i + 1,
            m.profile.kit_number,
            display_or_dash(m.profile.name.as_deref()),
            display_or_dash(m.profile.country.as_deref()),
            display_or_dash(m.profile.haplogroup.as_deref()),
            m.distance,
            m.compared_markers,
            m.percent_identical,
        );
    }
}

fn print_json_results(
    query: &StrProfile,
    config: &SearchConfig,
    candidates: usize,
    matches: &[MatchResult],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "query": query.kit_number,
        "panel_size": config.panel_size,
        "calculation_mode": config.calculation_mode,
        "max_distance": config.max_distance,
        "max_matches": config.max_matches,
        "candidates": candidates,
        "matches": matches,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(matches: &[MatchResult]) {
    println!(
        "rank\tkit_number\tname\tcountry\thaplogroup\tdistance\tcompared_markers\tidentical_markers\tpercent_identical\thas_all_required_markers"
    );
    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
            i + 1,
            m.profile.kit_number,
            m.profile.name.as_deref().unwrap_or(""),
            m.profile.country.as_deref().unwrap_or(""),
            m.profile.haplogroup.as_deref().unwrap_or(""),
            m.distance,
            m.compared_markers,
            m.identical_markers,
            m.percent_identical,
            m.has_all_required_markers,
        );
    }
}
