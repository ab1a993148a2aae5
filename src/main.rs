use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;

use route_resilience_analyzer::cluster::metrics::{community_stats, modularity};
use route_resilience_analyzer::data::airports::load_airports;
use route_resilience_analyzer::data::routes::load_routes;
use route_resilience_analyzer::storage::{self, CommunitySummary};
use route_resilience_analyzer::{AnalysisContext, CentralityMetric, Config};

#[derive(Parser, Debug)]
#[clap(
    name = "route-resilience-analyzer",
    about = "Airline route network resilience analysis"
)]
struct Cli {
    /// Path to the airports CSV file
    #[clap(long)]
    airports: String,

    /// Path to the routes CSV file
    #[clap(long)]
    routes: String,

    /// Output directory for results
    #[clap(long, default_value = "resilience_results")]
    output_dir: String,

    /// Airport code to remove (repeatable)
    #[clap(long = "disrupt")]
    disrupt: Vec<String>,

    /// Also remove the N most central airports
    #[clap(long, default_value = "0")]
    auto_top_n: usize,

    /// Centrality metric for --auto-top-n (degree, closeness, betweenness)
    #[clap(long, default_value = "betweenness")]
    centrality: String,

    /// Maximum number of stops for a route to be included
    #[clap(long, default_value = "1")]
    max_stops: u32,

    /// Stop loading after this many routes
    #[clap(long)]
    max_routes: Option<usize>,

    /// Use numeric airport ids instead of IATA/ICAO codes
    #[clap(long)]
    use_ids: bool,

    /// Great-circle interpolation steps for route geometry
    #[clap(long, default_value = "0")]
    gc_steps: u32,

    /// Community detection seed
    #[clap(long, default_value = "42")]
    seed: u64,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Reject bad input before touching any data
    let metric: CentralityMetric = args.centrality.parse()?;

    let config = Config {
        max_stops: args.max_stops,
        max_routes: args.max_routes,
        use_ids: args.use_ids,
        community_seed: args.seed,
        gc_steps: args.gc_steps,
        threads: args.threads,
        ..Config::default()
    };
    config.validate()?;

    let num_threads = if config.threads > 0 {
        config.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting route resilience analysis");
    log::info!("Airports: {}", args.airports);
    log::info!("Routes: {}", args.routes);
    log::info!("Output: {}", args.output_dir);

    // 1. Load data
    let airports = load_airports(&args.airports, config.use_ids)
        .with_context(|| format!("loading airports from {}", args.airports))?;
    let routes = load_routes(&args.routes, &config)
        .with_context(|| format!("loading routes from {}", args.routes))?;

    // 2. Build graph and communities
    let context = AnalysisContext::new(airports, routes, &config)?;
    let health = context.health();
    if health.degraded {
        log::warn!("Community detection degraded to a single group");
    }

    // 3. Simulate the disruption
    let requested: HashSet<String> = args
        .disrupt
        .iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect();
    let result = context.analyze(&requested, args.auto_top_n, metric);

    log::info!("Disrupted: {}", result.disrupted_list.iter().join(", "));
    log::info!(
        "Stranded ({}): {}",
        result.stranded.len(),
        result.stranded.iter().take(20).join(", ")
    );

    // 4. Render and save
    let disrupted: HashSet<String> = result.disrupted_list.iter().cloned().collect();
    let features = context.build_features(&disrupted);

    let communities = CommunitySummary {
        modularity: modularity(context.graph(), context.partition()),
        stats: community_stats(context.graph(), context.communities()),
    };

    storage::save_results(&result, &features, &health, &communities, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
