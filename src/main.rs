use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use tripplanner::api::{PointInput, cluster_points};
use tripplanner::clustering::DayOrdering;
use tripplanner::geocoding::{GeocodeOutcome, build_geocoder, resolve_all};
use tripplanner::llm::{ChatCompletionClient, FileItinerary, ItineraryGenerator};
use tripplanner::logging::init_logging;
use tripplanner::models::{PointRole, TripRequest, TripStyle, Waypoint};
use tripplanner::planner::TripPlanner;
use tripplanner::render::{OutputFormat, write_export};
use tripplanner::{TripPlannerConfig, TripPlannerError, VERSION, web};

#[derive(Parser, Debug)]
#[command(
    name = "tripplanner",
    version,
    about = "AI trip planner: generated itineraries, geocoded places and day clustering"
)]
struct Cli {
    /// Config file (default: <config dir>/tripplanner/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging and extra output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a trip plan
    Plan(PlanArgs),
    /// Look up coordinates for place names
    Geocode {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Group known coordinates into days
    Cluster {
        /// JSON array of {name, latitude, longitude}
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        days: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Run the HTTP API
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[arg(long, default_value = "Mumbai, India")]
    origin: String,
    #[arg(long, default_value = "Zurich, Switzerland")]
    destination: String,
    #[arg(short, long)]
    days: Option<u32>,
    #[arg(short, long)]
    travelers: Option<u32>,
    #[arg(short, long, value_enum)]
    style: Option<TripStyle>,
    /// Use a saved itinerary JSON instead of calling the model
    #[arg(long)]
    itinerary: Option<PathBuf>,
    /// Write the itinerary JSON to this file
    #[arg(long)]
    export: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, value_enum)]
    ordering: Option<DayOrdering>,
    /// Scale factor for the first and last point before clustering
    #[arg(long)]
    endpoint_weight: Option<f64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<TripPlannerError>() {
                Some(err) => {
                    eprintln!("❌ {}", err.user_message());
                    if verbose {
                        eprintln!("   Details: {e:#}");
                    }
                }
                None => eprintln!("❌ Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = TripPlannerConfig::load_from_path(cli.config.clone())?;
    init_logging(&config.logging, cli.verbose)?;
    debug!("Configuration loaded");

    match cli.command {
        None => {
            print_overview(&config, cli.config.as_ref(), cli.verbose);
            Ok(())
        }
        Some(Commands::Plan(args)) => plan(&config, args).await,
        Some(Commands::Geocode { names }) => geocode(&config, names).await,
        Some(Commands::Cluster {
            input,
            days,
            seed,
            format,
        }) => cluster(&config, &input, days, seed, format),
        Some(Commands::Serve { port }) => serve(&config, port).await,
    }
}

fn print_overview(config: &TripPlannerConfig, config_path: Option<&PathBuf>, verbose: bool) {
    println!("🌍 TripPlanner v{VERSION}");
    println!("AI trip planning: generated itineraries, geocoded places and day clustering");
    println!();
    println!("Commands:");
    println!("  plan      Generate a trip plan");
    println!("  geocode   Look up coordinates for place names");
    println!("  cluster   Group known coordinates into days");
    println!("  serve     Run the HTTP API");
    println!();
    println!(
        "💡 Set {} (or llm.api_key in the config file) to generate itineraries.",
        config.llm.api_key_env
    );
    println!("   Run 'tripplanner --help' for all options.");

    if verbose {
        let path = config_path
            .cloned()
            .or_else(TripPlannerConfig::get_config_path)
            .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
        println!();
        println!("Using config from: {path}");
        println!("Cache location: {}", config.cache.resolved_location().display());
        println!("Log level: {}", config.logging.level);
    }
}

async fn plan(config: &TripPlannerConfig, args: PlanArgs) -> Result<()> {
    let request = TripRequest {
        origin: args.origin,
        destination: args.destination,
        days: args.days.unwrap_or(config.defaults.days),
        travelers: args.travelers.unwrap_or(config.defaults.travelers),
        style: args.style.unwrap_or(config.defaults.style),
    };
    request.validate()?;

    let mut grouping = config.clustering.grouping_options();
    if let Some(ordering) = args.ordering {
        grouping.ordering = ordering;
    }
    if args.endpoint_weight.is_some() {
        grouping.endpoint_weight = args.endpoint_weight;
    }

    let generator: Box<dyn ItineraryGenerator> = match args.itinerary {
        Some(path) => Box::new(FileItinerary::new(path)),
        None => Box::new(ChatCompletionClient::from_config(&config.llm)?),
    };
    let geocoder = build_geocoder(config)?;

    let planner = TripPlanner::new(generator, geocoder, grouping);
    let plan = planner.plan(request).await?;

    if let Some(path) = &args.export {
        write_export(path, &plan.itinerary)?;
    }

    match args.format {
        OutputFormat::Text => println!("{plan}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    }
    Ok(())
}

async fn geocode(config: &TripPlannerConfig, names: Vec<String>) -> Result<()> {
    let geocoder = build_geocoder(config)?;
    let waypoints = names
        .into_iter()
        .map(|name| Waypoint::new(name, PointRole::Stop))
        .collect();

    for outcome in resolve_all(&geocoder, waypoints).await {
        match outcome {
            GeocodeOutcome::Resolved { waypoint, location } => {
                println!(
                    "📍 {} → {} ({})",
                    waypoint.name,
                    location.format_coordinates(),
                    location.name
                );
            }
            GeocodeOutcome::Unresolved { waypoint, reason } => {
                println!("❌ {}: {}", waypoint.name, reason);
            }
        }
    }
    Ok(())
}

fn cluster(
    config: &TripPlannerConfig,
    input: &Path,
    days: u32,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let points: Vec<PointInput> = serde_json::from_str(&raw).map_err(TripPlannerError::from)?;

    let mut options = config.clustering.grouping_options();
    if let Some(seed) = seed {
        options.seed = seed;
    }

    let rows = cluster_points(points, days, &options)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            for row in &rows {
                println!(
                    "Day {}  {:<30} {:>10.4} {:>11.4}",
                    row.day + 1,
                    row.name,
                    row.latitude,
                    row.longitude
                );
            }
        }
    }
    Ok(())
}

async fn serve(config: &TripPlannerConfig, port: u16) -> Result<()> {
    let generator = ChatCompletionClient::from_config(&config.llm)?;
    let geocoder = build_geocoder(config)?;
    let planner = Arc::new(TripPlanner::new(
        generator,
        geocoder,
        config.clustering.grouping_options(),
    ));
    web::run(planner, port).await
}
