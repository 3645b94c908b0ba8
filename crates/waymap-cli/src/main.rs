use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use waymap_cli::commands::route::{run_route, RouteCommandArgs};
use waymap_cli::commands::strategies::write_strategies;
use waymap_cli::commands::ways::{run_ways, WaysCommandArgs};
use waymap_cli::logging::{init_logging, LoggingConfig};
use waymap_cli::output::{write_frame, OutputFormat};
use waymap_lib::{
    default_road_tags, ClientConfig, CoordinatorConfig, HttpBackend, LatLon,
    RouteRequestDispatcher, RouteSettings, SearchStrategy, ViewportBounds,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore candidate walking and cycling routes")]
struct Cli {
    /// Base URL of the routing service (overrides WAYMAP_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides WAYMAP_REQUEST_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the road network and print its layers.
    Ways {
        /// Highway tag to request; repeat for several (defaults to the standard road types).
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Include the node overlay.
        #[arg(long)]
        nodes: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Request candidate routes between a start and a goal.
    Route {
        #[arg(long, allow_negative_numbers = true)]
        start_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        start_lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        goal_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        goal_lon: f64,
        /// Target route length in meters.
        #[arg(long, default_value_t = 1000.0)]
        distance: f64,
        /// Number of candidate routes to request.
        #[arg(long, default_value_t = 3)]
        amount: u32,
        /// Search strategy (breadth_first, depth_first, distance_targeted).
        #[arg(long, default_value = "breadth_first")]
        strategy: SearchStrategy,
        /// Also load and render the road network.
        #[arg(long)]
        with_ways: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// List search strategies and the endpoints serving them.
    Strategies,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Cull layers to `min_lat,max_lat,min_lon,max_lon`.
    #[arg(long, value_parser = parse_bounds, allow_hyphen_values = true)]
    bounds: Option<ViewportBounds>,
    /// Cluster nodes when more than this many are in view.
    #[arg(long)]
    cluster_threshold: Option<usize>,
}

impl ViewArgs {
    fn coordinator_config(&self) -> CoordinatorConfig {
        let mut config = CoordinatorConfig::default();
        if let Some(threshold) = self.cluster_threshold {
            config.node_cluster_threshold = threshold;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig::from_env().verbose(cli.verbose));

    let config = client_config(&cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Strategies => write_strategies(&mut out, &config)?,
        Command::Ways { tags, nodes, view } => {
            let dispatcher = dispatcher(config)?;
            let args = WaysCommandArgs {
                tags: if tags.is_empty() {
                    default_road_tags()
                } else {
                    tags
                },
                nodes,
                bounds: view.bounds,
                config: view.coordinator_config(),
            };
            let frame = run_ways(&dispatcher, &args)?;
            write_frame(&mut out, &frame, cli.format)?;
        }
        Command::Route {
            start_lat,
            start_lon,
            goal_lat,
            goal_lon,
            distance,
            amount,
            strategy,
            with_ways,
            view,
        } => {
            let dispatcher = dispatcher(config)?;
            let args = RouteCommandArgs {
                start: LatLon::new(start_lat, start_lon),
                goal: LatLon::new(goal_lat, goal_lon),
                settings: RouteSettings {
                    target_distance: distance,
                    amount,
                    strategy,
                },
                way_tags: with_ways.then(default_road_tags),
                bounds: view.bounds,
                config: view.coordinator_config(),
            };
            let frame = run_route(&dispatcher, &args)?;
            write_frame(&mut out, &frame, cli.format)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid routing client configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn dispatcher(config: ClientConfig) -> Result<RouteRequestDispatcher<HttpBackend>> {
    let backend = HttpBackend::new(config).context("failed to build the HTTP client")?;
    Ok(RouteRequestDispatcher::new(backend))
}

fn parse_bounds(raw: &str) -> std::result::Result<ViewportBounds, String> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("bounds must be four numbers: {e}"))?;
    let [min_lat, max_lat, min_lon, max_lon] = parts[..] else {
        return Err(format!(
            "expected min_lat,max_lat,min_lon,max_lon, got {} values",
            parts.len()
        ));
    };
    ViewportBounds::new(min_lat, max_lat, min_lon, max_lon).map_err(|e| e.to_string())
}
