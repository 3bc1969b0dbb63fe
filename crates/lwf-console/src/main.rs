//! lwf-routes CLI
//!
//! Command-line tool for inspecting a JSON route table.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lwf_console::{generate_url, list_routes, load_router, match_path};
use lwf_router::{ReferenceType, RequestContext, ROUTE_PARAMETER};

/// List, match and generate URLs against a route table.
#[derive(Parser)]
#[command(name = "lwf-routes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route table (JSON).
    #[arg(short, long, env = "LWF_ROUTES", default_value = "routes.json")]
    routes: PathBuf,

    /// Host of the simulated request.
    #[arg(long, default_value = "localhost", global = true)]
    host: String,

    /// Scheme of the simulated request.
    #[arg(long, default_value = "http", global = true)]
    scheme: String,

    /// Prefix the application is mounted on.
    #[arg(long, default_value = "", global = true)]
    base_url: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in matching order.
    List,

    /// Show which route a request would reach.
    Match {
        /// Path info to match.
        path: String,

        /// Request method.
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Role held by the user (repeatable).
        #[arg(long = "role")]
        roles: Vec<String>,
    },

    /// Generate the URL of a named route.
    Generate {
        /// Route name.
        name: String,

        /// Route or query parameter as key=value (repeatable).
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Emit scheme and host.
        #[arg(long, conflicts_with_all = ["network", "relative"])]
        absolute: bool,

        /// Emit `//host/path`.
        #[arg(long, conflicts_with = "relative")]
        network: bool,

        /// Emit a path relative to --from.
        #[arg(long)]
        relative: bool,

        /// Current path, for relative URLs.
        #[arg(long, default_value = "/")]
        from: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = load_router(&cli.routes)?;
    let context = |method: &str, path: &str| {
        RequestContext::new(method, path)
            .with_scheme(&cli.scheme)
            .with_host(cli.host.as_str())
            .with_base_url(cli.base_url.as_str())
    };

    match cli.command {
        Commands::List => {
            for line in list_routes(&router) {
                println!("{line}");
            }
        }

        Commands::Match {
            path,
            method,
            roles,
        } => {
            let matched = match_path(&router, &context(&method, &path), &roles)?;
            info!("Route \"{}\" matches.", matched.route_name());
            for (key, value) in matched.iter() {
                if key != ROUTE_PARAMETER {
                    println!("{key}: {value}");
                }
            }
        }

        Commands::Generate {
            name,
            params,
            absolute,
            network,
            relative,
            from,
        } => {
            let reference_type = if absolute {
                ReferenceType::AbsoluteUrl
            } else if network {
                ReferenceType::NetworkPath
            } else if relative {
                ReferenceType::RelativePath
            } else {
                ReferenceType::AbsolutePath
            };
            let url = generate_url(&router, &context("GET", &from), &name, &params, reference_type)?;
            println!("{url}");
        }
    }

    Ok(())
}
