use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use torii::config::Compiler;
use torii::dispatch::Loader;
use torii::engine::AxumEngine;
use torii::middleware::{builtin, Manager, Registry};

#[derive(Parser)]
#[command(name = "torii")]
#[command(about = "Configuration-driven API gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile route configuration files into a single manifest
    Compile {
        /// Directory holding the per-domain route documents
        #[arg(long, default_value = "config/routes")]
        config_dir: PathBuf,

        /// Directory the compiled manifest is written into
        #[arg(long, default_value = "build")]
        output_dir: PathBuf,

        /// Global defaults document; silently skipped when absent
        #[arg(long, default_value = "config/global.json")]
        global_config: PathBuf,
    },
    /// Start the gateway from a compiled manifest
    Serve {
        /// Compiled manifest produced by `compile`
        #[arg(long, default_value = "build/routes.json")]
        routes: PathBuf,

        /// Listen address
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Optional canonical middleware ordering document
        #[arg(long)]
        execution_order: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torii=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Commands::Compile {
            config_dir,
            output_dir,
            global_config,
        } => {
            let compiler = Compiler::new(config_dir, output_dir, Some(global_config));
            let output = compiler.compile()?;
            tracing::info!(output = %output.display(), "Routes compiled successfully");
        }
        Commands::Serve {
            routes,
            bind,
            execution_order,
        } => {
            let mut registry = Registry::new();
            builtin::register_defaults(&mut registry);

            let mut manager = Manager::from_registry(&registry);
            if let Some(path) = &execution_order {
                manager.load_execution_order(path)?;
            }

            let mut engine = AxumEngine::new();
            {
                let mut loader = Loader::new(&mut engine, &manager);
                loader.load_from_file(&routes)?;
            }

            engine.serve(&bind).await?;
        }
    }

    Ok(())
}
