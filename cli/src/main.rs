mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{default_config_path, Config};
use kubeforge_orchestrator::{
    networking, parse_operation, ClusterOperation, CredentialStore, HttpBootstrapEngine,
    OperationContext,
};

const DEFAULT_RETRIES: u32 = 3;

#[derive(Parser, Debug)]
#[command(name = "kubeforge")]
#[command(about = "Declarative Kubernetes cluster provisioning", long_about = None)]
struct Args {
    /// Config file path
    #[arg(long, env = "KUBEFORGE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Debug logging, also forwarded to the bootstrap engine
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Default)]
struct EngineArgs {
    /// Bootstrap engine API URL
    #[arg(long, env = "KUBEFORGE_ENGINE_URL")]
    engine_url: Option<String>,

    /// Directory the kubeconfig is written to (defaults to $HOME)
    #[arg(long)]
    credentials_dir: Option<PathBuf>,

    /// Retries for fetching the kubeconfig
    #[arg(long)]
    retries: Option<u32>,
}

impl EngineArgs {
    fn into_config(self) -> Config {
        Config {
            engine_url: self.engine_url,
            credentials_dir: self.credentials_dir,
            retries: self.retries,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the cluster described by a document
    Apply {
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Parse and validate a document without touching infrastructure
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the resolved bootstrap plan as JSON
    Plan {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List the networking plugins that can be requested
    Plugins,
    /// Store engine defaults in the config file
    Configure {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.verbose)?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)?;

    match args.command {
        Command::Apply { file, engine } => {
            let op = load_operation(&file)?;
            op.validate()?;
            info!("Configuration {:?} is valid", file);

            let ctx = operation_context(config.merge(engine.into_config()))?;
            op.run(&ctx, args.verbose).await?;
        }
        Command::Validate { file } => {
            let op = load_operation(&file)?;
            op.validate()?;
            println!("{}: valid {} document", file.display(), op.kind());
        }
        Command::Plan { file } => {
            println!("{}", render_plan(&file, args.verbose)?);
        }
        Command::Plugins => {
            let default = networking::default_plugin();
            for plugin in networking::plugins() {
                let marker = if plugin == default { "*" } else { " " };
                println!(
                    "{} {:<8} {:<16} {}",
                    marker, plugin.name, plugin.default_pod_cidr, plugin.manifest
                );
            }
        }
        Command::Configure { engine } => {
            let updated = config.merge(engine.into_config());
            updated.save(&config_path)?;
            info!("Saved configuration to {:?}", config_path);
        }
    }

    Ok(())
}

fn init_logging(level: &str, verbose: bool) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    // Level orders TRACE as the maximum
    let log_level = if verbose { log_level.max(Level::DEBUG) } else { log_level };

    // stdout carries command output such as the plan JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_operation(file: &Path) -> Result<Box<dyn ClusterOperation>> {
    let raw = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let op = parse_operation(&raw).with_context(|| format!("Failed to load {:?}", file))?;
    Ok(op)
}

fn render_plan(file: &Path, verbose: bool) -> Result<String> {
    let op = load_operation(file)?;
    let plan = op
        .plan(verbose)
        .with_context(|| format!("Failed to plan {:?}", file))?;
    Ok(plan)
}

fn operation_context(config: Config) -> Result<OperationContext> {
    let engine_url = config.engine_url.context(
        "No bootstrap engine configured: pass --engine-url, set KUBEFORGE_ENGINE_URL or run `kubeforge configure`",
    )?;
    let engine = HttpBootstrapEngine::new(&engine_url, config.retries.unwrap_or(DEFAULT_RETRIES))
        .context("Failed to create bootstrap engine client")?;

    let credentials = match config.credentials_dir {
        Some(dir) => CredentialStore::new(dir),
        None => CredentialStore::in_home().context("Failed to locate credentials directory")?,
    };

    Ok(OperationContext::new(Arc::new(engine), credentials).with_cancellation(interrupt_token()))
}

/// First Ctrl-C stops the run before the engine is called; a second one exits.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if token.is_cancelled() {
                std::process::exit(130);
            }
            warn!("Interrupt received; a running bootstrap is not interrupted, press Ctrl-C again to exit");
            token.cancel();
        }
    });

    cancel
}
