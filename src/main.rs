use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mailgate::{
    AppState, Config, create_app,
    email::create_dispatcher,
    startup_checks::{self, StartupCheckError},
    tenants::TenantRegistry,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Validate the configuration and tenant file, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = Config::read(&cli.config)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // RUST_LOG takes precedence over the CLI flag and the config file.
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.app.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if found {
        info!("Configuration loaded from: {:?}", cli.config);
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
    }

    match cli.command {
        Some(Commands::Check) => check_config(&cli.config, config).await,
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, port, host, quit_after).await,
        None => run_server(config, None, None, None).await,
    }
}

async fn load_and_check(config: &Config) -> Result<TenantRegistry, Box<dyn std::error::Error>> {
    let registry = TenantRegistry::load_from_file(&config.app.tenants_file).await?;

    if let Err(errors) = startup_checks::perform_startup_checks(config, &registry).await {
        for error in &errors {
            tracing::error!("Startup check failed: {}", error);
        }
        if errors.iter().any(StartupCheckError::is_critical) {
            tracing::error!("Critical startup check failed, exiting");
            return Err("Critical startup check failed".into());
        }
        tracing::warn!("Non-critical startup checks failed, continuing");
    }

    Ok(registry)
}

async fn check_config(
    config_path: &std::path::Path,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_and_check(&config).await?;

    println!("Configuration: {:?}", config_path);
    println!("Tenants file: {:?}", config.app.tenants_file);
    println!("Dispatch backend: {}", config.dispatch.provider_name());
    println!("Tenants:");
    for name in registry.names() {
        let Some(tenant) = registry.get(name) else {
            continue;
        };
        println!(
            "  {} <{}> secret={} to={} body={}",
            name,
            tenant.from_address,
            if tenant.requires_secret() { "yes" } else { "no" },
            tenant.fixed_recipient().unwrap_or("(caller)"),
            if tenant.secure_body { "html" } else { "text" },
        );
    }

    Ok(())
}

async fn run_server(
    config: Config,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);
    info!("Tenants file: {:?}", config.app.tenants_file);

    // Any invalid tenant aborts startup before the listener binds.
    let registry = load_and_check(&config).await?;

    let dispatcher = create_dispatcher(&config.dispatch).await?;
    info!("Dispatching through {}", dispatcher.name());

    let app = create_app(
        AppState::new(registry, dispatcher, &config),
        &config.server,
    );

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
