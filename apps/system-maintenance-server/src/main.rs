//! System maintenance server
//!
//! Serves the HTML views and the admin console, applies migrations and
//! creates accounts from the command line.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{AppConfig, DatabaseConfig, LogFormat, LoggingConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use system_maintenance::contract::NewAccount;
use system_maintenance::SystemMaintenanceModule;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "system-maintenance-server", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "SYSMAINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Create a login account, optionally with a SysAdmin profile
    CreateAccount(CreateAccountArgs),
}

#[derive(Debug, Args)]
struct CreateAccountArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "SYSMAINT_PASSWORD")]
    password: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    email: String,
    /// Grant access to the admin console
    #[arg(long)]
    superuser: bool,
    /// Attach a SysAdmin profile so the account can browse records
    #[arg(long)]
    sysadmin: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    let db = connect(&config.database).await?;
    SystemMaintenanceModule::migrate(&db)
        .await
        .context("failed to apply migrations")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db).await,
        Command::Migrate => Ok(()),
        Command::CreateAccount(args) => create_account(config, db, args).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("invalid log level '{}'", logging.level))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
    .context("failed to install tracing subscriber")
}

async fn connect(database: &DatabaseConfig) -> Result<Arc<DatabaseConnection>> {
    let mut options = ConnectOptions::new(database.url.clone());
    options
        .max_connections(database.max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", database.url))?;
    tracing::info!(max_connections = database.max_connections, "database connected");
    Ok(Arc::new(db))
}

async fn serve(config: AppConfig, db: Arc<DatabaseConnection>) -> Result<()> {
    let module = SystemMaintenanceModule::new(config.system_maintenance.clone(), db);
    let app = module.router().layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "system maintenance server listening");

    let shutdown_timeout = config.server.shutdown_timeout;
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::select! {
        result = server => result.context("server failed")?,
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => tracing::warn!("shutdown timeout elapsed, dropping open connections"),
    }
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received");
}

async fn create_account(
    config: AppConfig,
    db: Arc<DatabaseConnection>,
    args: CreateAccountArgs,
) -> Result<()> {
    let module = SystemMaintenanceModule::new(config.system_maintenance, db);
    let service = module.service();

    let account = service
        .create_account(NewAccount {
            username: args.username,
            password: args.password,
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            is_active: true,
            is_superuser: args.superuser,
        })
        .await
        .context("failed to create account")?;
    tracing::info!(account_id = account.id, username = %account.username, "account created");

    if args.sysadmin {
        let admin = service
            .create_sys_admin(account.id)
            .await
            .context("failed to create sys admin profile")?;
        tracing::info!(sys_admin_id = admin.id, "sys admin profile created");
    }
    Ok(())
}
