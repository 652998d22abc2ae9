use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::IngressConfig;
use runtime::{AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use users_info::{UsersInfo, UsersInfoConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const INGRESS_MODULE: &str = "api_ingress";
const USERS_MODULE: &str = "users_info";

/// Users Server - CRUD service for user records
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - CRUD service for user records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the in-memory store regardless of configuration
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; secrets may come from the real environment.
    let dotenv = dotenvy::dotenv();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    if args.mock {
        if let Some(users) = config.module_config_mut(USERS_MODULE).as_object_mut() {
            users.insert("store".into(), serde_json::json!("memory"));
        }
    }

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

fn ingress_config(config: &AppConfig) -> Result<IngressConfig> {
    let mut ingress: IngressConfig = config.module_config(INGRESS_MODULE)?;
    if config.server.timeout_sec > 0 {
        ingress.request_timeout_sec = config.server.timeout_sec;
    }
    Ok(ingress)
}

fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    let raw = format!("{}:{}", config.server.host, config.server.port);
    raw.parse()
        .with_context(|| format!("invalid bind address '{raw}'"))
}

/// Assemble the full HTTP app: users routes, optional OpenAPI document, ingress stack.
fn build_app(users: &UsersInfo, ingress: &IngressConfig) -> Router {
    let mut api = users.register_rest(Router::new());
    if ingress.enable_docs {
        api = api.route(
            "/openapi.json",
            get(|| async { Json(users_info::openapi()) }),
        );
    }
    modkit::ingress::build_router(api, ingress)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let ingress = ingress_config(&config)?;
    let users_cfg: UsersInfoConfig = config.module_config(USERS_MODULE)?;
    let addr = bind_addr(&config)?;

    let users = UsersInfo::init(&users_cfg)
        .await
        .context("failed to initialize users_info")?;
    let app = build_app(&users, &ingress);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, store = ?users_cfg.store, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = modkit::shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handling failed; shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Users Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    ingress_config(&config)?;
    bind_addr(&config)?;
    let users_cfg: UsersInfoConfig = config.module_config(USERS_MODULE)?;
    users_cfg.validate()?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn openapi_is_served_only_when_enabled() {
        let users = UsersInfo::in_memory();

        let enabled = IngressConfig {
            enable_docs: true,
            ..Default::default()
        };
        let resp = build_app(&users, &enabled)
            .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = build_app(&users, &IngressConfig::default())
            .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn users_routes_sit_behind_ingress() {
        let users = UsersInfo::in_memory();
        let resp = build_app(&users, &IngressConfig::default())
            .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[test]
    fn bad_host_is_rejected() {
        let mut config = AppConfig::default();
        config.server.host = "not a host".into();
        assert!(bind_addr(&config).is_err());
    }

    #[test]
    fn server_timeout_overrides_ingress_default() {
        let mut config = AppConfig::default();
        assert_eq!(ingress_config(&config).unwrap().request_timeout_sec, 30);
        config.server.timeout_sec = 5;
        assert_eq!(ingress_config(&config).unwrap().request_timeout_sec, 5);
    }
}
