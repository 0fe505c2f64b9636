use actix_cors::Cors;
use actix_web::{
    middleware::{from_fn, NormalizePath, TrailingSlash},
    web::{Data, ServiceConfig},
    App, HttpServer,
};
use config::Config;
use tracing::level_filters::LevelFilter;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter, FmtSubscriber};

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod message;
pub mod queue;
pub mod service;
pub mod subscription;
pub mod telemetry;
pub mod topic;
pub mod validation;

const LOG_ENV_VAR: &str = "ROWMQ_LOG";

/// Installs the global tracing subscriber: human-readable output in debug
/// builds, JSON lines in release builds.
pub fn init_tracing() -> eyre::Result<()> {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    #[cfg(debug_assertions)]
    FmtSubscriber::builder()
        .pretty()
        .with_env_filter(filter)
        .finish()
        .try_init()?;

    #[cfg(not(debug_assertions))]
    FmtSubscriber::builder()
        .json()
        .with_env_filter(filter)
        .finish()
        .try_init()?;

    Ok(())
}

/// Registers the extractor settings and every route. Expects a
/// `Data<Service>` to be registered on the app.
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.app_data(api::json_config())
        .app_data(api::query_config())
        .app_data(api::path_config())
        .service(api::health::healthz)
        .service(api::service());
}

/// Returns a builder for the HTTP server.
#[bon::builder(finish_fn = start)]
pub async fn run(config: Config) -> eyre::Result<()> {
    let host = config.host().to_owned();
    let port = config.port();
    let shutdown_timeout = config.shutdown_timeout_seconds();

    telemetry::install_exporter(&config)?;

    let service = service::Service::connect_with()
        .config(config)
        .call()
        .await?;

    let data = Data::new(service);

    tracing::info!(%host, port, "starting server");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_header()
            .allow_any_method();

        App::new()
            .wrap(from_fn(telemetry::record_request))
            .wrap(TracingLogger::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(cors)
            .app_data(data.clone())
            .configure(routes)
    })
    .shutdown_timeout(shutdown_timeout)
    .bind((host.as_str(), port))?
    .run()
    .await?;

    tracing::info!("server stopped");

    Ok(())
}

