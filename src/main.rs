mod cli;
mod error;
mod server;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::server::AppState;
use clap::Parser;
use exn::ResultExt;
use iiifman_cache::CacheProxy;
use iiifman_config::{CacheBackend, ClassifierMode, Config};
use iiifman_manifest::Renderer;
use iiifman_remote::Remote;
use iiifman_service::{Classifier, Links, LocalClassifier, RecordStore, RemoteClassifier, Service};
use iiifman_storage::BackendHandle;
use iiifman_storage::backend::{LocalBackend, S3Backend};
use iiifman_tracksys::{Database, Repository};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::load(cli.config.as_deref(), &cli.overrides()).or_raise(|| ErrorKind::Config)?);
    tracing::info!(
        target: "iiifman",
        version = env!("CARGO_PKG_VERSION"),
        classifier = ?config.classifier,
        cache = ?config.cache.backend,
        "starting IIIF manifest service"
    );
    let service = build_service(&config).await?;
    let app = server::router(AppState::new(service, config.clone()));

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await.or_raise(|| ErrorKind::Startup("listener"))?;
    tracing::info!(target: "iiifman", port = config.port, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown()).await.or_raise(|| ErrorKind::Serve)?;
    tracing::info!(target: "iiifman", "stopped");
    Ok(())
}

async fn build_service(config: &Config) -> Result<Service> {
    let remote = Arc::new(Remote::from_config(config).or_raise(|| ErrorKind::Startup("HTTP clients"))?);
    let store: Option<Arc<dyn RecordStore>> = match (&config.database_url, config.classifier) {
        (Some(url), ClassifierMode::Local) => {
            let database = Database::connect(url, config.database_max_connections)
                .await
                .or_raise(|| ErrorKind::Startup("record store"))?;
            Some(Arc::new(Repository::from(&database)))
        },
        _ => None,
    };
    let classifier: Arc<dyn Classifier> = match &store {
        Some(store) => Arc::new(LocalClassifier::new(store.clone(), Some(remote.clone()))),
        None => Arc::new(RemoteClassifier::new(remote.clone())),
    };
    let renderer = Renderer::from_file(&config.template).or_raise(|| ErrorKind::Startup("manifest template"))?;
    Ok(Service::new(classifier, remote, store, renderer, cache_proxy(config)?, Links::from(config)))
}

fn cache_proxy(config: &Config) -> Result<CacheProxy> {
    let cache = &config.cache;
    let backend: BackendHandle = match cache.backend {
        CacheBackend::Disabled => return Ok(CacheProxy::disabled()),
        CacheBackend::S3 => Arc::new(
            S3Backend::new(
                "manifests",
                &cache.bucket,
                cache.prefix.clone(),
                &cache.region,
                cache.endpoint.clone(),
                cache.key_id.clone().unwrap_or_default(),
                cache.key_secret.clone().unwrap_or_default(),
            )
            .or_raise(|| ErrorKind::Startup("S3 cache"))?,
        ),
        CacheBackend::Local => {
            let Some(directory) = &cache.directory else {
                exn::bail!(ErrorKind::Config);
            };
            Arc::new(LocalBackend::new("manifests", directory).or_raise(|| ErrorKind::Startup("local cache"))?)
        },
    };
    Ok(CacheProxy::new(backend, &cache.root_url, &cache.bucket))
}

async fn shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "iiifman", error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "iiifman", "shutting down");
}
