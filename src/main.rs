// src/main.rs
use anyhow::{Context, Result};
use elb_watcher::{
    config::{self, MetricsConfig},
    health::{HttpLoadBalancerApi, LoadBalancerApi},
    metrics::MetricsRegistry,
    sink::create_sink,
    watcher::{spawn, ElbWatcher, Watcher},
    zones::zone_provider,
};
use hyper::{header, Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("elb_watcher=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    // Own zone is resolved once; failing here is fatal
    let own_zone = zone_provider(&config.zone)?
        .own_zone()
        .await
        .context("Failed to determine own availability zone")?;
    info!("running in AWS zone {}", own_zone);

    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;
    let metrics = metrics_registry.collector();

    if config.metrics.enabled {
        start_metrics_server(&config.metrics, metrics_registry).await?;
    }

    let api: Arc<dyn LoadBalancerApi> = Arc::new(HttpLoadBalancerApi::new(&config.elb_api)?);
    let sink = create_sink(&config.sink);

    // One watcher per service
    let mut handles = Vec::with_capacity(config.services.len());
    for service in &config.services {
        let watcher = ElbWatcher::from_service(service, &own_zone, api.clone(), sink.clone())?
            .with_metrics(metrics.clone());
        info!(service = %watcher.name(), elb = %watcher.config().elb_name, "Starting watcher");
        handles.push(spawn(watcher));
    }

    shutdown_signal().await;

    for handle in &handles {
        handle.stop();
    }

    let results = futures::future::join_all(handles.into_iter().map(|handle| handle.join())).await;
    for result in results {
        if let Err(e) = result {
            error!("Watcher task failed: {}", e);
        }
    }

    info!("All watchers stopped");
    Ok(())
}

async fn start_metrics_server(config: &MetricsConfig, registry: MetricsRegistry) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let registry = Arc::new(registry);
    let metrics_path = Arc::new(config.path.clone());
    let service_path = metrics_path.clone();

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move { Ok::<_, Infallible>(metrics_response(&req, &registry, &path)) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind metrics server on {addr}"))?
        .serve(make_service);

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

fn metrics_response(req: &Request<Body>, registry: &MetricsRegistry, path: &str) -> Response<Body> {
    if req.uri().path() != path {
        return status_response(StatusCode::NOT_FOUND, "Not Found");
    }

    match registry.gather() {
        Ok(metrics) => {
            let mut response = Response::new(Body::from(metrics));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            status_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics")
        }
    }
}

fn status_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
