use crate::routes::{self, DemoState};
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use girder_core::{App, Settings};
use girder_http::{AllowList, Client, StatusValidator};
use girder_observability::{MetricsCollector, RequestLogState, TracingSink, request_log};
use girder_server::{Health, Module, Server, ServerHandle, build_router};
use girder_store::{PostgresStore, RedisStore};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let metrics = Arc::new(MetricsCollector::new(settings.metrics.enabled)?);

    let postgres = PostgresStore::connect(&settings.postgres)?;
    let redis = RedisStore::connect(&settings.redis).await?;

    let health = Health::new();
    {
        let store = postgres.clone();
        health.add_readiness_check("postgres", move || {
            let store = store.clone();
            async move { store.ping().await }
        });
    }
    {
        let store = redis.clone();
        health.add_readiness_check("redis", move || {
            let store = store.clone();
            async move { store.ping().await }
        });
    }

    let client = Client::builder()
        .layer(StatusValidator::layer(AllowList::recommended()))
        .build();

    let mut modules = vec![
        health.module(),
        routes::module(DemoState {
            postgres,
            redis,
            client,
        }),
    ];
    if metrics.is_enabled() {
        modules.push(metrics_module(&settings.metrics.path, metrics.clone()));
    }

    let log_state = RequestLogState::new(
        Arc::new(TracingSink),
        &settings.logging.excluded_headers,
    );
    let router = build_router(modules)
        .layer(middleware::from_fn_with_state(log_state, request_log))
        .layer(middleware::from_fn_with_state(metrics, track_requests))
        .layer(CorsLayer::permissive());

    let server_config = settings.server.clone();
    let handle: Arc<Mutex<Option<ServerHandle>>> = Arc::new(Mutex::new(None));
    let start_slot = handle.clone();
    let stop_slot = handle;

    App::new(settings.app.name.clone())
        .lifecycle(
            "http-server",
            move || async move {
                let started = Server::new(server_config, router).start().await?;
                *start_slot.lock().await = Some(started);
                Ok(())
            },
            move || async move {
                if let Some(started) = stop_slot.lock().await.take() {
                    started.shutdown().await?;
                }
                Ok(())
            },
        )
        .run()
        .await
}

fn metrics_module(path: &str, metrics: Arc<MetricsCollector>) -> Module {
    Module::new(path, move |router| {
        router.route(
            "/",
            get(move || {
                let metrics = metrics.clone();
                async move { metrics.render() }
            }),
        )
    })
}

/// Records one counter increment and one duration observation per request,
/// labelled by route template where one matched.
async fn track_requests(
    State(metrics): State<Arc<MetricsCollector>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    metrics.record_request(
        &path,
        &method,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
