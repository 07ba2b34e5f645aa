use crate::router::Module;
use axum::Json;
use axum::routing::get;
use http::StatusCode;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

type CheckFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
type CheckFn = Box<dyn Fn() -> CheckFuture + Send + Sync>;

/// Registry of named readiness checks.
///
/// Liveness is unconditional — the process answering at all is the check.
/// Readiness runs every registered check; one failure makes the whole
/// service not-ready. Clones share the registry, so components can keep
/// registering checks after the routes are mounted.
#[derive(Clone, Default)]
pub struct Health {
    checks: Arc<RwLock<Vec<(String, CheckFn)>>>,
}

impl Health {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_readiness_check<F, Fut>(&self, name: impl Into<String>, check: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        self.checks
            .write()
            .expect("health check registry poisoned")
            .push((name.into(), Box::new(move || Box::pin(check()))));
    }

    /// Run all checks; per-check outcome keyed by name.
    pub async fn run_checks(&self) -> BTreeMap<String, Result<(), String>> {
        let pending: Vec<(String, CheckFuture)> = {
            let checks = self.checks.read().expect("health check registry poisoned");
            checks.iter().map(|(name, f)| (name.clone(), f())).collect()
        };
        let mut results = BTreeMap::new();
        for (name, fut) in pending {
            results.insert(name, fut.await);
        }
        results
    }

    async fn ready_response(self) -> (StatusCode, Json<BTreeMap<String, String>>) {
        let results = self.run_checks().await;
        let mut status = StatusCode::OK;
        let mut body = BTreeMap::new();
        for (name, result) in results {
            match result {
                Ok(()) => {
                    body.insert(name, "OK".to_string());
                }
                Err(detail) => {
                    status = StatusCode::SERVICE_UNAVAILABLE;
                    body.insert(name, detail);
                }
            }
        }
        (status, Json(body))
    }

    /// The `/live` + `/ready` routes as a mountable [`Module`].
    pub fn module(&self) -> Module {
        let health = self.clone();
        Module::new("health", move |router| {
            router
                .route(
                    "/live",
                    get(|| async { (StatusCode::OK, Json(BTreeMap::<String, String>::new())) }),
                )
                .route(
                    "/ready",
                    get(move || {
                        let health = health.clone();
                        health.ready_response()
                    }),
                )
        })
    }
}
