use crate::response::Problem;
use axum::Router;
use http::StatusCode;

type ApplyFn = Box<dyn FnOnce(Router) -> Router>;

/// A group of routes mounted under a path prefix.
pub struct Module {
    pub path: String,
    apply: ApplyFn,
}

impl Module {
    pub fn new<F>(path: impl Into<String>, apply: F) -> Self
    where
        F: FnOnce(Router) -> Router + 'static,
    {
        Self {
            path: path.into(),
            apply: Box::new(apply),
        }
    }

    /// The module path with a leading slash.
    pub fn path_prefix(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }
}

/// Compose modules into one router with problem+json fallbacks for
/// unknown routes (404) and known routes hit with the wrong method (405).
pub fn build_router(modules: Vec<Module>) -> Router {
    let mut router = Router::new();
    for module in modules {
        let prefix = module.path_prefix();
        let sub = (module.apply)(Router::new());
        router = match prefix.as_str() {
            "/" => router.merge(sub),
            p => router.nest(p, sub),
        };
    }
    router
        .fallback(|| async { Problem::new(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND") })
        .method_not_allowed_fallback(|| async {
            Problem::new(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED")
        })
}
