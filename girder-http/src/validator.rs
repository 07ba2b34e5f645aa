use crate::error::ClientError;
use crate::transport::Transport;
use async_trait::async_trait;
use reqwest::{Method, Request, Response, StatusCode};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Per-method sets of status codes considered a successful outcome.
///
/// Methods are matched exactly as the caller provides them — no
/// normalization. A method with no entry means "no validation". The table is
/// immutable once handed to a [`StatusValidator`].
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    table: HashMap<Method, HashSet<StatusCode>>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `codes` for `method`. An empty set is dropped — it would
    /// reject every response, so a present entry is always non-empty.
    pub fn allow<I>(mut self, method: Method, codes: I) -> Self
    where
        I: IntoIterator<Item = StatusCode>,
    {
        let set: HashSet<StatusCode> = codes.into_iter().collect();
        if !set.is_empty() {
            self.table.insert(method, set);
        }
        self
    }

    /// The default policy: GET/DELETE/CONNECT/TRACE accept 200/202/204,
    /// HEAD accepts 200/204, POST/PUT/PATCH accept 200/201/202/204.
    pub fn recommended() -> Self {
        let read = [StatusCode::OK, StatusCode::ACCEPTED, StatusCode::NO_CONTENT];
        let write = [
            StatusCode::OK,
            StatusCode::CREATED,
            StatusCode::ACCEPTED,
            StatusCode::NO_CONTENT,
        ];
        Self::new()
            .allow(Method::GET, read)
            .allow(Method::HEAD, [StatusCode::OK, StatusCode::NO_CONTENT])
            .allow(Method::POST, write)
            .allow(Method::PUT, write)
            .allow(Method::PATCH, write)
            .allow(Method::DELETE, read)
            .allow(Method::CONNECT, read)
            .allow(Method::TRACE, read)
    }

    pub fn get(&self, method: &Method) -> Option<&HashSet<StatusCode>> {
        self.table.get(method)
    }
}

/// Transport wrapper enforcing a status-code contract on responses.
///
/// Requests whose method has no allow-list entry pass through untouched.
/// For listed methods, a response outside the set comes back as
/// [`ClientError::DisallowedStatus`] with the response preserved inside the
/// error. The validator performs no retries and never touches the body.
pub struct StatusValidator<T> {
    allowable: AllowList,
    inner: T,
}

impl<T: Transport> StatusValidator<T> {
    pub fn new(allowable: AllowList, inner: T) -> Self {
        Self { allowable, inner }
    }

    /// Wrap with the recommended policy.
    pub fn with_recommended(inner: T) -> Self {
        Self::new(AllowList::recommended(), inner)
    }
}

impl StatusValidator<Arc<dyn Transport>> {
    /// A layer for [`crate::ClientBuilder::layer`].
    pub fn layer(
        allowable: AllowList,
    ) -> impl FnOnce(Arc<dyn Transport>) -> Arc<dyn Transport> {
        move |inner| Arc::new(StatusValidator::new(allowable, inner))
    }
}

#[async_trait]
impl<T: Transport> Transport for StatusValidator<T> {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let Some(allowed) = self.allowable.get(request.method()) else {
            return self.inner.execute(request).await;
        };
        let method = request.method().clone();
        let response = self
            .inner
            .execute(request)
            .await
            .map_err(|e| ClientError::StatusCheck(Box::new(e)))?;
        let status = response.status();
        if allowed.contains(&status) {
            Ok(response)
        } else {
            Err(ClientError::DisallowedStatus {
                status,
                method,
                response: Box::new(response),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    struct CannedTransport(StatusCode);

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, _request: Request) -> Result<Response, ClientError> {
            let inner = http::Response::builder()
                .status(self.0)
                .header("x-origin", "canned")
                .body("hello")
                .unwrap();
            Ok(Response::from(inner))
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn execute(&self, _request: Request) -> Result<Response, ClientError> {
            Err(ClientError::Transport(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))))
        }
    }

    fn request(method: Method) -> Request {
        Request::new(method, Url::parse("http://localhost/items").unwrap())
    }

    // ── Allow-list construction ──────────────────────────────────

    #[test]
    fn recommended_policy_matches_documented_table() {
        let list = AllowList::recommended();
        for method in [
            Method::GET,
            Method::DELETE,
            Method::CONNECT,
            Method::TRACE,
        ] {
            let set = list.get(&method).unwrap();
            assert_eq!(set.len(), 3, "{method} must allow exactly 3 codes");
            assert!(set.contains(&StatusCode::OK));
            assert!(set.contains(&StatusCode::ACCEPTED));
            assert!(set.contains(&StatusCode::NO_CONTENT));
        }
        let head = list.get(&Method::HEAD).unwrap();
        assert_eq!(head.len(), 2);
        assert!(!head.contains(&StatusCode::ACCEPTED), "HEAD omits 202");
        for method in [Method::POST, Method::PUT, Method::PATCH] {
            let set = list.get(&method).unwrap();
            assert_eq!(set.len(), 4, "{method} must allow exactly 4 codes");
            assert!(set.contains(&StatusCode::CREATED));
        }
        assert!(list.get(&Method::OPTIONS).is_none());
    }

    #[test]
    fn empty_code_set_is_dropped() {
        let list = AllowList::new().allow(Method::GET, []);
        assert!(list.get(&Method::GET).is_none());
    }

    // ── Validation ───────────────────────────────────────────────

    #[tokio::test]
    async fn allowed_status_passes_through() {
        let validator =
            StatusValidator::with_recommended(CannedTransport(StatusCode::OK));
        let response = validator.execute(request(Method::GET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn disallowed_status_yields_error_naming_status_and_method() {
        let validator =
            StatusValidator::with_recommended(CannedTransport(StatusCode::NOT_FOUND));
        let err = validator.execute(request(Method::GET)).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert!(msg.contains("GET"), "got: {msg}");
    }

    #[tokio::test]
    async fn disallowed_status_preserves_response_for_cleanup() {
        let validator =
            StatusValidator::with_recommended(CannedTransport(StatusCode::NOT_FOUND));
        let err = validator.execute(request(Method::GET)).await.unwrap_err();
        let response = err.into_response().expect("response must be returned");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-origin"], "canned");
        // The body is still readable.
        assert_eq!(response.text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn unlisted_method_passes_any_status() {
        let custom = Method::from_bytes(b"CUSTOM").unwrap();
        let validator =
            StatusValidator::with_recommended(CannedTransport(StatusCode::BAD_REQUEST));
        let response = validator.execute(request(custom)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn method_match_is_case_sensitive() {
        // A lowercase extension method is distinct from the uppercase entry.
        let get_lower = Method::from_bytes(b"get").unwrap();
        let validator =
            StatusValidator::with_recommended(CannedTransport(StatusCode::IM_A_TEAPOT));
        let response = validator.execute(request(get_lower)).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn transport_failure_is_wrapped_with_check_context() {
        let validator = StatusValidator::with_recommended(FailingTransport);
        let err = validator.execute(request(Method::GET)).await.unwrap_err();
        assert!(matches!(err, ClientError::StatusCheck(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("could not process request to check status"));
        assert!(!msg.contains("acceptable status"));
    }

    #[tokio::test]
    async fn transport_failure_on_unlisted_method_is_returned_unwrapped() {
        let custom = Method::from_bytes(b"CUSTOM").unwrap();
        let validator = StatusValidator::with_recommended(FailingTransport);
        let err = validator.execute(request(custom)).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn per_instance_override_replaces_recommended_policy() {
        let list = AllowList::new().allow(Method::GET, [StatusCode::IM_A_TEAPOT]);
        let validator = StatusValidator::new(list, CannedTransport(StatusCode::IM_A_TEAPOT));
        let response = validator.execute(request(Method::GET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn validators_chain() {
        // Outer validator's GET entry defers nothing: both layers check.
        let inner = StatusValidator::with_recommended(CannedTransport(StatusCode::OK));
        let outer = StatusValidator::new(
            AllowList::new().allow(Method::GET, [StatusCode::OK]),
            inner,
        );
        let response = outer.execute(request(Method::GET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
