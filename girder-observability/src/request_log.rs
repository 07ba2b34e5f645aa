use crate::record::{LogField, LogSink};
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, header};
use std::collections::HashSet;
use std::sync::Arc;

/// State for [`request_log`]: the sink records go to, plus the set of
/// request headers that must never be logged.
#[derive(Clone)]
pub struct RequestLogState {
    sink: Arc<dyn LogSink>,
    excluded_headers: Arc<HashSet<String>>,
}

impl RequestLogState {
    /// Header names are folded through the header map's own normalization
    /// (lowercase), so exclusions match however the caller spells them.
    pub fn new(sink: Arc<dyn LogSink>, excluded_headers: &[String]) -> Self {
        let excluded = excluded_headers
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        Self {
            sink,
            excluded_headers: Arc::new(excluded),
        }
    }
}

/// Middleware emitting one structured record per request: request metadata,
/// then the downstream handler's status code and response headers.
///
/// Use with `axum::middleware::from_fn_with_state`. The middleware never
/// alters the response and produces no errors of its own; handler panics
/// propagate to whatever recovery layer sits above.
pub async fn request_log(
    State(state): State<RequestLogState>,
    request: Request,
    next: Next,
) -> Response {
    let mut fields = request_fields(&request, &state.excluded_headers);

    let response = next.run(request).await;

    fields.push(LogField::int(
        "status-code",
        i64::from(response.status().as_u16()),
    ));
    append_headers(&mut fields, "response.header", response.headers(), None);

    state.sink.emit("request log", &fields);
    response
}

fn request_fields(request: &Request, excluded: &HashSet<String>) -> Vec<LogField> {
    let mut fields = Vec::with_capacity(8 + request.headers().len());
    fields.push(LogField::str("method", request.method().as_str()));
    fields.push(LogField::str("host", host(request)));
    fields.push(LogField::str("path", path(request)));
    fields.push(LogField::str("protocol", format!("{:?}", request.version())));
    fields.push(LogField::int(
        "request.content-length",
        content_length(request.headers()),
    ));
    append_headers(&mut fields, "request.header", request.headers(), Some(excluded));
    append_query_params(&mut fields, request);
    fields
}

/// Prefer the matched route template over the literal request path.
fn path(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn host(request: &Request) -> String {
    request
        .headers()
        .get(header::HOST)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

fn content_length(headers: &HeaderMap) -> i64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn append_headers(
    fields: &mut Vec<LogField>,
    prefix: &str,
    headers: &HeaderMap,
    excluded: Option<&HashSet<String>>,
) {
    for name in headers.keys() {
        if excluded.is_some_and(|set| set.contains(name.as_str())) {
            continue;
        }
        let value = headers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();
        fields.push(LogField::str(format!("{prefix}.{name}"), value));
    }
}

fn append_query_params(fields: &mut Vec<LogField>, request: &Request) {
    let Some(query) = request.uri().query() else {
        return;
    };
    let mut params: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match params.iter_mut().find(|(name, _)| *name == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => params.push((key.into_owned(), vec![value.into_owned()])),
        }
    }
    for (key, values) in params {
        fields.push(LogField::str_list(format!("query.{key}"), values));
    }
}
