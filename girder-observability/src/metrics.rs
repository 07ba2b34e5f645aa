use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Request metrics — all counters are gated behind `enabled`.
///
/// When `enabled = false` no Registry or counters are allocated and every
/// method is a no-op, so disabled metrics cost nothing on the request path.
pub struct MetricsCollector {
    enabled: bool,
    registry: Option<Registry>,
    pub http_requests_total: Option<IntCounterVec>,
    pub http_request_duration: Option<HistogramVec>,
}

impl MetricsCollector {
    /// Create a new collector. When `enabled = false`, everything is None.
    pub fn new(enabled: bool) -> anyhow::Result<Self> {
        if !enabled {
            return Ok(Self {
                enabled: false,
                registry: None,
                http_requests_total: None,
                http_request_duration: None,
            });
        }

        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("girder_http_requests_total", "Total HTTP requests"),
            &["path", "method", "status"],
        )?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("girder_http_request_duration_seconds", "Request latency")
                .buckets(vec![
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ]),
            &["path"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            enabled: true,
            registry: Some(registry),
            http_requests_total: Some(http_requests_total),
            http_request_duration: Some(http_request_duration),
        })
    }

    /// Record a served request (no-op when disabled). `path` should be the
    /// route template, not the literal path, to bound label cardinality.
    pub fn record_request(&self, path: &str, method: &str, status: u16, duration_secs: f64) {
        if !self.enabled {
            return;
        }
        if let Some(ref counter) = self.http_requests_total {
            counter
                .with_label_values(&[path, method, status.to_string().as_str()])
                .inc();
        }
        if let Some(ref hist) = self.http_request_duration {
            hist.with_label_values(&[path]).observe(duration_secs);
        }
    }

    /// Render prometheus text exposition format.
    pub fn render(&self) -> String {
        if let Some(ref registry) = self.registry {
            let encoder = TextEncoder::new();
            let metric_families = registry.gather();
            let mut buffer = Vec::new();
            encoder.encode(&metric_families, &mut buffer).unwrap_or(());
            String::from_utf8(buffer).unwrap_or_default()
        } else {
            String::new()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
