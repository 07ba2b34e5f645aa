use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;

/// One HTTP round trip: request in, response or failure out.
///
/// Implementations wrap each other to add behavior around the network call
/// (see [`crate::StatusValidator`]); every wrapper satisfies the same
/// contract, so layers chain freely.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        (**self).execute(request).await
    }
}

/// Base transport delegating to a [`reqwest::Client`].
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        Ok(self.inner.execute(request).await?)
    }
}

/// Outbound client: a stack of transports over a base [`reqwest::Client`].
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Wrap an already-built transport stack.
    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        self.transport.execute(request).await
    }
}

type Layer = Box<dyn FnOnce(Arc<dyn Transport>) -> Arc<dyn Transport>>;

/// Builds a [`Client`] by applying transport layers, in registration order,
/// over the base reqwest transport.
#[derive(Default)]
pub struct ClientBuilder {
    base: Option<reqwest::Client>,
    layers: Vec<Layer>,
}

impl ClientBuilder {
    /// Use a preconfigured [`reqwest::Client`] as the base transport.
    pub fn base(mut self, client: reqwest::Client) -> Self {
        self.base = Some(client);
        self
    }

    /// Add a wrapping layer. The first registered layer sits closest to the
    /// network; the last registered is the outermost.
    pub fn layer<F>(mut self, layer: F) -> Self
    where
        F: FnOnce(Arc<dyn Transport>) -> Arc<dyn Transport> + 'static,
    {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn build(self) -> Client {
        let mut transport: Arc<dyn Transport> =
            Arc::new(ReqwestTransport::new(self.base.unwrap_or_default()));
        for layer in self.layers {
            transport = layer(transport);
        }
        Client { transport }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, StatusCode, Url};

    struct CannedTransport {
        status: StatusCode,
        tag: &'static str,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, _request: Request) -> Result<Response, ClientError> {
            let inner = http::Response::builder()
                .status(self.status)
                .header("x-tag", self.tag)
                .body("")
                .unwrap();
            Ok(Response::from(inner))
        }
    }

    /// Stamps a marker so tests can observe layer ordering.
    struct TaggingTransport {
        inner: Arc<dyn Transport>,
        tag: &'static str,
    }

    #[async_trait]
    impl Transport for TaggingTransport {
        async fn execute(&self, request: Request) -> Result<Response, ClientError> {
            let mut response = self.inner.execute(request).await?;
            let value = self.tag.parse().unwrap();
            response.headers_mut().append("x-layer", value);
            Ok(response)
        }
    }

    fn request() -> Request {
        Request::new(Method::GET, Url::parse("http://localhost/test").unwrap())
    }

    #[tokio::test]
    async fn client_delegates_to_transport() {
        let client = Client::from_transport(Arc::new(CannedTransport {
            status: StatusCode::NO_CONTENT,
            tag: "canned",
        }));
        let response = client.execute(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["x-tag"], "canned");
    }

    #[tokio::test]
    async fn layers_apply_in_registration_order() {
        // Swap the base for a canned transport, then wrap twice. The first
        // registered layer is innermost, so its header lands first.
        let base: Arc<dyn Transport> = Arc::new(CannedTransport {
            status: StatusCode::OK,
            tag: "base",
        });
        let mut transport = base;
        let layers: [fn(Arc<dyn Transport>) -> Arc<dyn Transport>; 2] = [
            |inner| Arc::new(TaggingTransport { inner, tag: "first" }),
            |inner| Arc::new(TaggingTransport { inner, tag: "second" }),
        ];
        for layer in layers {
            transport = layer(transport);
        }
        let client = Client::from_transport(transport);

        let response = client.execute(request()).await.unwrap();
        let layers: Vec<_> = response
            .headers()
            .get_all("x-layer")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(layers, vec!["first", "second"]);
    }

    #[test]
    fn builder_without_layers_yields_reqwest_base() {
        // Smoke test: build succeeds with no layers or base configured.
        let _client = Client::builder().build();
    }
}
