//! HTTP listener: every method and path lands on the rate handler.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::cache::RequestIdentity;
use crate::handler::RequestHandler;

/// Router sending every request to the handler.
pub fn router(handler: Arc<RequestHandler>) -> Router {
    Router::new().fallback(serve_rates).with_state(handler)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    handler: Arc<RequestHandler>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr().ok(), "Listening");
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown)
        .await
}

#[instrument(skip_all, fields(request_id = %Uuid::now_v7(), method = %method, path = %uri.path()))]
async fn serve_rates(
    State(handler): State<Arc<RequestHandler>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let identity = RequestIdentity::new(method.as_str(), &request_url(&uri, &headers));
    handler.handle(identity).await.into_response()
}

/// Absolute request URL, using the `Host` header when the URI is relative.
fn request_url(uri: &Uri, headers: &HeaderMap) -> String {
    if uri.authority().is_some() {
        return uri.to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());

    format!("http://{}{}", host, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::metrics::Metrics;
    use crate::store::MemoryCacheStore;
    use crate::tasks::DeferredTasks;
    use ratefeed_common::{RateMapping, Symbol};
    use ratefeed_fx::{Credentials, FallbackAggregator, MockRateProvider, ProviderRates};
    use serde_json::Value;
    use std::time::Duration;

    #[test]
    fn test_request_url_from_host() {
        let uri: Uri = "/latest?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "rates.example".parse().unwrap());

        assert_eq!(request_url(&uri, &headers), "http://rates.example/latest?x=1");
    }

    #[test]
    fn test_request_url_absolute() {
        let uri: Uri = "https://rates.example/latest".parse().unwrap();
        assert_eq!(request_url(&uri, &HeaderMap::new()), "https://rates.example/latest");
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let mut rates = RateMapping::new();
        rates.insert(Symbol::new("BTC"), 1.0 / 60000.0);
        let provider = Arc::new(MockRateProvider::with_rates("primary", ProviderRates::new(rates)));

        let tasks = DeferredTasks::new();
        let metrics = Arc::new(Metrics::new());
        let cache = ResponseCache::new(Arc::new(MemoryCacheStore::new()), tasks.clone(), metrics.clone());
        let handler = Arc::new(RequestHandler::new(
            FallbackAggregator::new(vec![provider.clone()]),
            cache,
            Credentials::new(),
            metrics,
            Duration::from_secs(90),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, handler, async move {
            let _ = stopped.await;
        }));

        let url = format!("http://{}/", addr);
        let client = reqwest::Client::new();

        let first = client.get(&url).send().await.unwrap();
        assert_eq!(first.status(), 200);
        assert_eq!(first.headers()["access-control-allow-origin"], "*");
        assert_eq!(first.headers()["cache-control"], "public, max-age=90");
        let body: Value = first.json().await.unwrap();
        assert_eq!(body["rates"]["USD"], 1.0);
        assert_eq!(body["rates"]["BTC"], 1.0 / 60000.0);

        tasks.flush().await;

        // Method-agnostic: any method is answered, keyed separately.
        let post = client.post(&url).send().await.unwrap();
        assert_eq!(post.status(), 200);
        assert_eq!(provider.calls(), 2);

        let again = client.get(&url).send().await.unwrap();
        assert_eq!(again.status(), 200);
        assert_eq!(provider.calls(), 2);

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
