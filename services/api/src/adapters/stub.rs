//! A throwaway HTTP upstream for exercising the REST adapters in tests.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use serde_json::Value;

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Answers every request with `status` and the JSON `reply`, recording what it got.
///
/// Returns the base URL to point an adapter at and the request log.
pub async fn serve(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorder = requests.clone();
    let router = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder.lock().unwrap().push(Recorded {
                    method,
                    uri,
                    authorization: headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string),
                    body: serde_json::from_slice(&body).ok(),
                });
                (status, axum::Json(reply)).into_response()
            }
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), requests)
}
