//! Probing a live HTTP endpoint that only understands one signature scheme.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use mc::{
    models::alias::SignatureVersion,
    services::signature_probe::{HttpBucketStat, ProbeError, probe_signature},
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Which Authorization scheme the mock server accepts.
#[derive(Clone, Copy)]
enum Accepts {
    V4,
    V2,
    Nothing,
    /// Accepts V4 but denies HEAD by policy.
    V4Denied,
}

#[derive(Clone)]
struct Mock {
    accepts: Accepts,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

async fn head_bucket(State(mock): State<Mock>, uri: Uri, headers: HeaderMap) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    mock.seen
        .lock()
        .unwrap()
        .push((uri.path().to_string(), auth.clone()));

    let is_v4 = auth.starts_with("AWS4-HMAC-SHA256 ");
    let is_v2 = auth.starts_with("AWS ");
    match (mock.accepts, is_v4, is_v2) {
        (Accepts::V4, true, _) | (Accepts::V2, _, true) => StatusCode::NOT_FOUND.into_response(),
        (Accepts::V4Denied, true, _) => StatusCode::FORBIDDEN.into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            [("x-minio-error-code", "AuthorizationHeaderMalformed")],
        )
            .into_response(),
    }
}

async fn spawn(accepts: Accepts) -> (String, Arc<Mutex<Vec<(String, String)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(head_bucket).with_state(Mock {
        accepts,
        seen: seen.clone(),
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

#[tokio::test]
async fn v2_only_endpoint_resolves_to_s3v2() {
    let (url, seen) = spawn(Accepts::V2).await;
    let stat = HttpBucketStat::new(false).unwrap();

    let sig = probe_signature(&stat, &url, "minioadmin", "minioadmin")
        .await
        .unwrap();
    assert_eq!(sig, SignatureVersion::V2);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].1.starts_with("AWS4-HMAC-SHA256 Credential=minioadmin/"));
    assert!(seen[1].1.starts_with("AWS minioadmin:"));
    // Both attempts address the same random bucket.
    assert_eq!(seen[0].0, seen[1].0);
    assert!(seen[0].0.starts_with("/probe-bucket-sign-"));
}

#[tokio::test]
async fn v4_endpoint_is_probed_once() {
    let (url, seen) = spawn(Accepts::V4).await;
    let stat = HttpBucketStat::new(false).unwrap();

    let sig = probe_signature(&stat, &url, "minioadmin", "minioadmin")
        .await
        .unwrap();
    assert_eq!(sig, SignatureVersion::V4);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn bare_forbidden_counts_as_access_denied() {
    let (url, _) = spawn(Accepts::V4Denied).await;
    let stat = HttpBucketStat::new(false).unwrap();

    let sig = probe_signature(&stat, &url, "minioadmin", "minioadmin")
        .await
        .unwrap();
    assert_eq!(sig, SignatureVersion::V4);
}

#[tokio::test]
async fn endpoint_rejecting_both_is_inconclusive() {
    let (url, seen) = spawn(Accepts::Nothing).await;
    let stat = HttpBucketStat::new(false).unwrap();

    let err = probe_signature(&stat, &url, "minioadmin", "minioadmin")
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Inconclusive { .. }), "{err}");
    assert_eq!(seen.lock().unwrap().len(), 2);
}
