//! Signature auto-probe: find out whether an endpoint accepts SigV4 or SigV2.
//!
//! A HEAD request for a random bucket is sent signed with V4. "Bucket does
//! not exist" and "access denied" both prove the signature was accepted;
//! any other outcome retries once with V2.

use crate::{
    models::alias::SignatureVersion,
    services::signing::{Credentials, SigningError, sign_request},
};
use chrono::Utc;
use reqwest::{Client, Method, StatusCode};
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

const PROBE_BUCKET_PREFIX: &str = "probe-bucket-sign-";
const PROBE_BUCKET_LEN: usize = 60;
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Error code headers set by S3-compatible servers on body-less responses.
const ERROR_CODE_HEADERS: [&str; 2] = ["x-minio-error-code", "x-amz-error-code"];

#[derive(Debug, Error)]
pub enum StatError {
    #[error("bucket `{0}` does not exist")]
    BucketDoesNotExist(String),
    #[error("server returned {status} ({code})")]
    Remote { status: u16, code: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unable to sign request: {0}")]
    Signing(#[from] SigningError),
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid endpoint `{0}`")]
    InvalidUrl(String),
    #[error("unable to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("neither S3v4 ({v4}) nor S3v2 ({v2}) signature was accepted")]
    Inconclusive { v4: StatError, v2: StatError },
}

/// One HEAD-bucket request.
#[derive(Clone, Debug)]
pub struct StatRequest {
    pub endpoint: Url,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub signature: SignatureVersion,
}

/// The one S3 operation the probe needs.
pub trait BucketStat {
    fn stat_bucket(&self, request: StatRequest) -> impl Future<Output = Result<(), StatError>> + Send;
}

/// `BucketStat` over HTTP, path-style addressing.
#[derive(Clone)]
pub struct HttpBucketStat {
    client: Client,
}

impl HttpBucketStat {
    /// `insecure` disables TLS certificate verification.
    pub fn new(insecure: bool) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(ProbeError::Client)?;
        Ok(Self { client })
    }
}

impl BucketStat for HttpBucketStat {
    async fn stat_bucket(&self, request: StatRequest) -> Result<(), StatError> {
        let mut url = request.endpoint.clone();
        url.set_path(&format!("/{}/", request.bucket));

        let creds = Credentials {
            access_key: &request.access_key,
            secret_key: &request.secret_key,
        };
        let headers = sign_request(request.signature, "HEAD", &url, creds, Utc::now())?;

        let mut builder = self.client.request(Method::HEAD, url.clone());
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        debug!("HEAD {} signed {} -> {}", url, request.signature, status);

        if status.is_success() {
            return Ok(());
        }

        let code = ERROR_CODE_HEADERS
            .iter()
            .find_map(|h| resp.headers().get(*h))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match (status, code) {
            (StatusCode::NOT_FOUND, None) => Err(StatError::BucketDoesNotExist(request.bucket)),
            (_, Some(code)) if code == "NoSuchBucket" => {
                Err(StatError::BucketDoesNotExist(request.bucket))
            }
            // A bare 403 on HEAD is how servers report AccessDenied.
            (StatusCode::FORBIDDEN, None) => Err(StatError::Remote {
                status: status.as_u16(),
                code: "AccessDenied".into(),
            }),
            (_, code) => Err(StatError::Remote {
                status: status.as_u16(),
                code: code.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                }),
            }),
        }
    }
}

/// Random bucket name that is vanishingly unlikely to exist.
pub fn probe_bucket_name() -> String {
    let mut name = String::from(PROBE_BUCKET_PREFIX);
    while name.len() < PROBE_BUCKET_LEN {
        name.push_str(&Uuid::new_v4().simple().to_string());
    }
    name.truncate(PROBE_BUCKET_LEN);
    name
}

/// Send one stat signed with `signature` and decide whether the server
/// accepted it.
async fn try_signature<S: BucketStat>(
    stat: &S,
    endpoint: &Url,
    bucket: &str,
    creds: Credentials<'_>,
    signature: SignatureVersion,
) -> Result<SignatureVersion, StatError> {
    let request = StatRequest {
        endpoint: endpoint.clone(),
        bucket: bucket.to_string(),
        access_key: creds.access_key.to_string(),
        secret_key: creds.secret_key.to_string(),
        signature,
    };
    match stat.stat_bucket(request).await {
        Ok(()) => Ok(signature),
        Err(StatError::BucketDoesNotExist(_)) => Ok(signature),
        // Credentials are valid, HEAD is just not allowed by policy.
        Err(StatError::Remote { code, .. }) if code == "AccessDenied" => Ok(signature),
        Err(err) => Err(err),
    }
}

/// Determine which signature version `url` accepts for these credentials.
pub async fn probe_signature<S: BucketStat>(
    stat: &S,
    url: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<SignatureVersion, ProbeError> {
    let endpoint = Url::parse(url).map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;
    let bucket = probe_bucket_name();
    let creds = Credentials {
        access_key,
        secret_key,
    };

    let v4_err = match try_signature(stat, &endpoint, &bucket, creds, SignatureVersion::V4).await {
        Ok(signature) => return Ok(signature),
        Err(err) => err,
    };
    debug!("S3v4 probe of {} failed: {}, trying S3v2", url, v4_err);

    try_signature(stat, &endpoint, &bucket, creds, SignatureVersion::V2)
        .await
        .map_err(|v2_err| ProbeError::Inconclusive {
            v4: v4_err,
            v2: v2_err,
        })
}

/// Use `api` when the user gave one, probe the server otherwise.
pub async fn resolve_signature<S: BucketStat>(
    stat: &S,
    url: &str,
    access_key: &str,
    secret_key: &str,
    api: Option<SignatureVersion>,
) -> Result<SignatureVersion, ProbeError> {
    match api {
        Some(api) => Ok(api),
        None => probe_signature(stat, url, access_key, secret_key).await,
    }
}
