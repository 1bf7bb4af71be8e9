//! Request signing for the two AWS signature schemes an S3 endpoint may accept.
//!
//! Only what a body-less request needs is implemented: no chunked payload
//! signing, no presigned URLs.

use crate::models::alias::SignatureVersion;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// Region used for signing when the endpoint does not dictate one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// SHA-256 of an empty payload.
const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("HMAC rejected the signing key")]
    InvalidKey,
}

pub type SigningResult<T> = Result<T, SigningError>;

#[derive(Clone, Copy, Debug)]
pub struct Credentials<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
}

impl Credentials<'_> {
    pub fn is_anonymous(&self) -> bool {
        self.access_key.is_empty() || self.secret_key.is_empty()
    }
}

/// Headers to attach to a request so that it is signed with `version`.
///
/// Anonymous credentials produce no headers at all.
pub fn sign_request(
    version: SignatureVersion,
    method: &str,
    url: &Url,
    creds: Credentials<'_>,
    now: DateTime<Utc>,
) -> SigningResult<Vec<(&'static str, String)>> {
    if creds.is_anonymous() {
        return Ok(Vec::new());
    }
    match version {
        SignatureVersion::V4 => sign_v4(method, url, creds, DEFAULT_REGION, now),
        SignatureVersion::V2 => sign_v2(method, url, creds, now),
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> SigningResult<Vec<u8>> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Value of the `Host` header as an HTTP client would send it.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 encoding as SigV4 expects it: unreserved characters pass through.
fn uri_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// AWS Signature Version 4 over host, payload hash and date.
pub fn sign_v4(
    method: &str,
    url: &Url,
    creds: Credentials<'_>,
    region: &str,
    now: DateTime<Utc>,
) -> SigningResult<Vec<(&'static str, String)>> {
    let date_stamp = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let host = host_header(url);

    let signed_headers = "host;x-amz-content-sha256;x-amz-date";
    let canonical_headers = format!(
        "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        host, EMPTY_PAYLOAD_SHA256, amz_date
    );
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        url.path(),
        canonical_query(url),
        canonical_headers,
        signed_headers,
        EMPTY_PAYLOAD_SHA256
    );
    let request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));

    let scope = format!("{date_stamp}/{region}/s3/aws4_request");
    let string_to_sign = format!("AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{request_hash}");

    let k_date = hmac_sha256(
        format!("AWS4{}", creds.secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

    Ok(vec![
        ("x-amz-date", amz_date),
        ("x-amz-content-sha256", EMPTY_PAYLOAD_SHA256.to_string()),
        (
            "authorization",
            format!(
                "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
                creds.access_key, scope, signed_headers, signature
            ),
        ),
    ])
}

/// Base64 HMAC-SHA1 of a SigV2 string-to-sign.
pub fn v2_signature(secret_key: &str, string_to_sign: &str) -> SigningResult<String> {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(secret_key.as_bytes())
        .map_err(|_| SigningError::InvalidKey)?;
    mac.update(string_to_sign.as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// AWS Signature Version 2. No Content-MD5, Content-Type or `x-amz-*`
/// headers are sent, so those lines of the string-to-sign stay empty.
pub fn sign_v2(
    method: &str,
    url: &Url,
    creds: Credentials<'_>,
    now: DateTime<Utc>,
) -> SigningResult<Vec<(&'static str, String)>> {
    let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    let string_to_sign = format!("{}\n\n\n{}\n{}", method, date, url.path());
    let signature = v2_signature(creds.secret_key, &string_to_sign)?;

    Ok(vec![
        ("date", date),
        (
            "authorization",
            format!("AWS {}:{}", creds.access_key, signature),
        ),
    ])
}
