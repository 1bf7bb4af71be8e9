//! Input validation applied before any alias is written.
//!
//! The predicates are pure so they can be used both by the store and by
//! command handlers that want to fail before touching the network.

use crate::models::alias::{AliasEntry, BucketLookup, PathStyle, SignatureVersion};
use thiserror::Error;
use url::Url;

const ACCESS_KEY_MIN_LEN: usize = 3;
const SECRET_KEY_MIN_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid alias `{0}`")]
    InvalidAlias(String),
    #[error("invalid URL `{0}`, expected `http(s)://host[:port]` without a path")]
    InvalidUrl(String),
    #[error("invalid access key `{0}`, must be at least {ACCESS_KEY_MIN_LEN} characters")]
    InvalidAccessKey(String),
    #[error("invalid secret key, must be at least {SECRET_KEY_MIN_LEN} characters")]
    InvalidSecretKey,
    #[error("unrecognized API signature `{0}`, valid options are `[S3v4, S3v2]`")]
    InvalidApi(String),
    #[error("unrecognized path value `{0}`, valid options are `[auto, on, off]`")]
    InvalidPath(String),
    #[error("unrecognized bucket lookup `{0}`, valid options are `[dns, auto, path]`")]
    InvalidLookup(String),
}

/// Strip trailing path separators users tend to type (`myminio/`).
pub fn clean_alias(alias: &str) -> String {
    alias.trim_end_matches(['/', '\\']).to_string()
}

/// Trim trailing `/` from a URL before it is stored.
pub fn trim_trailing_separator(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// An ASCII letter followed by one or more letters, digits, `-` or `_`.
pub fn is_valid_alias(alias: &str) -> bool {
    let mut chars = alias.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    let rest = chars.as_str();
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

/// Absolute `http`/`https` URL with a host and no resource path, query,
/// fragment or embedded credentials.
pub fn is_valid_host_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|h| !h.is_empty())
        && matches!(url.path(), "" | "/")
        && url.query().is_none()
        && url.fragment().is_none()
        && url.username().is_empty()
        && url.password().is_none()
}

/// Empty (anonymous) or at least three characters.
pub fn is_valid_access_key(access_key: &str) -> bool {
    access_key.is_empty() || access_key.len() >= ACCESS_KEY_MIN_LEN
}

/// Empty (anonymous) or at least eight characters.
pub fn is_valid_secret_key(secret_key: &str) -> bool {
    secret_key.is_empty() || secret_key.len() >= SECRET_KEY_MIN_LEN
}

pub fn is_valid_api(api: &str) -> bool {
    api.parse::<SignatureVersion>().is_ok()
}

pub fn is_valid_path(path: &str) -> bool {
    path.parse::<PathStyle>().is_ok()
}

pub fn is_valid_lookup(lookup: &str) -> bool {
    lookup.parse::<BucketLookup>().is_ok()
}

/// Parse an optional `--api` value. Empty means "probe the server".
pub fn parse_api(api: &str) -> Result<Option<SignatureVersion>, ValidationError> {
    if api.trim().is_empty() {
        return Ok(None);
    }
    api.parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidApi(api.to_string()))
}

pub fn parse_path(path: &str) -> Result<PathStyle, ValidationError> {
    path.parse()
        .map_err(|_| ValidationError::InvalidPath(path.to_string()))
}

pub fn parse_lookup(lookup: &str) -> Result<PathStyle, ValidationError> {
    lookup
        .parse::<BucketLookup>()
        .map(PathStyle::from)
        .map_err(|_| ValidationError::InvalidLookup(lookup.to_string()))
}

pub fn ensure_alias_valid(alias: &str) -> Result<(), ValidationError> {
    if is_valid_alias(alias) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAlias(alias.to_string()))
    }
}

/// Validate the connection half of an entry: URL and keys.
pub fn ensure_credentials_valid(
    url: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<(), ValidationError> {
    if !is_valid_host_url(url) {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    if !is_valid_access_key(access_key) {
        return Err(ValidationError::InvalidAccessKey(access_key.to_string()));
    }
    if !is_valid_secret_key(secret_key) {
        return Err(ValidationError::InvalidSecretKey);
    }
    Ok(())
}

/// Validate a complete entry. `api` and `path` are already typed, so
/// only the free-form fields need checking.
pub fn ensure_entry_valid(entry: &AliasEntry) -> Result<(), ValidationError> {
    ensure_credentials_valid(&entry.url, &entry.access_key, &entry.secret_key)
}
