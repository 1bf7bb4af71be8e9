//! Represents a single configured endpoint, one alias entry in `config.json`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Connection profile bound to an alias name.
///
/// Serialized with the camelCase field names used by every config file
/// since version 7 (`accessKey`, `secretKey`, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AliasEntry {
    /// Endpoint URL, `scheme://host[:port]`.
    pub url: String,

    /// Access key; empty for anonymous access.
    #[serde(default)]
    pub access_key: String,

    /// Secret key; empty for anonymous access.
    #[serde(default)]
    pub secret_key: String,

    /// Session token for temporary credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    /// Signature version the endpoint accepts.
    #[serde(default)]
    pub api: SignatureVersion,

    /// Bucket lookup style.
    #[serde(default)]
    pub path: PathStyle,
}

impl AliasEntry {
    pub fn new(url: impl Into<String>, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
            api: SignatureVersion::default(),
            path: PathStyle::default(),
        }
    }

    pub fn with_api(mut self, api: SignatureVersion) -> Self {
        self.api = api;
        self
    }

    pub fn with_path(mut self, path: PathStyle) -> Self {
        self.path = path;
        self
    }

    /// True when either key is missing, i.e. requests go out unsigned.
    pub fn is_anonymous(&self) -> bool {
        self.access_key.is_empty() || self.secret_key.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized {kind} `{value}`, valid options are `[{options}]`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    options: &'static str,
}

/// AWS request signature version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignatureVersion {
    #[default]
    V4,
    V2,
}

impl SignatureVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureVersion::V4 => "S3v4",
            SignatureVersion::V2 => "S3v2",
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureVersion {
    type Err = ParseEnumError;

    /// Case-insensitive. Config versions 4 and 5 spelled these `v4`/`v2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3v4" | "v4" => Ok(SignatureVersion::V4),
            "s3v2" | "v2" => Ok(SignatureVersion::V2),
            _ => Err(ParseEnumError {
                kind: "API signature",
                value: s.to_string(),
                options: "S3v4, S3v2",
            }),
        }
    }
}

impl Serialize for SignatureVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SignatureVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(SignatureVersion::default());
        }
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Bucket lookup style: path (`on`), virtual-host (`off`) or detected (`auto`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PathStyle {
    #[default]
    Auto,
    On,
    Off,
}

impl PathStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStyle::Auto => "auto",
            PathStyle::On => "on",
            PathStyle::Off => "off",
        }
    }
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathStyle {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PathStyle::Auto),
            "on" => Ok(PathStyle::On),
            "off" => Ok(PathStyle::Off),
            _ => Err(ParseEnumError {
                kind: "path value",
                value: s.to_string(),
                options: "auto, on, off",
            }),
        }
    }
}

impl Serialize for PathStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PathStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(PathStyle::default());
        }
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Deprecated bucket lookup vocabulary used by config version 9 and by
/// `config host add --lookup`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BucketLookup {
    Dns,
    Path,
    #[default]
    Auto,
}

impl FromStr for BucketLookup {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(BucketLookup::Auto),
            "dns" => Ok(BucketLookup::Dns),
            "path" => Ok(BucketLookup::Path),
            _ => Err(ParseEnumError {
                kind: "bucket lookup",
                value: s.to_string(),
                options: "dns, auto, path",
            }),
        }
    }
}

impl BucketLookup {
    /// Lenient translation of a stored `lookup` string: anything unknown is `auto`.
    pub fn from_legacy(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl From<BucketLookup> for PathStyle {
    fn from(lookup: BucketLookup) -> Self {
        match lookup {
            BucketLookup::Dns => PathStyle::Off,
            BucketLookup::Path => PathStyle::On,
            BucketLookup::Auto => PathStyle::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_parses_case_insensitively() {
        assert_eq!("s3v4".parse::<SignatureVersion>(), Ok(SignatureVersion::V4));
        assert_eq!("S3V2".parse::<SignatureVersion>(), Ok(SignatureVersion::V2));
        assert_eq!("v2".parse::<SignatureVersion>(), Ok(SignatureVersion::V2));
        assert!("S3v3".parse::<SignatureVersion>().is_err());
    }

    #[test]
    fn lookup_translates_to_path_style() {
        assert_eq!(PathStyle::from(BucketLookup::from_legacy("dns")), PathStyle::Off);
        assert_eq!(PathStyle::from(BucketLookup::from_legacy("path")), PathStyle::On);
        assert_eq!(PathStyle::from(BucketLookup::from_legacy("whatever")), PathStyle::Auto);
    }

    #[test]
    fn entry_uses_camel_case_and_omits_missing_token() {
        let entry = AliasEntry::new("http://localhost:9000", "minio", "minio123")
            .with_api(SignatureVersion::V2)
            .with_path(PathStyle::On);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["accessKey"], "minio");
        assert_eq!(json["api"], "S3v2");
        assert_eq!(json["path"], "on");
        assert!(json.get("sessionToken").is_none());
    }

    #[test]
    fn empty_api_and_path_decode_to_defaults() {
        let entry: AliasEntry = serde_json::from_str(
            r#"{"url":"http://a:9000","accessKey":"","secretKey":"","api":"","path":""}"#,
        )
        .unwrap();
        assert_eq!(entry.api, SignatureVersion::V4);
        assert_eq!(entry.path, PathStyle::Auto);
        assert!(entry.is_anonymous());
    }
}
