//! Historical `config.json` schemas.
//!
//! Every version the client has ever written is a distinct variant of
//! [`LegacyConfig`]. Versions whose layout never changed share a struct;
//! the variant tag is what tells them apart.
//!
//! Versions `1.0.0` through `2` were written without JSON tags, so their
//! keys are capitalized (`Version`, `Hosts`, `AccessKeyID`).

use super::config_file::ConfigFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimal probe decode: only the version tag.
#[derive(Deserialize, Debug)]
pub struct AnyVersion {
    #[serde(alias = "Version")]
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostConfigV1 {
    #[serde(rename = "AccessKeyID", default)]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey", default)]
    pub secret_access_key: String,
}

/// Versions `1.0.0`, `1.0.1` and `2`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigV1 {
    #[serde(rename = "Version", alias = "version")]
    pub version: String,
    #[serde(rename = "Aliases", alias = "aliases", default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(rename = "Hosts", alias = "hosts", default)]
    pub hosts: BTreeMap<String, HostConfigV1>,
}

/// Version `3` as some releases actually wrote it: no JSON tags on the
/// host entries, plus two unused top-level fields.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct BrokenConfigV3 {
    #[serde(rename = "Version", alias = "version")]
    pub version: String,
    #[serde(rename = "ACL", default)]
    pub acl: Option<String>,
    #[serde(rename = "Access", default)]
    pub access: Option<String>,
    #[serde(rename = "Aliases", alias = "alias", default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(rename = "Hosts", alias = "hosts", default)]
    pub hosts: BTreeMap<String, HostConfigV1>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostConfigV3 {
    #[serde(rename = "access-key-id", default)]
    pub access_key_id: String,
    #[serde(rename = "secret-access-key", default)]
    pub secret_access_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigV3 {
    #[serde(alias = "Version")]
    pub version: String,
    #[serde(rename = "alias", alias = "Aliases", default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(alias = "Hosts", default)]
    pub hosts: BTreeMap<String, HostConfigV3>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostConfigV4 {
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub signature: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigV4 {
    pub version: String,
    #[serde(rename = "alias", default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfigV4>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostConfigV5 {
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub api: String,
}

/// Versions `5` and `6`. Version 6 host keys may be glob patterns.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigV5 {
    pub version: String,
    #[serde(rename = "alias", default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfigV5>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostConfigV7 {
    pub url: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub api: String,
}

/// Versions `7` and `8`: named hosts, no alias map.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigV7 {
    pub version: String,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfigV7>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostConfigV9 {
    pub url: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub lookup: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigV9 {
    pub version: String,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfigV9>,
}

/// One decoded config file, tagged by its schema version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegacyConfig {
    V1(ConfigV1),
    V101(ConfigV1),
    V2(ConfigV1),
    V3(ConfigV3),
    V4(ConfigV4),
    V5(ConfigV5),
    V6(ConfigV5),
    V7(ConfigV7),
    V8(ConfigV7),
    V9(ConfigV9),
    V10(ConfigFile),
}

impl LegacyConfig {
    /// Decode `data` with the struct matching `version`.
    ///
    /// Returns `Ok(None)` for a version tag this client never wrote.
    pub fn decode(version: &str, data: &[u8]) -> serde_json::Result<Option<Self>> {
        let cfg = match version {
            "1.0.0" => LegacyConfig::V1(serde_json::from_slice(data)?),
            "1.0.1" => LegacyConfig::V101(serde_json::from_slice(data)?),
            "2" => LegacyConfig::V2(serde_json::from_slice(data)?),
            "3" => LegacyConfig::V3(serde_json::from_slice(data)?),
            "4" => LegacyConfig::V4(serde_json::from_slice(data)?),
            "5" => LegacyConfig::V5(serde_json::from_slice(data)?),
            "6" => LegacyConfig::V6(serde_json::from_slice(data)?),
            "7" => LegacyConfig::V7(serde_json::from_slice(data)?),
            "8" => LegacyConfig::V8(serde_json::from_slice(data)?),
            "9" => LegacyConfig::V9(serde_json::from_slice(data)?),
            "10" => LegacyConfig::V10(serde_json::from_slice(data)?),
            _ => return Ok(None),
        };
        Ok(Some(cfg))
    }

    pub fn version(&self) -> &'static str {
        match self {
            LegacyConfig::V1(_) => "1.0.0",
            LegacyConfig::V101(_) => "1.0.1",
            LegacyConfig::V2(_) => "2",
            LegacyConfig::V3(_) => "3",
            LegacyConfig::V4(_) => "4",
            LegacyConfig::V5(_) => "5",
            LegacyConfig::V6(_) => "6",
            LegacyConfig::V7(_) => "7",
            LegacyConfig::V8(_) => "8",
            LegacyConfig::V9(_) => "9",
            LegacyConfig::V10(_) => "10",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reads_either_capitalization() {
        let lower: AnyVersion = serde_json::from_str(r#"{"version":"9","hosts":{}}"#).unwrap();
        let upper: AnyVersion = serde_json::from_str(r#"{"Version":"1.0.0"}"#).unwrap();
        assert_eq!(lower.version, "9");
        assert_eq!(upper.version, "1.0.0");
    }

    #[test]
    fn decode_dispatches_on_version_tag() {
        let data = br#"{"version":"8","hosts":{"local":{"url":"http://localhost:9000","accessKey":"","secretKey":"","api":"S3v4"}}}"#;
        let cfg = LegacyConfig::decode("8", data).unwrap().unwrap();
        assert_eq!(cfg.version(), "8");
        match cfg {
            LegacyConfig::V8(v8) => assert_eq!(v8.hosts["local"].url, "http://localhost:9000"),
            other => panic!("unexpected variant {other:?}"),
        }
        assert!(LegacyConfig::decode("11", data).unwrap().is_none());
    }
}
