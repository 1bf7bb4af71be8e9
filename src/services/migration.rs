//! Upgrade of `config.json` from any historical schema to the current one.
//!
//! Two kinds of steps run, in this order:
//! - **fixers** repair files that a release wrote in a broken shape. Each
//!   only looks at its own version and reports whether it changed anything.
//! - **upgrades** are pure `Vn -> Vn+1` functions chained until the
//!   config reaches version `10`.
//!
//! Files older than version 6 get the version 6 host fixers applied once
//! the chain reaches that version, since the `5 -> 6` step itself writes
//! glob host keys.
//!
//! The file is rewritten only when a fixer mutated it or an upgrade ran,
//! so running the migration on every startup is safe.

use crate::{
    models::{
        alias::{AliasEntry, BucketLookup, PathStyle, SignatureVersion},
        config_file::{
            CONFIG_VERSION, ConfigFile, DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY, PLAY_ACCESS_KEY,
            PLAY_SECRET_KEY,
        },
        legacy::{
            AnyVersion, BrokenConfigV3, ConfigV1, ConfigV3, ConfigV4, ConfigV5, ConfigV7,
            ConfigV9, HostConfigV1, HostConfigV3, HostConfigV4, HostConfigV5, HostConfigV7,
            HostConfigV9, LegacyConfig,
        },
    },
    services::alias_store::write_config_atomic,
};
use std::{io, path::Path};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

/// Placeholder keys written by versions `1.0.1` through `6`.
const EXAMPLE_ACCESS_KEY: &str = "YOUR-ACCESS-KEY-ID-HERE";
const EXAMPLE_SECRET_KEY: &str = "YOUR-SECRET-ACCESS-KEY-HERE";

/// Glob host keys introduced by the `5 -> 6` upgrade.
const S3_GLOB_HOST: &str = "*s3*amazonaws.com";
const GCS_GLOB_HOST: &str = "*storage.googleapis.com";

/// Bare hosts that version 6 files are known to contain.
const WELL_KNOWN_HOSTS: [&str; 6] = [
    "s3.amazonaws.com",
    "storage.googleapis.com",
    "localhost:9000",
    "127.0.0.1:9000",
    "play.min.io:9000",
    "dl.min.io:9000",
];

/// Aliases dropped on the way to versions 8 and 9.
const RETIRED_ALIASES: [&str; 3] = ["player", "play", "dl"];

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("unable to read or write config: {0}")]
    Io(#[from] io::Error),
    #[error("unable to decode config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unrecognized config version `{0}`")]
    UnknownVersion(String),
    #[error(
        "glob style `*` pattern matching is no longer supported, please fix `{0}` entry manually"
    )]
    UnsupportedGlob(String),
}

pub type MigrationResult<T> = Result<T, MigrationError>;

/// Output of a fixer: the config to continue with, and whether it differs
/// from the input. When `is_mutated` is false `config` is the input as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed<T> {
    pub config: T,
    pub is_mutated: bool,
}

impl<T> Fixed<T> {
    fn unchanged(config: T) -> Self {
        Self {
            config,
            is_mutated: false,
        }
    }
}

/// Result of migrating one file's contents.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub from_version: String,
    pub config: ConfigFile,
    pub changed: bool,
}

/// Rewrite a version 3 file written without host JSON tags.
///
/// Only files whose untagged hosts carry real keys count as broken; a
/// correctly tagged file decodes with empty keys here and is left alone.
pub fn fix_config_v3(broken: BrokenConfigV3) -> Fixed<ConfigV3> {
    let is_mutated = broken
        .hosts
        .values()
        .any(|h| !h.access_key_id.is_empty() && !h.secret_access_key.is_empty());

    if broken.acl.is_some() || broken.access.is_some() {
        debug!("dropping unused ACL and Access fields from config version `3`");
    }
    let config = ConfigV3 {
        version: "3".into(),
        aliases: broken.aliases,
        hosts: broken
            .hosts
            .into_iter()
            .map(|(host, h)| {
                (
                    host,
                    HostConfigV3 {
                        access_key_id: h.access_key_id,
                        secret_access_key: h.secret_access_key,
                    },
                )
            })
            .collect(),
    };

    Fixed { config, is_mutated }
}

/// Canonical literal for a known glob host, `None` when `host` has no
/// glob or matches no template.
fn canonical_glob_host(host: &str) -> Option<&'static str> {
    if host.contains("*s3*") || host.contains("*.s3*") || host.contains("s3*") {
        return Some("s3.amazonaws.com");
    }
    if host.contains("*amazonaws.com") || host.contains("*.amazonaws.com") {
        return Some("s3.amazonaws.com");
    }
    if host.contains("*storage.googleapis.com") {
        return Some("storage.googleapis.com");
    }
    if host.contains("localhost:*") {
        return Some("localhost:9000");
    }
    if host.contains("127.0.0.1:*") {
        return Some("127.0.0.1:9000");
    }
    None
}

/// Replace glob host keys in a version 6 file with literal hostnames.
pub fn fix_config_v6_globs(cfg: ConfigV5) -> MigrationResult<Fixed<ConfigV5>> {
    if !cfg.hosts.keys().any(|h| h.contains('*')) {
        return Ok(Fixed::unchanged(cfg));
    }

    let mut fixed = ConfigV5 {
        version: "6".into(),
        aliases: cfg.aliases,
        hosts: Default::default(),
    };
    for (host, host_cfg) in cfg.hosts {
        if !host.contains('*') {
            fixed.hosts.insert(host, host_cfg);
            continue;
        }
        let Some(literal) = canonical_glob_host(&host) else {
            return Err(MigrationError::UnsupportedGlob(host));
        };
        info!("found glob url, replacing {} with {}", host, literal);
        fixed.hosts.insert(literal.to_string(), host_cfg);
    }

    Ok(Fixed {
        config: fixed,
        is_mutated: true,
    })
}

fn scheme_for(host: &str) -> &'static str {
    if host.starts_with("localhost:") || host.starts_with("127.0.0.1:") {
        "http"
    } else {
        "https"
    }
}

/// Give well-known bare host keys of a version 6 file an explicit scheme.
///
/// Other bare hosts cannot be addressed after the upgrade and are dropped
/// when the file is rewritten.
pub fn fix_config_v6_hosts(cfg: ConfigV5) -> Fixed<ConfigV5> {
    let needs_fix = cfg
        .hosts
        .keys()
        .any(|h| !h.starts_with("http") && WELL_KNOWN_HOSTS.contains(&h.as_str()));
    if !needs_fix {
        return Fixed::unchanged(cfg);
    }

    let mut fixed = ConfigV5 {
        version: "6".into(),
        aliases: cfg.aliases,
        hosts: Default::default(),
    };
    for (host, host_cfg) in cfg.hosts {
        if host.starts_with("http") {
            fixed.hosts.insert(host, host_cfg);
        } else if WELL_KNOWN_HOSTS.contains(&host.as_str()) {
            let with_scheme = format!("{}://{}", scheme_for(&host), host);
            info!("found broken host entry, replacing {} with {}", host, with_scheme);
            fixed.hosts.insert(with_scheme, host_cfg);
        } else {
            debug!("dropping unaddressable host entry {}", host);
        }
    }

    Fixed {
        config: fixed,
        is_mutated: true,
    }
}

fn is_placeholder(access_key: &str, secret_key: &str) -> bool {
    access_key == EXAMPLE_ACCESS_KEY
        || secret_key == EXAMPLE_SECRET_KEY
        || access_key.is_empty()
        || secret_key.is_empty()
}

fn lenient_api(api: &str) -> SignatureVersion {
    api.parse().unwrap_or_default()
}

fn v1_to_v101(cfg: ConfigV1) -> ConfigV1 {
    let mut next = ConfigV1 {
        version: "1.0.1".into(),
        aliases: cfg.aliases,
        hosts: cfg.hosts,
    };
    next.hosts
        .entry("localhost:*".into())
        .or_insert_with(HostConfigV1::default);
    next.hosts
        .entry("127.0.0.1:*".into())
        .or_insert_with(HostConfigV1::default);
    next.hosts
        .entry("*.s3*.amazonaws.com".into())
        .or_insert_with(|| HostConfigV1 {
            access_key_id: EXAMPLE_ACCESS_KEY.into(),
            secret_access_key: EXAMPLE_SECRET_KEY.into(),
        });
    next
}

fn v101_to_v2(cfg: ConfigV1) -> ConfigV1 {
    ConfigV1 {
        version: "2".into(),
        ..cfg
    }
}

fn v2_to_v3(cfg: ConfigV1) -> ConfigV3 {
    ConfigV3 {
        version: "3".into(),
        aliases: cfg.aliases,
        hosts: cfg
            .hosts
            .into_iter()
            .map(|(host, h)| {
                (
                    host,
                    HostConfigV3 {
                        access_key_id: h.access_key_id,
                        secret_access_key: h.secret_access_key,
                    },
                )
            })
            .collect(),
    }
}

fn v3_to_v4(cfg: ConfigV3) -> ConfigV4 {
    // Every host before version 4 was signed with V4.
    ConfigV4 {
        version: "4".into(),
        aliases: cfg.aliases,
        hosts: cfg
            .hosts
            .into_iter()
            .map(|(host, h)| {
                (
                    host,
                    HostConfigV4 {
                        access_key_id: h.access_key_id,
                        secret_access_key: h.secret_access_key,
                        signature: "v4".into(),
                    },
                )
            })
            .collect(),
    }
}

fn v4_to_v5(cfg: ConfigV4) -> ConfigV5 {
    ConfigV5 {
        version: "5".into(),
        aliases: cfg.aliases,
        hosts: cfg
            .hosts
            .into_iter()
            .map(|(host, h)| {
                let api = if h.signature.is_empty() {
                    "v4".to_string()
                } else {
                    h.signature
                };
                (
                    host,
                    HostConfigV5 {
                        access_key_id: h.access_key_id,
                        secret_access_key: h.secret_access_key,
                        api,
                    },
                )
            })
            .collect(),
    }
}

fn v5_to_v6(cfg: ConfigV5) -> ConfigV5 {
    let mut next = ConfigV5 {
        version: "6".into(),
        ..Default::default()
    };

    next.aliases
        .insert("gcs".into(), "https://storage.googleapis.com".into());
    next.aliases.extend(cfg.aliases);

    next.hosts.insert(
        S3_GLOB_HOST.into(),
        HostConfigV5 {
            access_key_id: EXAMPLE_ACCESS_KEY.into(),
            secret_access_key: EXAMPLE_SECRET_KEY.into(),
            api: "S3v4".into(),
        },
    );
    next.hosts.insert(
        GCS_GLOB_HOST.into(),
        HostConfigV5 {
            access_key_id: EXAMPLE_ACCESS_KEY.into(),
            secret_access_key: EXAMPLE_SECRET_KEY.into(),
            api: "S3v2".into(),
        },
    );

    for (host, h) in cfg.hosts {
        let mut host = host;
        if host.contains("s3") {
            if is_placeholder(&h.access_key_id, &h.secret_access_key) {
                continue;
            }
            // Real keys move to the generalized s3 glob.
            host = S3_GLOB_HOST.into();
        }
        next.hosts.insert(host, h);
    }
    next
}

fn v6_to_v7(cfg: ConfigV5) -> ConfigV7 {
    let mut next = ConfigV7 {
        version: "7".into(),
        hosts: Default::default(),
    };
    let mut cloud_index = 0;

    for (host, h) in cfg.hosts {
        let entry = HostConfigV7 {
            url: host.clone(),
            access_key: h.access_key_id.clone(),
            secret_key: h.secret_access_key.clone(),
            api: h.api.clone(),
        };

        let named: Vec<&String> = cfg
            .aliases
            .iter()
            .filter(|(_, aliased)| **aliased == host)
            .map(|(name, _)| name)
            .collect();
        if !named.is_empty() {
            for name in named {
                next.hosts.insert(name.clone(), entry.clone());
            }
            continue;
        }

        if is_placeholder(&h.access_key_id, &h.secret_access_key) {
            // Defaults are re-inserted below.
            continue;
        }
        let name = match host.as_str() {
            "https://s3.amazonaws.com" => "s3".to_string(),
            "https://storage.googleapis.com" => "gcs".to_string(),
            _ => {
                let name = format!("cloud{}", cloud_index);
                cloud_index += 1;
                name
            }
        };
        next.hosts.insert(name, entry);
    }

    load_v7_defaults(&mut next);
    next
}

fn set_host_if_absent(cfg: &mut ConfigV7, name: &str, url: &str, keys: (&str, &str), api: &str) {
    cfg.hosts
        .entry(name.to_string())
        .or_insert_with(|| HostConfigV7 {
            url: url.into(),
            access_key: keys.0.into(),
            secret_key: keys.1.into(),
            api: api.into(),
        });
}

fn load_v7_defaults(cfg: &mut ConfigV7) {
    let placeholder = (DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY);
    set_host_if_absent(cfg, "local", "http://localhost:9000", ("", ""), "S3v4");
    set_host_if_absent(cfg, "s3", "https://s3.amazonaws.com", placeholder, "S3v4");
    set_host_if_absent(cfg, "gcs", "https://storage.googleapis.com", placeholder, "S3v2");
    set_host_if_absent(cfg, "play", "https://play.min.io", ("", ""), "S3v4");
    set_host_if_absent(
        cfg,
        "player",
        "https://play.min.io:9002",
        (PLAY_ACCESS_KEY, PLAY_SECRET_KEY),
        "S3v4",
    );
    set_host_if_absent(cfg, "dl", "https://dl.min.io:9000", ("", ""), "S3v4");
}

fn load_v8_defaults(cfg: &mut ConfigV7) {
    let placeholder = (DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY);
    set_host_if_absent(cfg, "local", "http://localhost:9000", ("", ""), "S3v4");
    set_host_if_absent(cfg, "s3", "https://s3.amazonaws.com", placeholder, "S3v4");
    set_host_if_absent(cfg, "gcs", "https://storage.googleapis.com", placeholder, "S3v2");
    set_host_if_absent(
        cfg,
        "play",
        "https://play.min.io",
        (PLAY_ACCESS_KEY, PLAY_SECRET_KEY),
        "S3v4",
    );
}

fn v7_to_v8(cfg: ConfigV7) -> ConfigV7 {
    let mut next = ConfigV7 {
        version: "8".into(),
        hosts: cfg
            .hosts
            .into_iter()
            .filter(|(name, _)| !RETIRED_ALIASES.contains(&name.as_str()))
            .collect(),
    };
    load_v8_defaults(&mut next);
    next
}

fn v8_to_v9(cfg: ConfigV7) -> ConfigV9 {
    ConfigV9 {
        version: "9".into(),
        hosts: cfg
            .hosts
            .into_iter()
            .filter(|(name, _)| !RETIRED_ALIASES.contains(&name.as_str()))
            .map(|(name, h)| {
                (
                    name,
                    HostConfigV9 {
                        url: h.url,
                        access_key: h.access_key,
                        secret_key: h.secret_key,
                        session_token: None,
                        api: h.api,
                        lookup: "auto".into(),
                    },
                )
            })
            .collect(),
    }
}

fn v9_to_v10(cfg: ConfigV9) -> ConfigFile {
    let mut next = ConfigFile::default();
    for (name, h) in cfg.hosts {
        next.aliases.insert(
            name,
            AliasEntry {
                url: h.url,
                access_key: h.access_key,
                secret_key: h.secret_key,
                session_token: h.session_token,
                api: lenient_api(&h.api),
                path: PathStyle::from(BucketLookup::from_legacy(&h.lookup)),
            },
        );
    }
    if next.aliases.is_empty() {
        next.load_defaults();
    }
    next
}

impl LegacyConfig {
    /// Advance one schema version. The current version maps to itself.
    pub fn upgrade(self) -> LegacyConfig {
        match self {
            LegacyConfig::V1(c) => LegacyConfig::V101(v1_to_v101(c)),
            LegacyConfig::V101(c) => LegacyConfig::V2(v101_to_v2(c)),
            LegacyConfig::V2(c) => LegacyConfig::V3(v2_to_v3(c)),
            LegacyConfig::V3(c) => LegacyConfig::V4(v3_to_v4(c)),
            LegacyConfig::V4(c) => LegacyConfig::V5(v4_to_v5(c)),
            LegacyConfig::V5(c) => LegacyConfig::V6(v5_to_v6(c)),
            LegacyConfig::V6(c) => LegacyConfig::V7(v6_to_v7(c)),
            LegacyConfig::V7(c) => LegacyConfig::V8(v7_to_v8(c)),
            LegacyConfig::V8(c) => LegacyConfig::V9(v8_to_v9(c)),
            LegacyConfig::V9(c) => LegacyConfig::V10(v9_to_v10(c)),
            LegacyConfig::V10(c) => LegacyConfig::V10(c),
        }
    }
}

/// Run the upgrade chain to completion.
pub fn upgrade_to_current(mut cfg: LegacyConfig) -> ConfigFile {
    loop {
        if let LegacyConfig::V10(current) = cfg {
            return current;
        }
        let from = cfg.version();
        cfg = cfg.upgrade();
        info!("migrated config from version `{}` to version `{}`", from, cfg.version());
    }
}

/// Upgrade a pre-6 config to version 6 and repair the glob and bare host
/// keys that the `5 -> 6` step leaves behind. Later versions pass through.
fn upgrade_through_v6(mut cfg: LegacyConfig) -> MigrationResult<LegacyConfig> {
    use LegacyConfig::*;
    if !matches!(cfg, V1(_) | V101(_) | V2(_) | V3(_) | V4(_) | V5(_)) {
        return Ok(cfg);
    }
    loop {
        cfg = match cfg {
            V6(v6) => {
                let globs = fix_config_v6_globs(v6)?;
                return Ok(V6(fix_config_v6_hosts(globs.config).config));
            }
            older => older.upgrade(),
        };
    }
}

/// Decode `data` through the version probe, apply fixers, then upgrade.
pub fn migrate_bytes(data: &[u8]) -> MigrationResult<MigrationOutcome> {
    let probe: AnyVersion = serde_json::from_slice(data)?;
    let from_version = probe.version;

    let mut fixed = false;
    let cfg = match from_version.as_str() {
        "3" => {
            let broken: BrokenConfigV3 = serde_json::from_slice(data)?;
            let result = fix_config_v3(broken);
            let v3 = if result.is_mutated {
                info!("fixed broken config for version `3`");
                fixed = true;
                result.config
            } else {
                serde_json::from_slice(data)?
            };
            upgrade_through_v6(LegacyConfig::V3(v3))?
        }
        "6" => {
            let v6: ConfigV5 = serde_json::from_slice(data)?;
            let globs = fix_config_v6_globs(v6)?;
            let hosts = fix_config_v6_hosts(globs.config);
            fixed = globs.is_mutated || hosts.is_mutated;
            LegacyConfig::V6(hosts.config)
        }
        other => {
            let cfg = LegacyConfig::decode(other, data)?
                .ok_or_else(|| MigrationError::UnknownVersion(other.to_string()))?;
            upgrade_through_v6(cfg)?
        }
    };

    let changed = fixed || cfg.version() != CONFIG_VERSION;
    Ok(MigrationOutcome {
        from_version,
        config: upgrade_to_current(cfg),
        changed,
    })
}

/// Migrate the config file at `path` in place.
///
/// Returns `Ok(None)` when there is no file yet. The file is rewritten
/// only when the outcome reports a change.
pub async fn migrate_config_file(path: &Path) -> MigrationResult<Option<MigrationOutcome>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let outcome = migrate_bytes(&data)?;
    if outcome.changed {
        write_config_atomic(path, &outcome.config).await?;
        info!(
            "successfully migrated {} from version `{}` to version `{}`",
            path.display(),
            outcome.from_version,
            CONFIG_VERSION
        );
    } else {
        debug!("config {} is current", path.display());
    }
    Ok(Some(outcome))
}
