//! The current on-disk schema of `config.json`.

use super::alias::{AliasEntry, PathStyle, SignatureVersion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this client.
pub const CONFIG_VERSION: &str = "10";

/// Placeholder credentials written for cloud defaults.
pub const DEFAULT_ACCESS_KEY: &str = "YOUR-ACCESS-KEY-HERE";
pub const DEFAULT_SECRET_KEY: &str = "YOUR-SECRET-KEY-HERE";

/// Public credentials of the MinIO demo server.
pub const PLAY_ACCESS_KEY: &str = "Q3AM3UQ867SPQQA43P2F";
pub const PLAY_SECRET_KEY: &str = "zuf+tfteSlswRu7BJ86wekitnifILbZam1KYY3TG";

/// Root object of a version `10` config file.
///
/// Aliases are kept in a `BTreeMap` so the file is always written in
/// lexical order and rewrites of unchanged data are byte-identical.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default)]
    pub aliases: BTreeMap<String, AliasEntry>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            aliases: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// A fresh config populated with the default aliases.
    pub fn with_defaults() -> Self {
        let mut cfg = Self::default();
        cfg.load_defaults();
        cfg
    }

    /// Insert `entry` under `alias` unless the alias already exists.
    ///
    /// Returns `true` when the entry was inserted.
    pub fn set_alias_if_absent(&mut self, alias: &str, entry: AliasEntry) -> bool {
        if self.aliases.contains_key(alias) {
            return false;
        }
        self.aliases.insert(alias.to_string(), entry);
        true
    }

    /// Add the stock aliases that are missing.
    pub fn load_defaults(&mut self) {
        self.set_alias_if_absent(
            "local",
            AliasEntry::new("http://localhost:9000", "", ""),
        );
        self.set_alias_if_absent(
            "s3",
            AliasEntry::new("https://s3.amazonaws.com", DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY)
                .with_path(PathStyle::Off),
        );
        self.set_alias_if_absent(
            "gcs",
            AliasEntry::new(
                "https://storage.googleapis.com",
                DEFAULT_ACCESS_KEY,
                DEFAULT_SECRET_KEY,
            )
            .with_api(SignatureVersion::V2)
            .with_path(PathStyle::Off),
        );
        self.set_alias_if_absent(
            "play",
            AliasEntry::new("https://play.min.io", PLAY_ACCESS_KEY, PLAY_SECRET_KEY),
        );
    }
}
