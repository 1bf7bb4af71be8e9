//! Printable results of alias commands, as text or JSON lines.

use crate::{errors::AppError, models::alias::AliasEntry};
use serde::Serialize;
use std::{
    fmt,
    io::{self, Write},
};

/// Which command produced a message; decides the text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOp {
    Set,
    /// `config host add`
    Add,
    Remove,
    List,
    Import,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AliasMessage {
    pub status: &'static str,
    #[serde(skip)]
    pub op: AliasOp,
    pub alias: String,
    #[serde(rename = "URL", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Deprecated spelling of `path`, used by `config host list`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lookup: String,
    /// Set when `alias set` found the alias already configured.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unchanged: bool,
}

impl AliasMessage {
    pub fn new(op: AliasOp, alias: &str, entry: &AliasEntry) -> Self {
        Self {
            status: "success",
            op,
            alias: alias.to_string(),
            url: entry.url.clone(),
            access_key: entry.access_key.clone(),
            secret_key: entry.secret_key.clone(),
            session_token: entry.session_token.clone(),
            api: entry.api.to_string(),
            path: entry.path.to_string(),
            lookup: String::new(),
            unchanged: false,
        }
    }

    /// Report `path` under the deprecated `lookup` key.
    pub fn with_lookup(mut self) -> Self {
        self.lookup = std::mem::take(&mut self.path);
        self
    }

    pub fn unchanged(mut self) -> Self {
        self.unchanged = true;
        self
    }

    /// Hide the keys and signature of entries that have no credentials.
    pub fn blank_anonymous(mut self) -> Self {
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            self.access_key.clear();
            self.secret_key.clear();
            self.api.clear();
        }
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for AliasMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = self.alias.trim_end();
        match self.op {
            AliasOp::Set | AliasOp::Add if self.unchanged => {
                write!(f, "Alias `{}` already exists, left unchanged.", alias)
            }
            AliasOp::Set | AliasOp::Add => write!(f, "Added `{}` successfully.", alias),
            AliasOp::Import => write!(f, "Imported `{}` successfully.", alias),
            AliasOp::Remove => write!(f, "Removed `{}` successfully.", alias),
            AliasOp::List => {
                writeln!(f, "{}", self.alias)?;
                writeln!(f, "  URL       : {}", self.url)?;
                writeln!(f, "  AccessKey : {}", self.access_key)?;
                writeln!(f, "  SecretKey : {}", self.secret_key)?;
                writeln!(f, "  API       : {}", self.api)?;
                if self.lookup.is_empty() {
                    write!(f, "  Path      : {}", self.path)
                } else {
                    write!(f, "  Lookup    : {}", self.lookup)
                }
            }
        }
    }
}

/// Pad alias names to a common width for text listings.
pub fn align_aliases(messages: &mut [AliasMessage]) {
    let width = messages.iter().map(|m| m.alias.len()).max().unwrap_or(0);
    for msg in messages.iter_mut() {
        msg.alias = format!("{:<width$}", msg.alias);
    }
}

/// Render `messages` to `out`, one per line in JSON mode.
pub fn write_messages<W: Write>(
    out: &mut W,
    messages: &[AliasMessage],
    json: bool,
) -> Result<(), AppError> {
    let io_err = |err: io::Error| AppError::io(format!("unable to write output: {}", err));
    for msg in messages {
        if json {
            let line = msg
                .to_json()
                .map_err(|err| AppError::io(format!("unable to encode output: {}", err)))?;
            writeln!(out, "{}", line).map_err(io_err)?;
        } else {
            writeln!(out, "{}", msg).map_err(io_err)?;
        }
    }
    Ok(())
}

/// Print `messages` to stdout.
pub fn print_messages(mut messages: Vec<AliasMessage>, json: bool) -> Result<(), AppError> {
    if !json && messages.iter().all(|m| m.op == AliasOp::List) {
        align_aliases(&mut messages);
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_messages(&mut out, &messages, json)
}

/// Print a failure the way the current output mode expects.
pub fn print_error(err: &AppError, json: bool) {
    if json {
        println!("{}", err.to_json());
    } else {
        eprintln!("mc: <ERROR> {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alias::{PathStyle, SignatureVersion};

    fn entry() -> AliasEntry {
        AliasEntry::new("http://localhost:9000", "minioadmin", "minioadmin")
            .with_api(SignatureVersion::V4)
            .with_path(PathStyle::Auto)
    }

    #[test]
    fn json_uses_wire_names() {
        let msg = AliasMessage::new(AliasOp::Set, "myminio", &entry());
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["alias"], "myminio");
        assert_eq!(value["URL"], "http://localhost:9000");
        assert_eq!(value["accessKey"], "minioadmin");
        assert_eq!(value["api"], "S3v4");
        assert_eq!(value["path"], "auto");
        assert!(value.get("unchanged").is_none());
        assert!(value.get("lookup").is_none());
    }

    #[test]
    fn anonymous_entries_are_blanked() {
        let anon = AliasEntry::new("http://localhost:9000", "", "");
        let msg = AliasMessage::new(AliasOp::List, "local", &anon).blank_anonymous();
        assert!(msg.access_key.is_empty());
        assert!(msg.api.is_empty());
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert!(value.get("api").is_none());
    }

    #[test]
    fn text_listing_is_aligned() {
        let mut msgs = vec![
            AliasMessage::new(AliasOp::List, "s3", &entry()),
            AliasMessage::new(AliasOp::List, "myminio", &entry()),
        ];
        align_aliases(&mut msgs);
        let mut out = Vec::new();
        write_messages(&mut out, &msgs, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("s3     \n  URL       : http://localhost:9000\n"));
        assert!(text.contains("  Path      : auto\n"));
    }

    #[test]
    fn unchanged_set_is_reported() {
        let msg = AliasMessage::new(AliasOp::Set, "myminio", &entry()).unchanged();
        assert_eq!(
            msg.to_string(),
            "Alias `myminio` already exists, left unchanged."
        );
    }
}
