//! Machine-readable output for `--json`
//!
//! Every command prints one JSON envelope on stdout:
//! `{"ok": true, "command": "...", "data": ...}` or
//! `{"ok": false, "command": "...", "error": "..."}`.

use serde::Serialize;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `UCE_QUIET=1` suppresses progress bars and decorative output
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("UCE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        *self == OutputMode::Human
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

pub fn success_json<T: Serialize>(command: &str, data: T) -> anyhow::Result<String> {
    let envelope = Envelope {
        ok: true,
        command,
        data: Some(data),
        error: None,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn error_json(command: &str, message: &str) -> anyhow::Result<String> {
    let envelope: Envelope<'_, ()> = Envelope {
        ok: false,
        command,
        data: None,
        error: Some(message),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Print `data` as a JSON envelope; a no-op in human mode
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", success_json(command, data)?);
    }
    Ok(())
}

pub fn emit_error(mode: OutputMode, command: &str, message: &str) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", error_json(command, message)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        let ok: serde_json::Value = serde_json::from_str(&success_json("parse", vec![1, 2]).unwrap()).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["command"], "parse");
        assert_eq!(ok["data"][1], 2);
        assert!(ok.get("error").is_none());

        let err: serde_json::Value = serde_json::from_str(&error_json("scan", "boom").unwrap()).unwrap();
        assert_eq!(err["ok"], false);
        assert_eq!(err["error"], "boom");
        assert!(err.get("data").is_none());
    }

    #[test]
    fn test_output_mode() {
        assert!(OutputMode::from_flag(false).is_human());
        assert!(!OutputMode::from_flag(true).is_human());
    }
}
