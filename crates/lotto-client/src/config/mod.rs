//! Client config loader (strict parsing, env overrides, validation).

pub mod schema;

use std::fs;

use lotto_core::error::{LottoError, Result};

pub use schema::{
    BatchSection, ClientConfig, LogSection, LoopSection, PollSection, ServerSection,
    SourceSection, SubmitMode,
};

/// Read the YAML file, apply `CLI_*` overrides from the process environment, validate.
pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LottoError::Config(format!("read config failed ({path}): {e}")))?;
    load_with_overrides(&s, |key| std::env::var(key).ok())
}

/// Parse and validate without looking at the environment.
pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    load_with_overrides(s, |_| None)
}

/// Parse, apply overrides from `lookup`, then validate.
pub fn load_with_overrides(s: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
    let mut cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| LottoError::Config(format!("invalid yaml: {e}")))?;
    cfg.apply_overrides(lookup)?;
    cfg.validate()?;
    Ok(cfg)
}
