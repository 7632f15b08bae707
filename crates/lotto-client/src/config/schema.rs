use std::time::Duration;

use serde::Deserialize;
use lotto_core::error::{LottoError, Result};

/// Characters that would break the brace-delimited payload grammar.
const RESERVED_AGENCY_CHARS: [char; 5] = ['{', '}', ',', ':', '|'];

const MAX_BATCH_AMOUNT: usize = 1000;
const MAX_PERIOD_MS: u64 = 600_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    /// Agency identifier, also settable through `CLI_ID`.
    #[serde(default)]
    pub agency: String,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub batch: BatchSection,

    #[serde(default, rename = "loop")]
    pub cadence: LoopSection,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub source: SourceSection,

    #[serde(default)]
    pub log: LogSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LottoError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.agency.is_empty() {
            return Err(LottoError::Config("agency must not be empty".into()));
        }
        if self.agency.contains(RESERVED_AGENCY_CHARS) {
            return Err(LottoError::Config(
                "agency must not contain any of { } , : |".into(),
            ));
        }
        if self.server.address.is_empty() {
            return Err(LottoError::Config("server.address must not be empty".into()));
        }
        if !(1..=MAX_BATCH_AMOUNT).contains(&self.batch.max_amount) {
            return Err(LottoError::Config(format!(
                "batch.max_amount must be between 1 and {MAX_BATCH_AMOUNT}"
            )));
        }
        if self.cadence.amount == 0 {
            return Err(LottoError::Config("loop.amount must be at least 1".into()));
        }
        if self.cadence.period_ms > MAX_PERIOD_MS || self.poll.period_ms > MAX_PERIOD_MS {
            return Err(LottoError::Config(format!(
                "loop.period_ms and poll.period_ms must be at most {MAX_PERIOD_MS}"
            )));
        }
        if self.poll.max_attempts == 0 {
            return Err(LottoError::Config("poll.max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Deployment overrides from `CLI_*` environment variables.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("CLI_ID") {
            self.agency = v;
        }
        if let Some(v) = lookup("CLI_SERVER_ADDRESS") {
            self.server.address = v;
        }
        if let Some(v) = lookup("CLI_LOOP_AMOUNT") {
            self.cadence.amount = parse_override("CLI_LOOP_AMOUNT", &v)?;
        }
        if let Some(v) = lookup("CLI_LOOP_PERIOD") {
            self.cadence.period_ms = parse_override("CLI_LOOP_PERIOD", &v)?;
        }
        if let Some(v) = lookup("CLI_BATCH_MAXAMOUNT") {
            self.batch.max_amount = parse_override("CLI_BATCH_MAXAMOUNT", &v)?;
        }
        if let Some(v) = lookup("CLI_LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = lookup("CLI_DATA_PATH") {
            self.source.path = v;
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, v: &str) -> Result<T> {
    v.trim()
        .parse()
        .map_err(|_| LottoError::Config(format!("{key}: invalid value {v:?}")))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

/// How records are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// BATCH messages, then FINISHED and winners polling.
    #[default]
    Batch,
    /// Legacy: one BET message per record, bounded by `loop.amount`.
    Single,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    #[serde(default = "default_batch_amount")]
    pub max_amount: usize,

    #[serde(default)]
    pub mode: SubmitMode,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            max_amount: default_batch_amount(),
            mode: SubmitMode::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoopSection {
    #[serde(default = "default_loop_amount")]
    pub amount: u32,

    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

impl Default for LoopSection {
    fn default() -> Self {
        Self {
            amount: default_loop_amount(),
            period_ms: default_period_ms(),
        }
    }
}

impl LoopSection {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            max_attempts: default_poll_attempts(),
            period_ms: default_period_ms(),
        }
    }
}

impl PollSection {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    #[serde(default = "default_source_path")]
    pub path: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            path: default_source_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_address() -> String {
    "server:12345".into()
}
fn default_batch_amount() -> usize {
    50
}
fn default_loop_amount() -> u32 {
    5
}
fn default_period_ms() -> u64 {
    5000
}
fn default_poll_attempts() -> u32 {
    10
}
fn default_source_path() -> String {
    "/data/agency.csv".into()
}
fn default_log_level() -> String {
    "info".into()
}
