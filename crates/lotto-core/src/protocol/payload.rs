//! Brace-delimited payload grammar.
//!
//! Requests:
//! - batch: `{agency:A,nombre:N,apellido:L,dni:D,nacimiento:B,numero:M}` joined with `|`
//! - finished / ask-for-winners: `{agency:A}`
//!
//! Responses are parsed once, right after receipt, into [`Reply`] so that
//! protocol code matches on variants instead of strings.

use crate::bet::Bet;

/// Separator between serialized records in a batch payload.
pub const RECORD_SEPARATOR: &str = "|";

/// Join the serialized bets of one batch into a single payload.
pub fn batch_payload(agency: &str, bets: &[Bet]) -> String {
    let parts: Vec<String> = bets.iter().map(|b| b.serialize(agency)).collect();
    parts.join(RECORD_SEPARATOR)
}

/// Payload shared by FINISHED and ASK_FOR_WINNERS.
pub fn agency_payload(agency: &str) -> String {
    format!("{{agency:{agency}}}")
}

/// Parsed response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `{result:success}`
    Success,
    /// `{result:failure}`
    Failure,
    /// `{result:in_progress}`: the draw has not happened yet.
    Pending,
    /// `{ganadores:a|b|...}`, empty list for `{ganadores:}`.
    Winners(Vec<String>),
    /// Anything else, kept verbatim (lossy UTF-8) for reporting.
    Malformed(String),
}

impl Reply {
    pub fn parse(payload: &[u8]) -> Reply {
        let Ok(text) = std::str::from_utf8(payload) else {
            return Reply::Malformed(String::from_utf8_lossy(payload).into_owned());
        };

        let Some(inner) = text.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            return Reply::Malformed(text.to_owned());
        };

        match inner.split_once(':') {
            Some(("result", "success")) => Reply::Success,
            Some(("result", "failure")) => Reply::Failure,
            Some(("result", "in_progress")) => Reply::Pending,
            Some(("ganadores", "")) => Reply::Winners(Vec::new()),
            Some(("ganadores", list)) => {
                Reply::Winners(list.split(RECORD_SEPARATOR).map(str::to_owned).collect())
            }
            _ => Reply::Malformed(text.to_owned()),
        }
    }
}
