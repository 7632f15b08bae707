//! Bet record and its wire serialization.

use crate::error::{LottoError, Result};

/// Number of leading fields a source row must carry.
pub const BET_FIELDS: usize = 5;

/// One bet placed at an agency. Immutable; compared by field equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    pub first_name: String,
    pub last_name: String,
    /// National identity document number.
    pub document: String,
    pub birthdate: String,
    pub number: String,
}

impl Bet {
    /// Build a bet from the ordered fields of a source row.
    /// Extra trailing fields are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Bet> {
        match fields {
            [first_name, last_name, document, birthdate, number, ..] => Ok(Bet {
                first_name: first_name.as_ref().to_owned(),
                last_name: last_name.as_ref().to_owned(),
                document: document.as_ref().to_owned(),
                birthdate: birthdate.as_ref().to_owned(),
                number: number.as_ref().to_owned(),
            }),
            _ => Err(LottoError::RecordParse(format!(
                "expected at least {BET_FIELDS} fields, got {}",
                fields.len()
            ))),
        }
    }

    /// Wire form for one record, tagged with the submitting agency.
    pub fn serialize(&self, agency: &str) -> String {
        format!(
            "{{agency:{},nombre:{},apellido:{},dni:{},nacimiento:{},numero:{}}}",
            agency, self.first_name, self.last_name, self.document, self.birthdate, self.number
        )
    }
}
