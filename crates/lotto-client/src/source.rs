//! Bet records read from a CSV source.
//!
//! Rows are `nombre,apellido,dni,nacimiento,numero[,...]` with RFC 4180
//! quoting, so a quoted field may hold commas, doubled quotes or line breaks.
//! Rows that cannot be turned into a bet are skipped with a warning; only read
//! failures of the underlying stream are errors.

use std::io;

use async_trait::async_trait;
use csv_async::{AsyncReader, AsyncReaderBuilder, ByteRecord};
use tokio::fs::File;
use tokio::io::AsyncRead;

use lotto_core::error::{LottoError, Result};
use lotto_core::Bet;

#[async_trait]
pub trait BetSource: Send {
    /// Up to `max` bets, in source order. Empty means the source is exhausted.
    async fn next_batch(&mut self, max: usize) -> Result<Vec<Bet>>;
}

pub struct CsvSource<R> {
    reader: AsyncReader<R>,
    record_no: usize,
    record: ByteRecord,
}

impl CsvSource<File> {
    pub async fn open(path: &str) -> Result<Self> {
        let file = File::open(path).await.map_err(|e| {
            tracing::error!(action = "open_csv", result = "fail", path, error = %e);
            LottoError::Source(e)
        })?;
        Ok(Self::new(file))
    }
}

impl<R: AsyncRead + Unpin + Send> CsvSource<R> {
    pub fn new(reader: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .create_reader(reader);
        Self {
            reader,
            record_no: 0,
            record: ByteRecord::new(),
        }
    }

    /// Next usable bet, or `None` at end of input.
    async fn next_bet(&mut self) -> Result<Option<Bet>> {
        loop {
            let more = self
                .reader
                .read_byte_record(&mut self.record)
                .await
                .map_err(|e| LottoError::Source(io::Error::new(io::ErrorKind::Other, e)))?;
            if !more {
                return Ok(None);
            }
            self.record_no += 1;

            match parse_record(&self.record) {
                Ok(Some(bet)) => return Ok(Some(bet)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        action = "read_csv",
                        result = "skip",
                        reason = "parse_error",
                        record = self.record_no,
                        error = %e
                    );
                }
            }
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> BetSource for CsvSource<R> {
    async fn next_batch(&mut self, max: usize) -> Result<Vec<Bet>> {
        let mut bets = Vec::with_capacity(max);
        while bets.len() < max {
            match self.next_bet().await? {
                Some(bet) => bets.push(bet),
                None => break,
            }
        }
        Ok(bets)
    }
}

/// `Ok(None)` for blank records.
fn parse_record(record: &ByteRecord) -> Result<Option<Bet>> {
    if record.iter().all(|field| field.iter().all(u8::is_ascii_whitespace)) {
        return Ok(None);
    }
    let fields = record
        .iter()
        .map(std::str::from_utf8)
        .collect::<std::result::Result<Vec<&str>, _>>()
        .map_err(|e| LottoError::RecordParse(format!("invalid utf-8: {e}")))?;
    Bet::from_fields(&fields).map(Some)
}
