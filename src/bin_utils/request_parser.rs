use std::io::{self, BufRead, Lines};

use thiserror::Error;

use super::api::Request;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to read request: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a stream of requests, one JSON object per line. Blank lines are
/// skipped, items carry their 1-based line number.
pub struct JsonRequestParser<R> {
    lines: Lines<R>,
    line: u64,
}

impl<R> JsonRequestParser<R>
where
    R: BufRead,
{
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
            line: 0,
        }
    }
}

impl<R> Iterator for JsonRequestParser<R>
where
    R: BufRead,
{
    type Item = (u64, Result<Request, RequestError>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line += 1;
            let text = match line {
                Ok(text) => text,
                Err(err) => return Some((self.line, Err(err.into()))),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some((self.line, serde_json::from_str(&text).map_err(Into::into)));
        }
    }
}
