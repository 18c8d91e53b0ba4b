//! Boundary between the ledger and whatever transport drives it. Requests
//! come in as JSON lines, responses go to a caller supplied printer and the
//! final balances are written as CSV.

use std::io::{BufRead, Write};

use crate::shared::SharedLedger;
use anyhow::Result;
use api::{Response, handle};
use csv_printer::print_accounts;
use request_parser::{JsonRequestParser, RequestError};
pub mod api;
pub mod csv_printer;
pub mod request_parser;

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub ledger: SharedLedger,
    pub response_printer: Box<dyn FnMut(u64, &Response)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: BufRead,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = JsonRequestParser::new(self.input);

        for (line, request) in parser {
            let response = match request {
                Ok(request) => handle(&self.ledger, request),
                Err(RequestError::Json(err)) => Response::bad_request(err.to_string()),
                Err(err @ RequestError::Io(_)) => {
                    anyhow::bail!("Line {line}: {err}")
                }
            };
            if !response.status.is_success() {
                tracing::debug!(line, status = response.status.code(), "Request rejected");
            }
            (self.response_printer)(line, &response);
        }

        print_accounts(self.output, self.ledger.accounts())
    }
}
