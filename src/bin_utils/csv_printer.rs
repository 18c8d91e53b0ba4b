use std::io::Write;

use anyhow::Context;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::account::{Account, AccountId, Direction};

/// One line of the balance sheet.
#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub id: AccountId,
    pub name: Option<String>,
    pub direction: Direction,
    pub balance: Decimal,
}

impl From<Account> for AccountRow {
    fn from(acc: Account) -> Self {
        Self {
            id: acc.id,
            name: acc.name,
            direction: acc.direction,
            balance: acc.balance,
        }
    }
}

/// Writes the balance sheet, header first, rows in the given order.
pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl IntoIterator<Item = Account>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        let id = acc.id.clone();
        writer
            .serialize(AccountRow::from(acc))
            .with_context(|| format!("Failed to write account `{id}` to CSV"))?;
    }
    // csv buffers internally, nothing reaches `output` before the flush
    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
