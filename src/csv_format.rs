//! CSV input tables and CSV report output.
//!
//! Inputs are matched by header name; every column of the fixed schema must be
//! present, extra columns are ignored. The report is written as a rectangular
//! grid mirroring the sheet layout.

use crate::error::{Error, Result};
use crate::sheet::Sheet;
use crate::types::{BankRecord, LedgerRecord, BANK_COLUMNS, LEDGER_COLUMNS};
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use tracing::{debug, warn};

/// Bank credit feed as read from CSV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BankTable {
    pub records: Vec<BankRecord>,
}

/// Accounting ledger as read from CSV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerTable {
    pub records: Vec<LedgerRecord>,
}

impl BankTable {
    /// Parse a bank feed from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use credit_recon::csv_format::BankTable;
    ///
    /// let mut file = File::open("bank.csv")?;
    /// let table = BankTable::from_read(&mut file)?;
    /// println!("{} bank rows", table.records.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let records = read_table(reader, "bank", &BANK_COLUMNS)?;
        Ok(BankTable { records })
    }
}

impl LedgerTable {
    /// Parse an accounting ledger export from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use credit_recon::csv_format::LedgerTable;
    ///
    /// let mut file = File::open("ledger.csv")?;
    /// let table = LedgerTable::from_read(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let records = read_table(reader, "ledger", &LEDGER_COLUMNS)?;
        Ok(LedgerTable { records })
    }
}

fn read_table<R, T>(reader: &mut R, table: &'static str, required: &[&str]) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_columns(&headers, table, required)?;

    let mut records = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let mut row = result?;
        if row.len() < headers.len() {
            warn!(table, row = index + 2, fields = row.len(), "short row padded with blank cells");
            while row.len() < headers.len() {
                row.push_field("");
            }
        }
        let record: T = row.deserialize(Some(&headers))?;
        records.push(record);
    }

    debug!(table, rows = records.len(), "read input table");
    Ok(records)
}

fn check_columns(headers: &StringRecord, table: &'static str, required: &[&str]) -> Result<()> {
    match required.iter().find(|column| !headers.iter().any(|h| h == **column)) {
        Some(column) => Err(Error::MissingColumn {
            table,
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Report grid written as CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvReport<'a> {
    pub sheet: &'a Sheet,
}

impl CsvReport<'_> {
    /// Write the grid to any destination implementing `Write`. Every row is
    /// padded to the full sheet width.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut csv_writer = Writer::from_writer(writer);
        let width = self.sheet.max_column();

        for row in self.sheet.rows() {
            let mut fields: Vec<String> = row.iter().map(|cell| cell.value.render()).collect();
            fields.resize(width, String::new());
            csv_writer.write_record(&fields)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BANK_CSV: &str = "\
Post Date,Check,Description,Debit,Credit
01/05/2024,,Coffee,,50.00
01/06/2024,101,Rent,1200.00,
";

    const LEDGER_CSV: &str = "\
Type,Date,Num,Name,Memo,Clr,Split,Amount,Balance
Deposit,01/02/2024,7,ACME,,,2024-7,20.00,20.00
Deposit,01/03/2024,,,,C,Misc refund,20.00,40.00
";

    #[test]
    fn test_read_bank() {
        let table = BankTable::from_read(&mut BANK_CSV.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].description, "Coffee");
        assert_eq!(table.records[0].credit, "50.00");
        assert_eq!(table.records[1].check, "101");
        assert_eq!(table.records[1].credit, "");
    }

    #[test]
    fn test_read_ledger_ignores_extra_columns() {
        let table = LedgerTable::from_read(&mut LEDGER_CSV.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].split, "2024-7");
        assert_eq!(table.records[1].cleared, "C");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let input = "Post Date,Description,Debit,Credit\n01/05/2024,Coffee,,50\n";
        match BankTable::from_read(&mut input.as_bytes()) {
            Err(Error::MissingColumn { table, column }) => {
                assert_eq!(table, "bank");
                assert_eq!(column, "Check");
            }
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let input = "type,Date,Num,Name,Memo,Clr,Split,Amount\n";
        assert!(matches!(
            LedgerTable::from_read(&mut input.as_bytes()),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let input = "Post Date,Check,Description,Debit,Credit\n01/05/2024,,Coffee\n";
        let table = BankTable::from_read(&mut input.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].description, "Coffee");
        assert_eq!(table.records[0].debit, "");
        assert_eq!(table.records[0].credit, "");
    }

    #[test]
    fn test_short_ledger_row_keeps_later_rows() {
        let input = "\
Type,Date,Num,Name,Memo,Clr,Split,Amount
Deposit,01/02/2024
Deposit,01/03/2024,,,,,Sales,20.00
";
        let table = LedgerTable::from_read(&mut input.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].amount, "");
        assert_eq!(table.records[1].amount, "20.00");
    }

    #[test]
    fn test_padded_headers_accepted() {
        let input = " Post Date , Check ,Description,Debit,Credit\n01/05/2024,,Coffee,,1\n";
        let table = BankTable::from_read(&mut input.as_bytes()).unwrap();
        assert_eq!(table.records[0].post_date, "01/05/2024");
    }
}
