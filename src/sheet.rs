//! Side-by-side sheet layout.
//!
//! Places the bank feed, the reconciled ledger and the extras on one grid,
//! each block separated by two spacer columns, with a header row, totals rows
//! and per-cell highlights. Writers only have to walk the grid.

use crate::report::{Highlight, Report};
use crate::types::{BankEntry, LedgerEntry, BANK_COLUMNS, LEDGER_COLUMNS};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Number of blank columns between two blocks.
pub const SPACER_WIDTH: usize = 2;

/// Label placed in the column before the extras block.
pub const EXTRAS_LABEL: &str = "Extras from QB";

/// Label of the totals rows.
pub const TOTAL_LABEL: &str = "TOTAL";

/// Name of the single worksheet.
pub const SHEET_TITLE: &str = "Reconciliation";

/// Headers whose column width is capped.
const CAPPED_HEADERS: [&str; 2] = ["Split", "Description"];

/// Value held by a cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
}

impl CellValue {
    fn text(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }

    fn optional_text(value: Option<&str>) -> Self {
        value.map(Self::text).unwrap_or_default()
    }

    fn optional_number(value: Option<Decimal>) -> Self {
        value.map(CellValue::Number).unwrap_or_default()
    }

    fn optional_date(value: Option<NaiveDate>) -> Self {
        value.map(CellValue::Date).unwrap_or_default()
    }

    /// Plain-text rendering used by the CSV writer and for column widths.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format!("{:.2}", n),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub highlight: Option<Highlight>,
}

/// A laid-out report. Rows and columns are 1-based, as in a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub title: String,
    grid: Vec<Vec<Cell>>,
    column_widths: Vec<usize>,
    /// Rows kept in view while scrolling.
    pub frozen_rows: usize,
}

/// First column of each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockColumns {
    pub bank: usize,
    pub ledger: usize,
    pub extras: usize,
}

impl Default for BlockColumns {
    fn default() -> Self {
        let bank = 1;
        let ledger = bank + BANK_COLUMNS.len() + SPACER_WIDTH;
        let extras = ledger + LEDGER_COLUMNS.len() + SPACER_WIDTH;
        Self { bank, ledger, extras }
    }
}

impl Sheet {
    /// Lay out `report`. Free-text columns are capped at `max_text_width`.
    pub fn layout(report: &Report, max_text_width: usize) -> Self {
        let cols = BlockColumns::default();
        let mut sheet = Sheet {
            title: SHEET_TITLE.to_string(),
            grid: Vec::new(),
            column_widths: Vec::new(),
            frozen_rows: 1,
        };

        for (i, name) in BANK_COLUMNS.iter().enumerate() {
            sheet.set(1, cols.bank + i, CellValue::text(name));
        }
        for (i, name) in LEDGER_COLUMNS.iter().enumerate() {
            sheet.set(1, cols.ledger + i, CellValue::text(name));
        }
        if !report.extras.is_empty() {
            sheet.set(1, cols.extras - 1, CellValue::text(EXTRAS_LABEL));
            for (i, name) in LEDGER_COLUMNS.iter().enumerate() {
                sheet.set(1, cols.extras + i, CellValue::text(name));
            }
        }

        for (r, row) in report.bank.iter().enumerate() {
            sheet.put_row(r + 2, cols.bank, bank_values(&row.entry), row.highlight);
        }
        for (r, row) in report.ledger.iter().enumerate() {
            sheet.put_row(r + 2, cols.ledger, ledger_values(&row.entry.entry), row.highlight);
        }
        for (r, row) in report.extras.iter().enumerate() {
            sheet.put_row(r + 2, cols.extras, ledger_values(&row.entry), row.highlight);
        }

        let spacer_start = cols.bank + BANK_COLUMNS.len();
        for r in 1..=sheet.max_row() {
            for c in spacer_start..spacer_start + SPACER_WIDTH {
                sheet.cell_mut(r, c).highlight = Some(Highlight::Spacer);
            }
        }

        let bank_total_row = report.bank.len() + 2;
        sheet.set(bank_total_row, cols.bank + column_index(&BANK_COLUMNS, "Description"), CellValue::text(TOTAL_LABEL));
        sheet.set(
            bank_total_row,
            cols.bank + column_index(&BANK_COLUMNS, "Credit"),
            CellValue::Number(report.totals.bank_credit),
        );

        let ledger_total_row = report.ledger.len() + 2;
        sheet.set(ledger_total_row, cols.ledger + column_index(&LEDGER_COLUMNS, "Memo"), CellValue::text(TOTAL_LABEL));
        sheet.set(
            ledger_total_row,
            cols.ledger + column_index(&LEDGER_COLUMNS, "Amount"),
            CellValue::Number(report.totals.ledger_amount),
        );

        sheet.column_widths = sheet.measure_columns(max_text_width);
        sheet
    }

    pub fn max_row(&self) -> usize {
        self.grid.len()
    }

    pub fn max_column(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at (`row`, `column`), if it was ever written.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.grid.get(row.checked_sub(1)?)?.get(column.checked_sub(1)?)
    }

    /// Rendered value at (`row`, `column`); empty for unwritten cells.
    pub fn value(&self, row: usize, column: usize) -> String {
        self.cell(row, column).map(|c| c.value.render()).unwrap_or_default()
    }

    /// Rows as written, top to bottom. Rows may differ in length.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.grid.iter().map(Vec::as_slice)
    }

    /// Width of `column` in characters.
    pub fn column_width(&self, column: usize) -> usize {
        column
            .checked_sub(1)
            .and_then(|i| self.column_widths.get(i))
            .copied()
            .unwrap_or(0)
    }

    fn cell_mut(&mut self, row: usize, column: usize) -> &mut Cell {
        if self.grid.len() < row {
            self.grid.resize_with(row, Vec::new);
        }
        let cells = &mut self.grid[row - 1];
        if cells.len() < column {
            cells.resize_with(column, Cell::default);
        }
        &mut cells[column - 1]
    }

    fn set(&mut self, row: usize, column: usize, value: CellValue) {
        self.cell_mut(row, column).value = value;
    }

    fn put_row(&mut self, row: usize, first_column: usize, values: Vec<CellValue>, highlight: Option<Highlight>) {
        for (i, value) in values.into_iter().enumerate() {
            let cell = self.cell_mut(row, first_column + i);
            cell.value = value;
            if highlight.is_some() {
                cell.highlight = highlight;
            }
        }
    }

    /// Longest rendered value plus two, capped for free-text columns.
    fn measure_columns(&self, max_text_width: usize) -> Vec<usize> {
        (1..=self.max_column())
            .map(|column| {
                let longest = (1..=self.max_row())
                    .map(|row| self.value(row, column).chars().count())
                    .max()
                    .unwrap_or(0);
                let width = longest + 2;
                let header = self.value(1, column);
                if CAPPED_HEADERS.contains(&header.as_str()) {
                    width.min(max_text_width)
                } else {
                    width
                }
            })
            .collect()
    }
}

fn column_index(columns: &[&str], name: &str) -> usize {
    columns.iter().position(|c| *c == name).unwrap_or(0)
}

fn bank_values(entry: &BankEntry) -> Vec<CellValue> {
    vec![
        CellValue::optional_date(entry.post_date),
        CellValue::optional_text(entry.check.as_deref()),
        CellValue::text(&entry.description),
        CellValue::optional_number(entry.debit.value()),
        CellValue::optional_number(entry.credit.value()),
    ]
}

fn ledger_values(entry: &LedgerEntry) -> Vec<CellValue> {
    vec![
        CellValue::text(&entry.entry_type),
        CellValue::optional_date(entry.date),
        CellValue::optional_text(entry.num.as_deref()),
        CellValue::optional_text(entry.name.as_deref()),
        CellValue::optional_text(entry.memo.as_deref()),
        CellValue::text(&entry.cleared),
        CellValue::optional_text(entry.split.as_deref()),
        CellValue::optional_number(entry.amount.value()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::reconcile::Reconciler;
    use crate::types::Amount;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bank(post_date: &str, description: &str, credit: &str) -> BankEntry {
        BankEntry {
            post_date: Some(date(post_date)),
            check: None,
            description: description.into(),
            debit: Amount::Unparseable,
            credit: Amount::new(dec(credit)),
        }
    }

    fn ledger(split: &str, amount: &str) -> LedgerEntry {
        LedgerEntry {
            entry_type: "Deposit".into(),
            date: Some(date("2024-01-02")),
            num: None,
            name: None,
            memo: None,
            cleared: String::new(),
            split: Some(split.into()),
            amount: Amount::new(dec(amount)),
        }
    }

    fn sheet(bank: &[BankEntry], ledger: &[LedgerEntry], width: usize) -> Sheet {
        let options = ReconcileOptions::new().unwrap();
        let report = Report::assemble(Reconciler::new(&options).reconcile(bank, ledger));
        Sheet::layout(&report, width)
    }

    #[test]
    fn test_block_columns() {
        let cols = BlockColumns::default();
        assert_eq!((cols.bank, cols.ledger, cols.extras), (1, 8, 18));
    }

    #[test]
    fn test_headers_and_totals() {
        let bank = vec![bank("2024-01-02", "Deposit", "20"), bank("2024-01-05", "Coffee", "50")];
        let ledger = vec![ledger("2024-7", "20"), ledger("Misc refund", "20")];
        let sheet = sheet(&bank, &ledger, 60);

        assert_eq!(sheet.value(1, 1), "Post Date");
        assert_eq!(sheet.value(1, 5), "Credit");
        assert_eq!(sheet.value(1, 8), "Type");
        assert_eq!(sheet.value(1, 15), "Amount");
        assert_eq!(sheet.value(1, 17), EXTRAS_LABEL);
        assert_eq!(sheet.value(1, 18), "Type");

        // Bank: 20, 50 then totals on row 4.
        assert_eq!(sheet.value(2, 5), "20.00");
        assert_eq!(sheet.value(4, 3), TOTAL_LABEL);
        assert_eq!(sheet.value(4, 5), "70.00");

        // Ledger: kept 20 and added 50, totals on row 4.
        assert_eq!(sheet.value(2, 14), "2024-7");
        assert_eq!(sheet.value(3, 8), "Bank-Add");
        assert_eq!(sheet.value(4, 12), TOTAL_LABEL);
        assert_eq!(sheet.value(4, 15), "70.00");

        // Extras block.
        assert_eq!(sheet.value(2, 24), "Misc refund");
        assert_eq!(sheet.cell(2, 18).unwrap().highlight, Some(Highlight::Removed));
        assert_eq!(sheet.cell(2, 25).unwrap().highlight, Some(Highlight::Removed));
    }

    #[test]
    fn test_no_extras_block_without_extras() {
        let sheet = sheet(&[bank("2024-01-02", "Deposit", "20")], &[ledger("2024-7", "20")], 60);
        assert_eq!(sheet.value(1, 17), "");
        assert_eq!(sheet.value(1, 18), "");
        assert_eq!(sheet.max_column(), 15);
    }

    #[test]
    fn test_highlights_span_block() {
        let sheet = sheet(&[bank("2024-01-05", "Coffee", "50")], &[], 60);

        for column in 1..=5 {
            assert_eq!(sheet.cell(2, column).unwrap().highlight, Some(Highlight::CleanAdded));
        }
        for column in 8..=15 {
            assert_eq!(sheet.cell(2, column).unwrap().highlight, Some(Highlight::CleanAdded));
        }
        assert_eq!(sheet.cell(1, 1).unwrap().highlight, None);
    }

    #[test]
    fn test_spacer_columns() {
        let sheet = sheet(&[bank("2024-01-05", "Coffee", "50")], &[], 60);
        assert_eq!(sheet.cell(1, 6).unwrap().highlight, Some(Highlight::Spacer));
        assert_eq!(sheet.cell(2, 7).unwrap().highlight, Some(Highlight::Spacer));
        assert_eq!(sheet.value(2, 6), "");
    }

    #[test]
    fn test_free_text_width_capped() {
        let long = "x".repeat(80);
        let sheet = sheet(&[bank("2024-01-05", &long, "50")], &[], 30);

        assert_eq!(sheet.column_width(3), 30);
        // Split of the added row holds the same description and is capped too.
        assert_eq!(sheet.column_width(14), 30);
        // "Post Date" vs "2024-01-05".
        assert_eq!(sheet.column_width(1), 12);
        assert_eq!(sheet.column_width(99), 0);
    }
}
