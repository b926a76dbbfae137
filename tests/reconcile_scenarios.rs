use credit_recon::csv_format::{BankTable, CsvReport, LedgerTable};
use credit_recon::normalize::normalize_ledger;
use credit_recon::spreadsheet_xml::XmlWorkbook;
use credit_recon::types::{MEMO_ADDED, MEMO_DUPLICATE};
use credit_recon::{
    reconcile_records, BankRecord, Highlight, LedgerRecord, ReconcileOptions, Report, Sheet,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::str::FromStr;

fn bank(post_date: &str, description: &str, credit: &str) -> BankRecord {
    BankRecord {
        post_date: post_date.into(),
        description: description.into(),
        credit: credit.into(),
        ..Default::default()
    }
}

fn ledger(date: &str, split: &str, amount: &str) -> LedgerRecord {
    LedgerRecord {
        entry_type: "Deposit".into(),
        date: date.into(),
        split: split.into(),
        amount: amount.into(),
        ..Default::default()
    }
}

fn run(bank: &[BankRecord], ledger: &[LedgerRecord]) -> Report {
    reconcile_records(bank, ledger, &ReconcileOptions::new().unwrap())
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn assert_counts_balanced(report: &Report) {
    let amounts: BTreeSet<Decimal> = report
        .bank
        .iter()
        .filter_map(|r| r.entry.credit.value())
        .chain(report.ledger.iter().filter_map(|r| r.entry.entry.amount.value()))
        .collect();
    for amount in amounts {
        assert_eq!(report.ledger_count(amount), report.bank_count(amount), "count mismatch at {}", amount);
    }
}

fn assert_sums_balanced(report: &Report, ledger: &[LedgerRecord]) {
    let eligible: Decimal = normalize_ledger(ledger)
        .iter()
        .filter_map(|e| e.amount.value())
        .sum();
    let added: Decimal = report
        .ledger
        .iter()
        .filter(|r| r.entry.is_synthetic())
        .filter_map(|r| r.entry.entry.amount.value())
        .sum();
    assert_eq!(report.totals.ledger_amount, eligible - report.totals.extras_amount + added);
}

#[test]
fn scenario_a_single_missing_credit() {
    let report = run(&[bank("2024-01-05", "Coffee", "50.00")], &[]);

    assert_eq!(report.ledger.len(), 1);
    let row = &report.ledger[0];
    assert!(row.entry.is_synthetic());
    assert_eq!(row.entry.entry.entry_type, "Bank-Add");
    assert_eq!(row.entry.entry.amount.value(), Some(dec("50.00")));
    assert_eq!(row.entry.entry.date.map(|d| d.to_string()).as_deref(), Some("2024-01-05"));
    assert_eq!(row.entry.entry.split.as_deref(), Some("Coffee"));
    assert_eq!(row.entry.entry.memo.as_deref(), Some(MEMO_ADDED));
    assert_eq!(row.highlight, Some(Highlight::CleanAdded));
}

#[test]
fn scenario_b_extra_without_file_reference_is_removed() {
    let ledger = vec![ledger("2024-01-02", "2024-7", "20.00"), ledger("2024-01-03", "Misc refund", "20.00")];
    let report = run(&[bank("2024-01-02", "Deposit", "20.00")], &ledger);

    assert_eq!(report.extras.len(), 1);
    assert_eq!(report.extras[0].entry.split.as_deref(), Some("Misc refund"));
    assert_eq!(report.ledger.len(), 1);
    assert_eq!(report.ledger[0].entry.entry.split.as_deref(), Some("2024-7"));
}

#[test]
fn scenario_b_order_does_not_change_choice() {
    let ledger = vec![ledger("2024-01-03", "Misc refund", "20.00"), ledger("2024-01-02", "2024-7", "20.00")];
    let report = run(&[bank("2024-01-02", "Deposit", "20.00")], &ledger);
    assert_eq!(report.extras[0].entry.split.as_deref(), Some("Misc refund"));
}

#[test]
fn scenario_c_two_credits_same_date() {
    let bank = vec![bank("2024-02-01", "Stripe payout", "15.00"), bank("2024-02-01", "Square payout", "15.00")];
    let report = run(&bank, &[]);

    assert_eq!(report.added_count(), 2);
    for row in &report.ledger {
        assert_eq!(row.entry.entry.memo.as_deref(), Some(MEMO_DUPLICATE));
        assert_eq!(row.highlight, Some(Highlight::Ambiguous));
    }
    assert!(report.bank.iter().all(|r| r.highlight == Some(Highlight::Ambiguous)));
}

#[test]
fn cleared_and_incomplete_ledger_rows_are_ignored() {
    let mut cleared = ledger("2024-01-02", "", "20.00");
    cleared.cleared = "C".into();
    let mut untyped = ledger("2024-01-02", "", "20.00");
    untyped.entry_type = String::new();
    let undated = ledger("bad date", "", "20.00");

    let report = run(&[bank("2024-01-02", "Deposit", "20.00")], &[cleared, untyped, undated]);

    assert!(report.extras.is_empty());
    assert_eq!(report.added_count(), 1);
    assert_eq!(report.ledger.len(), 1);
}

#[test]
fn balanced_input_is_unchanged() {
    let bank = vec![
        bank("2024-01-01", "a", "10"),
        bank("2024-01-02", "b", "10"),
        bank("2024-01-03", "c", "99.95"),
    ];
    let ledger = vec![
        ledger("2024-01-09", "x", "99.95"),
        ledger("2024-01-01", "y", "10.00"),
        ledger("2024-01-05", "z", "10"),
    ];
    let report = run(&bank, &ledger);

    assert!(report.extras.is_empty());
    assert_eq!(report.added_count(), 0);
    let splits: Vec<&str> = report
        .ledger
        .iter()
        .map(|r| r.entry.entry.split.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(splits, vec!["y", "z", "x"]);
    assert!(report.ledger.iter().all(|r| r.highlight.is_none()));
}

#[test]
fn mixed_ledgers_balance_counts_and_sums() {
    let bank = vec![
        bank("2024-03-01", "Client A", "100.00"),
        bank("2024-03-01", "Client B", "100.00"),
        bank("2024-03-04", "Client C", "100.00"),
        bank("2024-03-02", "Interest", "0.42"),
        bank("2024-03-05", "Refund", "12.345"),
        BankRecord {
            post_date: "2024-03-06".into(),
            description: "Wire fee".into(),
            debit: "25.00".into(),
            ..Default::default()
        },
    ];
    let ledger = vec![
        ledger("2024-03-01", "2024-11", "100"),
        ledger("2024-03-02", "Sales", "0.42"),
        ledger("2024-03-02", "2024-12", "0.42"),
        ledger("2024-03-03", "", "0.42"),
        ledger("2024-03-07", "Sales", "75"),
        ledger("2024-03-07", "Sales", "not a number"),
    ];
    let report = run(&bank, &ledger);

    assert_counts_balanced(&report);
    assert_sums_balanced(&report, &ledger);

    // 0.42: three ledger rows, one bank row; the file reference survives.
    let kept: Vec<&str> = report
        .ledger
        .iter()
        .filter(|r| r.entry.entry.amount.value() == Some(dec("0.42")))
        .map(|r| r.entry.entry.split.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(kept, vec!["2024-12"]);
    // 75 has no bank counterpart.
    assert!(report.extras.iter().any(|r| r.entry.amount.value() == Some(dec("75"))));
    // The unparseable ledger row is kept, last, and never bucketed.
    assert!(report.ledger.last().unwrap().entry.entry.amount.value().is_none());
    // 100: one ledger entry on 03-01, so Client C and one of the 03-01 rows are added.
    let added_100: Vec<&str> = report
        .ledger
        .iter()
        .filter(|r| r.entry.is_synthetic() && r.entry.entry.amount.value() == Some(dec("100")))
        .map(|r| r.entry.entry.split.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(added_100, vec!["Client A; Client B", "Client C"]);
    assert_eq!(report.padded_count(), 0);
    assert_eq!(report.totals.bank_credit, dec("312.76"));
}

#[test]
fn generated_ledgers_always_balance() {
    // Small deterministic generator; amounts drawn from a narrow set to force collisions.
    let mut seed: u64 = 0x5eed;
    let mut next = move |bound: u64| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) % bound
    };
    let amounts = ["5.00", "7.50", "12.00", "12.001", "40", "(3.00)"];
    let splits = ["2024-1", "Misc", "", "1999-42", "Sales"];

    for _ in 0..200 {
        let bank: Vec<BankRecord> = (0..next(8))
            .map(|_| {
                bank(
                    &format!("2024-05-{:02}", next(4) + 1),
                    ["A", "B", "C"][next(3) as usize],
                    amounts[next(amounts.len() as u64) as usize],
                )
            })
            .collect();
        let ledger: Vec<LedgerRecord> = (0..next(8))
            .map(|_| {
                ledger(
                    &format!("2024-05-{:02}", next(4) + 1),
                    splits[next(splits.len() as u64) as usize],
                    amounts[next(amounts.len() as u64) as usize],
                )
            })
            .collect();

        let report = run(&bank, &ledger);
        assert_counts_balanced(&report);
        assert_sums_balanced(&report, &ledger);
        assert_eq!(report.padded_count(), 0);
    }
}

#[test]
fn csv_files_to_reports() {
    let dir = tempfile::tempdir().unwrap();
    let bank_path = dir.path().join("bank.csv");
    let ledger_path = dir.path().join("ledger.csv");
    fs::write(
        &bank_path,
        "Post Date,Check,Description,Debit,Credit\n\
         01/05/2024,,Coffee,,50.00\n\
         01/02/2024,,Deposit,,20.00\n",
    )
    .unwrap();
    fs::write(
        &ledger_path,
        "Type,Date,Num,Name,Memo,Clr,Split,Amount\n\
         Deposit,01/02/2024,,,,,2024-7,20.00\n\
         Deposit,01/03/2024,,,,,Misc refund,20.00\n\
         Deposit,01/01/2024,,,,R,Old,99.00\n",
    )
    .unwrap();

    let bank = BankTable::from_read(&mut File::open(&bank_path).unwrap()).unwrap();
    let ledger = LedgerTable::from_read(&mut File::open(&ledger_path).unwrap()).unwrap();
    let options = ReconcileOptions::new().unwrap();
    let report = reconcile_records(&bank.records, &ledger.records, &options);
    let sheet = Sheet::layout(&report, options.max_text_width);

    let csv_path = dir.path().join("out.csv");
    CsvReport { sheet: &sheet }.write_to(&mut File::create(&csv_path).unwrap()).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Post Date,Check,Description,Debit,Credit,,,Type,"));
    assert!(lines[0].contains("Extras from QB"));
    assert!(lines[2].contains("Bank-Add"));
    assert!(lines[2].contains("Added to match bank"));
    assert!(lines[3].contains("TOTAL"));

    let xml_path = dir.path().join("out.xml");
    XmlWorkbook { sheet: &sheet }.write_to(&mut File::create(&xml_path).unwrap()).unwrap();
    let xml = fs::read_to_string(&xml_path).unwrap();
    assert!(xml.contains("ss:StyleID=\"removed\""));
    assert!(xml.contains("ss:StyleID=\"clean\""));
}
