//! End-to-end tests for the reporting core: command dispatch, filter
//! chains, aggregation and the identifier resolver working together.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tally_core::{Amount, Entry, EntryState, Journal, Posting, Value};
use tally_report::{
    resolve, Binding, CallArgs, Command, Expr, Options, Report, ReportError, Session,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn food_and_salary_journal() -> Journal {
    let mut journal = Journal::new();
    let food = journal.accounts.find_or_create("Expenses:Food");
    let salary = journal.accounts.find_or_create("Income:Salary");

    let mut e1 = Entry::new(date(2024, 1, 2), "Grocer");
    e1.postings
        .push(Posting::new(food, Amount::new(dec!(10), "USD")));
    e1.postings
        .push(Posting::new(salary, Amount::new(dec!(-10), "USD")));
    journal.add_entry(e1);

    let mut e2 = Entry::new(date(2024, 1, 5), "Market");
    e2.postings
        .push(Posting::new(food, Amount::new(dec!(5), "USD")));
    e2.postings
        .push(Posting::new(salary, Amount::new(dec!(-5), "USD")));
    journal.add_entry(e2);
    journal
}

fn report_over(journal: Journal) -> Report {
    Report::new(Session::with_today(journal, date(2024, 6, 1)))
}

fn total_of(report: &Report, account: &str) -> tally_core::Decimal {
    let id = report.session.journal.accounts.find(account).unwrap();
    report
        .session
        .journal
        .accounts
        .get(id)
        .total
        .amount("USD")
        .map_or(dec!(0), |a| a.number)
}

// ============================================================================
// Accounts domain
// ============================================================================

#[test]
fn test_accounts_report_totals_food_and_salary() {
    let mut report = report_over(food_and_salary_journal());
    report.run("balance", &CallArgs::default()).unwrap();

    let lines: Vec<&str> = report.output.lines().collect();
    assert!(lines.iter().any(|l| l.contains("Food") && l.contains("15 USD")));
    assert!(lines
        .iter()
        .any(|l| l.contains("Salary") && l.contains("-15 USD")));
    // Root nets to zero; the grand total line shows it.
    assert_eq!(lines.last().unwrap().trim(), "0");
}

#[test]
fn test_balance_totals_via_aggregation() {
    let mut report = report_over(food_and_salary_journal());
    let Report {
        session, options, ..
    } = &mut report;
    tally_report::sum_all_accounts(&mut session.journal, options, date(2024, 6, 1)).unwrap();

    assert_eq!(total_of(&report, "Expenses:Food"), dec!(15));
    assert_eq!(total_of(&report, "Income:Salary"), dec!(-15));
    assert_eq!(total_of(&report, "Expenses"), dec!(15));
}

#[test]
fn test_balance_flat_mode_prints_full_names() {
    let mut report = report_over(food_and_salary_journal());
    report.call("flat", &CallArgs::default()).unwrap();
    report.run("balance", &CallArgs::default()).unwrap();
    assert!(report.output.contains("Expenses:Food"));
    assert!(report.output.contains("Income:Salary"));
}

#[test]
fn test_balance_sorted_by_total() {
    let mut report = report_over(food_and_salary_journal());
    report.options.set_on("flat").unwrap();
    report
        .options
        .set_expr(
            "sort",
            Expr::Call("quantity".into(), vec![Expr::Ident("total".into())]),
            "quantity(total)",
        )
        .unwrap();
    report.run("balance", &CallArgs::default()).unwrap();

    let salary_at = report.output.find("Salary").unwrap();
    let food_at = report.output.find("Food").unwrap();
    // Ascending by total: -15 before 15.
    assert!(salary_at < food_at);
}

// ============================================================================
// Postings domain
// ============================================================================

#[test]
fn test_register_food_predicate_running_totals() {
    let mut report = report_over(food_and_salary_journal());
    report
        .run("register", &CallArgs::new(vec![Value::from("Food")]))
        .unwrap();

    let lines: Vec<&str> = report.output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Grocer"));
    assert!(lines[0].ends_with("10 USD"));
    assert!(lines[1].contains("Market"));
    assert!(lines[1].ends_with("15 USD"));
}

#[test]
fn test_register_head_and_tail() {
    let mut journal = Journal::new();
    let food = journal.accounts.find_or_create("Expenses:Food");
    for day in 1..=5 {
        let mut e = Entry::new(date(2024, 1, day), "P");
        e.postings
            .push(Posting::new(food, Amount::new(dec!(1), "USD")));
        journal.add_entry(e);
    }

    let mut report = report_over(journal.clone());
    report.options.set_num("head", 2).unwrap();
    report.run("register", &CallArgs::default()).unwrap();
    assert_eq!(report.output.lines().count(), 2);
    assert!(report.output.starts_with("2024-01-01"));

    let mut report = report_over(journal);
    report.options.set("last", "2").unwrap();
    report.run("register", &CallArgs::default()).unwrap();
    let lines: Vec<&str> = report.output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2024-01-04"));
    assert!(lines[1].starts_with("2024-01-05"));
}

#[test]
fn test_register_cleared_filter() {
    let mut journal = food_and_salary_journal();
    journal.entries[0].state = EntryState::Cleared;
    let mut report = report_over(journal);
    report.call("cleared", &CallArgs::default()).unwrap();
    report.run("register", &CallArgs::default()).unwrap();
    assert!(report.output.contains("Grocer"));
    assert!(!report.output.contains("Market"));
}

#[test]
fn test_register_related_shows_siblings() {
    let mut report = report_over(food_and_salary_journal());
    report.call("related", &CallArgs::default()).unwrap();
    report
        .run("register", &CallArgs::new(vec![Value::from("Food")]))
        .unwrap();
    // Matching Food postings are replaced by their Salary siblings.
    assert!(report.output.contains("Salary"));
    assert!(!report.output.contains("Food"));
}

#[test]
fn test_register_monthly_collapse() {
    let mut journal = Journal::new();
    let food = journal.accounts.find_or_create("Expenses:Food");
    for (m, d, n) in [(1, 5, dec!(10)), (1, 20, dec!(5)), (2, 3, dec!(7))] {
        let mut e = Entry::new(date(2024, m, d), "P");
        e.postings.push(Posting::new(food, Amount::new(n, "USD")));
        journal.add_entry(e);
    }

    let mut report = report_over(journal);
    report.call("monthly", &CallArgs::default()).unwrap();
    report.run("register", &CallArgs::default()).unwrap();

    let lines: Vec<&str> = report.output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2024-01-01"));
    assert!(lines[0].contains("15 USD"));
    assert!(lines[1].starts_with("2024-02-01"));
    assert!(lines[1].contains("7 USD"));
}

#[test]
fn test_register_market_valuation() {
    let mut journal = Journal::new();
    let broker = journal.accounts.find_or_create("Assets:Broker");
    let mut e = Entry::new(date(2024, 1, 10), "Buy");
    e.postings
        .push(Posting::new(broker, Amount::new(dec!(2), "AAPL")));
    journal.add_entry(e);
    journal
        .prices
        .record("AAPL", date(2024, 1, 1), dec!(150), "USD");

    let mut report = report_over(journal);
    report.call("opt_market", &CallArgs::default()).unwrap();
    report.run("register", &CallArgs::default()).unwrap();
    assert!(report.output.contains("300 USD"));
}

#[test]
fn test_print_reproduces_entries() {
    let mut report = report_over(food_and_salary_journal());
    report.run("print", &CallArgs::default()).unwrap();
    let lines: Vec<&str> = report.output.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("2024-01-02 Grocer"));
    assert!(lines[3].starts_with("2024-01-05 Market"));
}

#[test]
fn test_csv_records() {
    let mut report = report_over(food_and_salary_journal());
    report.run("csv", &CallArgs::default()).unwrap();
    assert!(report
        .output
        .starts_with("\"2024-01-02\",\"Grocer\",\"Expenses:Food\",\"10 USD\""));
    assert_eq!(report.output.lines().count(), 4);
}

// ============================================================================
// Resolver contract
// ============================================================================

#[test]
fn test_resolver_totality_over_declared_options() {
    let options = Options::new();
    for def in tally_report::OPTION_TABLE {
        assert!(
            resolve(def.canonical, &options).is_some(),
            "{} must resolve",
            def.canonical
        );
    }
    assert!(resolve("definitely_not_an_option", &options).is_none());
}

#[test]
fn test_alias_equivalence_end_to_end() {
    let mut journal = Journal::new();
    let broker = journal.accounts.find_or_create("Assets:Broker");
    let mut e = Entry::new(date(2024, 1, 10), "Buy");
    let lot = Amount::new(dec!(2), "AAPL").annotated(tally_core::Annotation {
        price: Some(Box::new(Amount::new(dec!(150), "USD"))),
        date: None,
        tag: None,
    });
    e.postings.push(Posting::new(broker, lot));
    journal.add_entry(e);

    // `cost` and `basis` drive the same valuation cell.
    for name in ["basis", "cost"] {
        let mut report = report_over(journal.clone());
        report.call(name, &CallArgs::default()).unwrap();
        report.run("register", &CallArgs::default()).unwrap();
        assert!(report.output.contains("300 USD"), "via {name}");
    }
}

#[test]
fn test_flag_binding() {
    let options = Options::new();
    assert_eq!(resolve("V", &options), Some(Binding::Option("market")));
    assert_eq!(resolve("B", &options), Some(Binding::Option("basis")));
    assert_eq!(
        resolve("cmd_bal", &options),
        Some(Binding::Command(Command::Balance))
    );
    // Command verbs only resolve under their marker.
    assert_eq!(resolve("bal", &options), None);
}

// ============================================================================
// Function library through dispatch
// ============================================================================

#[test]
fn test_quoted_function() {
    let mut report = report_over(Journal::new());
    report
        .call(
            "quoted",
            &CallArgs::new(vec![Value::from("he said \"hi\"")]),
        )
        .unwrap();
    assert_eq!(report.output, "\"he said \\\"hi\\\"\"\n");
}

#[test]
fn test_truncate_function() {
    let mut report = report_over(Journal::new());
    report
        .call(
            "truncate",
            &CallArgs::new(vec![
                Value::from("Expenses:Food:Groceries"),
                Value::Amount(Amount::new(dec!(10), "")),
            ]),
        )
        .unwrap();
    let line = report.output.trim_end();
    assert!(line.chars().count() <= 10, "{line}");
    assert!(line.ends_with("roceries"));
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_undefined_identifier_propagates() {
    // A populated journal, so the predicate is actually evaluated.
    let mut report = report_over(food_and_salary_journal());
    report
        .options
        .set_expr("limit", Expr::Ident("no_such".into()), "no_such")
        .unwrap();
    let err = report.run("register", &CallArgs::default()).unwrap_err();
    assert!(matches!(err, ReportError::UndefinedIdentifier(n) if n == "no_such"));
}

#[test]
fn test_bad_query_regex() {
    let mut report = report_over(food_and_salary_journal());
    let err = report
        .run("register", &CallArgs::new(vec![Value::from("(")]))
        .unwrap_err();
    assert!(matches!(err, ReportError::BadExpression(_)));
}
