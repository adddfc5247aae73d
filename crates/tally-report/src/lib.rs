//! Reporting core for tally.
//!
//! Reports are built from three cooperating pieces:
//!
//! - **Walkers and filter chains** ([`walk`], [`filters`], [`chain`]) stream
//!   postings through a fixed-order pipeline of composable stages ending in
//!   a formatting terminal.
//! - **Aggregation** ([`aggregate`]) folds the selected postings into
//!   per-account totals, rolled up bottom-to-top through the account tree.
//! - **Resolution and dispatch** ([`resolve`], [`report`]) classify every
//!   incoming identifier as a command, pre-command, option or function and
//!   run it against a [`Session`].
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use tally_core::{Amount, Entry, Journal, Posting};
//! use tally_report::{CallArgs, Report, Session};
//!
//! let mut journal = Journal::new();
//! let food = journal.accounts.find_or_create("Expenses:Food");
//! let cash = journal.accounts.find_or_create("Assets:Cash");
//! let mut entry = Entry::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "Grocer");
//! entry.postings.push(Posting::new(food, Amount::new(dec!(10), "USD")));
//! entry.postings.push(Posting::new(cash, Amount::new(dec!(-10), "USD")));
//! journal.add_entry(entry);
//!
//! let session = Session::with_today(journal, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
//! let mut report = Report::new(session);
//! report.run("balance", &CallArgs::default())?;
//! assert!(report.output.contains("Food"));
//! # Ok::<(), tally_report::ReportError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod chain;
pub mod error;
pub mod expr;
pub mod filters;
pub mod fns;
pub mod options;
pub mod output;
pub mod report;
pub mod resolve;
pub mod session;
pub mod walk;

pub use aggregate::sum_all_accounts;
pub use chain::compose_posting_chain;
pub use error::ReportError;
pub use expr::{predicate_from_args, CallArgs, CmpOp, EvalContext, Expr, Subject};
pub use filters::{
    AccountDisplayFilter, AccountSink, Chain, PeriodWidth, PostingSink, PostingStage, StatePolicy,
};
pub use options::{OptionDef, OptionKind, Options, OPTION_TABLE};
pub use output::{FormatAccounts, FormatPostings, GatherStatistics, OutputStyle};
pub use report::Report;
pub use resolve::{resolve, Binding, Command, PreCommand};
pub use session::Session;
pub use walk::{
    walk_accounts, walk_accounts_sorted, walk_commodities, walk_journal, PostingView,
};
