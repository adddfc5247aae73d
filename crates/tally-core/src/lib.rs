//! Core types for tally
//!
//! This crate provides the data model the tally reporting core operates on:
//!
//! - [`Amount`] - A decimal quantity with a commodity and optional lot annotation
//! - [`Balance`] - A multi-commodity sum
//! - [`Value`] - The tagged union report expressions compute with
//! - [`Journal`] / [`Entry`] / [`Posting`] - The ledger itself
//! - [`AccountTree`] - The arena-backed chart of accounts
//! - [`PriceHistory`] - Commodity quotes for market valuation
//!
//! # Example
//!
//! ```
//! use tally_core::{Amount, Entry, Journal, Posting};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let mut journal = Journal::new();
//! let food = journal.accounts.find_or_create("Expenses:Food");
//! let salary = journal.accounts.find_or_create("Income:Salary");
//!
//! let mut entry = Entry::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "Grocer");
//! entry.postings.push(Posting::new(food, Amount::new(dec!(10), "USD")));
//! entry.postings.push(Posting::new(salary, Amount::new(dec!(-10), "USD")));
//! journal.add_entry(entry);
//!
//! assert_eq!(journal.posting_count(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod amount;
pub mod balance;
pub mod intern;
pub mod journal;
pub mod prices;
pub mod value;

pub use account::{Account, AccountId, AccountTree};
pub use amount::{Amount, Annotation, AnnotationKeep};
pub use balance::Balance;
pub use intern::Symbol;
pub use journal::{Entry, EntryId, EntryState, Journal, Posting};
pub use prices::PriceHistory;
pub use value::{Value, ValueError};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
