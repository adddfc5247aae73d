//! The journal: entries, postings and the account tree.
//!
//! A [`Journal`] owns every [`Entry`] in chronological file order plus the
//! [`AccountTree`] and [`PriceHistory`] reports draw on. Entries own their
//! postings; postings point at accounts by arena id, so nothing here holds a
//! back pointer. Entries are balanced by the upstream parser, which this
//! crate assumes rather than re-checks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountTree};
use crate::amount::Amount;
use crate::prices::PriceHistory;

/// Index of an entry in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub usize);

/// Clearing state of an entry or posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryState {
    /// Not yet cleared.
    #[default]
    Uncleared,
    /// Pending clearance (`!`).
    Pending,
    /// Cleared (`*`).
    Cleared,
}

/// One debit or credit line within an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    /// Target account.
    pub account: AccountId,
    /// The posted amount.
    pub amount: Amount,
    /// Posting-level state; defaults to the entry's.
    pub state: EntryState,
    /// Posting-level date override.
    pub date: Option<NaiveDate>,
    /// Total cost of the posting, from an `@`/`@@` annotation.
    pub cost: Option<Amount>,
    /// Whether this is a virtual (parenthesized) posting.
    pub virtual_: bool,
    /// Trailing note.
    pub note: Option<String>,
}

impl Posting {
    /// Create a plain, real, uncleared posting.
    pub fn new(account: AccountId, amount: Amount) -> Self {
        Self {
            account,
            amount,
            state: EntryState::Uncleared,
            date: None,
            cost: None,
            virtual_: false,
            note: None,
        }
    }
}

/// A balanced group of postings sharing a date and payee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Primary date.
    pub date: NaiveDate,
    /// Effective (auxiliary) date, if any.
    pub effective_date: Option<NaiveDate>,
    /// Payee text.
    pub payee: String,
    /// Optional code, e.g. a check number.
    pub code: Option<String>,
    /// Entry-level clearing state.
    pub state: EntryState,
    /// The postings, in file order.
    pub postings: Vec<Posting>,
}

impl Entry {
    /// Create an entry with no postings yet.
    pub fn new(date: NaiveDate, payee: impl Into<String>) -> Self {
        Self {
            date,
            effective_date: None,
            payee: payee.into(),
            code: None,
            state: EntryState::Uncleared,
            postings: Vec::new(),
        }
    }
}

/// Top-level owner of all entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Entries in chronological file order.
    pub entries: Vec<Entry>,
    /// The chart of accounts.
    pub accounts: AccountTree,
    /// Commodity price history for market valuation.
    pub prices: PriceHistory,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            accounts: AccountTree::new(),
            prices: PriceHistory::new(),
        }
    }

    /// Append an entry, returning its id.
    pub fn add_entry(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(entry);
        id
    }

    /// Borrow an entry.
    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    /// Total posting count across all entries.
    pub fn posting_count(&self) -> usize {
        self.entries.iter().map(|e| e.postings.len()).sum()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
