//! Walkers: one-shot ordered producers of postings or accounts.
//!
//! Each walker feeds every item exactly once to a driving callback and never
//! owns what it produces. Postings flow as owned [`PostingView`] items so
//! downstream stages can transform them freely without touching the journal;
//! transient display state lives on the view and dies with the run.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use tally_core::{
    AccountId, AccountTree, Amount, EntryId, EntryState, Journal, Symbol, Value,
};

use crate::error::ReportError;

/// An owned snapshot of one posting, flowing through a filter chain.
#[derive(Debug, Clone)]
pub struct PostingView {
    /// The entry this posting came from.
    pub entry: EntryId,
    /// Posting index within the entry.
    pub index: usize,
    /// Effective date (posting override, else entry date).
    pub date: NaiveDate,
    /// The entry's auxiliary date, if any.
    pub effective_date: Option<NaiveDate>,
    /// The entry's payee.
    pub payee: String,
    /// Target account.
    pub account: AccountId,
    /// The posting's value; valuation stages may replace it.
    pub amount: Value,
    /// Total cost annotation, if the posting carried one.
    pub cost: Option<Amount>,
    /// Clearing state (posting override, else entry state).
    pub state: EntryState,
    /// Whether the posting is virtual.
    pub virtual_: bool,
    /// Whether this item was fabricated by a collapsing stage.
    pub synthetic: bool,
    /// Per-run display account override.
    pub display_account: Option<String>,
    /// Per-run display amount override.
    pub display_amount: Option<Value>,
}

impl PostingView {
    /// Snapshot the posting at `(entry, index)`.
    pub fn from_journal(journal: &Journal, entry: EntryId, index: usize) -> Self {
        let e = journal.entry(entry);
        let p = &e.postings[index];
        let state = if p.state == EntryState::Uncleared {
            e.state
        } else {
            p.state
        };
        Self {
            entry,
            index,
            date: p.date.unwrap_or(e.date),
            effective_date: e.effective_date,
            payee: e.payee.clone(),
            account: p.account,
            amount: Value::Amount(p.amount.clone()),
            cost: p.cost.clone(),
            state,
            virtual_: p.virtual_,
            synthetic: false,
            display_account: None,
            display_amount: None,
        }
    }

    /// The account name shown for this item (display override wins).
    pub fn account_name(&self, journal: &Journal) -> String {
        self.display_account.clone().unwrap_or_else(|| {
            journal.accounts.get(self.account).full_name.to_string()
        })
    }

    /// The value shown for this item (display override wins).
    pub fn display_value(&self) -> &Value {
        self.display_amount.as_ref().unwrap_or(&self.amount)
    }
}

/// Feed every posting of the journal, in journal order.
pub fn walk_journal(
    journal: &Journal,
    f: &mut dyn FnMut(PostingView) -> Result<(), ReportError>,
) -> Result<(), ReportError> {
    for (e, entry) in journal.entries.iter().enumerate() {
        for i in 0..entry.postings.len() {
            f(PostingView::from_journal(journal, EntryId(e), i))?;
        }
    }
    Ok(())
}

/// Feed one representative posting per distinct commodity, first encountered
/// wins, in journal order. Drives the price listing reports.
pub fn walk_commodities(
    journal: &Journal,
    f: &mut dyn FnMut(PostingView) -> Result<(), ReportError>,
) -> Result<(), ReportError> {
    let mut seen: HashSet<Symbol> = HashSet::new();
    for (e, entry) in journal.entries.iter().enumerate() {
        for (i, posting) in entry.postings.iter().enumerate() {
            if seen.insert(posting.amount.commodity.clone()) {
                f(PostingView::from_journal(journal, EntryId(e), i))?;
            }
        }
    }
    Ok(())
}

/// Feed accounts in pre-order: parent before children, children in creation
/// order, root included.
pub fn walk_accounts(
    tree: &AccountTree,
    f: &mut dyn FnMut(AccountId) -> Result<(), ReportError>,
) -> Result<(), ReportError> {
    fn descend(
        tree: &AccountTree,
        id: AccountId,
        f: &mut dyn FnMut(AccountId) -> Result<(), ReportError>,
    ) -> Result<(), ReportError> {
        f(id)?;
        for child in tree.get(id).children.clone() {
            descend(tree, child, f)?;
        }
        Ok(())
    }
    descend(tree, tree.root(), f)
}

/// Incomparable keys sort as equal so the stable sort keeps their original
/// relative order rather than failing mid-walk.
fn key_ordering(a: &Value, b: &Value) -> Ordering {
    a.compare(b).unwrap_or(Ordering::Equal)
}

/// Feed accounts sorted by a computed key.
///
/// The sort is stable: equal keys keep their pre-order position. In
/// hierarchical mode siblings are sorted within each parent and the parent
/// still precedes its children; `flat` mode drops the grouping and sorts
/// every account (root excluded) in one list.
pub fn walk_accounts_sorted(
    tree: &AccountTree,
    key: &mut dyn FnMut(AccountId) -> Result<Value, ReportError>,
    flat: bool,
    f: &mut dyn FnMut(AccountId) -> Result<(), ReportError>,
) -> Result<(), ReportError> {
    if flat {
        let mut ids: Vec<AccountId> = Vec::new();
        walk_accounts(tree, &mut |id| {
            if id != tree.root() {
                ids.push(id);
            }
            Ok(())
        })?;
        let mut keyed = Vec::with_capacity(ids.len());
        for id in ids {
            keyed.push((key(id)?, id));
        }
        keyed.sort_by(|a, b| key_ordering(&a.0, &b.0));
        for (_, id) in keyed {
            f(id)?;
        }
        return Ok(());
    }

    fn descend(
        tree: &AccountTree,
        id: AccountId,
        key: &mut dyn FnMut(AccountId) -> Result<Value, ReportError>,
        f: &mut dyn FnMut(AccountId) -> Result<(), ReportError>,
    ) -> Result<(), ReportError> {
        f(id)?;
        let children = tree.get(id).children.clone();
        let mut keyed = Vec::with_capacity(children.len());
        for child in children {
            keyed.push((key(child)?, child));
        }
        keyed.sort_by(|a, b| key_ordering(&a.0, &b.0));
        for (_, child) in keyed {
            descend(tree, child, key, f)?;
        }
        Ok(())
    }
    descend(tree, tree.root(), key, f)
}
