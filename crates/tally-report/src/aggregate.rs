//! Account aggregation: fold the selected postings into per-account totals.
//!
//! Runs the minimal pipeline (selection predicate only) so presentation
//! stages never distort totals, accumulates each posting's amount value into
//! its account, then sweeps the tree bottom-up so every parent's total
//! includes its descendants. Totals are cleared first, so re-running over
//! the same journal and options lands on the same numbers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tally_core::{AccountId, Balance, Journal};

use crate::chain::compose_posting_chain;
use crate::error::ReportError;
use crate::expr::{EvalContext, Expr, Subject};
use crate::filters::PostingSink;
use crate::options::Options;
use crate::walk::{walk_journal, PostingView};

/// Accumulates per-account balances from the amount accessor expression.
struct Collector<'a> {
    amount: &'a Expr,
    journal: &'a Journal,
    options: &'a Options,
    now: NaiveDate,
    totals: BTreeMap<AccountId, Balance>,
}

impl PostingSink for &mut Collector<'_> {
    fn item(&mut self, view: PostingView) -> Result<(), ReportError> {
        let ctx = EvalContext {
            journal: self.journal,
            options: self.options,
            subject: Subject::Posting(&view),
            now: self.now,
        };
        let value = self.amount.eval(&ctx)?;
        self.totals
            .entry(view.account)
            .or_default()
            .add_balance(&value.to_balance()?);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Compute every account's `self_total` and rolled-up `total`.
pub fn sum_all_accounts(
    journal: &mut Journal,
    options: &Options,
    now: NaiveDate,
) -> Result<(), ReportError> {
    journal.accounts.clear_totals();

    let amount = options
        .expr("amount")
        .ok_or_else(|| ReportError::UndefinedIdentifier("amount".to_string()))?;

    let mut collector = Collector {
        amount,
        journal,
        options,
        now,
        totals: BTreeMap::new(),
    };
    {
        let mut chain = compose_posting_chain(journal, options, now, Box::new(&mut collector), true);
        walk_journal(journal, &mut |view| chain.item(view))?;
        chain.flush()?;
    }
    let totals = collector.totals;

    for (id, balance) in totals {
        if id.0 >= journal.accounts.len() {
            return Err(ReportError::AccountTree(format!(
                "posting references account {} outside the tree",
                id.0
            )));
        }
        journal.accounts.get_mut(id).self_total = balance;
    }
    journal.accounts.sum_children_into_parents();
    Ok(())
}
