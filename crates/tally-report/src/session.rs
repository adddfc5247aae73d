//! The session: journal ownership and ambient bindings.
//!
//! A session outlives any single report invocation. It owns the journal,
//! fixes what "today" means for every expression evaluated under it, and
//! gets first refusal on identifier lookup before the report's own
//! resolution runs.

use chrono::{NaiveDate, Utc};
use tally_core::Journal;

use crate::resolve::Binding;

/// A loaded journal plus the ambient state reports evaluate under.
#[derive(Debug)]
pub struct Session {
    /// The journal under report.
    pub journal: Journal,
    /// The date ambient `today`/`now` references resolve to.
    pub today: NaiveDate,
}

impl Session {
    /// Wrap a journal, pinning `today` to the current date.
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            today: Utc::now().date_naive(),
        }
    }

    /// Wrap a journal with an explicit `today`, for reproducible runs.
    pub const fn with_today(journal: Journal, today: NaiveDate) -> Self {
        Self { journal, today }
    }

    /// Names the session claims ahead of all report-level resolution.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        match name {
            "today" | "now" => Some(Binding::Function("today")),
            _ => None,
        }
    }

    /// Drop accumulated account totals, leaving the journal itself intact.
    ///
    /// Called after every aggregated report so the next run starts clean.
    pub fn clean_accounts(&mut self) {
        self.journal.accounts.clear_totals();
    }

    /// Discard the journal entirely for re-population by the caller.
    pub fn reload(&mut self) {
        self.journal = Journal::new();
    }
}
