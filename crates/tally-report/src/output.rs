//! Formatting terminals: the sinks at the downstream end of a chain.
//!
//! Each terminal renders into a caller-supplied string buffer so reports
//! compose with whatever the caller does with the text. The amount shown
//! per item comes from the `display_amount` accessor expression, which by
//! default chains through the `amount` accessor.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDate;
use tally_core::{AccountId, EntryId, Journal, Value};

use crate::error::ReportError;
use crate::expr::{EvalContext, Subject};
use crate::filters::{AccountSink, PostingSink};
use crate::fns::truncate_path;
use crate::options::Options;
use crate::walk::PostingView;

/// The rendering shape of a postings report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// One line per posting with a running total.
    Register,
    /// Entries re-printed in journal syntax.
    Print,
    /// One quoted CSV record per posting.
    Csv,
    /// Price quotes for each commodity encountered.
    Prices,
    /// Price quotes in journal price-directive syntax.
    PricesDb,
}

fn format_date(options: &Options, date: NaiveDate) -> String {
    date.format(options.str_value("date_format").unwrap_or("%Y-%m-%d"))
        .to_string()
}

fn csv_field(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Renders the postings stream in one of the [`OutputStyle`] shapes.
pub struct FormatPostings<'a> {
    journal: &'a Journal,
    options: &'a Options,
    now: NaiveDate,
    style: OutputStyle,
    out: &'a mut String,
    running: Option<Value>,
    last_entry: Option<EntryId>,
}

impl<'a> FormatPostings<'a> {
    /// Create a postings terminal writing into `out`.
    pub fn new(
        journal: &'a Journal,
        options: &'a Options,
        now: NaiveDate,
        style: OutputStyle,
        out: &'a mut String,
    ) -> Self {
        Self {
            journal,
            options,
            now,
            style,
            out,
            running: None,
            last_entry: None,
        }
    }

    fn display_amount(&self, view: &PostingView) -> Result<Value, ReportError> {
        if let Some(value) = &view.display_amount {
            return Ok(value.clone());
        }
        let ctx = EvalContext {
            journal: self.journal,
            options: self.options,
            subject: Subject::Posting(view),
            now: self.now,
        };
        match self.options.expr("display_amount") {
            Some(expr) => expr.eval(&ctx),
            None => Ok(view.amount.clone()),
        }
    }

    fn account_column(&self, view: &PostingView) -> String {
        let name = view.account_name(self.journal);
        let abbrev = usize::try_from(self.options.num("abbrev_len").unwrap_or(2)).unwrap_or(2);
        truncate_path(&name, 34, abbrev)
    }

    fn register_line(&mut self, view: &PostingView) -> Result<(), ReportError> {
        let amount = self.display_amount(view)?;
        let running = match self.running.take() {
            Some(prev) => prev.add(&amount)?,
            None => amount.clone(),
        };
        // Pre-render the value columns; width flags only pad strings.
        writeln!(
            self.out,
            "{} {:<20} {:<34} {:>12} {:>12}",
            format_date(self.options, view.date),
            truncate_path(&view.payee, 20, 2),
            self.account_column(view),
            amount.to_string(),
            running.to_string(),
        )?;
        self.running = Some(running);
        Ok(())
    }

    fn print_lines(&mut self, view: &PostingView) -> Result<(), ReportError> {
        if self.last_entry != Some(view.entry) {
            let entry = self.journal.entry(view.entry);
            writeln!(
                self.out,
                "{} {}",
                format_date(self.options, entry.date),
                entry.payee
            )?;
            self.last_entry = Some(view.entry);
        }
        writeln!(
            self.out,
            "    {:<34} {:>12}",
            view.account_name(self.journal),
            self.display_amount(view)?.to_string(),
        )?;
        Ok(())
    }

    fn csv_record(&mut self, view: &PostingView) -> Result<(), ReportError> {
        let amount = self.display_amount(view)?;
        writeln!(
            self.out,
            "{},{},{},{}",
            csv_field(&format_date(self.options, view.date)),
            csv_field(&view.payee),
            csv_field(&view.account_name(self.journal)),
            csv_field(&amount.as_display_string()),
        )?;
        Ok(())
    }

    fn price_lines(&mut self, view: &PostingView) -> Result<(), ReportError> {
        let commodity = match &view.amount {
            Value::Amount(a) => a.commodity.clone(),
            _ => return Ok(()),
        };
        for (base, quote) in self.journal.prices.iter() {
            if *base != commodity {
                continue;
            }
            match self.style {
                OutputStyle::PricesDb => writeln!(
                    self.out,
                    "P {} {} {} {}",
                    quote.date, base, quote.rate, quote.commodity
                )?,
                _ => writeln!(
                    self.out,
                    "{} {} {} {}",
                    format_date(self.options, quote.date),
                    base,
                    quote.rate,
                    quote.commodity
                )?,
            }
        }
        Ok(())
    }
}

impl PostingSink for FormatPostings<'_> {
    fn item(&mut self, view: PostingView) -> Result<(), ReportError> {
        match self.style {
            OutputStyle::Register => self.register_line(&view),
            OutputStyle::Print => self.print_lines(&view),
            OutputStyle::Csv => self.csv_record(&view),
            OutputStyle::Prices | OutputStyle::PricesDb => self.price_lines(&view),
        }
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Renders aggregated account totals as a balance report.
pub struct FormatAccounts<'a> {
    journal: &'a Journal,
    options: &'a Options,
    out: &'a mut String,
    printed: usize,
}

impl<'a> FormatAccounts<'a> {
    /// Create an accounts terminal writing into `out`.
    pub fn new(journal: &'a Journal, options: &'a Options, out: &'a mut String) -> Self {
        Self {
            journal,
            options,
            out,
            printed: 0,
        }
    }
}

impl AccountSink for FormatAccounts<'_> {
    fn account(&mut self, id: AccountId) -> Result<(), ReportError> {
        if id == self.journal.accounts.root() {
            return Ok(());
        }
        let account = self.journal.accounts.get(id);
        if account.total.is_zero() && !self.options.is_set("empty") {
            return Ok(());
        }
        let name = if self.options.is_set("flat") {
            account.full_name.to_string()
        } else {
            let indent = 2 * (account.depth().saturating_sub(1));
            format!("{:indent$}{}", "", account.name)
        };
        writeln!(self.out, "{:>20}  {}", account.total.to_string(), name)?;
        self.printed += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        if self.options.is_set("no_total") || self.printed == 0 {
            return Ok(());
        }
        let root = self.journal.accounts.get(self.journal.accounts.root());
        writeln!(self.out, "{:>20}", "--------------------")?;
        writeln!(self.out, "{:>20}", root.total.to_string())?;
        Ok(())
    }
}

/// Journal statistics gathered from the filtered stream.
pub struct GatherStatistics<'a> {
    out: &'a mut String,
    postings: usize,
    entries: HashSet<EntryId>,
    accounts: HashSet<AccountId>,
    commodities: HashSet<String>,
    earliest: Option<NaiveDate>,
    latest: Option<NaiveDate>,
}

impl<'a> GatherStatistics<'a> {
    /// Create a statistics terminal writing into `out`.
    pub fn new(out: &'a mut String) -> Self {
        Self {
            out,
            postings: 0,
            entries: HashSet::new(),
            accounts: HashSet::new(),
            commodities: HashSet::new(),
            earliest: None,
            latest: None,
        }
    }
}

impl PostingSink for GatherStatistics<'_> {
    fn item(&mut self, view: PostingView) -> Result<(), ReportError> {
        self.postings += 1;
        self.entries.insert(view.entry);
        self.accounts.insert(view.account);
        if let Value::Amount(a) = &view.amount {
            self.commodities.insert(a.commodity.to_string());
        }
        self.earliest = Some(self.earliest.map_or(view.date, |d| d.min(view.date)));
        self.latest = Some(self.latest.map_or(view.date, |d| d.max(view.date)));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        writeln!(self.out, "Entries:     {}", self.entries.len())?;
        writeln!(self.out, "Postings:    {}", self.postings)?;
        writeln!(self.out, "Accounts:    {}", self.accounts.len())?;
        writeln!(self.out, "Commodities: {}", self.commodities.len())?;
        if let (Some(earliest), Some(latest)) = (self.earliest, self.latest) {
            writeln!(self.out, "Range:       {earliest} to {latest}")?;
            let days = (latest - earliest).num_days().max(1);
            let per_day = self.postings as f64 / days as f64;
            writeln!(self.out, "Per day:     {per_day:.2} postings")?;
        }
        Ok(())
    }
}
