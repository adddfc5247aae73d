//! Commodity price history for market valuation.
//!
//! Quotes are stored per base commodity as a date-sorted series. Lookup
//! returns the most recent rate at or before the requested date, falling
//! back to the inverse pair when only the reverse direction is quoted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::amount::Amount;
use crate::intern::Symbol;

/// One recorded quote: base priced in `commodity` on `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Quote date.
    pub date: NaiveDate,
    /// Units of the quote commodity per unit of base.
    pub rate: Decimal,
    /// The quote commodity.
    pub commodity: Symbol,
}

/// Historical prices indexed by base commodity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    quotes: HashMap<Symbol, Vec<Quote>>,
}

impl PriceHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quote, keeping the base's series date-sorted.
    pub fn record(
        &mut self,
        base: impl Into<Symbol>,
        date: NaiveDate,
        rate: Decimal,
        quote: impl Into<Symbol>,
    ) {
        let series = self.quotes.entry(base.into()).or_default();
        series.push(Quote {
            date,
            rate,
            commodity: quote.into(),
        });
        series.sort_by_key(|q| q.date);
    }

    /// Iterate every recorded quote as `(base, quote)` tuples, grouped by
    /// base commodity in unspecified base order, date-sorted within a base.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Quote)> {
        self.quotes
            .iter()
            .flat_map(|(base, series)| series.iter().map(move |q| (base, q)))
    }

    /// Whether any quote exists.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// The conversion rate from `base` to `quote` as of `date`.
    ///
    /// Tries the direct pair first, then the inverse pair.
    pub fn rate(&self, base: &str, quote: &str, date: NaiveDate) -> Option<Decimal> {
        if base == quote {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.direct_rate(base, quote, date) {
            return Some(rate);
        }
        match self.direct_rate(quote, base, date) {
            Some(rate) if rate != Decimal::ZERO => Some(Decimal::ONE / rate),
            _ => None,
        }
    }

    fn direct_rate(&self, base: &str, quote: &str, date: NaiveDate) -> Option<Decimal> {
        let series = self.quotes.get(&Symbol::from(base))?;
        series
            .iter()
            .rev()
            .find(|q| q.date <= date && q.commodity == quote)
            .map(|q| q.rate)
    }

    /// Market value of an amount as of a date, in whatever commodity the
    /// latest applicable quote is expressed in.
    ///
    /// Returns `None` when the base commodity has no quote at or before the
    /// date, leaving the caller to fall back to the original amount.
    pub fn value_of(&self, amount: &Amount, date: NaiveDate) -> Option<Amount> {
        let series = self.quotes.get(&amount.commodity)?;
        let quote = series.iter().rev().find(|q| q.date <= date)?;
        Some(Amount::new(
            amount.number * quote.rate,
            quote.commodity.clone(),
        ))
    }

    /// Convert an amount to a target commodity as of a date.
    ///
    /// Returns `None` when no rate is discoverable.
    pub fn convert(&self, amount: &Amount, to: &str, date: NaiveDate) -> Option<Amount> {
        if amount.commodity == to {
            return Some(amount.clone());
        }
        self.rate(&amount.commodity, to, date)
            .map(|rate| Amount::new(amount.number * rate, to))
    }
}
