//! Pipeline assembly.
//!
//! [`compose_posting_chain`] reads the option registry and builds the stage
//! list in one fixed order, so the same option set always yields the same
//! pipeline regardless of the order the options were given in. Stages whose
//! options are unset are simply absent.

use chrono::NaiveDate;
use tally_core::Journal;

use crate::error::ReportError;
use crate::filters::{
    Chain, HeadTailFilter, PeriodFilter, PeriodWidth, PostingSink, PredicateFilter, RelatedFilter,
    SortFilter, StateFilter, StatePolicy, ValuationFilter, ValuationMode,
};
use crate::options::Options;

fn period_width(options: &Options) -> Option<PeriodWidth> {
    if options.is_set("daily") {
        Some(PeriodWidth::Daily)
    } else if options.is_set("weekly") {
        Some(PeriodWidth::Weekly)
    } else if options.is_set("monthly") {
        Some(PeriodWidth::Monthly)
    } else if options.is_set("quarterly") {
        Some(PeriodWidth::Quarterly)
    } else if options.is_set("yearly") {
        Some(PeriodWidth::Yearly)
    } else if options.is_set("subtotal") {
        Some(PeriodWidth::All)
    } else {
        None
    }
}

fn count(options: &Options, name: &str) -> usize {
    // Negative counts clamp to zero, i.e. unset.
    options
        .num(name)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

/// Build the postings pipeline over `terminal`.
///
/// Stage order is fixed: state filters, selection predicates, related
/// expansion, valuation, sort, period collapse, display predicate, then
/// head/tail truncation. With `minimal` set, only the selection predicate
/// survives; aggregation uses that form so totals see every selected
/// posting exactly once, untouched by presentation stages.
pub fn compose_posting_chain<'a>(
    journal: &'a Journal,
    options: &'a Options,
    now: NaiveDate,
    terminal: Box<dyn PostingSink + 'a>,
    minimal: bool,
) -> Chain<'a> {
    let mut chain = Chain::new(terminal);

    if !minimal {
        for (name, policy) in [
            ("cleared", StatePolicy::Cleared),
            ("uncleared", StatePolicy::Uncleared),
            ("pending", StatePolicy::Pending),
            ("real", StatePolicy::Real),
            ("actual", StatePolicy::Actual),
        ] {
            if options.is_set(name) {
                chain.push(Box::new(StateFilter::new(policy)));
            }
        }
    }

    if let Some(limit) = options.expr("limit") {
        chain.push(Box::new(PredicateFilter::new(
            "limit",
            limit.clone(),
            journal,
            options,
            now,
        )));
    }
    if let Some(only) = options.expr("only") {
        chain.push(Box::new(PredicateFilter::new(
            "only",
            only.clone(),
            journal,
            options,
            now,
        )));
    }

    if minimal {
        return chain;
    }

    if options.is_set("related") || options.is_set("related_all") {
        chain.push(Box::new(RelatedFilter::new(
            journal,
            options.is_set("related_all"),
        )));
    }

    if options.is_set("market") {
        chain.push(Box::new(ValuationFilter::new(
            journal,
            ValuationMode::Market,
            now,
        )));
    } else if options.is_set("basis") {
        chain.push(Box::new(ValuationFilter::new(
            journal,
            ValuationMode::Basis,
            now,
        )));
    }

    if let Some(key) = options.expr("sort") {
        chain.push(Box::new(SortFilter::new(key.clone(), journal, options, now)));
    }

    if let Some(width) = period_width(options) {
        chain.push(Box::new(PeriodFilter::new(width)));
    }

    if let Some(display) = options.expr("display") {
        chain.push(Box::new(PredicateFilter::new(
            "display",
            display.clone(),
            journal,
            options,
            now,
        )));
    }

    let head = count(options, "head");
    let tail = count(options, "tail");
    if head > 0 || tail > 0 {
        chain.push(Box::new(HeadTailFilter::new(head, tail)));
    }

    chain
}
