//! Report error types.

use tally_core::ValueError;
use thiserror::Error;

/// Error raised while assembling or running a report.
///
/// Every variant is scoped to the single invocation that triggered it;
/// per-run state is reset at the start of each run, so a failed invocation
/// never corrupts a later one.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An identifier the resolver could not map to anything.
    #[error("undefined identifier: {0}")]
    UndefinedIdentifier(String),
    /// A malformed predicate or expression.
    #[error("malformed expression: {0}")]
    BadExpression(String),
    /// A value used where another kind was required.
    #[error(transparent)]
    Value(#[from] ValueError),
    /// A posting referenced an account index outside the tree.
    #[error("account tree invariant violated: {0}")]
    AccountTree(String),
    /// An option cell rejected an assigned value.
    #[error("invalid value for option {name}: {value}")]
    OptionValue {
        /// The option's canonical name.
        name: String,
        /// The rejected value.
        value: String,
    },
    /// Market valuation found no usable price.
    #[error("no price known for commodity {0}")]
    UnknownCommodity(String),
    /// Formatting into the output buffer failed.
    #[error(transparent)]
    Format(#[from] std::fmt::Error),
}
