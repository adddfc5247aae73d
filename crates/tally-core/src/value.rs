//! The dynamic value type reports and expressions compute with.
//!
//! Every conversion between kinds is explicit and may fail with a
//! [`ValueError`]; arithmetic is closed over the union, promoting
//! mixed-commodity amount sums to balances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::amount::Amount;
use crate::balance::Balance;

/// Error raised by a failed value conversion or combination.
#[derive(Debug, Error)]
pub enum ValueError {
    /// A value of one kind was used where another was required.
    #[error("type error: expected {expected}, found {found}")]
    Type {
        /// The kind the operation required.
        expected: &'static str,
        /// The kind actually supplied.
        found: &'static str,
    },
    /// Two values that cannot be combined arithmetically.
    #[error("cannot {op} {lhs} and {rhs}")]
    Combine {
        /// The attempted operation.
        op: &'static str,
        /// Left operand kind.
        lhs: &'static str,
        /// Right operand kind.
        rhs: &'static str,
    },
    /// A string that does not parse as a date.
    #[error("malformed date: {0}")]
    BadDate(String),
}

/// A tagged union over everything a report expression can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single-commodity amount.
    Amount(Amount),
    /// A multi-commodity balance.
    Balance(Balance),
    /// Text.
    String(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A boolean.
    Boolean(bool),
    /// An ordered sequence of values.
    Sequence(Vec<Value>),
}

impl Value {
    /// The kind name, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Amount(_) => "amount",
            Self::Balance(_) => "balance",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Boolean(_) => "boolean",
            Self::Sequence(_) => "sequence",
        }
    }

    fn type_error(&self, expected: &'static str) -> ValueError {
        ValueError::Type {
            expected,
            found: self.kind(),
        }
    }

    /// Convert to a single amount.
    ///
    /// A balance converts only when it holds exactly one commodity; an empty
    /// balance converts to a bare zero.
    pub fn to_amount(&self) -> Result<Amount, ValueError> {
        match self {
            Self::Amount(a) => Ok(a.clone()),
            Self::Balance(b) => {
                if b.is_zero() {
                    Ok(Amount::new(Decimal::ZERO, ""))
                } else {
                    b.single().cloned().ok_or_else(|| self.type_error("amount"))
                }
            }
            _ => Err(self.type_error("amount")),
        }
    }

    /// Convert to a balance.
    pub fn to_balance(&self) -> Result<Balance, ValueError> {
        match self {
            Self::Amount(a) => Ok(Balance::from(a.clone())),
            Self::Balance(b) => Ok(b.clone()),
            _ => Err(self.type_error("balance")),
        }
    }

    /// Convert to a date. Strings parse as `YYYY-MM-DD` or `YYYY/MM/DD`.
    pub fn to_date(&self) -> Result<NaiveDate, ValueError> {
        match self {
            Self::Date(d) => Ok(*d),
            Self::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
                .map_err(|_| ValueError::BadDate(s.clone())),
            _ => Err(self.type_error("date")),
        }
    }

    /// Truthiness: false, zero amounts/balances, empty strings and empty
    /// sequences are false; everything else is true.
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Amount(a) => !a.is_zero(),
            Self::Balance(b) => !b.is_zero(),
            Self::String(s) => !s.is_empty(),
            Self::Date(_) => true,
            Self::Sequence(seq) => !seq.is_empty(),
        }
    }

    /// Render as display text. Always succeeds.
    pub fn as_display_string(&self) -> String {
        self.to_string()
    }

    /// Add another value, promoting as needed.
    pub fn add(&self, other: &Self) -> Result<Self, ValueError> {
        match (self, other) {
            (Self::Amount(a), Self::Amount(b)) => {
                if a.commodity == b.commodity {
                    Ok(Self::Amount(a + b))
                } else {
                    let mut bal = Balance::from(a.clone());
                    bal.add_amount(b);
                    Ok(Self::Balance(bal))
                }
            }
            (Self::Amount(_) | Self::Balance(_), Self::Amount(_) | Self::Balance(_)) => {
                let mut bal = self.to_balance()?;
                bal.add_balance(&other.to_balance()?);
                Ok(Self::Balance(bal))
            }
            (Self::String(a), Self::String(b)) => {
                let mut out = a.clone();
                out.push_str(b);
                Ok(Self::String(out))
            }
            (Self::Sequence(a), Self::Sequence(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(Self::Sequence(out))
            }
            _ => Err(ValueError::Combine {
                op: "add",
                lhs: self.kind(),
                rhs: other.kind(),
            }),
        }
    }

    /// Subtract another value.
    pub fn sub(&self, other: &Self) -> Result<Self, ValueError> {
        self.add(&other.neg()?)
    }

    /// Arithmetic negation.
    pub fn neg(&self) -> Result<Self, ValueError> {
        match self {
            Self::Amount(a) => Ok(Self::Amount(-a)),
            Self::Balance(b) => Ok(Self::Balance(-b)),
            Self::Boolean(b) => Ok(Self::Boolean(!b)),
            _ => Err(ValueError::Combine {
                op: "negate",
                lhs: self.kind(),
                rhs: "-",
            }),
        }
    }

    /// Ordering between two comparable values.
    pub fn compare(&self, other: &Self) -> Result<std::cmp::Ordering, ValueError> {
        match (self, other) {
            (Self::Amount(a), Self::Amount(b)) if a.commodity == b.commodity => {
                Ok(a.number.cmp(&b.number))
            }
            (Self::String(a), Self::String(b)) => Ok(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Ok(a.cmp(b)),
            _ => Err(ValueError::Combine {
                op: "compare",
                lhs: self.kind(),
                rhs: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(a) => write!(f, "{a}"),
            Self::Balance(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Sequence(seq) => {
                write!(f, "(")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Amount> for Value {
    fn from(a: Amount) -> Self {
        Self::Amount(a)
    }
}

impl From<Balance> for Value {
    fn from(b: Balance) -> Self {
        Self::Balance(b)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(n: Decimal) -> Value {
        Value::Amount(Amount::new(n, "USD"))
    }

    #[test]
    fn test_add_same_commodity_stays_amount() {
        let sum = usd(dec!(10)).add(&usd(dec!(5))).unwrap();
        assert_eq!(sum, usd(dec!(15)));
    }

    #[test]
    fn test_add_mixed_commodities_promotes() {
        let eur = Value::Amount(Amount::new(dec!(3), "EUR"));
        let sum = usd(dec!(10)).add(&eur).unwrap();
        match sum {
            Value::Balance(b) => assert_eq!(b.len(), 2),
            other => panic!("expected balance, got {other:?}"),
        }
    }

    #[test]
    fn test_add_incompatible_kinds() {
        let err = usd(dec!(1)).add(&Value::Boolean(true)).unwrap_err();
        assert!(matches!(err, ValueError::Combine { .. }));
    }

    #[test]
    fn test_to_amount_from_singleton_balance() {
        let bal = Value::Balance(Balance::from(Amount::new(dec!(7), "USD")));
        assert_eq!(bal.to_amount().unwrap().number, dec!(7));
    }

    #[test]
    fn test_to_date() {
        let d = Value::String("2024-03-01".into()).to_date().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let d = Value::String("2024/03/01".into()).to_date().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(Value::String("yesterday".into()).to_date().is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!usd(dec!(0)).to_boolean());
        assert!(usd(dec!(1)).to_boolean());
        assert!(!Value::String(String::new()).to_boolean());
        assert!(Value::Date(NaiveDate::MIN).to_boolean());
    }

    #[test]
    fn test_compare() {
        use std::cmp::Ordering;
        assert_eq!(
            usd(dec!(1)).compare(&usd(dec!(2))).unwrap(),
            Ordering::Less
        );
        assert!(usd(dec!(1)).compare(&Value::Boolean(true)).is_err());
    }
}
