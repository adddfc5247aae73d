//! Multi-commodity balances.
//!
//! A [`Balance`] is the sum of amounts across any number of commodities,
//! keyed and iterated in commodity order so rendering is deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Neg;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::intern::Symbol;

/// A sum of amounts, one slot per commodity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    amounts: BTreeMap<Symbol, Amount>,
}

impl Balance {
    /// An empty balance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single amount into this balance.
    pub fn add_amount(&mut self, amount: &Amount) {
        if amount.is_zero() {
            return;
        }
        self.amounts
            .entry(amount.commodity.clone())
            .and_modify(|slot| *slot += amount)
            .or_insert_with(|| {
                // Annotations never survive summation.
                Amount::new(amount.number, amount.commodity.clone())
            });
        if self
            .amounts
            .get(&amount.commodity)
            .is_some_and(Amount::is_zero)
        {
            self.amounts.remove(&amount.commodity);
        }
    }

    /// Add another balance into this one.
    pub fn add_balance(&mut self, other: &Self) {
        for amount in other.amounts.values() {
            self.add_amount(amount);
        }
    }

    /// Whether every commodity slot is zero.
    pub fn is_zero(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Number of non-zero commodity slots.
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    /// Whether the balance holds no amounts at all.
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// The amount in one commodity, if present.
    pub fn amount(&self, commodity: &str) -> Option<&Amount> {
        self.amounts.get(&Symbol::from(commodity))
    }

    /// Collapse to a single amount when exactly one commodity is held.
    pub fn single(&self) -> Option<&Amount> {
        if self.amounts.len() == 1 {
            self.amounts.values().next()
        } else {
            None
        }
    }

    /// Iterate amounts in commodity order.
    pub fn iter(&self) -> impl Iterator<Item = &Amount> {
        self.amounts.values()
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        let mut bal = Self::new();
        bal.add_amount(&amount);
        bal
    }
}

impl Neg for &Balance {
    type Output = Balance;

    fn neg(self) -> Balance {
        let mut out = Balance::new();
        for amount in self.amounts.values() {
            out.add_amount(&-amount);
        }
        out
    }
}

impl Neg for Balance {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amounts.is_empty() {
            return write!(f, "0");
        }
        let mut first = true;
        for amount in self.amounts.values() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{amount}")?;
            first = false;
        }
        Ok(())
    }
}
