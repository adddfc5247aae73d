//! Single-commodity amounts, optionally annotated with lot details.
//!
//! An [`Amount`] pairs a decimal quantity with a commodity. Postings acquired
//! at a known price carry an [`Annotation`] recording the per-unit price, the
//! lot date and an optional lot tag; reports decide how much of that
//! annotation to keep via [`AnnotationKeep`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::intern::Symbol;

/// Lot details attached to an amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotation {
    /// Per-unit acquisition price.
    pub price: Option<Box<Amount>>,
    /// Date the lot was acquired.
    pub date: Option<NaiveDate>,
    /// Free-form lot tag.
    pub tag: Option<String>,
}

impl Annotation {
    /// Whether nothing at all is annotated.
    pub const fn is_empty(&self) -> bool {
        self.price.is_none() && self.date.is_none() && self.tag.is_none()
    }
}

/// Which annotation details a report keeps when stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotationKeep {
    /// Keep lot prices.
    pub price: bool,
    /// Keep lot dates.
    pub date: bool,
    /// Keep lot tags.
    pub tag: bool,
}

impl AnnotationKeep {
    /// Keep everything.
    pub const ALL: Self = Self {
        price: true,
        date: true,
        tag: true,
    };
}

/// A decimal quantity in one commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// The quantity.
    pub number: Decimal,
    /// The commodity code (e.g. "USD", "AAPL").
    pub commodity: Symbol,
    /// Lot annotation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Amount {
    /// Create a new, unannotated amount.
    pub fn new(number: Decimal, commodity: impl Into<Symbol>) -> Self {
        Self {
            number,
            commodity: commodity.into(),
            annotation: None,
        }
    }

    /// Create a zero amount in the given commodity.
    pub fn zero(commodity: impl Into<Symbol>) -> Self {
        Self::new(Decimal::ZERO, commodity)
    }

    /// Attach an annotation, replacing any existing one.
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Whether the quantity is zero.
    pub const fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    /// Whether the quantity is strictly negative.
    pub const fn is_negative(&self) -> bool {
        self.number.is_sign_negative() && !self.number.is_zero()
    }

    /// Absolute value, annotation preserved.
    pub fn abs(&self) -> Self {
        Self {
            number: self.number.abs(),
            commodity: self.commodity.clone(),
            annotation: self.annotation.clone(),
        }
    }

    /// The bare quantity, commodity discarded.
    pub const fn quantity(&self) -> Decimal {
        self.number
    }

    /// Drop every annotation detail the policy does not keep.
    ///
    /// An annotation that ends up empty is removed entirely.
    pub fn strip_annotations(&self, keep: AnnotationKeep) -> Self {
        let annotation = self.annotation.as_ref().and_then(|ann| {
            let stripped = Annotation {
                price: if keep.price { ann.price.clone() } else { None },
                date: if keep.date { ann.date } else { None },
                tag: if keep.tag { ann.tag.clone() } else { None },
            };
            (!stripped.is_empty()).then_some(stripped)
        });
        Self {
            number: self.number,
            commodity: self.commodity.clone(),
            annotation,
        }
    }

    /// Total cost basis of this amount, if a lot price is annotated.
    pub fn cost_basis(&self) -> Option<Self> {
        let price = self.annotation.as_ref()?.price.as_ref()?;
        Some(Self::new(
            self.number * price.number,
            price.commodity.clone(),
        ))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.commodity)?;
        if let Some(ann) = &self.annotation {
            if let Some(price) = &ann.price {
                write!(f, " {{{price}}}")?;
            }
            if let Some(date) = &ann.date {
                write!(f, " [{date}]")?;
            }
            if let Some(tag) = &ann.tag {
                write!(f, " ({tag})")?;
            }
        }
        Ok(())
    }
}

// Same-commodity arithmetic. Mixed-commodity sums go through Balance; these
// operators assume the caller already checked.

impl Add for &Amount {
    type Output = Amount;

    fn add(self, other: &Amount) -> Amount {
        debug_assert_eq!(self.commodity, other.commodity);
        Amount {
            number: self.number + other.number,
            commodity: self.commodity.clone(),
            annotation: None,
        }
    }
}

impl Sub for &Amount {
    type Output = Amount;

    fn sub(self, other: &Amount) -> Amount {
        debug_assert_eq!(self.commodity, other.commodity);
        Amount {
            number: self.number - other.number,
            commodity: self.commodity.clone(),
            annotation: None,
        }
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount {
            number: -self.number,
            commodity: self.commodity.clone(),
            annotation: self.annotation.clone(),
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl AddAssign<&Self> for Amount {
    fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.commodity, other.commodity);
        self.number += other.number;
    }
}

impl SubAssign<&Self> for Amount {
    fn sub_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.commodity, other.commodity);
        self.number -= other.number;
    }
}
