//! # Refund Rates and Rarity Weights
//!
//! **No floating point in the ledger path.**
//!
//! A refund share is held as an 18-decimal fixed-point value taken digit by
//! digit from the configured decimal (`0.12345` is stored as exactly
//! `123_450_000_000_000_000`). Refunds are computed from it with integer
//! round-half-up, which is `round(cost * fraction)` for the non-negative
//! amounts a pull deals with. Rarity weights are plain integers.

use std::collections::BTreeMap;

use covey_shared::{Rarity, WardrobeItem};

use crate::error::{WardrobeError, WardrobeResult};

/// Decimal places kept for a refund share.
const FRACTION_DECIMALS: u32 = 18;

/// Fixed-point value of 100%.
const SCALE: u128 = 10u128.pow(FRACTION_DECIMALS);

/// Fixed-point units per basis point.
const UNITS_PER_BASIS_POINT: u128 = SCALE / 10_000;

/// Share of a pull cost returned when the draw is a duplicate.
///
/// Internally stores `fraction * 10^18`, never above `10^18`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RefundRate(u128);

impl RefundRate {
    /// No refund.
    pub const NONE: Self = Self(0);

    /// Full refund.
    pub const FULL: Self = Self(SCALE);

    /// Creates a rate from basis points (10000 = 100%).
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidRefundRate` above 10000.
    pub fn from_basis_points(basis_points: u32) -> WardrobeResult<Self> {
        if basis_points > 10_000 {
            return Err(WardrobeError::InvalidRefundRate(format!(
                "{basis_points} basis points exceeds 100%"
            )));
        }
        Ok(Self(u128::from(basis_points) * UNITS_PER_BASIS_POINT))
    }

    /// Creates a rate from a fraction in `[0, 1]` (e.g. `0.1` = 10%).
    ///
    /// The fraction is read through its shortest decimal form, so the rate
    /// is exactly the decimal that was configured. Digits past the 18th are
    /// rounded half-up.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidRefundRate` for NaN or values outside `[0, 1]`.
    pub fn from_fraction(fraction: f64) -> WardrobeResult<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(WardrobeError::InvalidRefundRate(format!(
                "{fraction} is outside [0, 1]"
            )));
        }
        if fraction == 0.0 {
            return Ok(Self::NONE);
        }

        // `Display` for f64 never uses exponent notation.
        let text = fraction.to_string();
        let (whole, digits) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let digit = |c: char| {
            c.to_digit(10)
                .map(u128::from)
                .ok_or_else(|| WardrobeError::InvalidRefundRate(format!("cannot read {text} as a decimal")))
        };

        let mut units = match whole {
            "0" => 0,
            "1" => SCALE,
            _ => return Err(WardrobeError::InvalidRefundRate(format!("{text} is outside [0, 1]"))),
        };
        let mut place = SCALE;
        for c in digits.chars() {
            let value = digit(c)?;
            if place == 1 {
                if value >= 5 {
                    units += 1;
                }
                break;
            }
            place /= 10;
            units += value * place;
        }

        Ok(Self(units.min(SCALE)))
    }

    /// The rate as a fraction, for display and wire models.
    ///
    /// Returns the same `f64` that [`RefundRate::from_fraction`] was given
    /// for any input with at most 18 decimals.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_fraction(self) -> f64 {
        let decimal = format!("{}.{:018}", self.0 / SCALE, self.0 % SCALE);
        decimal
            .parse()
            .unwrap_or_else(|_| self.0 as f64 / SCALE as f64)
    }

    /// Currency returned for a duplicate on a pull of `cost`.
    #[inline]
    #[must_use]
    pub fn refund_for(self, cost: u32) -> i64 {
        let refund = (u128::from(cost) * self.0 + SCALE / 2) / SCALE;
        // Never above `cost`.
        u32::try_from(refund).map_or(i64::from(cost), i64::from)
    }
}

/// Relative draw weight per rarity tier.
///
/// - Empty map: every item weighs 1 (uniform draw).
/// - Otherwise: unranked items weigh 1, ranked items weigh their tier's
///   entry, and a tier missing from the map weighs 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RarityWeights {
    weights: BTreeMap<Rarity, u32>,
}

impl RarityWeights {
    /// Weight of anything drawn uniformly.
    pub const UNIFORM_WEIGHT: u32 = 1;

    /// The uniform table.
    #[must_use]
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Builder: sets one tier's weight.
    #[must_use]
    pub fn with(mut self, rarity: Rarity, weight: u32) -> Self {
        self.weights.insert(rarity, weight);
        self
    }

    /// Sets one tier's weight.
    pub fn set(&mut self, rarity: Rarity, weight: u32) {
        self.weights.insert(rarity, weight);
    }

    /// Configured weight of a tier, if any.
    #[must_use]
    pub fn get(&self, rarity: Rarity) -> Option<u32> {
        self.weights.get(&rarity).copied()
    }

    /// Returns true if no tier is configured.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.weights.is_empty()
    }

    /// Configured tiers.
    pub fn iter(&self) -> impl Iterator<Item = (Rarity, u32)> + '_ {
        self.weights.iter().map(|(&rarity, &weight)| (rarity, weight))
    }

    /// Configured tiers as a map, for broadcasting.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<Rarity, u32> {
        self.weights.clone()
    }

    /// Draw weight of one item.
    #[inline]
    #[must_use]
    pub fn weight_of(&self, item: &WardrobeItem) -> u32 {
        if self.is_uniform() {
            return Self::UNIFORM_WEIGHT;
        }
        match item.rarity {
            Some(rarity) => self.get(rarity).unwrap_or(0),
            None => Self::UNIFORM_WEIGHT,
        }
    }

    /// Sum of draw weights over a pool.
    #[must_use]
    pub fn total_for(&self, pool: &[WardrobeItem]) -> u64 {
        pool.iter().map(|item| u64::from(self.weight_of(item))).sum()
    }
}

impl FromIterator<(Rarity, u32)> for RarityWeights {
    fn from_iter<I: IntoIterator<Item = (Rarity, u32)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}
