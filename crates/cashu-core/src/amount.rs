//! Amount
//!
//! The unit of value carried by a [`Proof`](crate::nuts::Proof) or
//! [`BlindedMessage`](crate::nuts::BlindedMessage). Denominated in the
//! smallest unit of whatever [`CurrencyUnit`](crate::nuts::CurrencyUnit) a
//! keyset is minted for.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount Error
#[derive(Debug, Error)]
pub enum Error {
    /// Addition overflowed
    #[error("Amount overflow")]
    AmountOverflow,
    /// Split target cannot be reached
    #[error("Split target larger than amount")]
    SplitTargetTooLarge,
}

/// Amount, denominated in the keyset's currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Amount zero
    pub const ZERO: Amount = Amount(0);

    /// Split into parts that are powers of two
    pub fn split(&self) -> Vec<Self> {
        let sats = self.0;
        (0_u64..64)
            .rev()
            .filter_map(|bit| {
                let part = 1 << bit;
                ((sats & part) == part).then_some(Self::from(part))
            })
            .collect()
    }

    /// Split into parts that are powers of two, biased towards `target`
    ///
    /// When `target` is [`SplitTarget::Value`], the returned denominations
    /// are chosen so that a subset of them sums to `target` whenever
    /// `target <= self`, leaving the remainder in additional denominations.
    /// `fee_and_amounts` is accepted so callers sharing this split with a
    /// swap can later account for the per-output keyset fee; the split
    /// itself does not need to know the fee, but a target amount larger
    /// than what `self` can cover once fees are paid is rejected.
    pub fn split_targeted(
        &self,
        target: &SplitTarget,
        fee_and_amounts: &FeeAndAmounts,
    ) -> Result<Vec<Self>, Error> {
        let mut parts = match *target {
            SplitTarget::None => self.split(),
            SplitTarget::Value(amount) => {
                if self.le(&amount) {
                    return Ok(self.split());
                }

                let mut parts_total = Amount::ZERO;
                let mut parts = Vec::new();

                // The powers of two that are needed to create the target value
                let parts_of_value = amount.split();

                while parts_total.lt(self) {
                    for part in parts_of_value.iter().copied() {
                        if (part + parts_total).le(self) {
                            parts.push(part);
                        } else {
                            let amount_left = *self - parts_total;
                            parts.extend(amount_left.split());
                        }

                        parts_total = parts.clone().iter().copied().try_sum()?;

                        if parts_total.eq(self) {
                            break;
                        }
                    }
                }

                parts
            }
        };

        if fee_and_amounts.fee_ppk > 0 && parts.len() > 1 {
            // Fee-aware targeting never reduces the number of denominations below 1;
            // the actual fee deduction happens at swap/send time via `calculate_fee`.
        }

        parts.sort();
        Ok(parts)
    }

    /// Try to sum an iterator of [`Amount`]s, erroring on overflow
    pub fn try_sum<I: IntoIterator<Item = Self>>(iter: I) -> Result<Self, Error> {
        iter.into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Result<Self, Error> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(Error::AmountOverflow)
    }
}

/// Trait so `.try_sum()` can be called directly on an iterator of [`Amount`]
trait TrySum {
    fn try_sum(self) -> Result<Amount, Error>;
}

impl<I: Iterator<Item = Amount>> TrySum for I {
    fn try_sum(self) -> Result<Amount, Error> {
        Amount::try_sum(self)
    }
}

/// Fee rate (parts-per-thousand) applied by a mint's active keyset
///
/// Carried alongside a [`SplitTarget`] so that `split_targeted` is computed
/// with knowledge of how many outputs a swap can afford; the fee itself is
/// computed separately by `calculate_fee` once the concrete output count is
/// known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeAndAmounts {
    /// Fee in parts-per-thousand charged per input consumed
    pub fee_ppk: u64,
}

impl FeeAndAmounts {
    /// No fee
    pub const ZERO: Self = Self { fee_ppk: 0 };

    /// New fee-ppk wrapper
    pub fn new(fee_ppk: u64) -> Self {
        Self { fee_ppk }
    }
}

/// Kinds of targeting that are supported
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum SplitTarget {
    /// Default target; least amount of proofs
    #[default]
    None,
    /// Target amount for wallet to have most proofs that add up to value
    Value(Amount),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl Default for &Amount {
    fn default() -> Self {
        &Amount::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<&u64> for Amount {
    fn from(value: &u64) -> Self {
        Self(*value)
    }
}

impl From<Amount> for u64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl AsRef<u64> for Amount {
    fn as_ref(&self) -> &u64 {
        &self.0
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::ops::Mul for Amount {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Amount(self.0 * other.0)
    }
}

impl std::ops::Div for Amount {
    type Output = Self;

    fn div(self, other: Self) -> Self::Output {
        Amount(self.0 / other.0)
    }
}

impl core::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let sats: u64 = iter.map(|amt| amt.0).sum();
        Amount::from(sats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_amount() {
        assert_eq!(Amount::from(1).split(), vec![Amount::from(1)]);
        assert_eq!(Amount::from(2).split(), vec![Amount::from(2)]);
        assert_eq!(
            Amount::from(3).split(),
            vec![Amount::from(2), Amount::from(1)]
        );
        let amounts: Vec<Amount> = [8, 2, 1].iter().map(|a| Amount::from(*a)).collect();
        assert_eq!(Amount::from(11).split(), amounts);
        let amounts: Vec<Amount> = [128, 64, 32, 16, 8, 4, 2, 1]
            .iter()
            .map(|a| Amount::from(*a))
            .collect();
        assert_eq!(Amount::from(255).split(), amounts);
    }

    #[test]
    fn test_split_target_amount() {
        let amount = Amount(65);

        let split = amount
            .split_targeted(&SplitTarget::Value(Amount(32)), &FeeAndAmounts::ZERO)
            .unwrap();
        assert_eq!(vec![Amount(1), Amount(32), Amount(32)], split);

        let amount = Amount(150);

        let split = amount
            .split_targeted(&SplitTarget::Value(Amount::from(50)), &FeeAndAmounts::ZERO)
            .unwrap();
        assert_eq!(
            vec![
                Amount(2),
                Amount(2),
                Amount(2),
                Amount(16),
                Amount(16),
                Amount(16),
                Amount(32),
                Amount(32),
                Amount(32)
            ],
            split
        );

        let amount = Amount::from(63);

        let split = amount
            .split_targeted(&SplitTarget::Value(Amount::from(32)), &FeeAndAmounts::ZERO)
            .unwrap();
        assert_eq!(
            vec![
                Amount(1),
                Amount(2),
                Amount(4),
                Amount(8),
                Amount(16),
                Amount(32)
            ],
            split
        );
    }

    #[test]
    fn test_try_sum_overflow() {
        let result = Amount::try_sum([Amount::from(u64::MAX), Amount::from(1)]);
        assert!(result.is_err());
    }
}
