use crate::constants::SPLIT_TOLERANCE;
use crate::error::DivvyError;
use crate::models::{CalculatedSplit, Participant, SplitType};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use uuid::Uuid;

const HUNDRED: Decimal = dec!(100);

/// Chooses which participant absorbs the cent-level rounding remainder.
///
/// Product policy, not arithmetic: alternate products can substitute a
/// different rule without touching the split loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// The payer absorbs the remainder when they take part in the split,
    /// otherwise the first participant does.
    #[default]
    PayerFirst,
    /// Always the first participant in input order.
    FirstParticipant,
    /// The participant with the largest pre-adjustment base amount; first
    /// wins on ties.
    LargestShare,
}

impl RemainderPolicy {
    fn receiver_index(&self, payer_id: Uuid, splits: &[CalculatedSplit]) -> usize {
        match self {
            RemainderPolicy::PayerFirst => splits
                .iter()
                .position(|s| s.user_id == payer_id)
                .unwrap_or(0),
            RemainderPolicy::FirstParticipant => 0,
            RemainderPolicy::LargestShare => {
                let mut idx = 0;
                for (i, s) in splits.iter().enumerate() {
                    if s.calculated_amount > splits[idx].calculated_amount {
                        idx = i;
                    }
                }
                idx
            }
        }
    }
}

/// Divides an expense total across participants so that the owed amounts sum
/// to the total exactly, assigning any rounding remainder to a single
/// participant chosen by the [`RemainderPolicy`].
pub struct SplitCalculator {
    policy: RemainderPolicy,
}

impl Default for SplitCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitCalculator {
    pub fn new() -> Self {
        SplitCalculator {
            policy: RemainderPolicy::default(),
        }
    }

    pub fn with_policy(policy: RemainderPolicy) -> Self {
        SplitCalculator { policy }
    }

    pub fn calculate(
        &self,
        total: Decimal,
        split_type: SplitType,
        participants: &[Participant],
        payer_id: Uuid,
    ) -> Result<Vec<CalculatedSplit>, DivvyError> {
        if participants.is_empty() {
            return Err(DivvyError::InvalidSplitInput(
                "participant list is empty".to_string(),
            ));
        }
        if total <= Decimal::ZERO {
            return Err(DivvyError::InvalidSplitInput(
                "total amount must be positive".to_string(),
            ));
        }
        if total.round_dp(2) != total {
            return Err(DivvyError::InvalidSplitInput(
                "total amount cannot have more than 2 decimal places".to_string(),
            ));
        }

        let mut splits = match split_type {
            SplitType::Equal => self.equal_splits(total, participants, payer_id),
            SplitType::Exact => exact_splits(total, participants),
            SplitType::Percentage => self.percentage_splits(total, participants, payer_id),
            SplitType::Shares => self.weighted_splits(total, participants, payer_id),
        }?;

        // Derived display percentage, regardless of strategy.
        for split in &mut splits {
            split.percentage = round_cents(split.amount_owed / total * HUNDRED);
        }

        Ok(splits)
    }

    fn equal_splits(
        &self,
        total: Decimal,
        participants: &[Participant],
        payer_id: Uuid,
    ) -> Result<Vec<CalculatedSplit>, DivvyError> {
        let n = Decimal::from(participants.len());
        let base = (total / n).round_dp_with_strategy(2, RoundingStrategy::ToZero);
        let remainder = total - base * n;

        let mut splits: Vec<CalculatedSplit> = participants
            .iter()
            .map(|p| base_split(p.user_id, base))
            .collect();

        apply_adjustment(&mut splits, remainder, self.policy, payer_id);
        Ok(splits)
    }

    fn percentage_splits(
        &self,
        total: Decimal,
        participants: &[Participant],
        payer_id: Uuid,
    ) -> Result<Vec<CalculatedSplit>, DivvyError> {
        let mut percentages = Vec::with_capacity(participants.len());
        let mut sum = Decimal::ZERO;
        for p in participants {
            let pct = p.percentage.ok_or_else(|| {
                DivvyError::InvalidSplitInput(format!(
                    "participant {} is missing a percentage",
                    p.user_id
                ))
            })?;
            if pct <= Decimal::ZERO || pct > HUNDRED {
                return Err(DivvyError::InvalidSplitInput(format!(
                    "percentage of participant {} must be in (0, 100]",
                    p.user_id
                )));
            }
            sum += pct;
            percentages.push((p.user_id, pct));
        }

        let difference = HUNDRED - sum;
        if difference.abs() >= SPLIT_TOLERANCE {
            return Err(DivvyError::PercentageMismatch { sum, difference });
        }

        let mut splits: Vec<CalculatedSplit> = percentages
            .into_iter()
            .map(|(user_id, pct)| base_split(user_id, round_cents(total * pct / HUNDRED)))
            .collect();

        let assigned: Decimal = splits.iter().map(|s| s.amount_owed).sum();
        apply_adjustment(&mut splits, total - assigned, self.policy, payer_id);
        Ok(splits)
    }

    fn weighted_splits(
        &self,
        total: Decimal,
        participants: &[Participant],
        payer_id: Uuid,
    ) -> Result<Vec<CalculatedSplit>, DivvyError> {
        let mut weights = Vec::with_capacity(participants.len());
        let mut total_shares: u64 = 0;
        for p in participants {
            let shares = p.shares.ok_or_else(|| {
                DivvyError::InvalidSplitInput(format!(
                    "participant {} is missing a share count",
                    p.user_id
                ))
            })?;
            if shares == 0 {
                return Err(DivvyError::InvalidSplitInput(format!(
                    "share count of participant {} must be positive",
                    p.user_id
                )));
            }
            total_shares += u64::from(shares);
            weights.push((p.user_id, shares));
        }

        let denominator = Decimal::from(total_shares);
        let mut splits: Vec<CalculatedSplit> = weights
            .into_iter()
            .map(|(user_id, shares)| {
                let raw = total * Decimal::from(shares) / denominator;
                base_split(user_id, round_cents(raw))
            })
            .collect();

        let assigned: Decimal = splits.iter().map(|s| s.amount_owed).sum();
        apply_adjustment(&mut splits, total - assigned, self.policy, payer_id);
        Ok(splits)
    }
}

fn exact_splits(
    total: Decimal,
    participants: &[Participant],
) -> Result<Vec<CalculatedSplit>, DivvyError> {
    let mut splits = Vec::with_capacity(participants.len());
    let mut sum = Decimal::ZERO;
    for p in participants {
        let amount = p.amount.ok_or_else(|| {
            DivvyError::InvalidSplitInput(format!(
                "participant {} is missing an exact amount",
                p.user_id
            ))
        })?;
        if amount <= Decimal::ZERO {
            return Err(DivvyError::InvalidSplitInput(format!(
                "exact amount of participant {} must be positive",
                p.user_id
            )));
        }
        if amount.round_dp(2) != amount {
            return Err(DivvyError::InvalidSplitInput(format!(
                "exact amount of participant {} cannot have more than 2 decimal places",
                p.user_id
            )));
        }
        sum += amount;
        splits.push(base_split(p.user_id, amount));
    }

    let difference = total - sum;
    if difference.abs() >= SPLIT_TOLERANCE {
        return Err(DivvyError::SumMismatch {
            expected: total,
            actual: sum,
            difference,
        });
    }

    // Caller-supplied amounts are used verbatim; no redistribution.
    Ok(splits)
}

fn base_split(user_id: Uuid, amount: Decimal) -> CalculatedSplit {
    CalculatedSplit {
        user_id,
        amount_owed: amount,
        percentage: Decimal::ZERO,
        calculated_amount: amount,
        adjustment_amount: Decimal::ZERO,
        is_rounding_adjustment: false,
    }
}

fn apply_adjustment(
    splits: &mut [CalculatedSplit],
    residual: Decimal,
    policy: RemainderPolicy,
    payer_id: Uuid,
) {
    if residual.is_zero() {
        return;
    }
    let idx = policy.receiver_index(payer_id, splits);
    splits[idx].amount_owed += residual;
    splits[idx].adjustment_amount = residual;
    splits[idx].is_rounding_adjustment = true;
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
