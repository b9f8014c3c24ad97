use crate::constants::SPLIT_TOLERANCE;
use crate::models::{CalculatedSplit, SplitValidationResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Post-hoc sanity check over persisted splits, independent of the
/// calculation path. Guards against participant records edited out of band.
pub fn validate_splits(total: Decimal, splits: &[CalculatedSplit]) -> SplitValidationResult {
    if splits.is_empty() {
        return SplitValidationResult::invalid_participants();
    }

    let sum: Decimal = splits.iter().map(|s| s.amount_owed).sum();
    let difference = total - sum;
    if difference.abs() >= SPLIT_TOLERANCE {
        return SplitValidationResult::sum_mismatch(
            difference,
            format!("split amounts sum to {}, expected {}", sum, total),
        );
    }

    SplitValidationResult::valid()
}

/// Residual between the total and the split sum at 4-decimal precision.
/// Diagnostic only; mutates nothing.
pub fn calculate_rounding_difference(total: Decimal, splits: &[CalculatedSplit]) -> Decimal {
    let sum: Decimal = splits.iter().map(|s| s.amount_owed).sum();
    (total - sum).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}
