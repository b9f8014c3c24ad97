use crate::error::DivvyError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl std::fmt::Display for SplitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SplitType::Equal => "equal",
            SplitType::Exact => "exact",
            SplitType::Percentage => "percentage",
            SplitType::Shares => "shares",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SplitType {
    type Err = DivvyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(SplitType::Equal),
            "exact" => Ok(SplitType::Exact),
            "percentage" => Ok(SplitType::Percentage),
            "shares" => Ok(SplitType::Shares),
            other => Err(DivvyError::UnknownSplitType(other.to_string())),
        }
    }
}

/// Input to the split calculator. Which optional field must be present
/// depends on the split type: `amount` for exact splits, `percentage` for
/// percentage splits, `shares` for weighted splits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Uuid,
    pub amount: Option<Decimal>,
    pub percentage: Option<Decimal>,
    pub shares: Option<u32>,
}

impl Participant {
    pub fn of(user_id: Uuid) -> Self {
        Participant {
            user_id,
            amount: None,
            percentage: None,
            shares: None,
        }
    }

    pub fn with_amount(user_id: Uuid, amount: Decimal) -> Self {
        Participant {
            amount: Some(amount),
            ..Self::of(user_id)
        }
    }

    pub fn with_percentage(user_id: Uuid, percentage: Decimal) -> Self {
        Participant {
            percentage: Some(percentage),
            ..Self::of(user_id)
        }
    }

    pub fn with_shares(user_id: Uuid, shares: u32) -> Self {
        Participant {
            shares: Some(shares),
            ..Self::of(user_id)
        }
    }
}

/// One participant's final owed amount, computed once at expense creation.
///
/// `calculated_amount` is the pre-adjustment base; when a rounding remainder
/// was assigned to this participant, `adjustment_amount` carries the delta
/// and `is_rounding_adjustment` is set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalculatedSplit {
    pub user_id: Uuid,
    pub amount_owed: Decimal,
    pub percentage: Decimal,
    pub calculated_amount: Decimal,
    pub adjustment_amount: Decimal,
    pub is_rounding_adjustment: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitValidationStatus {
    Valid,
    SumMismatch,
    PercentageMismatch,
    InvalidParticipants,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitValidationResult {
    pub is_valid: bool,
    pub status: SplitValidationStatus,
    pub message: Option<String>,
    pub difference: Option<Decimal>,
}

impl SplitValidationResult {
    pub fn valid() -> Self {
        SplitValidationResult {
            is_valid: true,
            status: SplitValidationStatus::Valid,
            message: None,
            difference: None,
        }
    }

    pub fn sum_mismatch(difference: Decimal, message: String) -> Self {
        SplitValidationResult {
            is_valid: false,
            status: SplitValidationStatus::SumMismatch,
            message: Some(message),
            difference: Some(difference),
        }
    }

    pub fn invalid_participants() -> Self {
        SplitValidationResult {
            is_valid: false,
            status: SplitValidationStatus::InvalidParticipants,
            message: Some("split list is empty".to_string()),
            difference: None,
        }
    }
}
