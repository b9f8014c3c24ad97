use super::balance::SplitRecord;
use super::split::{CalculatedSplit, SplitType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted per-participant fact derived from a [`CalculatedSplit`].
///
/// Owed amounts are immutable after creation; only the settlement marker
/// changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub user_id: Uuid,
    pub amount_owed: Decimal,
    pub percentage: Decimal,
    pub adjustment_amount: Decimal,
    pub is_rounding_adjustment: bool,
    pub settled_at: Option<DateTime<Utc>>,
}

impl ExpenseShare {
    pub fn from_split(split: &CalculatedSplit) -> Self {
        ExpenseShare {
            user_id: split.user_id,
            amount_owed: split.amount_owed,
            percentage: split.percentage,
            adjustment_amount: split.adjustment_amount,
            is_rounding_adjustment: split.is_rounding_adjustment,
            settled_at: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled_at.is_some()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub payer_id: Uuid,
    pub added_by: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub split_type: SplitType,
    pub splits: Vec<ExpenseShare>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Flattens the expense into the per-participant records the balance
    /// aggregator folds. Settled shares no longer contribute.
    pub fn split_records(&self) -> Vec<SplitRecord> {
        self.splits
            .iter()
            .filter(|s| !s.is_settled())
            .map(|s| SplitRecord {
                group_id: Some(self.group_id),
                payer_id: self.payer_id,
                user_id: s.user_id,
                amount_owed: s.amount_owed,
                currency: self.currency.clone(),
            })
            .collect()
    }
}
