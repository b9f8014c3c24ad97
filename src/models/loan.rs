use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person-to-person loan outside any group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectLoan {
    pub id: Uuid,
    pub lender_id: Uuid,
    pub borrower_id: Uuid,
    pub amount: Decimal,
    pub amount_repaid: Decimal,
    pub currency: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DirectLoan {
    pub fn amount_remaining(&self) -> Decimal {
        self.amount - self.amount_repaid
    }
}
