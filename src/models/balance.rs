use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of one participant's owed amount in one expense, as handed to the
/// balance aggregator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitRecord {
    pub group_id: Option<Uuid>,
    pub payer_id: Uuid,
    pub user_id: Uuid,
    pub amount_owed: Decimal,
    pub currency: String,
}

/// Net directed debt between two users after folding all transactions
/// between them. The amount is always positive and only one direction per
/// pair is ever represented.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NetBalanceEdge {
    pub debtor_id: Uuid,
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
}

/// One payment in a settlement plan. Ephemeral, recomputed on every query.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedDebt {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRef {
    pub id: Uuid,
    pub name: String,
}

/// A user's combined standing with one counterparty. Positive amounts mean
/// the counterparty owes the querying user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsolidatedPosition {
    pub counterparty_id: Uuid,
    pub total: Decimal,
    pub direct_amount: Decimal,
    pub group_amount: Decimal,
    pub groups: Vec<GroupRef>,
}
