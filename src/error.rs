use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Serialize)]
pub enum DivvyError {
    /// Split input rejected before any computation runs
    #[error("Invalid split input: {0}")]
    InvalidSplitInput(String),

    /// Exact-split amounts do not add up to the expense total
    #[error("Split amounts sum to {actual}, expected {expected} (difference {difference})")]
    SumMismatch {
        expected: Decimal,
        actual: Decimal,
        difference: Decimal,
    },

    /// Percentages do not add up to 100
    #[error("Split percentages sum to {sum}, expected 100 (difference {difference})")]
    PercentageMismatch { sum: Decimal, difference: Decimal },

    /// Split type outside {equal, exact, percentage, shares}
    #[error("Unknown split type: {0}")]
    UnknownSplitType(String),

    /// Records from more than one currency handed to a single netting run
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: String, found: String },

    /// Monetary amount is non-positive or carries sub-cent precision
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// User with given ID not found
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// Group with given ID not found
    #[error("Group {0} not found")]
    GroupNotFound(Uuid),

    /// Expense with given ID not found
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Loan with given ID not found
    #[error("Loan {0} not found")]
    LoanNotFound(Uuid),

    /// User is not a member of the group
    #[error("User {0} is not a group member")]
    NotGroupMember(Uuid),

    /// User is already a member of the group
    #[error("User {0} is already a group member")]
    AlreadyGroupMember(Uuid),

    /// Only the group owner may perform this operation
    #[error("User {0} is not the group owner")]
    NotGroupOwner(Uuid),

    /// User has no share in the expense being settled
    #[error("User {user_id} has no share in expense {expense_id}")]
    ParticipantNotInExpense { expense_id: Uuid, user_id: Uuid },

    /// Share has already been marked as settled
    #[error("Share of user {user_id} in expense {expense_id} is already settled")]
    AlreadySettled { expense_id: Uuid, user_id: Uuid },

    /// Email is already registered
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Audit log error: {0}")]
    AuditError(String),
}
