use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Drift allowed when comparing money sums. A difference of a full cent or
/// more is a mismatch; anything smaller is rounding noise.
pub const SPLIT_TOLERANCE: Decimal = dec!(0.01);

// Audit action names
pub const USER_CREATED: &str = "USER_CREATED";
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const MEMBER_ADDED: &str = "MEMBER_ADDED";
pub const EXPENSE_ADDED: &str = "EXPENSE_ADDED";
pub const PARTICIPANT_SETTLED: &str = "PARTICIPANT_SETTLED";
pub const LOAN_RECORDED: &str = "LOAN_RECORDED";
pub const LOAN_PAYMENT_RECORDED: &str = "LOAN_PAYMENT_RECORDED";
pub const BALANCES_QUERIED: &str = "BALANCES_QUERIED";
pub const POSITIONS_QUERIED: &str = "POSITIONS_QUERIED";
