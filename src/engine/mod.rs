pub mod balance_aggregator;
pub mod debt_simplifier;
pub mod positions;
pub mod split_calculator;
pub mod split_validator;
