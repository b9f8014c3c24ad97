pub mod audit;
pub mod balance;
pub mod expense;
pub mod group;
pub mod group_user;
pub mod loan;
pub mod split;
pub mod user;

pub use audit::AppLog;
pub use balance::{ConsolidatedPosition, GroupRef, NetBalanceEdge, SimplifiedDebt, SplitRecord};
pub use expense::{Expense, ExpenseShare};
pub use group::Group;
pub use group_user::{GroupUser, Role};
pub use loan::DirectLoan;
pub use split::{
    CalculatedSplit, Participant, SplitType, SplitValidationResult, SplitValidationStatus,
};
pub use user::User;
