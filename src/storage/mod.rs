use crate::error::DivvyError;
use crate::models::*;
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Persistence seam for the engine's orchestration layer.
///
/// Multi-row updates that must stay consistent (settling a share and
/// flipping the parent expense's settled flag, applying a loan payment) are
/// single trait methods so a reader never observes a partial write.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_user(&self, user: User) -> Result<(), DivvyError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DivvyError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DivvyError>;

    async fn save_group(&self, group: Group) -> Result<(), DivvyError>;
    async fn get_group(&self, id: Uuid) -> Result<Option<Group>, DivvyError>;
    async fn add_group_member(&self, membership: GroupUser) -> Result<(), DivvyError>;
    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, DivvyError>;
    async fn get_member_role(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, DivvyError>;
    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<Group>, DivvyError>;

    async fn save_expense(&self, expense: Expense) -> Result<(), DivvyError>;
    async fn get_expense(&self, id: Uuid) -> Result<Option<Expense>, DivvyError>;
    async fn list_group_expenses(&self, group_id: Uuid) -> Result<Vec<Expense>, DivvyError>;
    async fn settle_participant(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
    ) -> Result<Expense, DivvyError>;

    async fn save_loan(&self, loan: DirectLoan) -> Result<(), DivvyError>;
    async fn get_loan(&self, id: Uuid) -> Result<Option<DirectLoan>, DivvyError>;
    async fn list_user_loans(&self, user_id: Uuid) -> Result<Vec<DirectLoan>, DivvyError>;
    async fn apply_loan_payment(
        &self,
        loan_id: Uuid,
        amount: Decimal,
    ) -> Result<DirectLoan, DivvyError>;
}

pub mod in_memory;
