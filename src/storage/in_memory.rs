use crate::error::DivvyError;
use crate::models::*;
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct InMemoryStorage {
    users: Mutex<HashMap<Uuid, User>>,
    emails: Mutex<HashMap<String, Uuid>>, // email -> user_id
    groups: Mutex<HashMap<Uuid, Group>>,
    memberships: Mutex<HashMap<Uuid, Vec<GroupUser>>>, // group_id -> members
    expenses: Mutex<HashMap<Uuid, Expense>>,
    loans: Mutex<HashMap<Uuid, DirectLoan>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Mutex::new(HashMap::new()),
            emails: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
            memberships: Mutex::new(HashMap::new()),
            expenses: Mutex::new(HashMap::new()),
            loans: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_user(&self, user: User) -> Result<(), DivvyError> {
        let mut emails = self.emails.lock().await;
        if emails.contains_key(&user.email) {
            return Err(DivvyError::EmailAlreadyRegistered(user.email));
        }
        emails.insert(user.email.clone(), user.id);
        self.users.lock().await.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DivvyError> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DivvyError> {
        // For production: use a database index on email
        let user_id = self.emails.lock().await.get(email).copied();
        Ok(match user_id {
            Some(id) => self.users.lock().await.get(&id).cloned(),
            None => None,
        })
    }

    async fn save_group(&self, group: Group) -> Result<(), DivvyError> {
        self.groups.lock().await.insert(group.id, group);
        Ok(())
    }

    async fn get_group(&self, id: Uuid) -> Result<Option<Group>, DivvyError> {
        Ok(self.groups.lock().await.get(&id).cloned())
    }

    async fn add_group_member(&self, membership: GroupUser) -> Result<(), DivvyError> {
        let mut memberships = self.memberships.lock().await;
        let members = memberships.entry(membership.group_id).or_default();
        if members.iter().any(|m| m.user_id == membership.user_id) {
            return Err(DivvyError::AlreadyGroupMember(membership.user_id));
        }
        members.push(membership);
        Ok(())
    }

    async fn is_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, DivvyError> {
        Ok(self
            .memberships
            .lock()
            .await
            .get(&group_id)
            .is_some_and(|members| members.iter().any(|m| m.user_id == user_id)))
    }

    async fn get_member_role(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, DivvyError> {
        Ok(self.memberships.lock().await.get(&group_id).and_then(|members| {
            members
                .iter()
                .find(|m| m.user_id == user_id)
                .map(|m| m.role.clone())
        }))
    }

    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<Group>, DivvyError> {
        let memberships = self.memberships.lock().await;
        let groups = self.groups.lock().await;
        let mut result: Vec<Group> = memberships
            .iter()
            .filter(|(_, members)| members.iter().any(|m| m.user_id == user_id))
            .filter_map(|(group_id, _)| groups.get(group_id).cloned())
            .collect();
        result.sort_by_key(|g| g.id);
        Ok(result)
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), DivvyError> {
        self.expenses.lock().await.insert(expense.id, expense);
        Ok(())
    }

    async fn get_expense(&self, id: Uuid) -> Result<Option<Expense>, DivvyError> {
        Ok(self.expenses.lock().await.get(&id).cloned())
    }

    async fn list_group_expenses(&self, group_id: Uuid) -> Result<Vec<Expense>, DivvyError> {
        // For production: use a database query with an index on group_id
        let mut result: Vec<Expense> = self
            .expenses
            .lock()
            .await
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        result.sort_by_key(|e| e.created_at);
        Ok(result)
    }

    async fn settle_participant(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
    ) -> Result<Expense, DivvyError> {
        // Single lock: the share update and the parent settled flag flip are
        // observed together or not at all.
        let mut expenses = self.expenses.lock().await;
        let expense = expenses
            .get_mut(&expense_id)
            .ok_or(DivvyError::ExpenseNotFound(expense_id))?;

        let now = Utc::now();
        let share = expense
            .splits
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .ok_or(DivvyError::ParticipantNotInExpense {
                expense_id,
                user_id,
            })?;
        if share.is_settled() {
            return Err(DivvyError::AlreadySettled {
                expense_id,
                user_id,
            });
        }
        share.settled_at = Some(now);

        if expense.splits.iter().all(|s| s.is_settled()) {
            expense.settled_at = Some(now);
        }
        expense.updated_at = now;

        Ok(expense.clone())
    }

    async fn save_loan(&self, loan: DirectLoan) -> Result<(), DivvyError> {
        self.loans.lock().await.insert(loan.id, loan);
        Ok(())
    }

    async fn get_loan(&self, id: Uuid) -> Result<Option<DirectLoan>, DivvyError> {
        Ok(self.loans.lock().await.get(&id).cloned())
    }

    async fn list_user_loans(&self, user_id: Uuid) -> Result<Vec<DirectLoan>, DivvyError> {
        let mut result: Vec<DirectLoan> = self
            .loans
            .lock()
            .await
            .values()
            .filter(|l| l.lender_id == user_id || l.borrower_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|l| l.created_at);
        Ok(result)
    }

    async fn apply_loan_payment(
        &self,
        loan_id: Uuid,
        amount: Decimal,
    ) -> Result<DirectLoan, DivvyError> {
        let mut loans = self.loans.lock().await;
        let loan = loans
            .get_mut(&loan_id)
            .ok_or(DivvyError::LoanNotFound(loan_id))?;
        if amount <= Decimal::ZERO {
            return Err(DivvyError::InvalidAmount(
                "loan payment must be positive".to_string(),
            ));
        }
        if amount > loan.amount_remaining() {
            return Err(DivvyError::InvalidAmount(format!(
                "loan payment {} exceeds remaining balance {}",
                amount,
                loan.amount_remaining()
            )));
        }
        loan.amount_repaid += amount;
        loan.updated_at = Utc::now();
        Ok(loan.clone())
    }
}
