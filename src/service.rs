use crate::cache::Cache;
use crate::config::CONFIG;
use crate::constants::{
    BALANCES_QUERIED, EXPENSE_ADDED, GROUP_CREATED, LOAN_PAYMENT_RECORDED, LOAN_RECORDED,
    MEMBER_ADDED, PARTICIPANT_SETTLED, POSITIONS_QUERIED, USER_CREATED,
};
use crate::engine::balance_aggregator::{aggregate_balances, aggregate_loan_balances};
use crate::engine::debt_simplifier::simplify_debts;
use crate::engine::positions::build_consolidated_positions;
use crate::engine::split_calculator::SplitCalculator;
use crate::engine::split_validator::validate_splits;
use crate::error::DivvyError;
use crate::logger::AuditLog;
use crate::models::*;
use crate::storage::Storage;
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const MAX_AMOUNT: Decimal = dec!(1000000);

/// Net edges plus the settlement plan for one group, both derived views over
/// the group's unsettled shares.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupBalances {
    net_edges: Vec<NetBalanceEdge>,
    simplified_debts: Vec<SimplifiedDebt>,
}

impl GroupBalances {
    pub fn net_edges(&self) -> &[NetBalanceEdge] {
        &self.net_edges
    }

    pub fn simplified_debts(&self) -> &[SimplifiedDebt] {
        &self.simplified_debts
    }
}

pub struct DivvyService<L: AuditLog, S: Storage, C: Cache> {
    storage: S,
    audit: L,
    cache: C,
    calculator: SplitCalculator,
}

impl<L: AuditLog, S: Storage, C: Cache> DivvyService<L, S, C> {
    pub fn new(storage: S, audit: L, cache: C) -> Self {
        info!("Initializing DivvyService");
        DivvyService {
            storage,
            audit,
            cache,
            calculator: SplitCalculator::new(),
        }
    }

    pub fn with_calculator(storage: S, audit: L, cache: C, calculator: SplitCalculator) -> Self {
        DivvyService {
            storage,
            audit,
            cache,
            calculator,
        }
    }

    // USER & GROUP MANAGEMENT

    pub async fn create_user(&self, email: String, name: String) -> Result<User, DivvyError> {
        info!("Creating user with email: {}", email);
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_user(user.clone()).await?;

        self.audit
            .log_action(
                USER_CREATED,
                json!({ "user_id": user.id, "email": user.email }),
                Some(user.id),
            )
            .await?;
        Ok(user)
    }

    pub async fn create_group(
        &self,
        owner_id: Uuid,
        name: String,
        currency: String,
    ) -> Result<Group, DivvyError> {
        info!("Creating group '{}' for owner {}", name, owner_id);
        self.require_user(owner_id).await?;

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name,
            owner_id,
            currency,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_group(group.clone()).await?;
        self.storage
            .add_group_member(GroupUser {
                group_id: group.id,
                user_id: owner_id,
                role: Role::Owner,
                joined_at: now,
            })
            .await?;

        self.audit
            .log_action(
                GROUP_CREATED,
                json!({ "group_id": group.id, "name": group.name, "currency": group.currency }),
                Some(owner_id),
            )
            .await?;
        Ok(group)
    }

    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        added_by: Uuid,
    ) -> Result<(), DivvyError> {
        info!("Adding user {} to group {}", user_id, group_id);
        self.require_group(group_id).await?;
        self.require_user(user_id).await?;

        match self.storage.get_member_role(group_id, added_by).await? {
            Some(Role::Owner) => {}
            Some(_) => {
                warn!(
                    "User {} attempted to add a member to group {} without owner role",
                    added_by, group_id
                );
                return Err(DivvyError::NotGroupOwner(added_by));
            }
            None => return Err(DivvyError::NotGroupMember(added_by)),
        }

        self.storage
            .add_group_member(GroupUser {
                group_id,
                user_id,
                role: Role::Member,
                joined_at: Utc::now(),
            })
            .await?;

        self.audit
            .log_action(
                MEMBER_ADDED,
                json!({ "group_id": group_id, "user_id": user_id }),
                Some(added_by),
            )
            .await?;
        Ok(())
    }

    // EXPENSES

    /// Computes the split once, sanity-checks it, and persists the expense
    /// with its immutable participant shares. Any validation failure aborts
    /// before anything is written.
    pub async fn add_expense(
        &self,
        group_id: Uuid,
        added_by: Uuid,
        payer_id: Uuid,
        amount: Decimal,
        description: String,
        split_type: SplitType,
        participants: &[Participant],
    ) -> Result<Expense, DivvyError> {
        info!(
            "Creating {} expense of {} in group {} paid by {}",
            split_type, amount, group_id, payer_id
        );
        let group = self.require_group(group_id).await?;
        self.require_member(group_id, added_by).await?;
        self.require_member(group_id, payer_id).await?;
        for p in participants {
            self.require_member(group_id, p.user_id).await?;
        }
        validate_amount(amount)?;

        let splits = self
            .calculator
            .calculate(amount, split_type, participants, payer_id)?;

        // Independent re-check of the calculator's output before persisting.
        let check = validate_splits(amount, &splits);
        if !check.is_valid {
            warn!(
                "Split calculation for group {} failed post-hoc validation: {:?}",
                group_id, check.status
            );
            let difference = check.difference.unwrap_or(Decimal::ZERO);
            return Err(DivvyError::SumMismatch {
                expected: amount,
                actual: amount - difference,
                difference,
            });
        }

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            group_id,
            payer_id,
            added_by,
            amount,
            currency: group.currency,
            description,
            split_type,
            splits: splits.iter().map(ExpenseShare::from_split).collect(),
            settled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_expense(expense.clone()).await?;
        self.cache.invalidate_group(group_id).await?;
        debug!("Expense created with ID: {}", expense.id);

        self.audit
            .log_action(
                EXPENSE_ADDED,
                json!({
                    "expense_id": expense.id,
                    "group_id": group_id,
                    "amount": amount,
                    "split_type": split_type.to_string(),
                    "payer_id": payer_id
                }),
                Some(added_by),
            )
            .await?;
        Ok(expense)
    }

    /// Marks one participant's share as settled; the parent expense's
    /// settled flag flips in the same storage operation once every share is
    /// settled.
    pub async fn settle_participant(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
        settled_by: Uuid,
    ) -> Result<Expense, DivvyError> {
        info!(
            "Settling share of user {} in expense {}",
            user_id, expense_id
        );
        let expense = self.storage.settle_participant(expense_id, user_id).await?;
        self.cache.invalidate_group(expense.group_id).await?;

        self.audit
            .log_action(
                PARTICIPANT_SETTLED,
                json!({
                    "expense_id": expense_id,
                    "user_id": user_id,
                    "expense_settled": expense.settled_at.is_some()
                }),
                Some(settled_by),
            )
            .await?;
        Ok(expense)
    }

    // DIRECT LOANS

    pub async fn record_loan(
        &self,
        lender_id: Uuid,
        borrower_id: Uuid,
        amount: Decimal,
        currency: String,
        description: String,
    ) -> Result<DirectLoan, DivvyError> {
        info!(
            "Recording loan of {} {} from {} to {}",
            amount, currency, lender_id, borrower_id
        );
        self.require_user(lender_id).await?;
        self.require_user(borrower_id).await?;
        validate_amount(amount)?;
        if lender_id == borrower_id {
            return Err(DivvyError::InvalidAmount(
                "lender and borrower must differ".to_string(),
            ));
        }

        let now = Utc::now();
        let loan = DirectLoan {
            id: Uuid::new_v4(),
            lender_id,
            borrower_id,
            amount,
            amount_repaid: Decimal::ZERO,
            currency,
            description,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_loan(loan.clone()).await?;

        self.audit
            .log_action(
                LOAN_RECORDED,
                json!({ "loan_id": loan.id, "amount": amount, "borrower_id": borrower_id }),
                Some(lender_id),
            )
            .await?;
        Ok(loan)
    }

    pub async fn record_loan_payment(
        &self,
        loan_id: Uuid,
        amount: Decimal,
        recorded_by: Uuid,
    ) -> Result<DirectLoan, DivvyError> {
        info!("Recording payment of {} on loan {}", amount, loan_id);
        let loan = self.storage.apply_loan_payment(loan_id, amount).await?;

        self.audit
            .log_action(
                LOAN_PAYMENT_RECORDED,
                json!({ "loan_id": loan_id, "amount": amount }),
                Some(recorded_by),
            )
            .await?;
        Ok(loan)
    }

    // BALANCES & SETTLEMENT VIEWS

    /// Net edges and the simplified settlement plan for one group, derived
    /// from the unsettled shares of its expenses. Cached until the next
    /// write to the group.
    pub async fn group_balances(
        &self,
        group_id: Uuid,
        queried_by: Uuid,
    ) -> Result<GroupBalances, DivvyError> {
        self.require_group(group_id).await?;
        self.require_member(group_id, queried_by).await?;

        if let Some(cached) = self.cache.get_group_balances(group_id).await? {
            debug!("Returning cached balances for group {}", group_id);
            return Ok(cached);
        }

        let expenses = self.storage.list_group_expenses(group_id).await?;
        let records: Vec<SplitRecord> = expenses
            .iter()
            .flat_map(|e| e.split_records())
            .collect();
        let net_edges = aggregate_balances(&records)?;
        let simplified_debts = simplify_debts(&net_edges);
        debug!(
            "Group {} reduced to {} edges, {} transfers",
            group_id,
            net_edges.len(),
            simplified_debts.len()
        );

        let balances = GroupBalances {
            net_edges,
            simplified_debts,
        };
        self.cache
            .save_group_balances(
                group_id,
                &balances,
                Duration::from_secs(CONFIG.balance_cache_ttl_secs),
            )
            .await?;

        self.audit
            .log_action(
                BALANCES_QUERIED,
                json!({ "group_id": group_id }),
                Some(queried_by),
            )
            .await?;
        Ok(balances)
    }

    /// One signed position per counterparty for the user, combining direct
    /// loans with every group's settlement plan, in one currency bucket.
    pub async fn consolidated_positions(
        &self,
        user_id: Uuid,
        currency: &str,
    ) -> Result<Vec<ConsolidatedPosition>, DivvyError> {
        self.require_user(user_id).await?;

        let loans: Vec<DirectLoan> = self
            .storage
            .list_user_loans(user_id)
            .await?
            .into_iter()
            .filter(|l| l.currency == currency)
            .collect();
        let direct_edges = aggregate_loan_balances(&loans)?;

        let mut group_debts: Vec<(GroupRef, SimplifiedDebt)> = Vec::new();
        for group in self.storage.list_user_groups(user_id).await? {
            if group.currency != currency {
                continue;
            }
            let expenses = self.storage.list_group_expenses(group.id).await?;
            let records: Vec<SplitRecord> = expenses
                .iter()
                .flat_map(|e| e.split_records())
                .collect();
            let edges = aggregate_balances(&records)?;
            let group_ref = GroupRef {
                id: group.id,
                name: group.name,
            };
            for debt in simplify_debts(&edges) {
                if debt.from_user_id == user_id || debt.to_user_id == user_id {
                    group_debts.push((group_ref.clone(), debt));
                }
            }
        }

        let positions = build_consolidated_positions(user_id, &direct_edges, &group_debts);
        debug!(
            "User {} holds {} consolidated positions in {}",
            user_id,
            positions.len(),
            currency
        );

        self.audit
            .log_action(
                POSITIONS_QUERIED,
                json!({ "user_id": user_id, "currency": currency }),
                Some(user_id),
            )
            .await?;
        Ok(positions)
    }

    // LOOKUPS

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DivvyError> {
        self.storage.get_user_by_email(email).await
    }

    pub async fn expense(&self, expense_id: Uuid) -> Result<Expense, DivvyError> {
        self.storage
            .get_expense(expense_id)
            .await?
            .ok_or(DivvyError::ExpenseNotFound(expense_id))
    }

    pub async fn loan(&self, loan_id: Uuid) -> Result<DirectLoan, DivvyError> {
        self.storage
            .get_loan(loan_id)
            .await?
            .ok_or(DivvyError::LoanNotFound(loan_id))
    }

    pub async fn audit_entries(&self) -> Result<Vec<AppLog>, DivvyError> {
        self.audit.entries().await
    }

    // VALIDATION HELPERS

    async fn require_user(&self, user_id: Uuid) -> Result<User, DivvyError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or(DivvyError::UserNotFound(user_id))
    }

    async fn require_group(&self, group_id: Uuid) -> Result<Group, DivvyError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or(DivvyError::GroupNotFound(group_id))
    }

    async fn require_member(&self, group_id: Uuid, user_id: Uuid) -> Result<(), DivvyError> {
        if !self.storage.is_group_member(group_id, user_id).await? {
            warn!("User {} is not a member of group {}", user_id, group_id);
            return Err(DivvyError::NotGroupMember(user_id));
        }
        Ok(())
    }
}

fn validate_amount(amount: Decimal) -> Result<(), DivvyError> {
    if amount <= Decimal::ZERO {
        return Err(DivvyError::InvalidAmount(
            "amount must be greater than 0".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(DivvyError::InvalidAmount(
            "amount cannot exceed 1,000,000".to_string(),
        ));
    }
    if amount.round_dp(2) != amount {
        return Err(DivvyError::InvalidAmount(
            "amount cannot have more than 2 decimal places".to_string(),
        ));
    }
    Ok(())
}
