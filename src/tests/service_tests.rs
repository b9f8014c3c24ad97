use super::create_test_service;
use crate::constants::{EXPENSE_ADDED, PARTICIPANT_SETTLED};
use crate::error::DivvyError;
use crate::models::{Group, Participant, SplitType, User};
use crate::{DivvyService, InMemoryAuditLog, InMemoryCache, InMemoryStorage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

type TestService = DivvyService<InMemoryAuditLog, InMemoryStorage, InMemoryCache>;

async fn seed_trio(service: &TestService) -> (User, User, User, Group) {
    let _ = env_logger::builder().is_test(true).try_init();
    let alice = service
        .create_user("alice@example.com".to_string(), "Alice".to_string())
        .await
        .unwrap();
    let bob = service
        .create_user("bob@example.com".to_string(), "Bob".to_string())
        .await
        .unwrap();
    let carol = service
        .create_user("carol@example.com".to_string(), "Carol".to_string())
        .await
        .unwrap();
    let group = service
        .create_group(alice.id, "Trip".to_string(), "EUR".to_string())
        .await
        .unwrap();
    service.add_member(group.id, bob.id, alice.id).await.unwrap();
    service
        .add_member(group.id, carol.id, alice.id)
        .await
        .unwrap();
    (alice, bob, carol, group)
}

#[tokio::test]
async fn added_expense_persists_splits_summing_to_total() {
    let service = create_test_service();
    let (alice, bob, carol, group) = seed_trio(&service).await;

    let expense = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(100),
            "Cabin".to_string(),
            SplitType::Equal,
            &[
                Participant::of(alice.id),
                Participant::of(bob.id),
                Participant::of(carol.id),
            ],
        )
        .await
        .unwrap();

    assert_eq!(expense.splits.len(), 3);
    let sum: Decimal = expense.splits.iter().map(|s| s.amount_owed).sum();
    assert_eq!(sum, dec!(100));
    assert_eq!(expense.currency, "EUR");
    assert!(expense.settled_at.is_none());

    // Payer carries the cent of remainder.
    let payer_share = expense
        .splits
        .iter()
        .find(|s| s.user_id == alice.id)
        .unwrap();
    assert_eq!(payer_share.amount_owed, dec!(33.34));
    assert!(payer_share.is_rounding_adjustment);
}

#[tokio::test]
async fn expense_rejects_non_member_participant() {
    let service = create_test_service();
    let (alice, bob, _, group) = seed_trio(&service).await;
    let outsider = service
        .create_user("dave@example.com".to_string(), "Dave".to_string())
        .await
        .unwrap();

    let result = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(30),
            "Taxi".to_string(),
            SplitType::Equal,
            &[
                Participant::of(alice.id),
                Participant::of(bob.id),
                Participant::of(outsider.id),
            ],
        )
        .await;
    assert!(matches!(result, Err(DivvyError::NotGroupMember(id)) if id == outsider.id));
}

#[tokio::test]
async fn expense_rejects_sub_cent_amount() {
    let service = create_test_service();
    let (alice, bob, _, group) = seed_trio(&service).await;

    let result = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(10.005),
            "Snacks".to_string(),
            SplitType::Equal,
            &[Participant::of(alice.id), Participant::of(bob.id)],
        )
        .await;
    assert!(matches!(result, Err(DivvyError::InvalidAmount(_))));
}

#[tokio::test]
async fn only_owner_may_add_members() {
    let service = create_test_service();
    let (_, bob, _, group) = seed_trio(&service).await;
    let dave = service
        .create_user("dave@example.com".to_string(), "Dave".to_string())
        .await
        .unwrap();

    let result = service.add_member(group.id, dave.id, bob.id).await;
    assert!(matches!(result, Err(DivvyError::NotGroupOwner(id)) if id == bob.id));
}

#[tokio::test]
async fn users_are_found_by_email() {
    let service = create_test_service();
    let (alice, _, _, _) = seed_trio(&service).await;

    let found = service
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, alice.id);

    let missing = service.find_user_by_email("nobody@example.com").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn expense_and_loan_lookups_round_trip() {
    let service = create_test_service();
    let (alice, bob, _, group) = seed_trio(&service).await;

    let expense = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(30),
            "Museum".to_string(),
            SplitType::Equal,
            &[Participant::of(alice.id), Participant::of(bob.id)],
        )
        .await
        .unwrap();
    let fetched = service.expense(expense.id).await.unwrap();
    assert_eq!(fetched.description, "Museum");

    let loan = service
        .record_loan(alice.id, bob.id, dec!(5), "EUR".to_string(), String::new())
        .await
        .unwrap();
    let fetched = service.loan(loan.id).await.unwrap();
    assert_eq!(fetched.amount, dec!(5));

    let missing = service.expense(uuid::Uuid::new_v4()).await;
    assert!(matches!(missing, Err(DivvyError::ExpenseNotFound(_))));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let service = create_test_service();
    service
        .create_user("alice@example.com".to_string(), "Alice".to_string())
        .await
        .unwrap();

    let result = service
        .create_user("alice@example.com".to_string(), "Alice again".to_string())
        .await;
    assert!(matches!(result, Err(DivvyError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn settling_every_share_settles_the_expense() {
    let service = create_test_service();
    let (alice, bob, carol, group) = seed_trio(&service).await;

    let expense = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(90),
            "Dinner".to_string(),
            SplitType::Equal,
            &[
                Participant::of(alice.id),
                Participant::of(bob.id),
                Participant::of(carol.id),
            ],
        )
        .await
        .unwrap();

    let after_one = service
        .settle_participant(expense.id, alice.id, alice.id)
        .await
        .unwrap();
    assert!(after_one.settled_at.is_none());

    service
        .settle_participant(expense.id, bob.id, bob.id)
        .await
        .unwrap();
    let after_all = service
        .settle_participant(expense.id, carol.id, carol.id)
        .await
        .unwrap();
    assert!(after_all.settled_at.is_some());
    assert!(after_all.splits.iter().all(|s| s.is_settled()));
}

#[tokio::test]
async fn settling_twice_is_rejected() {
    let service = create_test_service();
    let (alice, bob, _, group) = seed_trio(&service).await;

    let expense = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(40),
            "Fuel".to_string(),
            SplitType::Equal,
            &[Participant::of(alice.id), Participant::of(bob.id)],
        )
        .await
        .unwrap();

    service
        .settle_participant(expense.id, bob.id, bob.id)
        .await
        .unwrap();
    let result = service.settle_participant(expense.id, bob.id, bob.id).await;
    assert!(matches!(result, Err(DivvyError::AlreadySettled { .. })));
}

#[tokio::test]
async fn group_balances_reflect_unsettled_shares_only() {
    let service = create_test_service();
    let (alice, bob, carol, group) = seed_trio(&service).await;

    // Scenario D: Alice fronts 100, Bob fronts 60, both split equally.
    let everyone = vec![
        Participant::of(alice.id),
        Participant::of(bob.id),
        Participant::of(carol.id),
    ];
    service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(100),
            "Cabin".to_string(),
            SplitType::Equal,
            &everyone,
        )
        .await
        .unwrap();
    let groceries = service
        .add_expense(
            group.id,
            bob.id,
            bob.id,
            dec!(60),
            "Groceries".to_string(),
            SplitType::Equal,
            &everyone,
        )
        .await
        .unwrap();

    let balances = service.group_balances(group.id, alice.id).await.unwrap();
    assert_eq!(balances.net_edges().len(), 3);
    assert!(balances.simplified_debts().len() <= 2);

    // Carol squares her groceries share; her debt to Bob shrinks by 20.
    service
        .settle_participant(groceries.id, carol.id, carol.id)
        .await
        .unwrap();
    let balances = service.group_balances(group.id, alice.id).await.unwrap();
    let carol_to_bob = balances
        .net_edges()
        .iter()
        .find(|e| e.debtor_id == carol.id && e.creditor_id == bob.id);
    assert!(carol_to_bob.is_none());
}

#[tokio::test]
async fn cached_balances_are_invalidated_by_writes() {
    let service = create_test_service();
    let (alice, bob, _, group) = seed_trio(&service).await;

    service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(50),
            "Tickets".to_string(),
            SplitType::Equal,
            &[Participant::of(alice.id), Participant::of(bob.id)],
        )
        .await
        .unwrap();

    let before = service.group_balances(group.id, alice.id).await.unwrap();
    assert_eq!(before.net_edges()[0].amount, dec!(25));

    // A second read and a post-write read must both be coherent; the write
    // in between invalidates the cached snapshot.
    let cached = service.group_balances(group.id, alice.id).await.unwrap();
    assert_eq!(cached.net_edges(), before.net_edges());

    service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(10),
            "Parking".to_string(),
            SplitType::Equal,
            &[Participant::of(alice.id), Participant::of(bob.id)],
        )
        .await
        .unwrap();
    let after = service.group_balances(group.id, alice.id).await.unwrap();
    assert_eq!(after.net_edges()[0].amount, dec!(30));
}

#[tokio::test]
async fn balances_require_membership() {
    let service = create_test_service();
    let (_, _, _, group) = seed_trio(&service).await;
    let outsider = service
        .create_user("eve@example.com".to_string(), "Eve".to_string())
        .await
        .unwrap();

    let result = service.group_balances(group.id, outsider.id).await;
    assert!(matches!(result, Err(DivvyError::NotGroupMember(_))));
}

#[tokio::test]
async fn loan_payments_reduce_the_outstanding_amount() {
    let service = create_test_service();
    let (alice, bob, _, _) = seed_trio(&service).await;

    let loan = service
        .record_loan(
            alice.id,
            bob.id,
            dec!(100),
            "EUR".to_string(),
            "Bike repair".to_string(),
        )
        .await
        .unwrap();
    let loan = service
        .record_loan_payment(loan.id, dec!(40), bob.id)
        .await
        .unwrap();
    assert_eq!(loan.amount_repaid, dec!(40));
    assert_eq!(loan.amount_remaining(), dec!(60));

    let overpay = service.record_loan_payment(loan.id, dec!(100), bob.id).await;
    assert!(matches!(overpay, Err(DivvyError::InvalidAmount(_))));
}

#[tokio::test]
async fn self_loans_are_rejected() {
    let service = create_test_service();
    let (alice, _, _, _) = seed_trio(&service).await;

    let result = service
        .record_loan(
            alice.id,
            alice.id,
            dec!(10),
            "EUR".to_string(),
            String::new(),
        )
        .await;
    assert!(matches!(result, Err(DivvyError::InvalidAmount(_))));
}

#[tokio::test]
async fn consolidated_positions_combine_loans_and_groups() {
    let service = create_test_service();
    let (alice, bob, carol, group) = seed_trio(&service).await;

    service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(100),
            "Cabin".to_string(),
            SplitType::Equal,
            &[
                Participant::of(alice.id),
                Participant::of(bob.id),
                Participant::of(carol.id),
            ],
        )
        .await
        .unwrap();
    service
        .record_loan(
            alice.id,
            bob.id,
            dec!(25),
            "EUR".to_string(),
            "Concert ticket".to_string(),
        )
        .await
        .unwrap();

    let positions = service.consolidated_positions(alice.id, "EUR").await.unwrap();
    assert_eq!(positions.len(), 2);

    let vs_bob = positions
        .iter()
        .find(|p| p.counterparty_id == bob.id)
        .unwrap();
    assert_eq!(vs_bob.direct_amount, dec!(25));
    assert_eq!(vs_bob.group_amount, dec!(33.33));
    assert_eq!(vs_bob.total, dec!(58.33));
    assert_eq!(vs_bob.groups.len(), 1);
    assert_eq!(vs_bob.groups[0].id, group.id);

    let vs_carol = positions
        .iter()
        .find(|p| p.counterparty_id == carol.id)
        .unwrap();
    assert_eq!(vs_carol.direct_amount, Decimal::ZERO);
    assert_eq!(vs_carol.total, dec!(33.33));
}

#[tokio::test]
async fn positions_ignore_other_currencies() {
    let service = create_test_service();
    let (alice, bob, _, _) = seed_trio(&service).await;

    service
        .record_loan(
            alice.id,
            bob.id,
            dec!(25),
            "USD".to_string(),
            String::new(),
        )
        .await
        .unwrap();

    let positions = service.consolidated_positions(alice.id, "EUR").await.unwrap();
    assert!(positions.is_empty());
}

#[tokio::test]
async fn audit_trail_records_writes() {
    let service = create_test_service();
    let (alice, bob, _, group) = seed_trio(&service).await;

    let expense = service
        .add_expense(
            group.id,
            alice.id,
            alice.id,
            dec!(20),
            "Coffee".to_string(),
            SplitType::Equal,
            &[Participant::of(alice.id), Participant::of(bob.id)],
        )
        .await
        .unwrap();
    service
        .settle_participant(expense.id, bob.id, bob.id)
        .await
        .unwrap();

    let entries = service.audit_entries().await.unwrap();
    let added = entries.iter().find(|e| e.action == EXPENSE_ADDED).unwrap();
    assert_eq!(added.user_id, Some(alice.id));
    assert_eq!(added.details["group_id"], serde_json::json!(group.id));

    assert!(entries.iter().any(|e| e.action == PARTICIPANT_SETTLED));
}
