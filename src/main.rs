use divvy::config::CONFIG;
use divvy::models::{Participant, SplitType};
use divvy::{DivvyError, DivvyService, InMemoryAuditLog, InMemoryCache, InMemoryStorage};
use rust_decimal_macros::dec;

/// Seeds an in-memory service with a small trip scenario and prints the
/// resulting settlement plan and consolidated positions.
#[tokio::main]
async fn main() -> Result<(), DivvyError> {
    env_logger::Builder::new()
        .parse_filters(&CONFIG.log_level)
        .init();

    let service = DivvyService::new(
        InMemoryStorage::new(),
        InMemoryAuditLog::new(),
        InMemoryCache::new(),
    );

    let alice = service
        .create_user("alice@example.com".to_string(), "Alice".to_string())
        .await?;
    let bob = service
        .create_user("bob@example.com".to_string(), "Bob".to_string())
        .await?;
    let carol = service
        .create_user("carol@example.com".to_string(), "Carol".to_string())
        .await?;

    let group = service
        .create_group(alice.id, "Ski trip".to_string(), "EUR".to_string())
        .await?;
    service.add_member(group.id, bob.id, alice.id).await?;
    service.add_member(group.id, carol.id, alice.id).await?;

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
        .await?;
    service
        .add_expense(
            group.id,
            bob.id,
            bob.id,
            dec!(60),
            "Groceries".to_string(),
            SplitType::Equal,
            &everyone,
        )
        .await?;

    let balances = service.group_balances(group.id, alice.id).await?;
    println!("Net balances in '{}':", group.name);
    for edge in balances.net_edges() {
        println!(
            "  {} owes {} {} {}",
            edge.debtor_id, edge.creditor_id, edge.amount, edge.currency
        );
    }
    println!("Settlement plan:");
    for debt in balances.simplified_debts() {
        println!(
            "  {} pays {} -> {}",
            debt.from_user_id, debt.amount, debt.to_user_id
        );
    }

    service
        .record_loan(
            alice.id,
            bob.id,
            dec!(25),
            "EUR".to_string(),
            "Concert ticket".to_string(),
        )
        .await?;

    println!("Consolidated positions for Alice:");
    for position in service.consolidated_positions(alice.id, "EUR").await? {
        println!(
            "  vs {}: total {} (direct {}, groups {})",
            position.counterparty_id, position.total, position.direct_amount, position.group_amount
        );
    }

    Ok(())
}
