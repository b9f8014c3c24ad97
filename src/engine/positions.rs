use crate::models::{ConsolidatedPosition, GroupRef, NetBalanceEdge, SimplifiedDebt};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Merges direct-loan net edges and per-group settlement entries into one
/// signed position per counterparty for the given user.
///
/// Sign convention: positive means the counterparty owes the user. Direct
/// and group contributions stay separate for breakdown display, with the
/// originating groups retained. Sorted by absolute total, descending;
/// counterparty id breaks ties.
pub fn build_consolidated_positions(
    user_id: Uuid,
    direct_edges: &[NetBalanceEdge],
    group_debts: &[(GroupRef, SimplifiedDebt)],
) -> Vec<ConsolidatedPosition> {
    let mut positions: HashMap<Uuid, ConsolidatedPosition> = HashMap::new();

    for edge in direct_edges {
        let (counterparty, signed) = if edge.creditor_id == user_id {
            (edge.debtor_id, edge.amount)
        } else if edge.debtor_id == user_id {
            (edge.creditor_id, -edge.amount)
        } else {
            continue;
        };
        position_entry(&mut positions, counterparty).direct_amount += signed;
    }

    for (group, debt) in group_debts {
        let (counterparty, signed) = if debt.to_user_id == user_id {
            (debt.from_user_id, debt.amount)
        } else if debt.from_user_id == user_id {
            (debt.to_user_id, -debt.amount)
        } else {
            continue;
        };
        let position = position_entry(&mut positions, counterparty);
        position.group_amount += signed;
        if !position.groups.iter().any(|g| g.id == group.id) {
            position.groups.push(group.clone());
        }
    }

    let mut result: Vec<ConsolidatedPosition> = positions
        .into_values()
        .map(|mut p| {
            p.total = p.direct_amount + p.group_amount;
            p
        })
        .collect();

    result.sort_by(|a, b| {
        b.total
            .abs()
            .cmp(&a.total.abs())
            .then(a.counterparty_id.cmp(&b.counterparty_id))
    });
    result
}

fn position_entry(
    positions: &mut HashMap<Uuid, ConsolidatedPosition>,
    counterparty_id: Uuid,
) -> &mut ConsolidatedPosition {
    positions
        .entry(counterparty_id)
        .or_insert_with(|| ConsolidatedPosition {
            counterparty_id,
            total: Decimal::ZERO,
            direct_amount: Decimal::ZERO,
            group_amount: Decimal::ZERO,
            groups: Vec::new(),
        })
}
