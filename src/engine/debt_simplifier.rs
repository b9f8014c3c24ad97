use crate::constants::SPLIT_TOLERANCE;
use crate::models::{NetBalanceEdge, SimplifiedDebt};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Reduces a set of net balance edges into a settlement plan using the
/// greedy max-creditor/max-debtor matching heuristic.
///
/// Each round settles `min(largest credit, largest debt)` between the two
/// extremes, so every round retires at least one party and the plan holds at
/// most k-1 transfers for k parties with a non-zero net. Ordering is an
/// explicit total order (balance descending, user id ascending on ties), so
/// repeated calls over the same edges produce the identical plan.
pub fn simplify_debts(edges: &[NetBalanceEdge]) -> Vec<SimplifiedDebt> {
    let mut nets: HashMap<Uuid, Decimal> = HashMap::new();
    for edge in edges {
        *nets.entry(edge.debtor_id).or_insert(Decimal::ZERO) -= edge.amount;
        *nets.entry(edge.creditor_id).or_insert(Decimal::ZERO) += edge.amount;
    }

    let mut creditors: Vec<(Uuid, Decimal)> = nets
        .iter()
        .filter(|(_, net)| **net > SPLIT_TOLERANCE)
        .map(|(id, net)| (*id, *net))
        .collect();
    let mut debtors: Vec<(Uuid, Decimal)> = nets
        .iter()
        .filter(|(_, net)| **net < -SPLIT_TOLERANCE)
        .map(|(id, net)| (*id, -*net))
        .collect();

    let mut plan = Vec::new();
    while !creditors.is_empty() && !debtors.is_empty() {
        creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let amount = creditors[0].1.min(debtors[0].1);
        plan.push(SimplifiedDebt {
            from_user_id: debtors[0].0,
            to_user_id: creditors[0].0,
            amount,
        });

        creditors[0].1 -= amount;
        debtors[0].1 -= amount;

        // Residuals below one cent count as settled and are dropped.
        if creditors[0].1 <= SPLIT_TOLERANCE {
            creditors.remove(0);
        }
        if debtors[0].1 <= SPLIT_TOLERANCE {
            debtors.remove(0);
        }
    }

    plan
}
