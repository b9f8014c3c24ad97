use crate::error::DivvyError;
use crate::models::{DirectLoan, NetBalanceEdge, SplitRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Folds persisted split-participant records into net pairwise balances.
///
/// Each record contributes `participant owes payer += amount_owed`; the two
/// directions of every pair are then collapsed into a single net edge, with
/// exact-zero nets dropped. All records must share one currency; callers
/// invoke the aggregator once per currency bucket.
pub fn aggregate_balances(records: &[SplitRecord]) -> Result<Vec<NetBalanceEdge>, DivvyError> {
    let currency = match single_currency(records.iter().map(|r| r.currency.as_str()))? {
        Some(c) => c.to_string(),
        None => return Ok(Vec::new()),
    };

    let mut owed: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
    for record in records {
        if record.user_id == record.payer_id {
            continue;
        }
        *owed
            .entry((record.user_id, record.payer_id))
            .or_insert(Decimal::ZERO) += record.amount_owed;
    }

    Ok(net_edges(owed, currency))
}

/// Same fold for direct loans: the outstanding remainder is owed on the
/// borrower-to-lender direction. Fully repaid loans contribute nothing.
pub fn aggregate_loan_balances(loans: &[DirectLoan]) -> Result<Vec<NetBalanceEdge>, DivvyError> {
    let currency = match single_currency(loans.iter().map(|l| l.currency.as_str()))? {
        Some(c) => c.to_string(),
        None => return Ok(Vec::new()),
    };

    let mut owed: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
    for loan in loans {
        let remaining = loan.amount_remaining();
        if remaining <= Decimal::ZERO {
            continue;
        }
        *owed
            .entry((loan.borrower_id, loan.lender_id))
            .or_insert(Decimal::ZERO) += remaining;
    }

    Ok(net_edges(owed, currency))
}

fn single_currency<'a, I>(mut currencies: I) -> Result<Option<&'a str>, DivvyError>
where
    I: Iterator<Item = &'a str>,
{
    let first = match currencies.next() {
        Some(c) => c,
        None => return Ok(None),
    };
    for currency in currencies {
        if currency != first {
            return Err(DivvyError::CurrencyMismatch {
                expected: first.to_string(),
                found: currency.to_string(),
            });
        }
    }
    Ok(Some(first))
}

/// Collapses directed owed totals into one net edge per unordered pair,
/// sorted by (debtor, creditor) for reproducible output.
fn net_edges(owed: HashMap<(Uuid, Uuid), Decimal>, currency: String) -> Vec<NetBalanceEdge> {
    let mut nets: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
    for ((debtor, creditor), amount) in owed {
        if debtor < creditor {
            *nets.entry((debtor, creditor)).or_insert(Decimal::ZERO) += amount;
        } else {
            *nets.entry((creditor, debtor)).or_insert(Decimal::ZERO) -= amount;
        }
    }

    let mut edges: Vec<NetBalanceEdge> = nets
        .into_iter()
        .filter(|(_, net)| !net.is_zero())
        .map(|((a, b), net)| {
            if net > Decimal::ZERO {
                NetBalanceEdge {
                    debtor_id: a,
                    creditor_id: b,
                    amount: net,
                    currency: currency.clone(),
                }
            } else {
                NetBalanceEdge {
                    debtor_id: b,
                    creditor_id: a,
                    amount: -net,
                    currency: currency.clone(),
                }
            }
        })
        .collect();

    edges.sort_by(|a, b| {
        a.debtor_id
            .cmp(&b.debtor_id)
            .then(a.creditor_id.cmp(&b.creditor_id))
    });
    edges
}
