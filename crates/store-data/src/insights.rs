//! Short prose observations derived from a Sales/Profit aggregate.

use store_core::error::Result;
use store_core::formatting::{format_currency, format_share, join_names};
use store_core::models::Field;

use crate::aggregator::Aggregate;

/// Most sales-versus-profit inversions mentioned per aggregate.
const MAX_INVERSIONS: usize = 3;

/// Commentary lines for an aggregate holding Sales and Profit sums.
///
/// Empty for an empty aggregate.
pub fn commentary(aggregate: &Aggregate) -> Result<Vec<String>> {
    let labels = aggregate.labels();
    let sales = aggregate.series(Field::Sales)?;
    let profit = aggregate.series(Field::Profit)?;
    if labels.is_empty() {
        return Ok(Vec::new());
    }

    let dimension = aggregate
        .keys()
        .iter()
        .map(|k| k.header())
        .collect::<Vec<_>>()
        .join("/");
    let total_sales: f64 = sales.iter().sum();
    let mut lines = Vec::new();

    let by_sales = ranked(&sales);
    let top = by_sales[0];
    lines.push(format!(
        "{} leads sales with {} ({} of the total).",
        labels[top],
        format_currency(sales[top]),
        format_share(sales[top], total_sales)
    ));

    if labels.len() >= 3 {
        let second = by_sales[1];
        lines.push(format!(
            "{} and {} together make up {} of sales.",
            labels[top],
            labels[second],
            format_share(sales[top] + sales[second], total_sales)
        ));
    }

    let by_profit = ranked(&profit);
    let best = by_profit[0];
    if profit[best] < 0.0 {
        lines.push(format!(
            "{} has the smallest loss at {}.",
            labels[best],
            format_currency(profit[best])
        ));
    } else {
        lines.push(format!(
            "{} is the most profitable with {}.",
            labels[best],
            format_currency(profit[best])
        ));
    }

    let losses = aggregate.loss_making(Field::Profit)?;
    if losses.is_empty() {
        lines.push(format!("No {} reports a loss.", dimension));
    } else {
        let verb = if losses.len() == 1 { "operates" } else { "operate" };
        lines.push(format!("{} {} at a loss.", join_names(&losses), verb));
    }

    let worst = by_profit[by_profit.len() - 1];
    if labels.len() >= 2 && worst == top {
        lines.push(format!(
            "{} has the highest sales but the lowest profit.",
            labels[top]
        ));
    }

    // Adjacent pairs in sales rank where the bigger seller earns less.
    let inversions = by_sales
        .windows(2)
        .filter(|w| profit[w[0]] < profit[w[1]])
        .take(MAX_INVERSIONS);
    for pair in inversions {
        let (hi, lo) = (pair[0], pair[1]);
        if hi == top && worst == top {
            continue;
        }
        lines.push(format!(
            "{} sells more than {} but earns less profit.",
            labels[hi], labels[lo]
        ));
    }

    Ok(lines)
}

/// Indices sorted by descending value; ties keep their original order.
fn ranked(values: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    idx
}
