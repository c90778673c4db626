//! Sales reporting: pure aggregation over the transaction list.
//!
//! Every figure is recomputed on demand from an immutable slice; nothing
//! here mutates or persists. Only LUNAS transactions count — PENDING sales
//! are not yet revenue and DIBATALKAN ones never were.
//!
//! Date grouping uses the local calendar date of each transaction. The
//! 7-day trend is sorted chronologically and takes the last seven distinct
//! dates with sales, regardless of the order transactions arrived in.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{CartItem, PaymentMethod, Transaction, TransactionStatus};

/// Distinct calendar dates shown in the sales trend.
const TREND_DAYS: usize = 7;

/// Rows in the best-seller ranking.
const TOP_PRODUCT_ROWS: usize = 5;

/// One bar of the sales trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSales {
    pub date: NaiveDate,
    /// Chart label, e.g. "Jan 5".
    pub label: String,
    pub total: i64,
}

/// One row of the best-seller ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub id: String,
    /// Product name as of its first appearance in the transaction list.
    pub name: String,
    pub quantity: u64,
    pub revenue: i64,
}

/// The full reporting rollup. All fields are zero/empty for an empty
/// transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    /// Sum of totals for completed transactions dated today (local time).
    pub daily_total: i64,
    /// Lifetime sum of totals over all completed transactions.
    pub grand_total: i64,
    /// Lifetime `(price - cost) * quantity` over all completed items.
    pub net_profit: i64,
    /// Number of completed transactions.
    pub completed_count: usize,
    /// Last seven distinct sale dates, chronological.
    pub sales_by_date: Vec<DateSales>,
    /// Completed-transaction count per payment method.
    pub payment_breakdown: BTreeMap<PaymentMethod, u64>,
    /// Best sellers by quantity, ties kept in first-encounter order.
    pub top_products: Vec<ProductSales>,
}

impl SalesReport {
    /// Aggregate `transactions` with "today" pinned to an explicit date.
    pub fn compute(transactions: &[Transaction], today: NaiveDate) -> SalesReport {
        let completed: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Lunas)
            .collect();

        let daily_total = completed
            .iter()
            .filter(|t| local_date(t.date) == today)
            .map(|t| t.total)
            .sum();
        let grand_total = completed.iter().map(|t| t.total).sum();
        let net_profit = completed
            .iter()
            .flat_map(|t| &t.items)
            .map(CartItem::line_profit)
            .sum();

        SalesReport {
            daily_total,
            grand_total,
            net_profit,
            completed_count: completed.len(),
            sales_by_date: sales_trend(&completed),
            payment_breakdown: payment_breakdown(&completed),
            top_products: top_products(&completed),
        }
    }

    /// Aggregate with "today" taken from the wall clock.
    pub fn compute_now(transactions: &[Transaction]) -> SalesReport {
        SalesReport::compute(transactions, Local::now().date_naive())
    }
}

/// The calendar date of a timestamp in the terminal's local timezone.
fn local_date(date: DateTime<Utc>) -> NaiveDate {
    date.with_timezone(&Local).date_naive()
}

fn sales_trend(completed: &[&Transaction]) -> Vec<DateSales> {
    let mut by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for t in completed {
        *by_date.entry(local_date(t.date)).or_insert(0) += t.total;
    }
    let skip = by_date.len().saturating_sub(TREND_DAYS);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, total)| DateSales {
            label: date.format("%b %-d").to_string(),
            date,
            total,
        })
        .collect()
}

fn payment_breakdown(completed: &[&Transaction]) -> BTreeMap<PaymentMethod, u64> {
    let mut by_method = BTreeMap::new();
    for t in completed {
        *by_method.entry(t.payment_method).or_insert(0) += 1;
    }
    by_method
}

fn top_products(completed: &[&Transaction]) -> Vec<ProductSales> {
    // Accumulate in first-encounter order so the later stable sort keeps
    // tied products in that order.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<ProductSales> = Vec::new();
    for t in completed {
        for item in &t.items {
            let i = *index.entry(item.product.id.as_str()).or_insert_with(|| {
                rows.push(ProductSales {
                    id: item.product.id.clone(),
                    name: item.product.name.clone(),
                    quantity: 0,
                    revenue: 0,
                });
                rows.len() - 1
            });
            rows[i].quantity += u64::from(item.quantity);
            rows[i].revenue += item.line_total();
        }
    }
    rows.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    rows.truncate(TOP_PRODUCT_ROWS);
    rows
}

// ===========================================================================
// Tests
// ===========================================================================
