//! Revenue and sales aggregation over the order store.
//!
//! Everything here is a pure fold over in-memory order facts: no state is
//! kept between calls and no bucket is synthesized for an empty period.
//! Consumers that need a dense series (e.g. exactly 7 daily points) must
//! densify on their side.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use uuid::Uuid;

use super::order::{OrderStatus, PaymentMethod};

/// One order line's contribution to product-level aggregates. Title and
/// image are the ingestion-time snapshots, used as a fallback when the
/// product has since disappeared from the catalog.
#[derive(Debug, Clone)]
pub struct ItemFacts {
    pub product_id: Uuid,
    pub title: String,
    pub image: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// The slice of an order the aggregation engine reads.
#[derive(Debug, Clone)]
pub struct OrderFacts {
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ItemFacts>,
}

impl OrderFacts {
    /// Revenue is recognized only once the order is Delivered. The payment
    /// method whitelist (COD/CARD/UPI) is total by construction of the enum.
    fn is_recognized(&self) -> bool {
        self.status == OrderStatus::Delivered
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub revenue: BigDecimal,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPoint {
    pub year: i32,
    pub week: u32,
    pub revenue: BigDecimal,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub revenue: BigDecimal,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HalfYearPoint {
    pub year: i32,
    pub half: u32,
    pub revenue: BigDecimal,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentBucket {
    pub method: PaymentMethod,
    pub revenue: BigDecimal,
    pub orders: i64,
}

/// Current catalog metadata joined into the top-product ranking.
#[derive(Debug, Clone)]
pub struct ProductMeta {
    pub name: String,
    pub image: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub category: String,
    pub quantity: i64,
    pub revenue: BigDecimal,
}

pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// Known display-name variants collapsed to one canonical string. Consulted
/// once per category during ranking; extend the table rather than adding
/// string branches elsewhere.
const CATEGORY_SYNONYMS: &[(&str, &str)] = &[
    ("Home and Kitchen", "Home & Kitchen"),
    ("Home-Kitchen", "Home & Kitchen"),
    ("Home&Kitchen", "Home & Kitchen"),
    ("Beauty and Personal Care", "Beauty & Personal Care"),
    ("Beauty-Personal Care", "Beauty & Personal Care"),
    ("Sports and Fitness", "Sports & Fitness"),
    ("Sports-Fitness", "Sports & Fitness"),
];

pub fn canonical_category(name: &str) -> &str {
    CATEGORY_SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Fold recognized orders newer than `from` into calendar buckets. The
/// BTreeMap key keeps buckets ascending by (year, sub-period).
fn rollup<K: Ord>(
    orders: &[OrderFacts],
    from: DateTime<Utc>,
    key: impl Fn(DateTime<Utc>) -> K,
) -> BTreeMap<K, (BigDecimal, i64)> {
    let mut buckets: BTreeMap<K, (BigDecimal, i64)> = BTreeMap::new();
    for order in orders {
        if !order.is_recognized() || order.created_at < from {
            continue;
        }
        let entry = buckets
            .entry(key(order.created_at))
            .or_insert_with(|| (BigDecimal::from(0), 0));
        entry.0 += &order.total_amount;
        entry.1 += 1;
    }
    buckets
}

fn months_back(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Last 7 days, keyed by calendar day.
pub fn daily_revenue(orders: &[OrderFacts], now: DateTime<Utc>) -> Vec<DailyPoint> {
    rollup(orders, now - Duration::days(7), |t| {
        (t.year(), t.month(), t.day())
    })
    .into_iter()
    .map(|((year, month, day), (revenue, count))| DailyPoint {
        year,
        month,
        day,
        revenue,
        orders: count,
    })
    .collect()
}

/// Last 28 days, keyed by ISO week. The ISO week-year is used for the year
/// component so the first days of January land in the right bucket.
pub fn weekly_revenue(orders: &[OrderFacts], now: DateTime<Utc>) -> Vec<WeeklyPoint> {
    rollup(orders, now - Duration::days(28), |t| {
        let iso = t.iso_week();
        (iso.year(), iso.week())
    })
    .into_iter()
    .map(|((year, week), (revenue, count))| WeeklyPoint {
        year,
        week,
        revenue,
        orders: count,
    })
    .collect()
}

/// Last 12 months, keyed by calendar month.
pub fn monthly_revenue(orders: &[OrderFacts], now: DateTime<Utc>) -> Vec<MonthlyPoint> {
    rollup(orders, months_back(now, 12), |t| (t.year(), t.month()))
        .into_iter()
        .map(|((year, month), (revenue, count))| MonthlyPoint {
            year,
            month,
            revenue,
            orders: count,
        })
        .collect()
}

/// Last 2 years, keyed by calendar half (H1 = Jan–Jun, H2 = Jul–Dec).
pub fn half_yearly_revenue(orders: &[OrderFacts], now: DateTime<Utc>) -> Vec<HalfYearPoint> {
    rollup(orders, months_back(now, 24), |t| {
        (t.year(), if t.month() <= 6 { 1 } else { 2 })
    })
    .into_iter()
    .map(|((year, half), (revenue, count))| HalfYearPoint {
        year,
        half,
        revenue,
        orders: count,
    })
    .collect()
}

/// Count of all orders per status, no payment or status filter.
pub fn status_distribution(orders: &[OrderFacts]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .iter()
        .filter_map(|status| {
            let count = orders.iter().filter(|o| o.status == *status).count() as i64;
            (count > 0).then_some(StatusCount {
                status: *status,
                count,
            })
        })
        .collect()
}

/// Delivered orders grouped by payment method.
pub fn payment_breakdown(orders: &[OrderFacts]) -> Vec<PaymentBucket> {
    [PaymentMethod::Cod, PaymentMethod::Card, PaymentMethod::Upi]
        .iter()
        .filter_map(|method| {
            let mut revenue = BigDecimal::from(0);
            let mut count = 0i64;
            for order in orders {
                if order.status == OrderStatus::Delivered && order.payment_method == *method {
                    revenue += &order.total_amount;
                    count += 1;
                }
            }
            (count > 0).then_some(PaymentBucket {
                method: *method,
                revenue,
                orders: count,
            })
        })
        .collect()
}

pub fn total_recognized_revenue(orders: &[OrderFacts]) -> BigDecimal {
    orders
        .iter()
        .filter(|o| o.is_recognized())
        .fold(BigDecimal::from(0), |acc, o| acc + &o.total_amount)
}

/// Orders that reached fulfilment: Delivered or Shipped.
pub fn completed_orders(orders: &[OrderFacts]) -> i64 {
    orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::Delivered | OrderStatus::Shipped))
        .count() as i64
}

/// Rank products by units sold within orders matching `filter`. Current
/// catalog metadata wins over line snapshots when available; categories go
/// through the synonym table and default to "Uncategorized".
pub fn top_products(
    orders: &[OrderFacts],
    filter: OrderStatus,
    meta: &HashMap<Uuid, ProductMeta>,
) -> Vec<TopProduct> {
    struct Acc {
        quantity: i64,
        revenue: BigDecimal,
        title: String,
        image: String,
    }

    let mut by_product: HashMap<Uuid, Acc> = HashMap::new();
    for order in orders.iter().filter(|o| o.status == filter) {
        for item in &order.items {
            let acc = by_product.entry(item.product_id).or_insert_with(|| Acc {
                quantity: 0,
                revenue: BigDecimal::from(0),
                title: item.title.clone(),
                image: item.image.clone(),
            });
            acc.quantity += i64::from(item.quantity);
            acc.revenue += &item.unit_price * BigDecimal::from(item.quantity);
        }
    }

    let mut ranked: Vec<TopProduct> = by_product
        .into_iter()
        .map(|(product_id, acc)| {
            let (name, image, category) = match meta.get(&product_id) {
                Some(m) => (
                    m.name.clone(),
                    m.image.clone(),
                    m.category
                        .as_deref()
                        .map(|c| canonical_category(c).to_string()),
                ),
                None => (acc.title, acc.image, None),
            };
            TopProduct {
                product_id,
                name,
                image,
                category: category.unwrap_or_else(|| "Uncategorized".to_string()),
                quantity: acc.quantity,
                revenue: acc.revenue,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TOP_PRODUCTS_LIMIT);
    ranked
}
