use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// The five order states. The transition graph is deliberately open: any
/// enumerated status is accepted as a next state from any current state,
/// which leaves room for back-office corrections (e.g. un-cancelling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cod,
    Card,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentMethod::Cod),
            "CARD" => Ok(PaymentMethod::Card),
            "UPI" => Ok(PaymentMethod::Upi),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Paid" => Ok(PaymentStatus::Paid),
            "Failed" => Ok(PaymentStatus::Failed),
            _ => Err(()),
        }
    }
}

/// Price after the catalog discount is applied:
/// `price − price × discount_percent / 100`, exact decimal arithmetic.
pub fn effective_price(price: &BigDecimal, discount_percent: &BigDecimal) -> BigDecimal {
    price - price * discount_percent / BigDecimal::from(100)
}

/// One cart line as submitted by the caller, before price resolution.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_ref: String,
    pub quantity: i32,
}

/// A fully resolved order line carrying catalog snapshots. Once persisted
/// these values are frozen; later catalog edits never touch them.
#[derive(Debug, Clone)]
pub struct SnapshotLine {
    pub product_id: Uuid,
    pub title: String,
    pub image: String,
    pub category: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Everything the repository needs to persist a new order atomically.
/// `order_number` is generated by the service exactly once per draft.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_number: String,
    pub items: Vec<SnapshotLine>,
    pub total_amount: BigDecimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: Value,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub image: String,
    pub category: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub items: Vec<OrderLineView>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_address: Value,
    pub has_reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// What the catalog knows about a product at resolution time.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub discount_percent: BigDecimal,
    pub category: Option<String>,
    pub stock: i32,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::{effective_price, OrderStatus, PaymentMethod};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn effective_price_applies_percentage_discount() {
        assert_eq!(effective_price(&dec("100"), &dec("10")), dec("90"));
    }

    #[test]
    fn effective_price_zero_discount_is_identity() {
        assert_eq!(effective_price(&dec("249.99"), &dec("0")), dec("249.99"));
    }

    #[test]
    fn effective_price_fractional_discount_is_exact() {
        // 200 − 200 × 12.5 / 100 = 175, no float rounding anywhere
        assert_eq!(effective_price(&dec("200"), &dec("12.5")), dec("175"));
    }

    #[test]
    fn effective_price_is_consistent_across_discount_range() {
        let base = dec("100");
        for discount in 0..100 {
            let d = BigDecimal::from(discount);
            let expected = &base * BigDecimal::from(100 - discount) / BigDecimal::from(100);
            assert_eq!(effective_price(&base, &d), expected, "discount {discount}");
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!(OrderStatus::from_str("Refunded").is_err());
        assert!(OrderStatus::from_str("pending").is_err());
        assert!(OrderStatus::from_str("").is_err());
    }

    #[test]
    fn payment_method_parses_uppercase_wire_values() {
        assert_eq!(PaymentMethod::from_str("COD"), Ok(PaymentMethod::Cod));
        assert_eq!(PaymentMethod::from_str("CARD"), Ok(PaymentMethod::Card));
        assert_eq!(PaymentMethod::from_str("UPI"), Ok(PaymentMethod::Upi));
        assert!(PaymentMethod::from_str("PAYPAL").is_err());
    }
}
