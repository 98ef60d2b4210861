use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    effective_price, CartLine, ListResult, OrderDraft, OrderStatus, OrderView, PaymentMethod,
    SnapshotLine,
};
use crate::domain::ports::{CatalogLookup, OrderRepository};
use crate::domain::time;

/// An order as submitted over the wire, before catalog resolution.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub lines: Vec<CartLine>,
    pub total_amount: String,
    pub payment_method: Option<String>,
    pub shipping_address: Value,
}

pub struct OrderService<R, C> {
    repo: R,
    catalog: C,
}

/// Sum of line snapshots, used to cross-check the caller-declared total.
/// Pure on purpose so it can be validated without touching persistence.
pub fn lines_total(items: &[SnapshotLine]) -> BigDecimal {
    items.iter().fold(BigDecimal::from(0), |acc, item| {
        acc + &item.unit_price * BigDecimal::from(item.quantity)
    })
}

/// Millisecond timestamp plus a random suffix; uniqueness is additionally
/// backed by the store's unique index on the column.
fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{}-{}", now.timestamp_millis(), suffix)
}

/// Shift both instants into display time, exactly once per response.
fn normalized(mut order: OrderView) -> OrderView {
    order.created_at = time::normalize(order.created_at);
    order.updated_at = time::normalize(order.updated_at);
    order
}

impl<R: OrderRepository, C: CatalogLookup> OrderService<R, C> {
    pub fn new(repo: R, catalog: C) -> Self {
        Self { repo, catalog }
    }

    /// Validate the cart, snapshot catalog prices, and persist the order
    /// atomically. No stock is decremented here; inventory enforcement is
    /// a stated non-goal of this service.
    pub fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> Result<OrderView, DomainError> {
        if input.lines.is_empty() {
            return Err(DomainError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            if line.quantity < 1 {
                return Err(DomainError::Validation(format!(
                    "Invalid quantity {} for product {}",
                    line.quantity, line.product_ref
                )));
            }
            let entry = self
                .catalog
                .resolve(&line.product_ref)?
                .ok_or(DomainError::NotFound("Product"))?;
            items.push(SnapshotLine {
                product_id: entry.id,
                title: entry.name,
                image: entry.image,
                category: entry
                    .category
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                quantity: line.quantity,
                unit_price: effective_price(&entry.price, &entry.discount_percent),
            });
        }

        let total = BigDecimal::from_str(input.total_amount.trim()).map_err(|_| {
            DomainError::Validation(format!(
                "totalAmount '{}' is not a number",
                input.total_amount
            ))
        })?;
        if total <= BigDecimal::from(0) {
            return Err(DomainError::Validation(
                "totalAmount must be greater than zero".to_string(),
            ));
        }
        let expected = lines_total(&items);
        if total != expected {
            return Err(DomainError::Validation(format!(
                "totalAmount {} does not match order lines total {}",
                total, expected
            )));
        }

        let payment_method = match input.payment_method.as_deref() {
            None => PaymentMethod::Cod,
            Some(raw) => PaymentMethod::from_str(raw).map_err(|_| {
                DomainError::Validation(format!("Unknown payment method '{raw}'"))
            })?,
        };

        let draft = OrderDraft {
            order_number: generate_order_number(Utc::now()),
            items,
            total_amount: total,
            payment_method,
            shipping_address: input.shipping_address,
        };

        let order = self.repo.create(user_id, draft)?;
        log::info!("created order {} for user {}", order.order_number, user_id);
        Ok(normalized(order))
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_id(id)?
            .map(normalized)
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let result = self.repo.list(page, limit)?;
        Ok(ListResult {
            items: result.items.into_iter().map(normalized).collect(),
            total: result.total,
        })
    }

    /// Apply a status transition. Any of the five enumerated statuses is
    /// accepted from any current state; anything else is rejected before
    /// persistence and the stored status stays untouched.
    pub fn update_status(&self, id: Uuid, new_status: &str) -> Result<OrderView, DomainError> {
        let status = OrderStatus::from_str(new_status)
            .map_err(|_| DomainError::InvalidStatus(new_status.to_string()))?;
        let order = self
            .repo
            .update_status(id, status)?
            .ok_or(DomainError::NotFound("Order"))?;
        log::info!("order {} -> {}", order.order_number, status.as_str());
        Ok(normalized(order))
    }

    /// Flip the review flag, exactly once, for a Delivered order owned by
    /// the caller.
    pub fn submit_review(
        &self,
        id: Uuid,
        user_id: Uuid,
        rating: i32,
    ) -> Result<(), DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::Validation(format!(
                "Rating must be between 1 and 5, got {rating}"
            )));
        }
        let order = self
            .repo
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))?;
        if order.user_id != user_id {
            // Ownership failures look like a missing order to the caller.
            return Err(DomainError::NotFound("Order"));
        }
        if order.status != OrderStatus::Delivered {
            return Err(DomainError::NotEligible);
        }
        if order.has_reviewed {
            return Err(DomainError::AlreadyReviewed);
        }
        self.repo.mark_reviewed(id)
    }
}
