use std::str::FromStr;

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::analytics::{ItemFacts, OrderFacts};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, OrderDraft, OrderLineView, OrderStatus, OrderView, PaymentMethod, PaymentStatus,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// A stored status/payment string the application no longer understands is
/// corrupt data, not caller error.
fn parse_stored<T: FromStr>(value: &str, what: &str) -> Result<T, DomainError> {
    T::from_str(value)
        .map_err(|_| DomainError::Internal(format!("stored {what} '{value}' is not recognized")))
}

fn to_view(order: OrderRow, items: Vec<OrderItemRow>) -> Result<OrderView, DomainError> {
    Ok(OrderView {
        id: order.id,
        user_id: order.user_id,
        order_number: order.order_number,
        items: items
            .into_iter()
            .map(|item| OrderLineView {
                id: item.id,
                product_id: item.product_id,
                title: item.title,
                image: item.image,
                category: item.category,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        total_amount: order.total_amount,
        status: parse_stored::<OrderStatus>(&order.status, "status")?,
        payment_method: parse_stored::<PaymentMethod>(&order.payment_method, "payment method")?,
        payment_status: parse_stored::<PaymentStatus>(&order.payment_status, "payment status")?,
        shipping_address: order.shipping_address,
        has_reviewed: order.has_reviewed,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}

/// Load orders plus their items grouped per order, preserving order-row
/// ordering.
fn with_items(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<OrderView>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .load(conn)?
        .grouped_by(&rows);
    rows.into_iter()
        .zip(items)
        .map(|(order, items)| to_view(order, items))
        .collect()
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, user_id: Uuid, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_id = Uuid::new_v4();
            let order: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    order_number: draft.order_number,
                    total_amount: draft.total_amount,
                    status: OrderStatus::Pending.as_str().to_string(),
                    payment_method: draft.payment_method.as_str().to_string(),
                    payment_status: PaymentStatus::Pending.as_str().to_string(),
                    shipping_address: draft.shipping_address,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            let new_items: Vec<NewOrderItemRow> = draft
                .items
                .into_iter()
                .map(|line| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: line.product_id,
                    title: line.title,
                    image: line.image,
                    category: line.category,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect();
            let items: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
                .values(&new_items)
                .returning(OrderItemRow::as_returning())
                .get_results(conn)?;

            to_view(order, items)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;

        to_view(order, items).map(Some)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn recent(&self, limit: i64) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .limit(limit)
            .load(&mut conn)?;

        with_items(&mut conn, rows)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        // Single-row atomic update; concurrent writers are last-write-wins.
        let order: Option<OrderRow> = diesel::update(orders::table.find(id))
            .set((
                orders::status.eq(status.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;

        to_view(order, items).map(Some)
    }

    fn mark_reviewed(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(orders::table.find(id))
            .set((
                orders::has_reviewed.eq(true),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }

    fn load_facts(&self) -> Result<Vec<OrderFacts>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table.select(OrderRow::as_select()).load(&mut conn)?;
        let items = OrderItemRow::belonging_to(&rows)
            .select(OrderItemRow::as_select())
            .load(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(order, items)| {
                Ok(OrderFacts {
                    total_amount: order.total_amount,
                    status: parse_stored::<OrderStatus>(&order.status, "status")?,
                    payment_method: parse_stored::<PaymentMethod>(
                        &order.payment_method,
                        "payment method",
                    )?,
                    created_at: order.created_at,
                    items: items
                        .into_iter()
                        .map(|item| ItemFacts {
                            product_id: item.product_id,
                            title: item.title,
                            image: item.image,
                            quantity: item.quantity,
                            unit_price: item.unit_price,
                        })
                        .collect(),
                })
            })
            .collect()
    }
}
