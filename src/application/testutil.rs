//! In-memory implementations of the persistence ports, shared by the
//! service tests in this layer.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::analytics::{ItemFacts, OrderFacts, ProductMeta};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CatalogEntry, ListResult, OrderDraft, OrderLineView, OrderStatus, OrderView, PaymentMethod,
    PaymentStatus,
};
use crate::domain::ports::{CatalogLookup, OrderRepository, StoreCounts};

#[derive(Clone)]
pub struct InMemoryOrders {
    orders: Arc<Mutex<Vec<OrderView>>>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// The raw stored order, without response-side timestamp shifting.
    pub fn stored_order(&self, id: Uuid) -> Option<OrderView> {
        self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }

    /// Insert a pre-built order, bypassing ingestion. Lets dashboard tests
    /// control status and creation time directly.
    pub fn seed(&self, order: OrderView) {
        self.orders.lock().unwrap().push(order);
    }

    pub fn seeded(
        status: OrderStatus,
        payment_method: PaymentMethod,
        total: &str,
        created_at: DateTime<Utc>,
        items: Vec<OrderLineView>,
    ) -> OrderView {
        OrderView {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_number: format!("ORD-SEED-{}", Uuid::new_v4().simple()),
            items,
            total_amount: BigDecimal::from_str(total).expect("valid decimal"),
            status,
            payment_method,
            payment_status: PaymentStatus::Pending,
            shipping_address: serde_json::json!({}),
            has_reviewed: false,
            created_at,
            updated_at: created_at,
        }
    }
}

impl OrderRepository for InMemoryOrders {
    fn create(&self, user_id: Uuid, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let now = Utc::now();
        let order = OrderView {
            id: Uuid::new_v4(),
            user_id,
            order_number: draft.order_number,
            items: draft
                .items
                .into_iter()
                .map(|line| OrderLineView {
                    id: Uuid::new_v4(),
                    product_id: line.product_id,
                    title: line.title,
                    image: line.image,
                    category: line.category,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            total_amount: draft.total_amount,
            status: OrderStatus::Pending,
            payment_method: draft.payment_method,
            payment_status: PaymentStatus::Pending,
            shipping_address: draft.shipping_address,
            has_reviewed: false,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.stored_order(id))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let orders = self.orders.lock().unwrap();
        let mut sorted: Vec<OrderView> = orders.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let offset = ((page - 1) * limit).max(0) as usize;
        Ok(ListResult {
            total: sorted.len() as i64,
            items: sorted.into_iter().skip(offset).take(limit as usize).collect(),
        })
    }

    fn recent(&self, limit: i64) -> Result<Vec<OrderView>, DomainError> {
        Ok(self.list(1, limit)?.items)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }

    fn mark_reviewed(&self, id: Uuid) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound("Order"))?;
        order.has_reviewed = true;
        order.updated_at = Utc::now();
        Ok(())
    }

    fn load_facts(&self) -> Result<Vec<OrderFacts>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .map(|o| OrderFacts {
                total_amount: o.total_amount.clone(),
                status: o.status,
                payment_method: o.payment_method,
                created_at: o.created_at,
                items: o
                    .items
                    .iter()
                    .map(|i| ItemFacts {
                        product_id: i.product_id,
                        title: i.title.clone(),
                        image: i.image.clone(),
                        quantity: i.quantity,
                        unit_price: i.unit_price.clone(),
                    })
                    .collect(),
            })
            .collect())
    }
}

struct StoredProduct {
    entry: CatalogEntry,
    legacy_ref: Option<String>,
}

#[derive(Clone)]
pub struct InMemoryCatalog {
    products: Arc<Mutex<Vec<StoredProduct>>>,
    users: Arc<Mutex<i64>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            products: Arc::new(Mutex::new(Vec::new())),
            users: Arc::new(Mutex::new(0)),
        }
    }

    pub fn add_product(
        &self,
        name: &str,
        price: &str,
        discount_percent: &str,
        category: Option<&str>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.products.lock().unwrap().push(StoredProduct {
            entry: CatalogEntry {
                id,
                name: name.to_string(),
                image: format!("{}.jpg", name.to_lowercase().replace(' ', "-")),
                price: BigDecimal::from_str(price).expect("valid decimal"),
                discount_percent: BigDecimal::from_str(discount_percent).expect("valid decimal"),
                category: category.map(str::to_string),
                stock: 100,
            },
            legacy_ref: None,
        });
        id
    }

    pub fn set_legacy_ref(&self, id: Uuid, legacy_ref: &str) {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.entry.id == id)
            .expect("product exists");
        product.legacy_ref = Some(legacy_ref.to_string());
    }

    pub fn update_product(&self, id: Uuid, name: &str, price: &str, discount_percent: &str) {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.entry.id == id)
            .expect("product exists");
        product.entry.name = name.to_string();
        product.entry.price = BigDecimal::from_str(price).expect("valid decimal");
        product.entry.discount_percent =
            BigDecimal::from_str(discount_percent).expect("valid decimal");
    }

    pub fn set_users(&self, users: i64) {
        *self.users.lock().unwrap() = users;
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn resolve(&self, product_ref: &str) -> Result<Option<CatalogEntry>, DomainError> {
        let products = self.products.lock().unwrap();
        if let Ok(id) = Uuid::from_str(product_ref) {
            if let Some(p) = products.iter().find(|p| p.entry.id == id) {
                return Ok(Some(p.entry.clone()));
            }
        }
        Ok(products
            .iter()
            .find(|p| p.legacy_ref.as_deref() == Some(product_ref))
            .map(|p| p.entry.clone()))
    }

    fn product_meta(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, ProductMeta>, DomainError> {
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.entry.id))
            .map(|p| {
                (
                    p.entry.id,
                    ProductMeta {
                        name: p.entry.name.clone(),
                        image: p.entry.image.clone(),
                        category: p.entry.category.clone(),
                    },
                )
            })
            .collect())
    }

    fn counts(&self) -> Result<StoreCounts, DomainError> {
        let products = self.products.lock().unwrap();
        let categories = products
            .iter()
            .filter_map(|p| p.entry.category.as_deref())
            .collect::<std::collections::HashSet<_>>()
            .len() as i64;
        Ok(StoreCounts {
            products: products.len() as i64,
            users: *self.users.lock().unwrap(),
            categories,
        })
    }
}
