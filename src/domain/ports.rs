use std::collections::HashMap;

use uuid::Uuid;

use super::analytics::{OrderFacts, ProductMeta};
use super::errors::DomainError;
use super::order::{CatalogEntry, ListResult, OrderDraft, OrderStatus, OrderView};

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the draft atomically; either the order and all of its items
    /// are stored, or nothing is.
    fn create(&self, user_id: Uuid, draft: OrderDraft) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn recent(&self, limit: i64) -> Result<Vec<OrderView>, DomainError>;
    /// Single-row last-write-wins status update. Returns the updated order,
    /// or None when the id is unknown.
    fn update_status(&self, id: Uuid, status: OrderStatus)
        -> Result<Option<OrderView>, DomainError>;
    fn mark_reviewed(&self, id: Uuid) -> Result<(), DomainError>;
    /// Every order with its items, as input to the aggregation engine.
    fn load_facts(&self) -> Result<Vec<OrderFacts>, DomainError>;
}

/// Counts surfaced on the dashboard alongside order aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreCounts {
    pub products: i64,
    pub users: i64,
    pub categories: i64,
}

pub trait CatalogLookup: Send + Sync + 'static {
    /// Resolve by primary id when `product_ref` parses as a UUID, falling
    /// back to the legacy external identifier carried by seeded data.
    fn resolve(&self, product_ref: &str) -> Result<Option<CatalogEntry>, DomainError>;
    /// Current name/image/category for the given products; absent ids are
    /// simply missing from the map.
    fn product_meta(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, ProductMeta>, DomainError>;
    fn counts(&self) -> Result<StoreCounts, DomainError>;
}
