use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::analytics::{
    self, DailyPoint, HalfYearPoint, MonthlyPoint, PaymentBucket, StatusCount, TopProduct,
    WeeklyPoint,
};
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderStatus, OrderView};
use crate::domain::ports::{CatalogLookup, OrderRepository};
use crate::domain::time;

const RECENT_ORDERS_LIMIT: i64 = 5;

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_categories: i64,
    pub total_revenue: BigDecimal,
    pub completed_orders: i64,
    pub payment_methods: Vec<PaymentBucket>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<OrderView>,
    pub order_status_stats: Vec<StatusCount>,
    pub daily_revenue: Vec<DailyPoint>,
    pub weekly_revenue: Vec<WeeklyPoint>,
    pub monthly_revenue: Vec<MonthlyPoint>,
    pub half_yearly_revenue: Vec<HalfYearPoint>,
    pub top_products: Vec<TopProduct>,
}

pub struct DashboardService<R, C> {
    repo: R,
    catalog: C,
}

impl<R: OrderRepository, C: CatalogLookup> DashboardService<R, C> {
    pub fn new(repo: R, catalog: C) -> Self {
        Self { repo, catalog }
    }

    /// Recompute the whole read surface from the order store. Fails closed:
    /// any store error aborts the read with no partial results.
    pub fn compute(&self, top_products_status: Option<&str>) -> Result<Dashboard, DomainError> {
        let filter = match top_products_status {
            None => OrderStatus::Delivered,
            Some(raw) => OrderStatus::from_str(raw)
                .map_err(|_| DomainError::InvalidStatus(raw.to_string()))?,
        };

        let facts = self.repo.load_facts()?;
        let counts = self.catalog.counts()?;

        let mut product_ids: Vec<Uuid> = facts
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product_id))
            .collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let meta = self.catalog.product_meta(&product_ids)?;

        let recent_orders = self
            .repo
            .recent(RECENT_ORDERS_LIMIT)?
            .into_iter()
            .map(|mut order| {
                order.created_at = time::normalize(order.created_at);
                order.updated_at = time::normalize(order.updated_at);
                order
            })
            .collect();

        let now = Utc::now();
        Ok(Dashboard {
            stats: DashboardStats {
                total_products: counts.products,
                total_orders: facts.len() as i64,
                total_users: counts.users,
                total_categories: counts.categories,
                total_revenue: analytics::total_recognized_revenue(&facts),
                completed_orders: analytics::completed_orders(&facts),
                payment_methods: analytics::payment_breakdown(&facts),
            },
            recent_orders,
            order_status_stats: analytics::status_distribution(&facts),
            daily_revenue: analytics::daily_revenue(&facts, now),
            weekly_revenue: analytics::weekly_revenue(&facts, now),
            monthly_revenue: analytics::monthly_revenue(&facts, now),
            half_yearly_revenue: analytics::half_yearly_revenue(&facts, now),
            top_products: analytics::top_products(&facts, filter, &meta),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use uuid::Uuid;

    use super::DashboardService;
    use crate::application::testutil::{InMemoryCatalog, InMemoryOrders};
    use crate::domain::errors::DomainError;
    use crate::domain::order::{OrderLineView, OrderStatus, PaymentMethod};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn line(product_id: Uuid, quantity: i32, unit_price: &str) -> OrderLineView {
        OrderLineView {
            id: Uuid::new_v4(),
            product_id,
            title: "Kettle".to_string(),
            image: "kettle.jpg".to_string(),
            category: "Home & Kitchen".to_string(),
            quantity,
            unit_price: dec(unit_price),
        }
    }

    #[test]
    fn dashboard_aggregates_the_store_in_one_pass() {
        let repo = InMemoryOrders::new();
        let catalog = InMemoryCatalog::new();
        catalog.set_users(7);
        let product = catalog.add_product("Kettle", "90", "0", Some("Home and Kitchen"));

        let now = Utc::now();
        repo.seed(InMemoryOrders::seeded(
            OrderStatus::Delivered,
            PaymentMethod::Cod,
            "180",
            now,
            vec![line(product, 2, "90")],
        ));
        repo.seed(InMemoryOrders::seeded(
            OrderStatus::Delivered,
            PaymentMethod::Card,
            "320",
            now,
            vec![line(product, 1, "320")],
        ));
        repo.seed(InMemoryOrders::seeded(
            OrderStatus::Pending,
            PaymentMethod::Upi,
            "999",
            now,
            vec![],
        ));

        let dashboard = DashboardService::new(repo, catalog)
            .compute(None)
            .expect("compute failed");

        assert_eq!(dashboard.stats.total_orders, 3);
        assert_eq!(dashboard.stats.total_users, 7);
        assert_eq!(dashboard.stats.total_products, 1);
        assert_eq!(dashboard.stats.total_categories, 1);
        assert_eq!(dashboard.stats.total_revenue, dec("500"));
        assert_eq!(dashboard.stats.completed_orders, 2);
        assert_eq!(dashboard.stats.payment_methods.len(), 2);

        assert_eq!(dashboard.recent_orders.len(), 3);
        let status_total: i64 = dashboard.order_status_stats.iter().map(|s| s.count).sum();
        assert_eq!(status_total, 3);

        assert_eq!(dashboard.daily_revenue.len(), 1);
        assert_eq!(dashboard.daily_revenue[0].revenue, dec("500"));
        assert_eq!(dashboard.daily_revenue[0].orders, 2);

        // Top products join live catalog metadata and canonicalize the
        // category variant stored on the product.
        assert_eq!(dashboard.top_products.len(), 1);
        assert_eq!(dashboard.top_products[0].quantity, 3);
        assert_eq!(dashboard.top_products[0].category, "Home & Kitchen");
    }

    #[test]
    fn top_product_filter_accepts_any_enumerated_status() {
        let repo = InMemoryOrders::new();
        let catalog = InMemoryCatalog::new();
        let product = catalog.add_product("Kettle", "90", "0", None);
        repo.seed(InMemoryOrders::seeded(
            OrderStatus::Pending,
            PaymentMethod::Cod,
            "90",
            Utc::now(),
            vec![line(product, 1, "90")],
        ));
        let svc = DashboardService::new(repo, catalog);

        let delivered_view = svc.compute(Some("Delivered")).expect("compute failed");
        assert!(delivered_view.top_products.is_empty());

        let pending_view = svc.compute(Some("Pending")).expect("compute failed");
        assert_eq!(pending_view.top_products.len(), 1);
    }

    #[test]
    fn invalid_top_product_filter_fails_the_whole_read() {
        let svc = DashboardService::new(InMemoryOrders::new(), InMemoryCatalog::new());
        let err = svc.compute(Some("Refunded")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatus(_)));
    }
}
