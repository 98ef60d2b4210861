use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dashboard_service::{Dashboard, DashboardService};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::orders::OrderResponse;
use crate::infrastructure::catalog_repo::DieselCatalogLookup;
use crate::infrastructure::order_repo::DieselOrderRepository;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DashboardParams {
    /// Status filter for the top-product ranking; defaults to Delivered.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodStat {
    pub method: String,
    pub revenue: String,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusStat {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyRevenuePoint {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub revenue: String,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyRevenuePoint {
    pub year: i32,
    pub week: u32,
    pub revenue: String,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyRevenuePoint {
    pub year: i32,
    pub month: u32,
    pub revenue: String,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HalfYearlyRevenuePoint {
    pub year: i32,
    pub half: u32,
    pub revenue: String,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProductEntry {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub category: String,
    pub quantity: i64,
    pub revenue: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsSummary {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_categories: i64,
    pub total_revenue: String,
    pub completed_orders: i64,
    pub payment_methods: Vec<PaymentMethodStat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: StatsSummary,
    pub recent_orders: Vec<OrderResponse>,
    pub order_status_stats: Vec<StatusStat>,
    pub daily_revenue: Vec<DailyRevenuePoint>,
    pub weekly_revenue: Vec<WeeklyRevenuePoint>,
    pub monthly_revenue: Vec<MonthlyRevenuePoint>,
    pub half_yearly_revenue: Vec<HalfYearlyRevenuePoint>,
    pub top_products: Vec<TopProductEntry>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(d: Dashboard) -> Self {
        DashboardResponse {
            stats: StatsSummary {
                total_products: d.stats.total_products,
                total_orders: d.stats.total_orders,
                total_users: d.stats.total_users,
                total_categories: d.stats.total_categories,
                total_revenue: d.stats.total_revenue.to_string(),
                completed_orders: d.stats.completed_orders,
                payment_methods: d
                    .stats
                    .payment_methods
                    .into_iter()
                    .map(|p| PaymentMethodStat {
                        method: p.method.as_str().to_string(),
                        revenue: p.revenue.to_string(),
                        orders: p.orders,
                    })
                    .collect(),
            },
            recent_orders: d.recent_orders.into_iter().map(OrderResponse::from).collect(),
            order_status_stats: d
                .order_status_stats
                .into_iter()
                .map(|s| StatusStat {
                    status: s.status.as_str().to_string(),
                    count: s.count,
                })
                .collect(),
            daily_revenue: d
                .daily_revenue
                .into_iter()
                .map(|p| DailyRevenuePoint {
                    year: p.year,
                    month: p.month,
                    day: p.day,
                    revenue: p.revenue.to_string(),
                    orders: p.orders,
                })
                .collect(),
            weekly_revenue: d
                .weekly_revenue
                .into_iter()
                .map(|p| WeeklyRevenuePoint {
                    year: p.year,
                    week: p.week,
                    revenue: p.revenue.to_string(),
                    orders: p.orders,
                })
                .collect(),
            monthly_revenue: d
                .monthly_revenue
                .into_iter()
                .map(|p| MonthlyRevenuePoint {
                    year: p.year,
                    month: p.month,
                    revenue: p.revenue.to_string(),
                    orders: p.orders,
                })
                .collect(),
            half_yearly_revenue: d
                .half_yearly_revenue
                .into_iter()
                .map(|p| HalfYearlyRevenuePoint {
                    year: p.year,
                    half: p.half,
                    revenue: p.revenue.to_string(),
                    orders: p.orders,
                })
                .collect(),
            top_products: d
                .top_products
                .into_iter()
                .map(|p| TopProductEntry {
                    product_id: p.product_id,
                    name: p.name,
                    image: p.image,
                    category: p.category,
                    quantity: p.quantity,
                    revenue: p.revenue.to_string(),
                })
                .collect(),
        }
    }
}

/// GET /dashboard/stats
///
/// Recomputes the full analytics read surface from the order store. Fails
/// closed: any store error aborts the read with no partial results.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    params(
        ("status" = Option<String>, Query, description = "Top-product status filter (default Delivered)"),
    ),
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardResponse),
        (status = 400, description = "Status filter outside the enumerated set"),
    ),
    tag = "dashboard"
)]
pub async fn get_stats(
    pool: web::Data<DbPool>,
    query: web::Query<DashboardParams>,
) -> Result<HttpResponse, AppError> {
    let status = query.into_inner().status;

    let dashboard = web::block(move || {
        let service = DashboardService::new(
            DieselOrderRepository::new(pool.get_ref().clone()),
            DieselCatalogLookup::new(pool.get_ref().clone()),
        );
        service.compute(status.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DashboardResponse::from(dashboard)))
}
