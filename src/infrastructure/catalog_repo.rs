use std::collections::HashMap;
use std::str::FromStr;

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::analytics::ProductMeta;
use crate::domain::errors::DomainError;
use crate::domain::order::CatalogEntry;
use crate::domain::ports::{CatalogLookup, StoreCounts};
use crate::schema::{categories, products, users};

use super::models::ProductRow;

pub struct DieselCatalogLookup {
    pool: DbPool,
}

impl DieselCatalogLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_entry(row: ProductRow, category: Option<String>) -> CatalogEntry {
    CatalogEntry {
        id: row.id,
        name: row.name,
        image: row.image,
        price: row.price,
        discount_percent: row.discount_percent,
        category,
        stock: row.stock,
    }
}

impl CatalogLookup for DieselCatalogLookup {
    fn resolve(&self, product_ref: &str) -> Result<Option<CatalogEntry>, DomainError> {
        let mut conn = self.pool.get()?;

        // Primary id first, then the legacy external identifier carried by
        // seeded catalog rows.
        if let Ok(id) = Uuid::from_str(product_ref) {
            let hit = products::table
                .left_join(categories::table)
                .filter(products::id.eq(id))
                .select((ProductRow::as_select(), categories::name.nullable()))
                .first::<(ProductRow, Option<String>)>(&mut conn)
                .optional()?;
            if let Some((row, category)) = hit {
                return Ok(Some(to_entry(row, category)));
            }
        }

        let hit = products::table
            .left_join(categories::table)
            .filter(products::legacy_ref.eq(product_ref))
            .select((ProductRow::as_select(), categories::name.nullable()))
            .first::<(ProductRow, Option<String>)>(&mut conn)
            .optional()?;

        Ok(hit.map(|(row, category)| to_entry(row, category)))
    }

    fn product_meta(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, ProductMeta>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .left_join(categories::table)
            .filter(products::id.eq_any(ids))
            .select((ProductRow::as_select(), categories::name.nullable()))
            .load::<(ProductRow, Option<String>)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(row, category)| {
                (
                    row.id,
                    ProductMeta {
                        name: row.name,
                        image: row.image,
                        category,
                    },
                )
            })
            .collect())
    }

    fn counts(&self) -> Result<StoreCounts, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(StoreCounts {
            products: products::table.count().get_result(&mut conn)?,
            users: users::table.count().get_result(&mut conn)?,
            categories: categories::table.count().get_result(&mut conn)?,
        })
    }
}
