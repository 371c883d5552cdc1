//! Product repository
//!
//! Listings join the provider and category names so views need one query.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{CategoryId, Money, Product, ProductId, ProductListing, ProviderId};

use super::query::Conditions;

const COLUMNS: &str = "id, name, price, provider_id, category_id, observations";

const LISTING_SELECT: &str = "SELECT p.id, p.name, p.price, p.provider_id, p.category_id, p.observations, \
     pr.name, c.name \
     FROM products p \
     LEFT JOIN providers pr ON pr.id = p.provider_id \
     LEFT JOIN categories c ON c.id = p.category_id";

/// Column values for a product that has no key yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub provider_id: Option<ProviderId>,
    pub category_id: Option<CategoryId>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Substring of the product name or observations
    pub search: Option<String>,
    pub provider_id: Option<ProviderId>,
    pub category_id: Option<CategoryId>,
    pub limit: Option<usize>,
}

pub struct ProductRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ProductRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, new: NewProduct) -> GestionResult<Product> {
        self.conn.execute(
            "INSERT INTO products (name, price, provider_id, category_id, observations) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.name,
                new.price,
                new.provider_id,
                new.category_id,
                new.observations
            ],
        )?;
        Ok(Product {
            id: ProductId::new(self.conn.last_insert_rowid()),
            name: new.name,
            price: new.price,
            provider_id: new.provider_id,
            category_id: new.category_id,
            observations: new.observations,
        })
    }

    pub fn insert_with_id(&self, product: &Product) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO products (id, name, price, provider_id, category_id, observations) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                product.id,
                product.name,
                product.price,
                product.provider_id,
                product.category_id,
                product.observations
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: ProductId) -> GestionResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", COLUMNS);
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn get_listing(&self, id: ProductId) -> GestionResult<Option<ProductListing>> {
        let sql = format!("{} WHERE p.id = ?1", LISTING_SELECT);
        Ok(self.conn.query_row(&sql, [id], map_listing).optional()?)
    }

    pub fn update(&self, product: &Product) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE products SET name = ?2, price = ?3, provider_id = ?4, category_id = ?5, \
             observations = ?6 WHERE id = ?1",
            params![
                product.id,
                product.name,
                product.price,
                product.provider_id,
                product.category_id,
                product.observations
            ],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Product", product.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: ProductId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM products WHERE id = ?1", [id])? > 0)
    }

    /// Ordered by product name, then id
    pub fn list(&self, filter: &ProductFilter) -> GestionResult<Vec<ProductListing>> {
        let mut conditions = Conditions::new();
        conditions.like_any(&["p.name", "p.observations"], filter.search.as_deref());
        conditions.push_opt("p.provider_id = ?", filter.provider_id.map(|id| id.get()));
        conditions.push_opt("p.category_id = ?", filter.category_id.map(|id| id.get()));
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "{}{} ORDER BY p.name COLLATE NOCASE, p.id{}",
            LISTING_SELECT, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_listing)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Most recently added first
    pub fn recent(&self, limit: usize) -> GestionResult<Vec<ProductListing>> {
        let sql = format!("{} ORDER BY p.id DESC LIMIT ?1", LISTING_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([i64::try_from(limit).unwrap_or(i64::MAX)], map_listing)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> GestionResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?)
    }

    /// Sum of catalogue prices
    pub fn total_value(&self) -> GestionResult<Money> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(price), 0) FROM products",
            [],
            |row| row.get(0),
        )?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM products", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        provider_id: row.get(3)?,
        category_id: row.get(4)?,
        observations: row.get(5)?,
    })
}

fn map_listing(row: &Row<'_>) -> rusqlite::Result<ProductListing> {
    Ok(ProductListing {
        product: map_row(row)?,
        provider_name: row.get(6)?,
        category_name: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderDraft;
    use crate::storage::testing::connection;
    use crate::storage::{CategoryRepository, ProviderRepository};

    fn widget(provider_id: Option<ProviderId>, category_id: Option<CategoryId>) -> NewProduct {
        NewProduct {
            name: "Widget".into(),
            price: Money::from_cents(4999),
            provider_id,
            category_id,
            observations: None,
        }
    }

    #[test]
    fn test_listing_joins_parent_names() {
        let conn = connection();
        let acme = ProviderRepository::new(&conn)
            .insert(&ProviderDraft::new("Acme"))
            .unwrap();
        let tools = CategoryRepository::new(&conn).insert("Tools").unwrap();

        let repo = ProductRepository::new(&conn);
        let product = repo.insert(widget(Some(acme.id), Some(tools.id))).unwrap();

        let listing = repo.get_listing(product.id).unwrap().unwrap();
        assert_eq!(listing.provider_name.as_deref(), Some("Acme"));
        assert_eq!(listing.category_name.as_deref(), Some("Tools"));
        assert_eq!(listing.product.price, Money::from_cents(4999));
    }

    #[test]
    fn test_missing_parent_rejected_by_foreign_key() {
        let conn = connection();
        let repo = ProductRepository::new(&conn);
        let err = repo
            .insert(widget(Some(ProviderId::new(99)), None))
            .unwrap_err();
        assert!(err.is_referential());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_filter_by_provider_and_text() {
        let conn = connection();
        let providers = ProviderRepository::new(&conn);
        let acme = providers.insert(&ProviderDraft::new("Acme")).unwrap();
        let other = providers.insert(&ProviderDraft::new("Other")).unwrap();

        let repo = ProductRepository::new(&conn);
        repo.insert(widget(Some(acme.id), None)).unwrap();
        repo.insert(NewProduct {
            name: "Gadget".into(),
            ..widget(Some(other.id), None)
        })
        .unwrap();

        let by_acme = repo
            .list(&ProductFilter {
                provider_id: Some(acme.id),
                ..ProductFilter::default()
            })
            .unwrap();
        assert_eq!(by_acme.len(), 1);
        assert_eq!(by_acme[0].product.name, "Widget");

        let by_text = repo
            .list(&ProductFilter {
                search: Some("gad".into()),
                ..ProductFilter::default()
            })
            .unwrap();
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].provider_name.as_deref(), Some("Other"));
    }

    #[test]
    fn test_totals_and_recent() {
        let conn = connection();
        let repo = ProductRepository::new(&conn);
        assert_eq!(repo.total_value().unwrap(), Money::zero());

        repo.insert(widget(None, None)).unwrap();
        let second = repo
            .insert(NewProduct {
                name: "Bolt".into(),
                price: Money::from_cents(1),
                ..widget(None, None)
            })
            .unwrap();

        assert_eq!(repo.total_value().unwrap(), Money::from_cents(5000));
        let recent = repo.recent(1).unwrap();
        assert_eq!(recent[0].product.id, second.id);
        assert_eq!(repo.recent(usize::MAX).unwrap().len(), 2);
    }
}
