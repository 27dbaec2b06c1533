//! # Product Repository
//!
//! Database operations for the POS catalog of products and services.
//!
//! ## Catalog Rule
//! Lodging rows (type_vente 'Hébergement') live in the same table but are
//! billed through stays, so [`ProductRepository::list`] excludes them.
//! Deleting a product referenced by a historical order line is refused by
//! the store's foreign key constraint.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use relais_core::validation::{validate_name, validate_price_cents};
use relais_core::{CoreError, Product, SALE_TYPE_LODGING};

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let sellable = repo.list().await?;
/// let product = repo.insert("Club sandwich", 1500, "Restauration", "Cuisine").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists sellable products, ordered by category then name.
    ///
    /// Lodging rows are excluded: the POS sells goods and services, rooms
    /// are billed through stays.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id,
                nom AS name,
                prix_unitaire AS unit_price_cents,
                type_vente AS sale_type,
                categorie AS category
            FROM produits_services
            WHERE type_vente != ?1
            ORDER BY categorie, nom
            "#,
        )
        .bind(SALE_TYPE_LODGING)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id,
                nom AS name,
                prix_unitaire AS unit_price_cents,
                type_vente AS sale_type,
                categorie AS category
            FROM produits_services
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product or service.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated id
    /// * `Err(DbError::Rule)` - Input rejected before any write
    pub async fn insert(
        &self,
        name: &str,
        unit_price_cents: i64,
        sale_type: &str,
        category: &str,
    ) -> DbResult<Product> {
        validate_name("nom", name).map_err(CoreError::from)?;
        validate_price_cents(unit_price_cents).map_err(CoreError::from)?;
        validate_name("type_vente", sale_type).map_err(CoreError::from)?;
        validate_name("categorie", category).map_err(CoreError::from)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            unit_price_cents,
            sale_type: sale_type.trim().to_string(),
            category: category.trim().to_string(),
        };

        debug!(name = %product.name, category = %product.category, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO produits_services (id, nom, prix_unitaire, type_vente, categorie)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(&product.sale_type)
        .bind(&product.category)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Deletes a product.
    ///
    /// ## Integrity
    /// Order lines keep their product reference for the bill history, so
    /// the foreign key refuses deletion of any product that was ever sold.
    ///
    /// ## Returns
    /// * `Ok(())` - Product deleted
    /// * `Err(DbError::ForeignKeyViolation)` - Referenced by an order line
    /// * `Err(DbError::NotFound)` - No such product
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM produits_services WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM produits_services")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
