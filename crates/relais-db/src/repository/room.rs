//! # Room Repository
//!
//! Database operations for hotel rooms.
//!
//! ## Key Operations
//! - Listing ordered by room number
//! - Admin CRUD
//! - Occupancy guard: a room with an open stay cannot be deleted
//!
//! ## Delete Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      delete(room_id)                                    │
//! │                                                                         │
//! │  Count open stays referencing the room                                 │
//! │       │                                                                 │
//! │       ├── > 0 ──► RoomOccupied (guest must check out first)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DELETE FROM chambres WHERE id = ?                                     │
//! │       │                                                                 │
//! │       ├── 0 rows ──► NotFound                                          │
//! │       └── 1 row  ──► Ok                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use relais_core::validation::{validate_name, validate_price_cents, validate_room_number};
use relais_core::{CoreError, Room};

/// Repository for room database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = RoomRepository::new(pool);
///
/// let room = repo.insert("101", "Double", 12500).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Lists all rooms ordered by room number.
    pub async fn list(&self) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT
                id,
                numero AS number,
                type_chambre AS room_type,
                prix_nuit AS nightly_price_cents
            FROM chambres
            ORDER BY numero
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Gets a room by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Room))` - Room found
    /// * `Ok(None)` - Room not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT
                id,
                numero AS number,
                type_chambre AS room_type,
                prix_nuit AS nightly_price_cents
            FROM chambres
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Inserts a new room.
    ///
    /// ## Arguments
    /// * `number` - Room number, unique across the hotel
    /// * `room_type` - Room category ("Simple", "Double", "Suite", ...)
    /// * `nightly_price_cents` - Nightly price in cents
    ///
    /// ## Returns
    /// * `Ok(Room)` - Inserted room with generated id
    /// * `Err(DbError::UniqueViolation)` - Room number already exists
    /// * `Err(DbError::Rule)` - Input rejected before any write
    pub async fn insert(
        &self,
        number: &str,
        room_type: &str,
        nightly_price_cents: i64,
    ) -> DbResult<Room> {
        validate_room_number(number).map_err(CoreError::from)?;
        validate_name("type_chambre", room_type).map_err(CoreError::from)?;
        validate_price_cents(nightly_price_cents).map_err(CoreError::from)?;

        let room = Room {
            id: Uuid::new_v4().to_string(),
            number: number.trim().to_string(),
            room_type: room_type.trim().to_string(),
            nightly_price_cents,
        };

        debug!(number = %room.number, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO chambres (id, numero, type_chambre, prix_nuit)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&room.id)
        .bind(&room.number)
        .bind(&room.room_type)
        .bind(room.nightly_price_cents)
        .execute(&self.pool)
        .await?;

        Ok(room)
    }

    /// Deletes a room.
    ///
    /// ## Business Rule
    /// A room referenced by an open stay (no actual checkout recorded)
    /// cannot be deleted. Closed stays do not block deletion: they are
    /// history, not occupancy.
    ///
    /// ## Returns
    /// * `Ok(())` - Room deleted
    /// * `Err(DbError::RoomOccupied)` - An open stay references the room
    /// * `Err(DbError::NotFound)` - No such room
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting room");

        let open_stays: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sejours WHERE chambre_id = ?1 AND date_checkout_reelle IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if open_stays > 0 {
            return Err(DbError::RoomOccupied {
                room_id: id.to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM chambres WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", id));
        }

        Ok(())
    }

    /// Counts total rooms (for diagnostics and occupancy math).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chambres")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list_ordered_by_number() {
        let db = test_db().await;
        let repo = db.rooms();

        repo.insert("203", "Suite", 30000).await.unwrap();
        repo.insert("101", "Simple", 10000).await.unwrap();
        repo.insert("102", "Double", 15000).await.unwrap();

        let rooms = repo.list().await.unwrap();
        let numbers: Vec<&str> = rooms.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["101", "102", "203"]);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let db = test_db().await;
        let repo = db.rooms();

        repo.insert("101", "Simple", 10000).await.unwrap();
        let err = repo.insert("101", "Double", 15000).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.is_rejection());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_input() {
        let db = test_db().await;
        let repo = db.rooms();

        assert!(matches!(
            repo.insert("", "Simple", 10000).await.unwrap_err(),
            DbError::Rule(_)
        ));
        assert!(matches!(
            repo.insert("101", "Simple", -5).await.unwrap_err(),
            DbError::Rule(_)
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_room() {
        let db = test_db().await;

        let err = db.rooms().delete("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_occupied_room_fails_until_checkout() {
        let db = test_db().await;
        let rooms = db.rooms();
        let stays = db.stays();

        let room = rooms.insert("101", "Double", 12500).await.unwrap();
        let stay = stays
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let err = rooms.delete(&room.id).await.unwrap_err();
        assert!(matches!(err, DbError::RoomOccupied { .. }));
        assert_eq!(rooms.count().await.unwrap(), 1);

        stays.checkout(&stay.id, 25000).await.unwrap();

        rooms.delete(&room.id).await.unwrap();
        assert_eq!(rooms.count().await.unwrap(), 0);
    }
}
