//! # Stay Repository
//!
//! Database operations for stays, from check-in to checkout.
//!
//! ## Stay Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stay Lifecycle                                    │
//! │                                                                         │
//! │  1. CHECK-IN                                                           │
//! │     └── create() → Stay { status: Open, balance: 0 }                   │
//! │                                                                         │
//! │  2. ROOM-ACCOUNT CHARGES (by the order repository)                     │
//! │     └── each account transfer adds its net total to the balance        │
//! │                                                                         │
//! │  3. CHECKOUT                                                           │
//! │     └── checkout(final_bill) → Stay { status: Closed }                 │
//! │     └── the stay's Transferred orders flip to Paid                     │
//! │     └── (single transaction: both updates or neither)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A stay is "open" iff date_checkout_reelle IS NULL; every occupancy
//! query filters on that, not on the statut label.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::now_timestamp;
use relais_core::validation::{validate_name, validate_price_cents};
use relais_core::{
    ActiveStay, CoreError, PaymentStatus, Room, Stay, StayDetails, StayLineItem, StayStatus,
    ValidationError,
};

/// Repository for stay lifecycle operations.
#[derive(Debug, Clone)]
pub struct StayRepository {
    pool: SqlitePool,
}

impl StayRepository {
    /// Creates a new StayRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StayRepository { pool }
    }

    /// Lists open stays joined to their rooms, ordered by room number.
    ///
    /// This is the front desk's occupancy board: room number, guest,
    /// check-in time, running balance.
    pub async fn list_active(&self) -> DbResult<Vec<ActiveStay>> {
        let stays = sqlx::query_as::<_, ActiveStay>(
            r#"
            SELECT
                s.id AS stay_id,
                c.numero AS room_number,
                s.client_nom AS client_name,
                s.date_checkin AS checkin_time,
                s.solde_actuel AS balance_cents
            FROM sejours s
            JOIN chambres c ON s.chambre_id = c.id
            WHERE s.date_checkout_reelle IS NULL
            ORDER BY c.numero
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stays)
    }

    /// Lists rooms not referenced by any open stay, ordered by number.
    pub async fn available_rooms(&self) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT
                id,
                numero AS number,
                type_chambre AS room_type,
                prix_nuit AS nightly_price_cents
            FROM chambres
            WHERE id NOT IN (
                SELECT chambre_id FROM sejours WHERE date_checkout_reelle IS NULL
            )
            ORDER BY numero
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Checks a guest in: creates an open stay on the room.
    ///
    /// ## Business Rules
    /// - The room must exist
    /// - At most one open stay per room (application-enforced, the store
    ///   carries no constraint for it)
    ///
    /// ## Arguments
    /// * `room_id` - Room to occupy
    /// * `client_name` - Guest name
    /// * `planned_checkout_date` - Planned departure (`YYYY-MM-DD`)
    ///
    /// ## Returns
    /// The created stay with check-in time = now, balance 0, status Open.
    pub async fn create(
        &self,
        room_id: &str,
        client_name: &str,
        planned_checkout_date: &str,
    ) -> DbResult<Stay> {
        validate_name("client_nom", client_name).map_err(CoreError::from)?;

        if NaiveDate::parse_from_str(planned_checkout_date, "%Y-%m-%d").is_err() {
            return Err(CoreError::from(ValidationError::InvalidFormat {
                field: "date_checkout_prevue".to_string(),
                reason: "must be YYYY-MM-DD".to_string(),
            })
            .into());
        }

        let room_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chambres WHERE id = ?1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        if room_exists == 0 {
            return Err(DbError::not_found("Room", room_id));
        }

        let open_stays: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sejours WHERE chambre_id = ?1 AND date_checkout_reelle IS NULL",
        )
        .bind(room_id)
        .fetch_one(&self.pool)
        .await?;
        if open_stays > 0 {
            return Err(DbError::RoomOccupied {
                room_id: room_id.to_string(),
            });
        }

        let stay = Stay {
            id: Uuid::new_v4().to_string(),
            room_id: room_id.to_string(),
            client_name: client_name.trim().to_string(),
            checkin_time: now_timestamp(),
            planned_checkout_date: planned_checkout_date.to_string(),
            actual_checkout_time: None,
            balance_cents: 0,
            status: StayStatus::Open,
        };

        debug!(stay_id = %stay.id, room_id = %room_id, client = %stay.client_name, "Creating stay");

        sqlx::query(
            r#"
            INSERT INTO sejours (
                id, chambre_id, client_nom,
                date_checkin, date_checkout_prevue, date_checkout_reelle,
                solde_actuel, statut
            ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)
            "#,
        )
        .bind(&stay.id)
        .bind(&stay.room_id)
        .bind(&stay.client_name)
        .bind(&stay.checkin_time)
        .bind(&stay.planned_checkout_date)
        .bind(stay.balance_cents)
        .bind(stay.status)
        .execute(&self.pool)
        .await?;

        Ok(stay)
    }

    /// Gets a stay by ID regardless of status.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Stay>> {
        let stay = sqlx::query_as::<_, Stay>(
            r#"
            SELECT
                id,
                chambre_id AS room_id,
                client_nom AS client_name,
                date_checkin AS checkin_time,
                date_checkout_prevue AS planned_checkout_date,
                date_checkout_reelle AS actual_checkout_time,
                solde_actuel AS balance_cents,
                statut AS status
            FROM sejours
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stay)
    }

    /// Gets joined room + stay details, only while the stay is open.
    ///
    /// ## Returns
    /// * `Ok(Some(StayDetails))` - Stay is open
    /// * `Ok(None)` - No such stay, or already checked out
    pub async fn get_details(&self, stay_id: &str) -> DbResult<Option<StayDetails>> {
        let details = sqlx::query_as::<_, StayDetails>(
            r#"
            SELECT
                s.id AS stay_id,
                c.numero AS room_number,
                c.type_chambre AS room_type,
                c.prix_nuit AS nightly_price_cents,
                s.client_nom AS client_name,
                s.date_checkin AS checkin_time,
                s.date_checkout_prevue AS planned_checkout_date,
                s.solde_actuel AS balance_cents
            FROM sejours s
            JOIN chambres c ON s.chambre_id = c.id
            WHERE s.id = ?1 AND s.date_checkout_reelle IS NULL
            "#,
        )
        .bind(stay_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    /// Itemizes the stay's room-account bill: every line of a Transferred
    /// order tied to this stay, joined to the product name, with the line
    /// subtotal computed, ordered by order timestamp.
    ///
    /// ## Caveat
    /// Checkout flips the stay's orders from Transferred to Paid, so this
    /// returns nothing for a closed stay. The itemized bill must be read
    /// before checkout.
    pub async fn ordered_items(&self, stay_id: &str) -> DbResult<Vec<StayLineItem>> {
        let items = sqlx::query_as::<_, StayLineItem>(
            r#"
            SELECT
                p.nom AS product_name,
                lc.quantite AS quantity,
                lc.prix_unitaire_vente AS unit_sale_price_cents,
                lc.quantite * lc.prix_unitaire_vente AS line_total_cents
            FROM lignes_commande lc
            JOIN produits_services p ON lc.produit_id = p.id
            JOIN commandes_ventes cv ON lc.commande_id = cv.id
            WHERE cv.stay_id = ?1 AND cv.statut_paiement = ?2
            ORDER BY cv.date_heure
            "#,
        )
        .bind(stay_id)
        .bind(PaymentStatus::Transferred)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Finalizes checkout.
    ///
    /// ## What This Does (single transaction)
    /// 1. On the open stay: set actual checkout time = now, overwrite the
    ///    balance with the final bill amount, set status Closed
    /// 2. Flip all of the stay's Transferred orders to Paid
    ///
    /// A closed or unknown stay matches zero rows in step 1 and aborts the
    /// whole transaction: re-invoking checkout after closure is rejected.
    ///
    /// ## Arguments
    /// * `stay_id` - The stay to close
    /// * `final_bill_cents` - Externally computed final bill (nights plus
    ///   room-account charges, after any adjustments at the desk)
    pub async fn checkout(&self, stay_id: &str, final_bill_cents: i64) -> DbResult<()> {
        validate_price_cents(final_bill_cents).map_err(CoreError::from)?;

        debug!(stay_id = %stay_id, final_bill_cents, "Checking out stay");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sejours SET
                date_checkout_reelle = ?2,
                solde_actuel = ?3,
                statut = ?4
            WHERE id = ?1 AND date_checkout_reelle IS NULL
            "#,
        )
        .bind(stay_id)
        .bind(now_timestamp())
        .bind(final_bill_cents)
        .bind(StayStatus::Closed)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(DbError::not_found("Stay (open)", stay_id));
        }

        sqlx::query("UPDATE commandes_ventes SET statut_paiement = ?2 WHERE stay_id = ?1")
            .bind(stay_id)
            .bind(PaymentStatus::Paid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use relais_core::CartItem;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_room(db: &Database, number: &str) -> Room {
        db.rooms().insert(number, "Double", 12500).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_moves_room_from_available_to_active() {
        let db = test_db().await;
        let stays = db.stays();

        let room_a = seeded_room(&db, "101").await;
        let room_b = seeded_room(&db, "102").await;

        let stay = stays
            .create(&room_a.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();
        assert_eq!(stay.status, StayStatus::Open);
        assert_eq!(stay.balance_cents, 0);
        assert!(stay.is_open());

        let active = stays.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].stay_id, stay.id);
        assert_eq!(active[0].room_number, "101");
        assert_eq!(active[0].client_name, "Alice Martin");
        assert_eq!(active[0].balance_cents, 0);

        let available = stays.available_rooms().await.unwrap();
        let numbers: Vec<&str> = available.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["102"]);
        assert_eq!(available[0].id, room_b.id);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_room_and_double_occupancy() {
        let db = test_db().await;
        let stays = db.stays();

        let err = stays
            .create("no-such-room", "Alice Martin", "2024-06-05")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let room = seeded_room(&db, "101").await;
        stays
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let err = stays
            .create(&room.id, "Bob Durand", "2024-06-07")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::RoomOccupied { .. }));
        assert_eq!(stays.list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_planned_date() {
        let db = test_db().await;
        let room = seeded_room(&db, "101").await;

        let err = db
            .stays()
            .create(&room.id, "Alice Martin", "05/06/2024")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(_)));
    }

    #[tokio::test]
    async fn test_details_only_while_open() {
        let db = test_db().await;
        let stays = db.stays();
        let room = seeded_room(&db, "101").await;

        let stay = stays
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let details = stays.get_details(&stay.id).await.unwrap().unwrap();
        assert_eq!(details.room_number, "101");
        assert_eq!(details.room_type, "Double");
        assert_eq!(details.nightly_price_cents, 12500);
        assert_eq!(details.planned_checkout_date, "2024-06-05");
        assert_eq!(details.balance_cents, 0);

        stays.checkout(&stay.id, 25000).await.unwrap();
        assert!(stays.get_details(&stay.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ordered_items_surface_transferred_lines_until_checkout() {
        let db = test_db().await;
        let stays = db.stays();
        let room = seeded_room(&db, "101").await;
        let stay = stays
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let sandwich = db
            .products()
            .insert("Club sandwich", 1500, "Vente Directe", "Cuisine")
            .await
            .unwrap();
        let water = db
            .products()
            .insert("Eau minérale", 250, "Vente Directe", "Bar")
            .await
            .unwrap();

        let cart = vec![
            CartItem {
                product_id: sandwich.id.clone(),
                quantity: 2,
                unit_price_cents: 1500,
            },
            CartItem {
                product_id: water.id.clone(),
                quantity: 1,
                unit_price_cents: 250,
            },
        ];
        db.orders()
            .create("reception", &cart, "Transfert Compte", Some(&stay.id))
            .await
            .unwrap();

        let items = stays.ordered_items(&stay.id).await.unwrap();
        assert_eq!(items.len(), 2);
        let sandwich_line = items
            .iter()
            .find(|i| i.product_name == "Club sandwich")
            .unwrap();
        assert_eq!(sandwich_line.quantity, 2);
        assert_eq!(sandwich_line.unit_sale_price_cents, 1500);
        assert_eq!(sandwich_line.line_total_cents, 3000);

        // Checkout flips the orders to Paid; the Transferred filter then
        // matches nothing for this stay.
        stays.checkout(&stay.id, 3250).await.unwrap();
        assert!(stays.ordered_items(&stay.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_closes_stay_and_settles_orders() {
        let db = test_db().await;
        let stays = db.stays();
        let room = seeded_room(&db, "101").await;
        let stay = stays
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let cafe = db
            .products()
            .insert("Café", 200, "Vente Directe", "Bar")
            .await
            .unwrap();
        let cart = vec![CartItem {
            product_id: cafe.id.clone(),
            quantity: 3,
            unit_price_cents: 200,
        }];
        let order_id = db
            .orders()
            .create("reception", &cart, "Transfert Compte", Some(&stay.id))
            .await
            .unwrap();

        stays.checkout(&stay.id, 26100).await.unwrap();

        let closed = stays.get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(closed.status, StayStatus::Closed);
        assert_eq!(closed.balance_cents, 26100);
        assert!(closed.actual_checkout_time.is_some());

        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.stay_id.as_deref(), Some(stay.id.as_str()));
    }

    #[tokio::test]
    async fn test_checkout_rejected_once_closed() {
        let db = test_db().await;
        let stays = db.stays();
        let room = seeded_room(&db, "101").await;
        let stay = stays
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        stays.checkout(&stay.id, 12500).await.unwrap();

        let err = stays.checkout(&stay.id, 99999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // The rejected re-run changed nothing
        let closed = stays.get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(closed.balance_cents, 12500);
    }
}
