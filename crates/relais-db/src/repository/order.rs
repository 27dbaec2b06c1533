//! # Order Repository
//!
//! Database operations for POS orders: a cart becomes an order, its lines,
//! a payment row, and possibly a room-account charge, all in one transaction.
//!
//! ## Payment Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create(cart, payment_type)                        │
//! │                                                                         │
//! │  "Transfert Compte" + stay ──► Transferred, stay kept,                 │
//! │                                 stay balance += net total              │
//! │  "Transfert Compte" alone  ──► rejected (nothing to charge)            │
//! │  "Espèces"/"Carte"/"Mobile"──► Paid, stay forced to NULL               │
//! │  anything else             ──► rejected, zero mutations                │
//! │                                                                         │
//! │  All writes in ONE transaction:                                        │
//! │    commandes_ventes + lignes_commande + paiements [+ sejours]          │
//! │  Any store error rolls back the entire order.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::now_timestamp;
use relais_core::validation::validate_cart;
use relais_core::{
    cart_net_total, CartItem, CoreError, Order, OrderLine, Payment, PaymentMethod, PaymentStatus,
};

/// Repository for POS order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Records a POS order.
    ///
    /// ## What This Does
    /// 1. Validates the cart and resolves the payment method (rejections
    ///    happen here, before any write)
    /// 2. Computes net total = Σ quantity × unit price
    /// 3. In one transaction: inserts the order, one line per cart item,
    ///    and a payment row for the full net total
    /// 4. For account transfers, adds the net total to the open target
    ///    stay's balance; a closed or unknown stay aborts the transaction
    ///
    /// ## Arguments
    /// * `user_id` - The acting user (not authenticated here)
    /// * `cart` - Items with their sale-time prices
    /// * `payment_type` - Stored payment label ("Espèces", "Carte",
    ///   "Mobile", "Transfert Compte")
    /// * `stay_id` - Stay to charge; only meaningful for transfers, forced
    ///   to NULL for direct payments
    ///
    /// ## Returns
    /// * `Ok(order_id)` - The new order's identifier
    /// * `Err(DbError::Rule)` - Cart or payment routing rejected
    /// * `Err(DbError::NotFound)` - Transfer target is not an open stay
    pub async fn create(
        &self,
        user_id: &str,
        cart: &[CartItem],
        payment_type: &str,
        stay_id: Option<&str>,
    ) -> DbResult<String> {
        validate_cart(cart)?;

        let method = PaymentMethod::parse(payment_type)
            .ok_or_else(|| CoreError::UnknownPaymentMethod(payment_type.to_string()))?;

        // Routing: direct methods never retain a stay, transfers require one.
        let (payment_status, stay_id) = if method.is_direct() {
            (PaymentStatus::Paid, None)
        } else {
            match stay_id {
                Some(id) => (PaymentStatus::Transferred, Some(id)),
                None => return Err(CoreError::MissingStayForTransfer.into()),
            }
        };

        let net_total = cart_net_total(cart);
        let order_id = Uuid::new_v4().to_string();
        let recorded_at = now_timestamp();

        debug!(
            order_id = %order_id,
            user_id = %user_id,
            method = method.as_str(),
            net_total_cents = net_total.cents(),
            "Creating order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO commandes_ventes (
                id, utilisateur_id, stay_id, total_net, statut_paiement, date_heure
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&order_id)
        .bind(user_id)
        .bind(stay_id)
        .bind(net_total.cents())
        .bind(payment_status)
        .bind(&recorded_at)
        .execute(&mut *tx)
        .await?;

        for item in cart {
            sqlx::query(
                r#"
                INSERT INTO lignes_commande (
                    commande_id, produit_id, quantite, prix_unitaire_vente
                ) VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        // One payment row per order, amount = net total. For transfers it
        // documents the charge; nothing is collected until checkout.
        sqlx::query(
            r#"
            INSERT INTO paiements (commande_id, montant, mode_paiement, date_heure)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&order_id)
        .bind(net_total.cents())
        .bind(method)
        .bind(&recorded_at)
        .execute(&mut *tx)
        .await?;

        if payment_status == PaymentStatus::Transferred {
            // Atomic read-modify-write under the store's write serialization
            let result = sqlx::query(
                r#"
                UPDATE sejours
                SET solde_actuel = solde_actuel + ?2
                WHERE id = ?1 AND date_checkout_reelle IS NULL
                "#,
            )
            .bind(stay_id)
            .bind(net_total.cents())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back the whole order
                return Err(DbError::not_found(
                    "Stay (open)",
                    stay_id.unwrap_or_default(),
                ));
            }
        }

        tx.commit().await?;

        Ok(order_id)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id,
                utilisateur_id AS user_id,
                stay_id,
                total_net AS net_total_cents,
                statut_paiement AS payment_status,
                date_heure AS recorded_at
            FROM commandes_ventes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines of an order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT
                commande_id AS order_id,
                produit_id AS product_id,
                quantite AS quantity,
                prix_unitaire_vente AS unit_sale_price_cents
            FROM lignes_commande
            WHERE commande_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets all payments recorded for an order.
    pub async fn payments(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT
                commande_id AS order_id,
                montant AS amount_cents,
                mode_paiement AS method,
                date_heure AS recorded_at
            FROM paiements
            WHERE commande_id = ?1
            ORDER BY date_heure
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Counts total orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commandes_ventes")
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
    use relais_core::{Product, Stay};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_product(db: &Database, name: &str, price: i64) -> Product {
        db.products()
            .insert(name, price, "Vente Directe", "Bar")
            .await
            .unwrap()
    }

    async fn seeded_stay(db: &Database, room_number: &str) -> Stay {
        let room = db.rooms().insert(room_number, "Double", 10000).await.unwrap();
        db.stays()
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap()
    }

    fn cart_of(product: &Product, qty: i64) -> Vec<CartItem> {
        vec![CartItem {
            product_id: product.id.clone(),
            quantity: qty,
            unit_price_cents: product.unit_price_cents,
        }]
    }

    #[tokio::test]
    async fn test_cash_order_ignores_stay_and_settles_immediately() {
        let db = test_db().await;
        let orders = db.orders();
        let product = seeded_product(&db, "Café", 200).await;
        let stay = seeded_stay(&db, "101").await;

        let order_id = orders
            .create("reception", &cart_of(&product, 3), "Espèces", Some(&stay.id))
            .await
            .unwrap();

        let order = orders.get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.stay_id, None); // forced off for direct payments
        assert_eq!(order.net_total_cents, 600);

        let lines = orders.lines(&order_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].unit_sale_price_cents, 200);

        let payments = orders.payments(&order_id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_cents, 600);
        assert_eq!(payments[0].method, PaymentMethod::Cash);

        // The stay's balance never moved
        let stay = db.stays().get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(stay.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_transfer_order_charges_the_stay() {
        let db = test_db().await;
        let orders = db.orders();
        let product = seeded_product(&db, "Club sandwich", 1500).await;
        let stay = seeded_stay(&db, "101").await;

        let order_id = orders
            .create(
                "reception",
                &cart_of(&product, 2),
                "Transfert Compte",
                Some(&stay.id),
            )
            .await
            .unwrap();

        let order = orders.get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Transferred);
        assert_eq!(order.stay_id.as_deref(), Some(stay.id.as_str()));

        let stay = db.stays().get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(stay.balance_cents, 3000);

        // A second charge accumulates
        orders
            .create(
                "reception",
                &cart_of(&product, 1),
                "Transfert Compte",
                Some(&stay.id),
            )
            .await
            .unwrap();
        let stay = db.stays().get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(stay.balance_cents, 4500);
    }

    #[tokio::test]
    async fn test_unknown_payment_type_mutates_nothing() {
        let db = test_db().await;
        let orders = db.orders();
        let product = seeded_product(&db, "Café", 200).await;

        let err = orders
            .create("reception", &cart_of(&product, 1), "Chèque", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rule(CoreError::UnknownPaymentMethod(_))
        ));
        assert_eq!(orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_without_stay_rejected() {
        let db = test_db().await;
        let orders = db.orders();
        let product = seeded_product(&db, "Café", 200).await;

        let err = orders
            .create("reception", &cart_of(&product, 1), "Transfert Compte", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rule(CoreError::MissingStayForTransfer)
        ));
        assert_eq!(orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = test_db().await;
        let orders = db.orders();

        let err = orders
            .create("reception", &[], "Espèces", None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rule(CoreError::EmptyCart)));
        assert_eq!(orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_to_closed_stay_rolls_back_everything() {
        let db = test_db().await;
        let orders = db.orders();
        let product = seeded_product(&db, "Café", 200).await;
        let stay = seeded_stay(&db, "101").await;

        db.stays().checkout(&stay.id, 10000).await.unwrap();

        let err = orders
            .create(
                "reception",
                &cart_of(&product, 1),
                "Transfert Compte",
                Some(&stay.id),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        // The whole transaction rolled back: no order, no lines, no payment
        assert_eq!(orders.count().await.unwrap(), 0);

        let stay = db.stays().get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(stay.balance_cents, 10000);
    }

    /// The reference walkthrough: check in, charge the room, check out.
    #[tokio::test]
    async fn test_room_account_walkthrough() {
        let db = test_db().await;

        let room = db.rooms().insert("101", "Double", 10000).await.unwrap();
        let stay = db
            .stays()
            .create(&room.id, "Alice", "2024-06-05")
            .await
            .unwrap();

        let snack = seeded_product(&db, "Plateau fromage", 1500).await;
        let order_id = db
            .orders()
            .create("1", &cart_of(&snack, 2), "Transfert Compte", Some(&stay.id))
            .await
            .unwrap();

        let charged = db.stays().get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(charged.balance_cents, 3000);

        db.stays().checkout(&stay.id, 3000).await.unwrap();

        let closed = db.stays().get_by_id(&stay.id).await.unwrap().unwrap();
        assert_eq!(closed.status, relais_core::StayStatus::Closed);
        assert_eq!(closed.balance_cents, 3000);

        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }
}
