//! # Reporting Repository
//!
//! Derived occupancy and revenue figures for the manager dashboard.
//!
//! ## Revenue Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Revenue Comes From                             │
//! │                                                                         │
//! │  Direct POS payments (Espèces/Carte/Mobile)                            │
//! │       └── counted on the day the payment row is dated                  │
//! │                                                                         │
//! │  Room-account charges (Transfert Compte)                               │
//! │       └── NOT counted as payments (nothing was collected)              │
//! │       └── counted ONCE, as the stay's final balance, on the day        │
//! │           the stay closes                                              │
//! │                                                                         │
//! │  This split is what keeps transfers from being double-counted.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Degradation
//! The dashboard never fails the caller. Store errors are logged and the
//! zero-initialized (possibly partially filled) figures are returned.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::DbResult;
use relais_core::{Dashboard, PaymentMethod, StayStatus};

/// Repository computing dashboard aggregates.
#[derive(Debug, Clone)]
pub struct ReportingRepository {
    pool: SqlitePool,
}

impl ReportingRepository {
    /// Creates a new ReportingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportingRepository { pool }
    }

    /// Computes the dashboard key figures.
    ///
    /// ## Figures
    /// - occupancy_rate: open stays / total rooms × 100, 0 with no rooms
    /// - revenue_today_cents: direct payments dated today + final balances
    ///   of stays closed today
    /// - revenue_month_cents: the same sums over the current calendar month
    ///
    /// ## Never Fails
    /// A store error mid-computation is logged and whatever was filled so
    /// far is returned, zeros for the rest.
    pub async fn dashboard(&self) -> Dashboard {
        let now = Local::now();
        let today = now.format("%Y-%m-%d").to_string();
        let month = now.format("%Y-%m").to_string();

        let mut report = Dashboard::default();
        if let Err(err) = self.fill(&mut report, &today, &month).await {
            warn!(error = %err, "Dashboard computation failed, returning partial figures");
        }
        report
    }

    /// Fills the report in place so the caller keeps partial figures when
    /// a later query fails.
    async fn fill(&self, report: &mut Dashboard, today: &str, month: &str) -> DbResult<()> {
        // Occupancy
        let total_rooms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chambres")
            .fetch_one(&self.pool)
            .await?;

        let open_stays: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sejours WHERE statut = ?1")
            .bind(StayStatus::Open)
            .fetch_one(&self.pool)
            .await?;

        if total_rooms > 0 {
            report.occupancy_rate = open_stays as f64 / total_rooms as f64 * 100.0;
        }

        // Revenue of the day: direct POS payments + checkouts finalized today
        let pos_today: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(montant) FROM paiements
            WHERE DATE(date_heure) = ?1 AND mode_paiement != ?2
            "#,
        )
        .bind(today)
        .bind(PaymentMethod::AccountTransfer)
        .fetch_one(&self.pool)
        .await?;

        let stays_today: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(solde_actuel) FROM sejours
            WHERE DATE(date_checkout_reelle) = ?1 AND statut = ?2
            "#,
        )
        .bind(today)
        .bind(StayStatus::Closed)
        .fetch_one(&self.pool)
        .await?;

        report.revenue_today_cents = pos_today.unwrap_or(0) + stays_today.unwrap_or(0);

        // Revenue of the month: same split over the calendar month
        let pos_month: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(montant) FROM paiements
            WHERE STRFTIME('%Y-%m', date_heure) = ?1 AND mode_paiement != ?2
            "#,
        )
        .bind(month)
        .bind(PaymentMethod::AccountTransfer)
        .fetch_one(&self.pool)
        .await?;

        let stays_month: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(solde_actuel) FROM sejours
            WHERE STRFTIME('%Y-%m', date_checkout_reelle) = ?1 AND statut = ?2
            "#,
        )
        .bind(month)
        .bind(StayStatus::Closed)
        .fetch_one(&self.pool)
        .await?;

        report.revenue_month_cents = pos_month.unwrap_or(0) + stays_month.unwrap_or(0);

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

    #[tokio::test]
    async fn test_empty_store_reports_zeros() {
        let db = test_db().await;

        let report = db.reporting().dashboard().await;
        assert_eq!(report.occupancy_rate, 0.0);
        assert_eq!(report.revenue_today_cents, 0);
        assert_eq!(report.revenue_month_cents, 0);
    }

    #[tokio::test]
    async fn test_occupancy_rate() {
        let db = test_db().await;

        let room_a = db.rooms().insert("101", "Double", 10000).await.unwrap();
        db.rooms().insert("102", "Double", 10000).await.unwrap();

        db.stays()
            .create(&room_a.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let report = db.reporting().dashboard().await;
        assert_eq!(report.occupancy_rate, 50.0);
    }

    #[tokio::test]
    async fn test_occupancy_excludes_closed_stays() {
        let db = test_db().await;

        let room = db.rooms().insert("101", "Double", 10000).await.unwrap();
        let stay = db
            .stays()
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();
        db.stays().checkout(&stay.id, 10000).await.unwrap();

        let report = db.reporting().dashboard().await;
        assert_eq!(report.occupancy_rate, 0.0);
    }

    #[tokio::test]
    async fn test_revenue_counts_direct_payments_and_checkouts_once() {
        let db = test_db().await;

        let room = db.rooms().insert("101", "Double", 10000).await.unwrap();
        let stay = db
            .stays()
            .create(&room.id, "Alice Martin", "2024-06-05")
            .await
            .unwrap();

        let cafe = db
            .products()
            .insert("Café", 200, "Vente Directe", "Bar")
            .await
            .unwrap();

        // Direct sale: 3 × 200 = 600, counted as a payment today
        db.orders()
            .create(
                "reception",
                &[CartItem {
                    product_id: cafe.id.clone(),
                    quantity: 3,
                    unit_price_cents: 200,
                }],
                "Espèces",
                None,
            )
            .await
            .unwrap();

        // Room-account charge: 2 × 200 = 400. Its payment row carries the
        // transfer label and must NOT count as revenue.
        db.orders()
            .create(
                "reception",
                &[CartItem {
                    product_id: cafe.id.clone(),
                    quantity: 2,
                    unit_price_cents: 200,
                }],
                "Transfert Compte",
                Some(&stay.id),
            )
            .await
            .unwrap();

        let report = db.reporting().dashboard().await;
        assert_eq!(report.revenue_today_cents, 600);
        assert_eq!(report.revenue_month_cents, 600);

        // Checkout settles the room account: final bill counted once, via
        // the stay's closing balance.
        db.stays().checkout(&stay.id, 10400).await.unwrap();

        let report = db.reporting().dashboard().await;
        assert_eq!(report.revenue_today_cents, 600 + 10400);
        assert_eq!(report.revenue_month_cents, 600 + 10400);
    }
}
