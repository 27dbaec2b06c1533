//! # Domain Types
//!
//! Core domain types used throughout Relais POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Room       │   │      Stay       │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  number (biz)   │   │  room_id (FK)   │   │  stay_id?       │       │
//! │  │  room_type      │   │  status         │   │  payment_status │       │
//! │  │  nightly_price  │   │  balance_cents  │   │  net_total      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StayStatus    │   │  PaymentStatus  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open "Ouvert"  │   │  Paid "Payé"    │   │  Cash, Card,    │       │
//! │  │  Closed "Clos"  │   │  Transferred    │   │  Mobile,        │       │
//! │  └─────────────────┘   │    "Transféré"  │   │  AccountTransfer│       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (room number) - human-readable
//!
//! ## Stored Labels
//! The status enums and the payment method persist as the hotel's
//! established French labels ("Ouvert", "Transféré", "Espèces", ...).
//! The enums own that mapping so no query hand-writes a label.

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Room
// =============================================================================

/// A hotel room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Room {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Room number - business identifier, unique across the hotel.
    pub number: String,

    /// Room category shown to the front desk ("Simple", "Double", "Suite").
    pub room_type: String,

    /// Nightly price in cents.
    pub nightly_price_cents: i64,
}

impl Room {
    /// Returns the nightly price as a Money type.
    #[inline]
    pub fn nightly_price(&self) -> Money {
        Money::from_cents(self.nightly_price_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product or service sellable at the POS.
///
/// Lodging rows (sale_type [`crate::SALE_TYPE_LODGING`]) live in the same
/// table but are billed through stays and excluded from catalog listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on the bill.
    pub name: String,

    /// Current unit price in cents.
    pub unit_price_cents: i64,

    /// Sale type label ("Restauration", "Bar", "Hébergement", ...).
    pub sale_type: String,

    /// Catalog category used for listing order.
    pub category: String,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Checks whether this row is a lodging entry rather than catalog goods.
    #[inline]
    pub fn is_lodging(&self) -> bool {
        self.sale_type == crate::SALE_TYPE_LODGING
    }
}

// =============================================================================
// Stay Status
// =============================================================================

/// The lifecycle status of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
pub enum StayStatus {
    /// Guest currently occupying the room.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Ouvert"))]
    Open,
    /// Checkout finalized; the balance holds the final bill amount.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Clos"))]
    Closed,
}

impl StayStatus {
    /// Returns the stored label for this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StayStatus::Open => "Ouvert",
            StayStatus::Closed => "Clos",
        }
    }
}

impl Default for StayStatus {
    fn default() -> Self {
        StayStatus::Open
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The payment status of a POS order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Settled immediately (cash/card/mobile), or settled at checkout.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Payé"))]
    Paid,
    /// Charged to a stay's running balance, settled at checkout.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Transféré"))]
    Transferred,
}

impl PaymentStatus {
    /// Returns the stored label for this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Payé",
            PaymentStatus::Transferred => "Transféré",
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How an order was paid.
///
/// Direct methods settle immediately; [`PaymentMethod::AccountTransfer`]
/// charges the amount to an open stay's balance instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Espèces"))]
    Cash,
    /// Card payment on the desk terminal.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Carte"))]
    Card,
    /// Mobile money payment.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Mobile"))]
    Mobile,
    /// Charge to the guest's room account.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Transfert Compte"))]
    AccountTransfer,
}

impl PaymentMethod {
    /// Parses a stored payment label.
    ///
    /// ## Returns
    /// * `Some(method)` - Known label
    /// * `None` - Unknown label; the POS must reject the order
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Espèces" => Some(PaymentMethod::Cash),
            "Carte" => Some(PaymentMethod::Card),
            "Mobile" => Some(PaymentMethod::Mobile),
            "Transfert Compte" => Some(PaymentMethod::AccountTransfer),
            _ => None,
        }
    }

    /// Returns the stored label for this method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Espèces",
            PaymentMethod::Card => "Carte",
            PaymentMethod::Mobile => "Mobile",
            PaymentMethod::AccountTransfer => "Transfert Compte",
        }
    }

    /// Checks whether the method collects payment immediately.
    ///
    /// Direct orders never retain a stay id; transfers always do.
    #[inline]
    pub const fn is_direct(&self) -> bool {
        !matches!(self, PaymentMethod::AccountTransfer)
    }
}

// =============================================================================
// Stay
// =============================================================================

/// A guest's continuous occupancy of one room from check-in to checkout.
///
/// ## Balance Accounting
/// ```text
/// check-in            balance = 0, status Open
///    │
///    ▼  account-transfer order (+net_total)
/// balance grows while the stay is open
///    │
///    ▼  checkout(final_bill)
/// balance = final_bill, status Closed, checkout time recorded
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stay {
    pub id: String,
    pub room_id: String,
    pub client_name: String,
    /// Check-in timestamp (`YYYY-MM-DD HH:MM:SS`, local time).
    pub checkin_time: String,
    /// Planned checkout date (`YYYY-MM-DD`).
    pub planned_checkout_date: String,
    /// Actual checkout timestamp; None while the stay is open.
    pub actual_checkout_time: Option<String>,
    /// Running balance while open; final bill amount once closed.
    pub balance_cents: i64,
    pub status: StayStatus,
}

impl Stay {
    /// Returns the balance as a Money type.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    /// Checks whether the guest is still occupying the room.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.actual_checkout_time.is_none()
    }
}

// =============================================================================
// Order
// =============================================================================

/// A POS order.
///
/// Invariant: `stay_id` is non-null iff `payment_status` is Transferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// The acting user; authentication is the embedding application's job.
    pub user_id: String,
    /// The stay charged, for account-transfer orders only.
    pub stay_id: Option<String>,
    pub net_total_cents: i64,
    pub payment_status: PaymentStatus,
    /// Order timestamp (`YYYY-MM-DD HH:MM:SS`, local time).
    pub recorded_at: String,
}

impl Order {
    /// Returns the net total as a Money type.
    #[inline]
    pub fn net_total(&self) -> Money {
        Money::from_cents(self.net_total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item of an order.
/// The sale price is captured at order time, decoupled from the product's
/// current price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_sale_price_cents: i64,
}

impl OrderLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_sale_price(&self) -> Money {
        Money::from_cents(self.unit_sale_price_cents)
    }

    /// Returns quantity × unit sale price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_sale_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment recorded for an order.
/// One row per order; the amount always equals the order's net total, even
/// for account transfers (where it documents the charge, not collected cash).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub order_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    /// Payment timestamp (`YYYY-MM-DD HH:MM:SS`, local time).
    pub recorded_at: String,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One item of a POS cart, as submitted by the terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at the moment of sale.
    pub unit_price_cents: i64,
}

impl CartItem {
    /// Returns quantity × unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// Computes the net total of a cart.
pub fn cart_net_total(items: &[CartItem]) -> Money {
    items.iter().map(CartItem::line_total).sum()
}

// =============================================================================
// View Rows
// =============================================================================

/// An open stay joined to its room, for the active-stays board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActiveStay {
    pub stay_id: String,
    pub room_number: String,
    pub client_name: String,
    pub checkin_time: String,
    pub balance_cents: i64,
}

/// Full room + stay details for one open stay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StayDetails {
    pub stay_id: String,
    pub room_number: String,
    pub room_type: String,
    pub nightly_price_cents: i64,
    pub client_name: String,
    pub checkin_time: String,
    pub planned_checkout_date: String,
    pub balance_cents: i64,
}

/// One itemized line of a stay's room-account bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StayLineItem {
    pub product_name: String,
    pub quantity: i64,
    pub unit_sale_price_cents: i64,
    /// quantity × unit sale price, computed by the query.
    pub line_total_cents: i64,
}

/// Daily/monthly key figures for the manager dashboard.
///
/// Zero-initialized; the reporting aggregator fills what it can and leaves
/// zeros behind on store errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    /// Percentage of rooms currently in an open stay (0-100).
    pub occupancy_rate: f64,
    /// Direct POS payments today + final bills of stays closed today.
    pub revenue_today_cents: i64,
    /// Same sums over the current calendar month.
    pub revenue_month_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stay_status_labels() {
        assert_eq!(StayStatus::Open.as_str(), "Ouvert");
        assert_eq!(StayStatus::Closed.as_str(), "Clos");
        assert_eq!(StayStatus::default(), StayStatus::Open);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("Espèces"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("Carte"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("Mobile"), Some(PaymentMethod::Mobile));
        assert_eq!(
            PaymentMethod::parse("Transfert Compte"),
            Some(PaymentMethod::AccountTransfer)
        );
        assert_eq!(PaymentMethod::parse("Chèque"), None);
        assert_eq!(PaymentMethod::parse(""), None);
    }

    #[test]
    fn test_payment_method_labels_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::Mobile,
            PaymentMethod::AccountTransfer,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_payment_method_is_direct() {
        assert!(PaymentMethod::Cash.is_direct());
        assert!(PaymentMethod::Card.is_direct());
        assert!(PaymentMethod::Mobile.is_direct());
        assert!(!PaymentMethod::AccountTransfer.is_direct());
    }

    #[test]
    fn test_cart_net_total() {
        let cart = vec![
            CartItem {
                product_id: "p1".to_string(),
                quantity: 2,
                unit_price_cents: 1500,
            },
            CartItem {
                product_id: "p2".to_string(),
                quantity: 1,
                unit_price_cents: 250,
            },
        ];
        assert_eq!(cart_net_total(&cart).cents(), 3250);
    }

    #[test]
    fn test_stay_is_open() {
        let mut stay = Stay {
            id: "s1".to_string(),
            room_id: "r1".to_string(),
            client_name: "Alice".to_string(),
            checkin_time: "2024-06-01 14:00:00".to_string(),
            planned_checkout_date: "2024-06-05".to_string(),
            actual_checkout_time: None,
            balance_cents: 0,
            status: StayStatus::Open,
        };
        assert!(stay.is_open());

        stay.actual_checkout_time = Some("2024-06-05 11:30:00".to_string());
        assert!(!stay.is_open());
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            unit_sale_price_cents: 400,
        };
        assert_eq!(line.line_total().cents(), 1200);
    }
}
