//! Wire-level data model shared by the catalog, cart, transaction, and
//! reporting modules.
//!
//! Field names match the spreadsheet columns exactly: the Apps Script
//! backend round-trips these records as-is, so renaming a field here is a
//! breaking change on the remote side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// A sellable product. Prices are integer rupiah; `cost` is the unit cost
/// (HPP) used for profit reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub cost: i64,
    pub stock: u32,
}

/// A product row without an id, as received from a bulk add. Ids are
/// assigned client-side before the row reaches the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub cost: i64,
    pub stock: u32,
}

impl NewProduct {
    /// Promote to a full [`Product`] with a freshly generated id.
    pub fn with_generated_id(self) -> Product {
        Product {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            category: self.category,
            price: self.price,
            cost: self.cost,
            stock: self.stock,
        }
    }
}

// ---------------------------------------------------------------------------
// Cart items
// ---------------------------------------------------------------------------

/// A product snapshot plus a quantity. Serialized flat (product fields and
/// `quantity` side by side), matching the item rows stored inside a
/// transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `price * quantity` in integer rupiah.
    pub fn line_total(&self) -> i64 {
        self.product.price * i64::from(self.quantity)
    }

    /// `(price - cost) * quantity` in integer rupiah.
    pub fn line_profit(&self) -> i64 {
        (self.product.price - self.product.cost) * i64::from(self.quantity)
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// How a transaction was (or will be) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Tunai,
    Qris,
    Digital,
}

impl PaymentMethod {
    /// The wire/chart label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Tunai => "TUNAI",
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::Digital => "DIGITAL",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a transaction.
///
/// Legal transitions: `PENDING -> LUNAS`, `PENDING -> DIBATALKAN`, and
/// `LUNAS -> DIBATALKAN` (a paid transaction can be voided later).
/// `DIBATALKAN` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Lunas,
    Pending,
    Dibatalkan,
}

impl TransactionStatus {
    /// Whether a status change from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Lunas)
                | (TransactionStatus::Pending, TransactionStatus::Dibatalkan)
                | (TransactionStatus::Lunas, TransactionStatus::Dibatalkan)
        )
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        self == TransactionStatus::Dibatalkan
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Lunas => "LUNAS",
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Dibatalkan => "DIBATALKAN",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted sale. `items` is a frozen snapshot of the cart at checkout,
/// insertion order preserved; `total` is computed once at creation and never
/// recomputed from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<CartItem>,
    pub total: i64,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Staff,
}

/// An authenticated cashier or admin, as returned by the `login` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, cost: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Produk {id}"),
            category: "Minuman".to_string(),
            price,
            cost,
            stock: 10,
        }
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem {
            product: product("1", 18_000, 6_000),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        // Product fields and quantity live side by side, no nesting.
        assert_eq!(json["id"], "1");
        assert_eq!(json["price"], 18_000);
        assert_eq!(json["quantity"], 2);
        assert!(json.get("product").is_none());
    }

    #[test]
    fn test_line_math() {
        let item = CartItem {
            product: product("1", 18_000, 6_000),
            quantity: 2,
        };
        assert_eq!(item.line_total(), 36_000);
        assert_eq!(item.line_profit(), 24_000);
    }

    #[test]
    fn test_status_transitions() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(Lunas));
        assert!(Pending.can_transition_to(Dibatalkan));
        assert!(Lunas.can_transition_to(Dibatalkan));
        assert!(!Lunas.can_transition_to(Pending));
        assert!(!Dibatalkan.can_transition_to(Lunas));
        assert!(!Dibatalkan.can_transition_to(Pending));
        assert!(Dibatalkan.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Tunai).unwrap(),
            "\"TUNAI\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Dibatalkan).unwrap(),
            "\"DIBATALKAN\""
        );
        let status: TransactionStatus = serde_json::from_str("\"LUNAS\"").unwrap();
        assert_eq!(status, TransactionStatus::Lunas);
    }

    #[test]
    fn test_transaction_round_trip() {
        let tx = Transaction {
            id: "tx-1".to_string(),
            date: "2026-08-20T09:30:00Z".parse().unwrap(),
            items: vec![CartItem {
                product: product("1", 18_000, 6_000),
                quantity: 2,
            }],
            total: 36_000,
            payment_method: PaymentMethod::Qris,
            status: TransactionStatus::Pending,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["paymentMethod"], "QRIS");
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
