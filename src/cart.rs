//! Cart engine: the in-memory order being assembled before checkout.
//!
//! The cart owns its item list exclusively and never talks to the remote
//! store. Stock is enforced only here, as a ceiling on quantities against
//! the catalog snapshot the cart was built from; a stale snapshot can let
//! a quantity exceed the true stock, which is an accepted limitation of
//! the single-terminal model rather than something this module papers over.

use tracing::debug;

use crate::models::{CartItem, Product};

/// A mutable candidate order. Dropped or cleared on checkout.
#[derive(Debug, Default, Clone)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Add one unit of `product`.
    ///
    /// No-op when the product is out of stock, or when the product is
    /// already in the cart at its full stock quantity.
    pub fn add(&mut self, product: &Product) {
        if product.stock == 0 {
            debug!(product_id = %product.id, "add skipped: out of stock");
            return;
        }
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => {
                if item.quantity >= product.stock {
                    debug!(product_id = %product.id, "add skipped: at stock ceiling");
                    return;
                }
                item.quantity += 1;
            }
            None => self.items.push(CartItem {
                product: product.clone(),
                quantity: 1,
            }),
        }
    }

    /// Adjust the quantity of the item with id `id` by `delta`.
    ///
    /// The change is rejected (the item is left untouched, never removed)
    /// when the result would be zero or negative, or would exceed the stock
    /// of the matching product in `products`. When the product is absent
    /// from the snapshot the ceiling cannot be checked and the change is
    /// allowed.
    pub fn update_quantity(&mut self, id: &str, delta: i64, products: &[Product]) {
        let Some(item) = self.items.iter_mut().find(|i| i.product.id == id) else {
            return;
        };
        let new_qty = i64::from(item.quantity) + delta;
        if new_qty <= 0 {
            return;
        }
        if let Some(product) = products.iter().find(|p| p.id == id) {
            if new_qty > i64::from(product.stock) {
                debug!(product_id = %id, new_qty, stock = product.stock, "quantity change rejected");
                return;
            }
        }
        item.quantity = new_qty as u32;
    }

    /// Remove the item with id `id`; no-op if absent.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|i| i.product.id != id);
    }

    /// Sum of `price * quantity` over all items, in integer rupiah.
    /// Matches the `total` frozen onto the transaction at checkout.
    pub fn total(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities (the UI badge number).
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Empty the cart. Called after a successful checkout.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
