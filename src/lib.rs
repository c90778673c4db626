//! Lumina POS - spreadsheet-backed point-of-sale core.
//!
//! This crate is the logic layer behind a small-merchant POS front-end:
//! product catalog, cart and checkout, transaction lifecycle, and sales
//! reporting, all persisted through a single Google Apps Script endpoint
//! that answers action-keyed JSON POSTs. The UI layer on top of it is out
//! of scope; so is the spreadsheet script itself.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use lumina_pos::{Cart, Catalog, PaymentMethod, SheetsClient, StoreConfig,
//!                  TransactionBook, TransactionStatus};
//!
//! # async fn run() -> lumina_pos::Result<()> {
//! let config = StoreConfig::new("https://script.google.com/macros/s/XXX/exec");
//! let store = Arc::new(SheetsClient::new(&config)?);
//!
//! let mut catalog = Catalog::new(store.clone());
//! catalog.refresh().await?;
//!
//! let mut cart = Cart::new();
//! if let Some(product) = catalog.product("1") {
//!     cart.add(product);
//! }
//!
//! let mut book = TransactionBook::new(store);
//! book.reload().await?;
//! book.checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Lunas)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod reports;
pub mod transactions;

pub use cart::Cart;
pub use catalog::{Catalog, DEFAULT_CATEGORIES, WILDCARD_CATEGORY};
pub use config::{normalize_script_url, StoreConfig};
pub use error::{PosError, Result};
pub use models::{
    CartItem, NewProduct, PaymentMethod, Product, Role, Transaction, TransactionStatus, User,
};
pub use remote::{ApiResponse, ConnectivityResult, RemoteStore, SheetsClient};
pub use reports::{DateSales, ProductSales, SalesReport};
pub use transactions::TransactionBook;

/// Initialize structured console logging for an embedding application.
///
/// Honors `RUST_LOG`; defaults to `info` globally and `debug` for this
/// crate. Call once at startup; applications that install their own
/// subscriber should skip this.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lumina_pos=debug"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}
