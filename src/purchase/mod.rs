//! Purchase management for the application.
//!
//! This module contains everything related to purchases:
//! - The `Purchase` model, the derived tax amounts, and the database
//!   functions for storing, querying, and deleting purchase records
//! - The dashboard list page with the form for logging new purchases
//! - The detail and edit pages for a single purchase
//! - The create/update/delete endpoints, all scoped to the owning account's
//!   email address

mod core;
mod create_endpoint;
mod dashboard_page;
mod delete_endpoint;
mod detail_page;
mod edit_endpoint;
mod edit_page;
mod form;

pub use core::{
    Purchase, PurchaseBuilder, PurchaseUpdate, TAX_RATE, create_purchase, create_purchase_table,
    delete_purchase, get_purchase, get_purchases_for_owner, map_purchase_row, update_purchase,
};
pub use create_endpoint::create_purchase_endpoint;
pub use dashboard_page::get_dashboard_page;
pub use delete_endpoint::delete_purchase_endpoint;
pub use detail_page::get_purchase_detail_page;
pub use edit_endpoint::edit_purchase_endpoint;
pub use edit_page::get_edit_purchase_page;

#[cfg(test)]
pub use core::count_purchases;
