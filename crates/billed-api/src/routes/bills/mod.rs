//! Bills routes - Bill list, receipt preview, new bill button
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_bills, htmx_bills_list, htmx_new_bill_click, htmx_receipt_modal};
pub use page::page_bills;
