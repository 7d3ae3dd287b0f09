//! New bill routes - Form page, receipt upload, submission

pub mod api;
pub mod page;

pub use api::{htmx_file_change, htmx_new_bill_store};
pub use page::page_new_bill;
