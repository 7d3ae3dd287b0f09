//! Page controllers
//!
//! - bills: bill list, receipt preview, "new bill" button
//! - new_bill: receipt upload and new bill form submission

pub mod bills;
pub mod new_bill;

pub use bills::BillsController;
pub use new_bill::{FileChange, FileInput, NewBillController, ALLOWED_EXTENSIONS};
