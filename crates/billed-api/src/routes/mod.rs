//! Route modules for the API server
//!
//! - bills: Bill list, receipt preview, "new bill" button
//! - new_bill: New bill form, receipt upload, submission
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX partials
//! - page.rs: HTMX page rendering
//!
//! Every request mounts its own page controller, wired to a `NavigationLog`
//! and a `ModalSlot` whose contents become the response.

pub mod bills;
pub mod new_bill;
