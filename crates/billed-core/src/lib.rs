//! Bill models, formatting, stores and page controllers

pub mod controllers;
pub mod error;
pub mod format;
pub mod models;
pub mod session;
pub mod store;
pub mod types;
pub mod ui;

pub use controllers::{BillsController, FileChange, FileInput, NewBillController};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::{Bill, DisplayBill, NewBill, NewBillForm, SelectedFile, UploadedFile};
pub use session::Session;
pub use store::{build_store, BillStore, MemoryStore, RemoteStore, StoreError, StoreRef};
pub use types::{BillStatus, UserType, EXPENSE_TYPES};
pub use ui::{EyeIcon, ModalContent, ModalSlot, NavigationLog, Navigator, PageEvents, PageState, Presenter, Route};
