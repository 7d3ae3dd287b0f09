//! Seams between the page controllers and whatever renders the pages
//!
//! Controllers never touch markup. They receive events through `PageEvents`,
//! move the user around through a `Navigator` and open the receipt modal
//! through a `Presenter`.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;

use crate::controllers::FileChange;
use crate::error::CoreError;
use crate::models::{Bill, NewBillForm, SelectedFile};

/// Employee routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    Login,
    Bills,
    NewBill,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Bills => "/bills",
            Route::NewBill => "/bills/new",
        }
    }
}

/// Navigation capability
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// What the receipt modal shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModalContent {
    /// Receipt is an image, shown inline
    Image { url: String },
    /// Receipt is some other document, offered as a link
    Link { url: String },
    /// No receipt URL on the bill
    Missing,
}

/// Modal capability
pub trait Presenter: Send + Sync {
    /// Fill the modal with `content` and show it
    fn show(&self, content: ModalContent);
}

/// The preview icon of a bill row, with the bill URL from its data attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EyeIcon {
    pub bill_url: Option<String>,
}

impl EyeIcon {
    pub fn new(bill_url: Option<String>) -> Self {
        Self { bill_url }
    }
}

/// Typed event surface of a page.
///
/// Each controller implements the events its page emits; the others answer
/// `CoreError::NotSupported`.
#[async_trait]
pub trait PageEvents: Send + Sync {
    /// A file was picked in the receipt input
    async fn on_file_change(&self, _file: SelectedFile) -> Result<FileChange, CoreError> {
        Err(CoreError::NotSupported {
            operation: "file change".to_string(),
        })
    }

    /// The new bill form was submitted
    async fn on_submit(&self, _form: NewBillForm) -> Result<Bill, CoreError> {
        Err(CoreError::NotSupported {
            operation: "submit".to_string(),
        })
    }

    /// A receipt preview icon was clicked
    fn on_icon_click(&self, _icon: &EyeIcon) -> Result<(), CoreError> {
        Err(CoreError::NotSupported {
            operation: "icon click".to_string(),
        })
    }
}

/// Lifecycle of a page that loads data once on mount
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        PageState::Idle
    }
}

impl<T> PageState<T> {
    /// Idle -> Loading. Returns false if the page already left Idle.
    pub fn start(&mut self) -> bool {
        if matches!(self, PageState::Idle) {
            *self = PageState::Loading;
            true
        } else {
            false
        }
    }

    /// Loading -> Loaded | Failed. Ignored outside Loading.
    pub fn resolve(&mut self, result: Result<T, CoreError>) {
        if !matches!(self, PageState::Loading) {
            log::warn!("page state resolved outside of loading, ignoring");
            return;
        }
        *self = match result {
            Ok(data) => PageState::Loaded(data),
            Err(e) => PageState::Failed(e.to_string()),
        };
    }
}

/// Navigator that records the routes it was asked to go to
#[derive(Debug, Default)]
pub struct NavigationLog {
    routes: Mutex<Vec<Route>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        match self.routes.lock() {
            Ok(routes) => routes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Last requested route
    pub fn last(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, route: Route) {
        log::debug!("navigate to {}", route.path());
        match self.routes.lock() {
            Ok(mut routes) => routes.push(route),
            Err(poisoned) => poisoned.into_inner().push(route),
        }
    }
}

/// Presenter that keeps what was shown, for the caller to render
#[derive(Debug, Default)]
pub struct ModalSlot {
    shown: Mutex<Vec<ModalContent>>,
}

impl ModalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `show` call, in order
    pub fn shown(&self) -> Vec<ModalContent> {
        match self.shown.lock() {
            Ok(shown) => shown.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Content of the last `show` call
    pub fn take_last(&self) -> Option<ModalContent> {
        self.shown().pop()
    }
}

impl Presenter for ModalSlot {
    fn show(&self, content: ModalContent) {
        match self.shown.lock() {
            Ok(mut shown) => shown.push(content),
            Err(poisoned) => poisoned.into_inner().push(content),
        }
    }
}
