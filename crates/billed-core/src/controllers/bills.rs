//! Bills page controller

use std::sync::Arc;

use crate::error::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::format::{display_bill, sort_by_date_desc};
use crate::models::DisplayBill;
use crate::session::Session;
use crate::store::StoreRef;
use crate::ui::{EyeIcon, ModalContent, Navigator, PageEvents, PageState, Presenter, Route};

/// Whether a receipt URL points at an image the modal can show inline
pub fn is_image_url(url: &str) -> bool {
    // Extension at the end of the path, query string and fragment ignored
    static IMAGE_URL: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let image_regex =
        IMAGE_URL.get_or_init(|| regex::Regex::new(r"(?i)\.(png|jpe?g|gif|webp)([?#].*)?$").unwrap());
    image_regex.is_match(url)
}

/// Whether a receipt URL is an `http(s)` link the modal may point at
pub fn is_web_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub struct BillsController {
    store: StoreRef,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn Presenter>,
    session: Session,
    logger: DefaultErrorLogger,
}

impl BillsController {
    pub fn new(
        store: StoreRef,
        navigator: Arc<dyn Navigator>,
        presenter: Arc<dyn Presenter>,
        session: Session,
    ) -> Self {
        Self {
            store,
            navigator,
            presenter,
            session,
            logger: DefaultErrorLogger,
        }
    }

    /// Open the receipt modal for the clicked row
    pub fn handle_click_icon_eye(&self, icon: &EyeIcon) {
        let url = icon
            .bill_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty() && *u != "null")
            .filter(|u| is_web_url(u));

        let content = match url {
            Some(url) if is_image_url(url) => ModalContent::Image { url: url.to_string() },
            Some(url) => ModalContent::Link { url: url.to_string() },
            None => {
                self.logger.log_warning(
                    "receipt preview requested for a bill without file URL",
                    &self.context("handle_click_icon_eye"),
                );
                ModalContent::Missing
            }
        };
        self.presenter.show(content);
    }

    /// Go to the new bill form
    pub fn handle_click_new_bill(&self) {
        self.navigator.navigate(Route::NewBill);
    }

    /// Fetch every bill, most recent first, formatted for display.
    ///
    /// A store rejection is a `CoreError::Fetch` carrying the store's message.
    pub async fn get_bills(&self) -> Result<Vec<DisplayBill>, CoreError> {
        let mut bills = self.store.list().await.map_err(|e| {
            let error = CoreError::Fetch { message: e.message };
            self.logger.log_error(&error, &self.context("get_bills"));
            error
        })?;

        sort_by_date_desc(&mut bills);
        log::debug!("fetched {} bills for {}", bills.len(), self.session.email);
        Ok(bills.into_iter().map(display_bill).collect())
    }

    /// Mount the page: Idle -> Loading -> Loaded | Failed
    pub async fn load(&self) -> PageState<Vec<DisplayBill>> {
        let mut state = PageState::Idle;
        state.start();
        state.resolve(self.get_bills().await);
        state
    }

    fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_user(&self.session.email)
    }
}

impl PageEvents for BillsController {
    fn on_icon_click(&self, icon: &EyeIcon) -> Result<(), CoreError> {
        self.handle_click_icon_eye(icon);
        Ok(())
    }
}
