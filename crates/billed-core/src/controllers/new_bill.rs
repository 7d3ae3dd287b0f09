//! New bill page controller

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::format::format_date;
use crate::models::{Bill, FileUpload, NewBill, NewBillForm, SelectedFile, UploadedFile};
use crate::session::Session;
use crate::store::StoreRef;
use crate::types::{BillStatus, EXPENSE_TYPES};
use crate::ui::{Navigator, PageEvents, Route};

/// Receipt extensions accepted by the file input
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// VAT percentage used when the field is left blank
const DEFAULT_PCT: i64 = 20;

/// State of the receipt `<input type="file">`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileInput {
    pub value: String,
    pub files: Vec<SelectedFile>,
}

impl FileInput {
    fn holding(file: SelectedFile) -> Self {
        Self {
            value: file.base_name().to_string(),
            files: vec![file],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Outcome of picking a receipt
#[derive(Debug, Clone, PartialEq)]
pub enum FileChange {
    /// Extension not allowed; the input was cleared and nothing was uploaded
    Rejected { input: FileInput, error: CoreError },
    /// Receipt stored, the input keeps the file
    Uploaded { input: FileInput, uploaded: UploadedFile },
    /// Store refused the upload; the input was cleared
    UploadFailed { input: FileInput, error: CoreError },
}

impl FileChange {
    pub fn input(&self) -> &FileInput {
        match self {
            FileChange::Rejected { input, .. }
            | FileChange::Uploaded { input, .. }
            | FileChange::UploadFailed { input, .. } => input,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            FileChange::Rejected { error, .. } | FileChange::UploadFailed { error, .. } => Some(error),
            FileChange::Uploaded { .. } => None,
        }
    }
}

pub struct NewBillController {
    store: StoreRef,
    navigator: Arc<dyn Navigator>,
    session: Session,
    attachment: Mutex<Option<UploadedFile>>,
    logger: DefaultErrorLogger,
}

impl NewBillController {
    pub fn new(store: StoreRef, navigator: Arc<dyn Navigator>, session: Session) -> Self {
        Self {
            store,
            navigator,
            session,
            attachment: Mutex::new(None),
            logger: DefaultErrorLogger,
        }
    }

    /// Resume with a receipt uploaded by an earlier request
    pub fn with_attachment(self, uploaded: Option<UploadedFile>) -> Self {
        self.set_attachment(uploaded);
        self
    }

    /// Receipt the next submission will reference
    pub fn attachment(&self) -> Option<UploadedFile> {
        match self.attachment.lock() {
            Ok(attachment) => attachment.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_attachment(&self, uploaded: Option<UploadedFile>) {
        match self.attachment.lock() {
            Ok(mut attachment) => *attachment = uploaded,
            Err(poisoned) => *poisoned.into_inner() = uploaded,
        }
    }

    /// Check the picked file and upload it when its extension is allowed
    pub async fn handle_change_file(&self, file: SelectedFile) -> FileChange {
        let extension = file.extension();
        let allowed = extension
            .as_deref()
            .map_or(false, |ext| ALLOWED_EXTENSIONS.contains(&ext));

        if !allowed {
            let error = CoreError::UnsupportedFileType { extension };
            self.logger.log_error(&error, &self.context("handle_change_file"));
            self.set_attachment(None);
            return FileChange::Rejected {
                input: FileInput::default(),
                error,
            };
        }

        let upload = FileUpload {
            file_name: file.base_name().to_string(),
            content_type: file.content_type.clone(),
            data: file.data.clone(),
            email: self.session.email.clone(),
        };

        match self.store.upload_file(upload).await {
            Ok(uploaded) => {
                log::info!("receipt {} uploaded as {}", uploaded.file_name, uploaded.file_key);
                self.set_attachment(Some(uploaded.clone()));
                FileChange::Uploaded {
                    input: FileInput::holding(file),
                    uploaded,
                }
            }
            Err(e) => {
                let error = CoreError::Upload { message: e.message };
                self.logger.log_error(&error, &self.context("handle_change_file"));
                self.set_attachment(None);
                FileChange::UploadFailed {
                    input: FileInput::default(),
                    error,
                }
            }
        }
    }

    /// Validate the form, create the bill and go back to the bills list
    pub async fn handle_submit(&self, form: NewBillForm) -> Result<Bill, CoreError> {
        let uploaded = self.issued_attachment().await?;
        let bill = self.build_bill(form, uploaded)?;

        let created = self.store.create(bill).await.map_err(|e| {
            let error = CoreError::Submit { message: e.message };
            self.logger.log_error(&error, &self.context("handle_submit"));
            error
        })?;

        log::info!("bill {} created for {}", created.id, created.email);
        self.navigator.navigate(Route::Bills);
        Ok(created)
    }

    /// The attachment as the store issued it. Only the key is taken from the
    /// caller; URL and name come from the store.
    async fn issued_attachment(&self) -> Result<UploadedFile, CoreError> {
        let claimed = self.attachment().ok_or(CoreError::MissingReceipt)?;
        let key = claimed.file_key.trim();
        if key.is_empty() {
            return Err(CoreError::MissingReceipt);
        }

        match self.store.find_file(key).await {
            Ok(Some(issued)) => Ok(issued),
            Ok(None) => {
                self.logger.log_warning(
                    &format!("receipt key {} was never issued by the store", key),
                    &self.context("handle_submit"),
                );
                self.set_attachment(None);
                Err(CoreError::MissingReceipt)
            }
            Err(e) => {
                let error = CoreError::Submit { message: e.message };
                self.logger.log_error(&error, &self.context("handle_submit"));
                Err(error)
            }
        }
    }

    fn build_bill(&self, form: NewBillForm, uploaded: UploadedFile) -> Result<NewBill, CoreError> {
        let raw_date = form.datepicker.trim();
        if raw_date.is_empty() {
            return Err(invalid("datepicker", "Veuillez saisir la date de la dépense."));
        }
        let date = format_date(raw_date)
            .map_err(|_| invalid("datepicker", "La date saisie n'est pas valide."))?;

        let amount = form
            .amount
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("amount", "Le montant doit être un nombre entier."))?;

        let pct = form.pct.trim().parse::<i64>().unwrap_or(DEFAULT_PCT);

        let expense_type = match form.expense_type.trim() {
            "" => EXPENSE_TYPES[0].to_string(),
            other => other.to_string(),
        };

        let file_name = if uploaded.file_name.is_empty() {
            uploaded.file_url.rsplit('/').next().unwrap_or_default().to_string()
        } else {
            uploaded.file_name
        };

        Ok(NewBill {
            email: self.session.email.clone(),
            expense_type,
            name: form.expense_name.trim().to_string(),
            amount,
            date,
            vat: form.vat.trim().to_string(),
            pct,
            commentary: form.commentary.trim().to_string(),
            file_url: uploaded.file_url,
            file_name,
            file_key: uploaded.file_key,
            status: BillStatus::Pending,
        })
    }

    fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_user(&self.session.email)
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl PageEvents for NewBillController {
    async fn on_file_change(&self, file: SelectedFile) -> Result<FileChange, CoreError> {
        Ok(self.handle_change_file(file).await)
    }

    async fn on_submit(&self, form: NewBillForm) -> Result<Bill, CoreError> {
        self.handle_submit(form).await
    }
}
