//! In-process bill store
//!
//! Backs the application when no remote API is configured, and stands in for
//! the API in tests: failures can be injected per endpoint and every call is
//! counted.

use async_trait::async_trait;
use billed_utils::generate_id;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

use super::{BillStore, StoreError};
use crate::models::{Bill, FileUpload, NewBill, UploadedFile};

#[derive(Debug, Default, Clone)]
struct Failures {
    list: Option<String>,
    create: Option<String>,
    upload: Option<String>,
}

/// Number of calls received per endpoint
#[derive(Debug, Default)]
pub struct CallCounts {
    list: AtomicUsize,
    create: AtomicUsize,
    upload: AtomicUsize,
}

impl CallCounts {
    pub fn list(&self) -> usize {
        self.list.load(Ordering::SeqCst)
    }

    pub fn create(&self) -> usize {
        self.create.load(Ordering::SeqCst)
    }

    pub fn upload(&self) -> usize {
        self.upload.load(Ordering::SeqCst)
    }
}

struct StoredFile {
    issued: UploadedFile,
    upload: FileUpload,
}

pub struct MemoryStore {
    bills: RwLock<Vec<Bill>>,
    files: RwLock<HashMap<String, StoredFile>>,
    file_base_url: String,
    failures: Mutex<Failures>,
    calls: CallCounts,
}

impl MemoryStore {
    /// Empty store
    pub fn new(file_base_url: &str) -> Self {
        Self::with_bills(file_base_url, Vec::new())
    }

    /// Store holding the given bills, in that order
    pub fn with_bills(file_base_url: &str, bills: Vec<Bill>) -> Self {
        Self {
            bills: RwLock::new(bills),
            files: RwLock::new(HashMap::new()),
            file_base_url: file_base_url.trim_end_matches('/').to_string(),
            failures: Mutex::new(Failures::default()),
            calls: CallCounts::default(),
        }
    }

    /// Store seeded with the four sample bills
    pub fn with_fixtures(file_base_url: &str) -> Self {
        let base = file_base_url.trim_end_matches('/');
        Self::with_bills(base, fixture_bills(base))
    }

    /// Make every `list` call reject with `message`
    pub fn fail_list_with(&self, message: &str) {
        self.set_failure(|f| f.list = Some(message.to_string()));
    }

    /// Make every `create` call reject with `message`
    pub fn fail_create_with(&self, message: &str) {
        self.set_failure(|f| f.create = Some(message.to_string()));
    }

    /// Make every `upload_file` call reject with `message`
    pub fn fail_upload_with(&self, message: &str) {
        self.set_failure(|f| f.upload = Some(message.to_string()));
    }

    /// Remove injected failures
    pub fn clear_failures(&self) {
        self.set_failure(|f| *f = Failures::default());
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Upload stored under `key`
    pub async fn uploaded(&self, key: &str) -> Option<FileUpload> {
        self.files.read().await.get(key).map(|f| f.upload.clone())
    }

    fn set_failure(&self, apply: impl FnOnce(&mut Failures)) {
        match self.failures.lock() {
            Ok(mut failures) => apply(&mut *failures),
            Err(poisoned) => apply(&mut *poisoned.into_inner()),
        }
    }

    fn failures(&self) -> Failures {
        match self.failures.lock() {
            Ok(failures) => failures.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl BillStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures().list {
            return Err(StoreError::new(message));
        }
        Ok(self.bills.read().await.clone())
    }

    async fn create(&self, bill: NewBill) -> Result<Bill, StoreError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures().create {
            return Err(StoreError::new(message));
        }
        let bill = bill.into_bill(generate_id());
        self.bills.write().await.push(bill.clone());
        log::debug!("memory store: created bill {}", bill.id);
        Ok(bill)
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedFile, StoreError> {
        self.calls.upload.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures().upload {
            return Err(StoreError::new(message));
        }
        let key = generate_id();
        let uploaded = UploadedFile {
            file_url: format!("{}/{}/{}", self.file_base_url, key, upload.file_name),
            file_key: key.clone(),
            file_name: upload.file_name.clone(),
        };
        log::debug!(
            "memory store: stored {} ({} bytes) for {}",
            upload.file_name,
            upload.data.len(),
            upload.email
        );
        self.files.write().await.insert(
            key,
            StoredFile {
                issued: uploaded.clone(),
                upload,
            },
        );
        Ok(uploaded)
    }

    async fn find_file(&self, key: &str) -> Result<Option<UploadedFile>, StoreError> {
        Ok(self.files.read().await.get(key).map(|f| f.issued.clone()))
    }
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    base: &str,
    id: &str,
    expense_type: &str,
    name: &str,
    amount: i64,
    date: &str,
    vat: &str,
    commentary: &str,
    file_name: &str,
    status: &str,
    comment_admin: &str,
) -> Bill {
    Bill {
        id: id.to_string(),
        email: "a@a".to_string(),
        expense_type: expense_type.to_string(),
        name: name.to_string(),
        amount,
        date: date.to_string(),
        vat: vat.to_string(),
        pct: 20,
        commentary: commentary.to_string(),
        file_url: Some(format!("{}/{}", base, file_name)),
        file_name: Some(file_name.to_string()),
        file_key: None,
        status: status.to_string(),
        comment_admin: Some(comment_admin.to_string()),
    }
}

fn fixture_bills(base: &str) -> Vec<Bill> {
    vec![
        fixture(
            base,
            "47qAXb6fIm2zOKkLzMro",
            "Hôtel et logement",
            "encore",
            400,
            "2004-04-04",
            "80",
            "séminaire billed",
            "preview-facture-free-201801-pdf-1.jpg",
            "pending",
            "ok",
        ),
        fixture(
            base,
            "BeKy5Mo4jkmdfPGYpTxZ",
            "Transports",
            "test1",
            100,
            "2001-01-01",
            "",
            "plop",
            "1592770761.jpeg",
            "refused",
            "en fait non",
        ),
        fixture(
            base,
            "UIUZtnPQvnbFnB0ozvJh",
            "Services en ligne",
            "test3",
            300,
            "2003-03-03",
            "60",
            "",
            "facture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png",
            "accepted",
            "bon bah d'accord",
        ),
        fixture(
            base,
            "qcCK3SzECmaZAGRrHjaC",
            "Restaurants et bars",
            "test2",
            200,
            "2002-02-02",
            "40",
            "test2",
            "preview-facture-free-201801-pdf-1.jpg",
            "refused",
            "pas la bonne facture",
        ),
    ]
}
