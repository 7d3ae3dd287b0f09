//! REST API store
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /bills`       list bills
//! - `POST /bills`       create a bill (JSON body)
//! - `POST /bills/files` upload a receipt (multipart `file` + `email`), answers `{fileUrl, key}`
//! - `GET  /bills/files/{key}` receipt issued under `key`, 404 when unknown

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::{BillStore, StoreError};
use crate::models::{Bill, FileUpload, NewBill, UploadedFile};

pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            log::error!("remote store unreachable: {}", e);
            StoreError::new(format!("Erreur réseau : {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("remote store answered {}: {}", status, body);
            return Err(StoreError::from_status(status.as_u16()));
        }
        Ok(response)
    }
}

fn decode_error(e: reqwest::Error) -> StoreError {
    log::error!("remote store sent an unreadable answer: {}", e);
    StoreError::new(format!("Réponse invalide du serveur : {}", e))
}

/// Decode a bill list record by record; a malformed record is skipped
fn decode_bills(records: Vec<serde_json::Value>) -> Vec<Bill> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Bill>(record) {
            Ok(bill) => Some(bill),
            Err(e) => {
                log::warn!("skipping unreadable bill #{} from remote store: {}", index, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl BillStore for RemoteStore {
    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        let response = self.send(self.client.get(self.url("bills"))).await?;
        let records = response
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(decode_error)?;
        Ok(decode_bills(records))
    }

    async fn create(&self, bill: NewBill) -> Result<Bill, StoreError> {
        let response = self
            .send(self.client.post(self.url("bills")).json(&bill))
            .await?;
        response.json::<Bill>().await.map_err(decode_error)
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedFile, StoreError> {
        let part = Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| StoreError::new(format!("Type de fichier invalide : {}", e)))?;
        let form = Form::new().part("file", part).text("email", upload.email);

        let response = self
            .send(self.client.post(self.url("bills/files")).multipart(form))
            .await?;
        let mut uploaded = response.json::<UploadedFile>().await.map_err(decode_error)?;
        if uploaded.file_name.is_empty() {
            uploaded.file_name = upload.file_name;
        }
        Ok(uploaded)
    }

    async fn find_file(&self, key: &str) -> Result<Option<UploadedFile>, StoreError> {
        let request = self.client.get(self.url(&format!("bills/files/{}", urlencoding::encode(key))));
        match self.send(request).await {
            Ok(response) => {
                let mut found = response.json::<UploadedFile>().await.map_err(decode_error)?;
                if found.file_key.is_empty() {
                    found.file_key = key.to_string();
                }
                Ok(Some(found))
            }
            Err(StoreError { status: Some(404), .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
