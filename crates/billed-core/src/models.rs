//! Core data models for bills

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

use super::types::BillStatus;

/// Expense report record, as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Expense category (e.g. "Transports")
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub expense_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Amount in whole currency units
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: i64,
    /// Expense date, usually `YYYY-MM-DD`
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vat: String,
    /// VAT percentage
    #[serde(default, deserialize_with = "null_as_default")]
    pub pct: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commentary: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Store key of the uploaded receipt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    /// Raw status; kept as text so unknown values survive a round trip
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
}

/// Read `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Bill {
    /// Typed status, `None` for values outside pending/accepted/refused
    pub fn status(&self) -> Option<BillStatus> {
        self.status.parse().ok()
    }

    /// Whether a receipt is attached
    pub fn has_receipt(&self) -> bool {
        self.file_url.as_deref().map_or(false, |u| !u.trim().is_empty())
    }
}

/// Payload for creating a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    pub amount: i64,
    pub date: String,
    pub vat: String,
    pub pct: i64,
    pub commentary: String,
    pub file_url: String,
    pub file_name: String,
    pub file_key: String,
    pub status: BillStatus,
}

impl NewBill {
    /// Materialize the record the store keeps under `id`
    pub fn into_bill(self, id: String) -> Bill {
        Bill {
            id,
            email: self.email,
            expense_type: self.expense_type,
            name: self.name,
            amount: self.amount,
            date: self.date,
            vat: self.vat,
            pct: self.pct,
            commentary: self.commentary,
            file_url: Some(self.file_url),
            file_name: Some(self.file_name),
            file_key: Some(self.file_key),
            status: self.status.to_string(),
            comment_admin: None,
        }
    }
}

/// Raw fields of the new bill form, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewBillForm {
    #[serde(default)]
    pub expense_type: String,
    #[serde(default)]
    pub expense_name: String,
    #[serde(default)]
    pub datepicker: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub vat: String,
    #[serde(default)]
    pub pct: String,
    #[serde(default)]
    pub commentary: String,
}

/// A file chosen in the receipt input
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Lowercased extension, `None` when the name has no dot
    pub fn extension(&self) -> Option<String> {
        self.base_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// File name without any client-side directory
    pub fn base_name(&self) -> &str {
        // Browsers may hand over a full client path ("C:\fakepath\x.jpg")
        self.name
            .rsplit(|c: char| c == '\\' || c == '/')
            .next()
            .unwrap_or(&self.name)
    }
}

/// Upload request sent to the store
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    /// Email of the uploading employee
    pub email: String,
}

/// Store answer to an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_url: String,
    #[serde(rename = "key", default)]
    pub file_key: String,
    #[serde(default)]
    pub file_name: String,
}

/// A bill ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBill {
    #[serde(flatten)]
    pub bill: Bill,
    /// Formatted date, or the raw date when it could not be parsed
    pub display_date: String,
    /// Formatted status, `None` for unknown statuses
    pub display_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_deserializes_from_api_shape() {
        let json = r#"{
            "id": "47qAXb6fIm2zOKkLzMro",
            "vat": "80",
            "fileUrl": "https://test.storage.tld/v0/b/billable.jpg?alt=media",
            "status": "pending",
            "type": "Hôtel et logement",
            "commentary": "séminaire billed",
            "name": "encore",
            "fileName": "preview-facture-free-201801-pdf-1.jpg",
            "date": "2004-04-04",
            "amount": 400,
            "commentAdmin": "ok",
            "email": "a@a",
            "pct": 20
        }"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.expense_type, "Hôtel et logement");
        assert_eq!(bill.amount, 400);
        assert_eq!(bill.status(), Some(BillStatus::Pending));
        assert_eq!(bill.comment_admin.as_deref(), Some("ok"));
        assert!(bill.has_receipt());
    }

    #[test]
    fn test_unknown_status_survives() {
        let bill: Bill = serde_json::from_str(r#"{"id":"1","status":"archived"}"#).unwrap();
        assert_eq!(bill.status, "archived");
        assert_eq!(bill.status(), None);
        assert!(!bill.has_receipt());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let json = r#"[
            {"id": "ok", "date": "2004-04-04", "status": "pending", "amount": 400},
            {"id": "bad", "date": null, "name": null, "vat": null, "commentary": null,
             "amount": null, "pct": null, "status": null, "fileUrl": null}
        ]"#;
        let bills: Vec<Bill> = serde_json::from_str(json).unwrap();
        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].amount, 400);
        assert_eq!(bills[1].id, "bad");
        assert_eq!(bills[1].date, "");
        assert_eq!(bills[1].amount, 0);
        assert_eq!(bills[1].status(), None);
        assert!(!bills[1].has_receipt());
    }

    #[test]
    fn test_selected_file_extension() {
        let file = SelectedFile::new("receipt.JPG", "image/jpeg", Bytes::new());
        assert_eq!(file.extension().as_deref(), Some("jpg"));

        let file = SelectedFile::new("C:\\fakepath\\scan.v2.PnG", "image/png", Bytes::new());
        assert_eq!(file.extension().as_deref(), Some("png"));
        assert_eq!(file.base_name(), "scan.v2.PnG");

        let file = SelectedFile::new("README", "text/plain", Bytes::new());
        assert_eq!(file.extension(), None);

        let file = SelectedFile::new("trailing.", "text/plain", Bytes::new());
        assert_eq!(file.extension(), None);
    }

    #[test]
    fn test_uploaded_file_wire_shape() {
        let uploaded: UploadedFile =
            serde_json::from_str(r#"{"fileUrl":"https://localhost:3456/images/test.jpg","key":"1234"}"#).unwrap();
        assert_eq!(uploaded.file_key, "1234");
        assert_eq!(uploaded.file_name, "");
    }
}
