//! New bill endpoints - HTMX partial responses
//!
//! Endpoints:
//! - htmx_file_change: Receipt picked in the file input (multipart, HTML fragment)
//! - htmx_new_bill_store: Form submission (HX-Redirect, or inline error)

use crate::{hx_redirect, session_from_headers, views, AppState};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use billed_core::{
    CoreError, FileChange, FileInput, NavigationLog, NewBillController, NewBillForm, PageEvents, Route, SelectedFile,
    UploadedFile,
};
use serde::Deserialize;
use std::sync::Arc;

/// Form fields posted by the new bill page, including the hidden receipt inputs
#[derive(Debug, Default, Deserialize)]
pub struct NewBillSubmission {
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
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_key: String,
    #[serde(default)]
    pub file_name: String,
}

impl NewBillSubmission {
    /// Split into the typed form fields and the receipt claimed by the page.
    /// The claim is checked against the store on submit, by key.
    fn into_parts(self) -> (NewBillForm, Option<UploadedFile>) {
        let uploaded = if self.file_key.trim().is_empty() {
            None
        } else {
            Some(UploadedFile {
                file_url: self.file_url,
                file_key: self.file_key,
                file_name: self.file_name,
            })
        };
        let form = NewBillForm {
            expense_type: self.expense_type,
            expense_name: self.expense_name,
            datepicker: self.datepicker,
            amount: self.amount,
            vat: self.vat,
            pct: self.pct,
            commentary: self.commentary,
        };
        (form, uploaded)
    }
}

/// Why a multipart upload could not be read, worded for the user
fn multipart_error(e: MultipartError, max_file_size: usize) -> String {
    log::warn!("rejected receipt upload ({}): {}", e.status(), e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!(
            "Le fichier dépasse la taille maximale autorisée ({} Ko).",
            max_file_size.div_ceil(1024)
        )
    } else {
        "Le fichier n'a pas pu être lu.".to_string()
    }
}

/// The `file` field of the upload
async fn read_receipt(mut multipart: Multipart, max_file_size: usize) -> Result<SelectedFile, String> {
    let mut selected = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, max_file_size))?;
        selected = Some(SelectedFile::new(name, content_type, data));
    }
    selected.ok_or_else(|| "Aucun fichier n'a été sélectionné.".to_string())
}

/// HTMX: Receipt picked in the file input.
///
/// Every outcome answers 200 so HTMX swaps the feedback in place of the
/// previous receipt inputs.
pub async fn htmx_file_change(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let max_file_size = state.config.upload.max_file_size;
    let file = match multipart {
        Ok(multipart) => read_receipt(multipart, max_file_size).await,
        Err(rejection) => {
            log::warn!("rejected receipt upload: {}", rejection.body_text());
            Err("Le fichier n'a pas pu être lu.".to_string())
        }
    };

    let change = match file {
        Ok(file) => {
            let controller = NewBillController::new(
                state.store.clone(),
                Arc::new(NavigationLog::new()),
                session_from_headers(&headers, &state.config),
            );
            controller.handle_change_file(file).await
        }
        Err(message) => FileChange::UploadFailed {
            input: FileInput::default(),
            error: CoreError::Upload { message },
        },
    };
    Html(views::file_feedback_ui(&change))
}

/// HTMX: New bill form submission
pub async fn htmx_new_bill_store(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    Form(submission): Form<NewBillSubmission>,
) -> Response {
    let (form, uploaded) = submission.into_parts();
    let navigator = Arc::new(NavigationLog::new());
    let controller = NewBillController::new(
        state.store.clone(),
        navigator.clone(),
        session_from_headers(&headers, &state.config),
    )
    .with_attachment(uploaded);

    match controller.on_submit(form).await {
        Ok(_) => hx_redirect(navigator.last().unwrap_or(Route::Bills)),
        // HTMX only swaps 2xx answers, the form stays as typed
        Err(e) => Html(views::form_error_ui(&e)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::create_router;
    use crate::tests::test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use billed_core::models::FileUpload;
    use billed_core::{BillStore, MemoryStore, UploadedFile};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BASE: &str = "https://localhost:3456/images";
    const BOUNDARY: &str = "----billedboundary";

    fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(BASE));
        (create_router(test_state(store.clone())), store)
    }

    fn receipt_body(field: &str, file_name: &str, content_type: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{n}\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\nfake image data\r\n--{b}--\r\n",
            b = BOUNDARY,
            n = field,
            f = file_name,
            c = content_type
        )
    }

    fn multipart_request(body: String) -> Request<Body> {
        Request::post("/bills/new/file")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .header(header::COOKIE, "user=%7B%22type%22%3A%22Employee%22%2C%22email%22%3A%22a%40a%22%7D")
            .body(Body::from(body))
            .unwrap()
    }

    fn upload_request(file_name: &str, content_type: &str) -> Request<Body> {
        multipart_request(receipt_body("file", file_name, content_type))
    }

    async fn issued_receipt(store: &MemoryStore) -> UploadedFile {
        store
            .upload_file(FileUpload {
                file_name: "receipt.jpg".to_string(),
                content_type: "image/jpg".to_string(),
                data: Default::default(),
                email: "employee@test.tld".to_string(),
            })
            .await
            .unwrap()
    }

    fn submit_request(body: &str) -> Request<Body> {
        Request::post("/bills")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_new_bill_page() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/bills/new").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("data-testid='form-new-bill'"));
        assert!(html.contains("data-testid='icon-mail' class='p-3 rounded-lg active-icon'"));
    }

    #[tokio::test]
    async fn test_pdf_upload_is_rejected() {
        let (app, store) = app();
        let response = app.oneshot(upload_request("document.PDF", "application/pdf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("data-testid='file-error-message'"));
        assert!(html.contains("Le PDF n&#39;est pas pris en charge."));
        assert_eq!(store.calls().upload(), 0);
    }

    #[tokio::test]
    async fn test_jpg_upload_returns_hidden_inputs() {
        let (app, store) = app();
        let response = app.oneshot(upload_request("receipt.jpg", "image/jpg")).await.unwrap();
        let html = body_text(response).await;

        assert!(html.contains("name='file_url'"));
        assert!(html.contains("receipt.jpg"));
        assert!(!html.contains("file-error-message"));
        assert_eq!(store.calls().upload(), 1);
    }

    #[tokio::test]
    async fn test_oversized_upload_shows_inline_error() {
        let store = Arc::new(MemoryStore::new(BASE));
        let mut state = test_state(store.clone());
        state.config.upload.max_file_size = 64;
        let app = create_router(state);

        let response = app.oneshot(upload_request("receipt.jpg", "image/jpg")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("data-testid='file-error-message'"));
        assert!(html.contains("taille maximale"));
        assert!(!html.contains("name='file_url'"));
        assert_eq!(store.calls().upload(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_upload_shows_inline_error() {
        let truncated = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"r.jpg\"\r\n\r\nfake",
            b = BOUNDARY
        );
        let missing_field = receipt_body("other", "receipt.jpg", "image/jpg");
        let not_multipart = Request::post("/bills/new/file")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("receipt.jpg"))
            .unwrap();

        for request in [multipart_request(truncated), multipart_request(missing_field), not_multipart] {
            let (app, store) = app();
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let html = body_text(response).await;
            assert!(html.contains("data-testid='file-error-message'"));
            assert!(!html.contains("name='file_url'"));
            assert_eq!(store.calls().upload(), 0);
        }
    }

    #[tokio::test]
    async fn test_submit_redirects_to_bills() {
        let (app, store) = app();
        let issued = issued_receipt(&store).await;
        let body = format!(
            "expense_type=Transports&expense_name=Vol+Paris&datepicker=2024-07-24&amount=348&vat=70&pct=&commentary=&file_url={}&file_key={}&file_name=receipt.jpg",
            urlencoding::encode(&issued.file_url),
            issued.file_key
        );
        let response = app.oneshot(submit_request(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/bills");

        let bills = store.list().await.unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].name, "Vol Paris");
        assert_eq!(bills[0].pct, 20);
        assert_eq!(bills[0].status, "pending");
        assert_eq!(bills[0].email, "employee@test.tld");
        assert_eq!(bills[0].file_url.as_deref(), Some(issued.file_url.as_str()));
    }

    #[tokio::test]
    async fn test_submit_with_forged_receipt_is_refused() {
        let (app, store) = app();
        let response = app
            .oneshot(submit_request(
                "datepicker=2024-07-24&amount=348&file_url=javascript%3Aalert(1)&file_key=forged&file_name=r.jpg",
            ))
            .await
            .unwrap();

        assert!(response.headers().get("HX-Redirect").is_none());
        let html = body_text(response).await;
        assert!(html.contains("data-testid='error-message'"));
        assert!(html.contains("Veuillez joindre un justificatif"));
        assert_eq!(store.calls().create(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_keeps_issued_url_over_posted_one() {
        let (app, store) = app();
        let issued = issued_receipt(&store).await;
        let body = format!(
            "datepicker=2024-07-24&amount=348&file_url=javascript%3Aalert(1)&file_key={}&file_name=x.jpg",
            issued.file_key
        );
        let response = app.oneshot(submit_request(&body)).await.unwrap();
        assert_eq!(response.headers()["HX-Redirect"], "/bills");

        let bills = store.list().await.unwrap();
        assert_eq!(bills[0].file_url.as_deref(), Some(issued.file_url.as_str()));
        assert_eq!(bills[0].file_name.as_deref(), Some("receipt.jpg"));
    }

    #[tokio::test]
    async fn test_submit_without_receipt_shows_error() {
        let (app, store) = app();
        let response = app
            .oneshot(submit_request("expense_type=Transports&datepicker=2024-07-24&amount=348"))
            .await
            .unwrap();

        assert!(response.headers().get("HX-Redirect").is_none());
        let html = body_text(response).await;
        assert!(html.contains("data-testid='error-message'"));
        assert_eq!(store.calls().create(), 0);
    }

    #[tokio::test]
    async fn test_submit_store_failure_shows_error() {
        let (app, store) = app();
        let issued = issued_receipt(&store).await;
        store.fail_create_with("Erreur 500");
        let body = format!("datepicker=2024-07-24&amount=348&file_key={}", issued.file_key);
        let response = app.oneshot(submit_request(&body)).await.unwrap();

        assert!(response.headers().get("HX-Redirect").is_none());
        let html = body_text(response).await;
        assert!(html.contains("Erreur 500"));
    }
}
