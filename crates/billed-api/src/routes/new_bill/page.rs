//! New bill page rendering - Full page endpoints

use crate::views::new_bill_form_ui;

/// New bill form page
pub async fn page_new_bill(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    axum::response::Html(crate::page_response(
        &headers,
        "Nouvelle note de frais",
        "/bills/new",
        &new_bill_form_ui(),
    ))
}
