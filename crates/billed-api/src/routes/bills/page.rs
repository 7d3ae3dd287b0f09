//! Bills page rendering - Full page endpoints

use crate::views::bills_page_ui;

/// Bills page shell; the table is fetched from `/bills/list` once loaded
pub async fn page_bills(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    axum::response::Html(crate::page_response(&headers, "Notes de frais", "/bills", &bills_page_ui()))
}
