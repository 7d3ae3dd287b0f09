//! Bills API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_bills: Bills list (JSON)
//! - htmx_bills_list: Bills table (HTML fragment)
//! - htmx_receipt_modal: Receipt preview modal (HTML fragment)
//! - htmx_new_bill_click: "New bill" button (HX-Redirect)

use crate::{hx_redirect, session_from_headers, views, ApiError, AppState};
use axum::extract::Query;
use axum::response::{Html, Response};
use axum::Json;
use billed_core::{BillsController, DisplayBill, EyeIcon, ModalContent, ModalSlot, NavigationLog, PageEvents, Route};
use std::collections::HashMap;
use std::sync::Arc;

/// Controller for one request, with the recorders it reports to
struct Mounted {
    controller: BillsController,
    navigator: Arc<NavigationLog>,
    presenter: Arc<ModalSlot>,
}

fn mount(state: &AppState, headers: &axum::http::HeaderMap) -> Mounted {
    let navigator = Arc::new(NavigationLog::new());
    let presenter = Arc::new(ModalSlot::new());
    let controller = BillsController::new(
        state.store.clone(),
        navigator.clone(),
        presenter.clone(),
        session_from_headers(headers, &state.config),
    );
    Mounted {
        controller,
        navigator,
        presenter,
    }
}

/// Get bills, most recent first (JSON API)
pub async fn api_bills(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<Vec<DisplayBill>>, ApiError> {
    let mounted = mount(&state, &headers);
    let bills = mounted.controller.get_bills().await?;
    Ok(Json(bills))
}

/// HTMX: Bills table, or the page-level error
pub async fn htmx_bills_list(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let mounted = mount(&state, &headers);
    let page = mounted.controller.load().await;
    Html(views::bills_ui(&page))
}

/// HTMX: Receipt preview for the clicked eye icon
pub async fn htmx_receipt_modal(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let mounted = mount(&state, &headers);
    let icon = EyeIcon::new(params.get("url").cloned());
    mounted.controller.on_icon_click(&icon)?;

    let content = mounted.presenter.take_last().unwrap_or(ModalContent::Missing);
    Ok(Html(views::modal_ui(&content)))
}

/// HTMX: "New bill" button
pub async fn htmx_new_bill_click(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Response {
    let mounted = mount(&state, &headers);
    mounted.controller.handle_click_new_bill();
    hx_redirect(mounted.navigator.last().unwrap_or(Route::NewBill))
}
