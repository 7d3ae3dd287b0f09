//! HTTP server with HTMX pages for bills
//!
//! Routes are organized into modules:
//! - routes::bills: Bill list, receipt preview, "new bill" button
//! - routes::new_bill: New bill form, receipt upload, submission

pub mod error;
pub mod routes;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use billed_config::Config;
use billed_core::{Route, Session, StoreRef};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: StoreRef,
    pub config: Config,
}

/// Largest body accepted by the form and page routes
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::bills::{api_bills, htmx_bills_list, htmx_new_bill_click, htmx_receipt_modal, page_bills};
    use routes::new_bill::{htmx_file_change, htmx_new_bill_store, page_new_bill};

    // Receipt uploads read the limit inside the handler so the answer is an
    // inline error instead of a bare 413
    let uploads = Router::new()
        .route("/bills/new/file", post(htmx_file_change))
        .layer(DefaultBodyLimit::max(state.config.upload.max_file_size));

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/bills", get(api_bills))
        // HTMX page routes
        .route("/", get(index_page))
        .route("/bills", get(page_bills).post(htmx_new_bill_store))
        .route("/bills/new", get(page_new_bill))
        // HTMX partial routes
        .route("/bills/list", get(htmx_bills_list))
        .route("/bills/receipt", get(htmx_receipt_modal))
        .route("/bills/new-click", post(htmx_new_bill_click))
        .layer(RequestBodyLimitLayer::new(FORM_BODY_LIMIT))
        .merge(uploads)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Employees land on their bills
async fn index_page() -> Redirect {
    Redirect::to(Route::Bills.path())
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Billed</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .active-icon {{ background-color: rgba(255, 255, 255, 0.2); }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Vertical navigation bar with the bills and new bill icons
pub fn vertical_layout(current_path: &str) -> String {
    let on_new_bill = current_path.starts_with(Route::NewBill.path());
    let on_bills = !on_new_bill && current_path.starts_with(Route::Bills.path());
    let class = |active: bool| if active { "active-icon" } else { "" };

    format!(
        r#"<div class='vertical-navbar bg-indigo-700 text-white h-screen w-20 flex flex-col items-center py-6 gap-6'>
    <div class='text-lg font-bold'>Billed</div>
    <a href='{}' id='layout-icon1' data-testid='icon-window' class='p-3 rounded-lg {}' title='Mes notes de frais'>🗔</a>
    <a href='{}' id='layout-icon2' data-testid='icon-mail' class='p-3 rounded-lg {}' title='Nouvelle note de frais'>✉</a>
</div>"#,
        Route::Bills.path(),
        class(on_bills),
        Route::NewBill.path(),
        class(on_new_bill)
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex h-screen overflow-hidden'>
    <aside class='flex-shrink-0'>{}</aside>
    <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
</div>"#,
                vertical_layout(current_path),
                inner_content
            ),
        )
    }
}

/// Response asking HTMX to load `route` as a full page
pub fn hx_redirect(route: Route) -> Response {
    ([("HX-Redirect", route.path())], "").into_response()
}

/// Connected user from the `user` cookie, or the configured default user
pub fn session_from_headers(headers: &HeaderMap, config: &Config) -> Session {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix("user="))
        .filter_map(|raw| urlencoding::decode(raw).ok())
        .find_map(|json| Session::from_json(&json))
        .unwrap_or_else(|| Session::from_config(&config.session))
}

/// Start the HTTP server
///
/// Binds the configured address and serves until the process is stopped.
pub async fn start_server(config: Config, store: StoreRef) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState { store, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Billed server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /bills (Expense reports)");
    log::info!("  - /bills/new (New expense report)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use billed_core::MemoryStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    pub(crate) fn test_state(store: Arc<MemoryStore>) -> AppState {
        AppState {
            store,
            config: Config::default(),
        }
    }

    #[test]
    fn test_vertical_layout_highlights_current_page() {
        let html = vertical_layout("/bills");
        assert!(html.contains("data-testid='icon-window' class='p-3 rounded-lg active-icon'"));
        assert!(html.contains("data-testid='icon-mail' class='p-3 rounded-lg '"));

        let html = vertical_layout("/bills/new");
        assert!(html.contains("data-testid='icon-mail' class='p-3 rounded-lg active-icon'"));
        assert!(html.contains("data-testid='icon-window' class='p-3 rounded-lg '"));
    }

    #[test]
    fn test_page_response_partial() {
        let mut headers = HeaderMap::new();
        assert!(page_response(&headers, "t", "/bills", "x").starts_with("<!DOCTYPE html>"));
        headers.insert("hx-request", "true".parse().unwrap());
        assert!(!page_response(&headers, "t", "/bills", "x").contains("<!DOCTYPE"));
    }

    #[test]
    fn test_session_from_cookie() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        assert_eq!(session_from_headers(&headers, &config).email, "employee@test.tld");

        let cookie = format!(
            "theme=dark; user={}",
            urlencoding::encode(r#"{"type":"Employee","email":"a@a"}"#)
        );
        headers.insert(header::COOKIE, cookie.parse().unwrap());
        assert_eq!(session_from_headers(&headers, &config), Session::employee("a@a"));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "user=garbage".parse().unwrap());
        assert_eq!(session_from_headers(&headers, &config).email, "employee@test.tld");
    }

    #[tokio::test]
    async fn test_health_and_index() {
        let app = create_router(test_state(Arc::new(MemoryStore::new("http://f"))));

        let response = app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/bills");
    }
}
