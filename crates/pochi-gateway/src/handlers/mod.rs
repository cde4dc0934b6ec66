pub mod chat;

use axum::http::StatusCode;

/// Liveness banner for the hosting platform.
pub async fn root() -> String {
    format!("🧸 Pochi Server v{} is running!", pochi_core::version())
}

pub async fn health() -> &'static str {
    "OK"
}

/// Any method other than POST on a chat route.
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
