//! HTTP fixtures for the chat backend.

pub use httpmock::{
    Method::{GET, POST},
    Mock, MockServer,
};
use serde_json::{Value, json};

pub const AUTH_STATUS: &str = "/api/auth/status";
pub const AUTH_LOGIN: &str = "/api/auth/login";
pub const AUTH_LOGOUT: &str = "/api/auth/logout";
pub const CAPABILITIES: &str = "/api/capabilities";
pub const MCP_STATUS: &str = "/api/mcp/status";
pub const CHAT: &str = "/api/chat";

/// Mock `path` to answer `method` requests with `status` and a JSON `body`.
pub async fn json<'a>(
    server: &'a MockServer,
    method: httpmock::Method,
    path: &str,
    status: u16,
    body: Value,
) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(method).path(path);
            then.status(status)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

/// Mock the status endpoint to report an authenticated session for `name`.
pub async fn signed_in<'a>(server: &'a MockServer, name: &str) -> Mock<'a> {
    json(
        server,
        GET,
        AUTH_STATUS,
        200,
        json!({
            "authenticated": true,
            "user": { "name": name, "email": format!("{name}@example.com"), "sub": "auth0|1" }
        }),
    )
    .await
}

/// Mock the status endpoint to report no session.
pub async fn signed_out(server: &MockServer) -> Mock<'_> {
    json(
        server,
        GET,
        AUTH_STATUS,
        200,
        json!({ "authenticated": false, "user": null }),
    )
    .await
}

/// Mock `path` to reject every request with a `401`.
pub async fn unauthorized<'a>(
    server: &'a MockServer,
    method: httpmock::Method,
    path: &str,
) -> Mock<'a> {
    json(
        server,
        method,
        path,
        401,
        json!({ "error": "Not authenticated" }),
    )
    .await
}
