//! Integration tests for the Netzone API router.
//!
//! Each test builds the full router over a temporary data directory and
//! drives it with `tower::ServiceExt::oneshot`, so no socket is opened.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use netzone_api::api::{create_router, AppState, PUBLIC_KEY};
use netzone_api::config::Config;

const SECRET: &str = "NZ_SEC_0d3e9c1a7b5f2e8d4c6a0b9f1e3d7c5a";

/// Fixture with the on-disk layout the service expects.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("tmpdir");
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();

        let fixture = Self { dir };
        fixture.write("templates/index.html", "<h1>Netzone</h1>");
        fixture.write("templates/contact.html", "<h1>Contact</h1>");
        fixture.write("templates/404.html", "<h1>Not found</h1>");
        fixture.write("data/secret_key.txt", &format!("{SECRET}\n"));
        fixture
    }

    fn write(&self, relative: &str, contents: &str) {
        std::fs::write(self.dir.path().join(relative), contents).unwrap();
    }

    fn remove(&self, relative: &str) {
        std::fs::remove_file(self.dir.path().join(relative)).unwrap();
    }

    fn config(&self) -> Config {
        Config {
            data_dir: self.dir.path().join("data"),
            secret_key_file: self.dir.path().join("data/secret_key.txt"),
            templates_dir: self.dir.path().join("templates"),
            ..Config::default()
        }
    }

    fn router(&self) -> Router {
        create_router(AppState::from_config(&self.config()))
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn v2rays_uri(public_key: &str, secret_key: &str) -> String {
    format!("/api/v2rays?public_key={public_key}&secret_key={secret_key}")
}

#[tokio::test]
async fn v2rays_without_keys_is_401() {
    let fixture = Fixture::new();

    let response = fixture.get("/api/v2rays").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Missing API keys",
            "message": "Both public_key and secret_key are required"
        })
    );
}

#[tokio::test]
async fn v2rays_with_only_public_key_is_401() {
    let fixture = Fixture::new();

    let response = fixture
        .get(&format!("/api/v2rays?public_key={PUBLIC_KEY}"))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn v2rays_with_wrong_secret_is_403() {
    let fixture = Fixture::new();

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, "wrong")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Invalid API keys",
            "message": "The provided API keys are invalid"
        })
    );
}

#[tokio::test]
async fn v2rays_with_wrong_public_key_is_403() {
    let fixture = Fixture::new();

    let response = fixture.get(&v2rays_uri("NZ_PUB_nope", SECRET)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn v2rays_with_valid_keys_serves_document() {
    let fixture = Fixture::new();
    fixture.write(
        "data/free_v2rays.json",
        r#"{"vpn_configs": ["vless://a", "vmess://b", "trojan://c"], "updated_at": "2024-05-01"}"#,
    );

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, SECRET)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(
        json_body(response).await,
        json!({
            "success": true,
            "count": 3,
            "data": {
                "vpn_configs": ["vless://a", "vmess://b", "trojan://c"],
                "updated_at": "2024-05-01"
            }
        })
    );
}

#[tokio::test]
async fn v2rays_without_document_is_empty_envelope() {
    let fixture = Fixture::new();

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, SECRET)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "count": 0, "data": {}})
    );
}

#[tokio::test]
async fn v2rays_accepts_header_credentials() {
    let fixture = Fixture::new();

    let response = fixture
        .send(
            Request::builder()
                .uri("/api/v2rays")
                .header("X-Public-Key", PUBLIC_KEY)
                .header("X-Secret-Key", SECRET)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn v2rays_fails_closed_without_secret_file() {
    let fixture = Fixture::new();
    fixture.remove("data/secret_key.txt");

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, "None")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, SECRET)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn v2rays_sees_rotated_secret_immediately() {
    let fixture = Fixture::new();
    let router = fixture.router();

    fixture.write("data/secret_key.txt", "rotated");

    let request = Request::builder()
        .uri(v2rays_uri(PUBLIC_KEY, "rotated"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn v2rays_parse_failure_is_json_500() {
    let fixture = Fixture::new();
    fixture.write("data/free_v2rays.json", "{\"vpn_configs\": [");

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, SECRET)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].as_str().unwrap().contains("EOF"));
}

#[tokio::test]
async fn apps_counts_without_credentials() {
    let fixture = Fixture::new();
    fixture.write(
        "data/apps.json",
        r#"{"apps": [{"name": "v2rayNG", "platform": "android"}, {"name": "Streisand", "platform": "ios"}]}"#,
    );

    let response = fixture.get("/api/apps").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"]["apps"][1]["name"], "Streisand");
}

#[tokio::test]
async fn apps_without_list_field_counts_zero() {
    let fixture = Fixture::new();
    fixture.write("data/apps.json", r#"{"featured": "v2rayNG"}"#);

    let response = fixture.get("/api/apps").await;

    assert_eq!(
        json_body(response).await,
        json!({"success": true, "count": 0, "data": {"featured": "v2rayNG"}})
    );
}

#[tokio::test]
async fn apps_serves_numbers_exactly_with_sorted_keys() {
    let fixture = Fixture::new();
    fixture.write(
        "data/apps.json",
        r#"{"id": 123456789012345678901234567890, "apps": [{"size_mb": 0.1}], "n": -9223372036854775809}"#,
    );

    let body = body_bytes(fixture.get("/api/apps").await).await;

    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"{"count":1,"data":{"apps":[{"size_mb":0.1}],"id":123456789012345678901234567890,"n":-9223372036854775809},"success":true}"#
    );
}

#[tokio::test]
async fn identical_requests_yield_identical_bodies() {
    let fixture = Fixture::new();
    fixture.write("data/apps.json", r#"{"apps": [1, 2], "b": {"z": 1, "a": 2}}"#);

    let first = body_bytes(fixture.get("/api/apps").await).await;
    let second = body_bytes(fixture.get("/api/apps").await).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn social_redirects_ignore_query() {
    let fixture = Fixture::new();

    for (uri, target) in [
        ("/whatsapp", "https://chat.whatsapp.com/Hre9DcY71UvC32oMVwwUrE"),
        ("/whatsapp?ref=home", "https://chat.whatsapp.com/Hre9DcY71UvC32oMVwwUrE"),
        ("/discord", "https://discord.gg/DhPZ8uMv4v"),
        ("/discord?public_key=x", "https://discord.gg/DhPZ8uMv4v"),
    ] {
        let response = fixture.get(uri).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(response.headers()[header::LOCATION], target, "{uri}");
        assert!(body_bytes(response).await.is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn health_is_independent_of_data_directory() {
    let fixture = Fixture::new();
    fixture.remove("data/secret_key.txt");
    fixture.remove("templates/404.html");

    let response = fixture.get("/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["service"], "Netzone API");
}

#[tokio::test]
async fn pages_render_from_templates() {
    let fixture = Fixture::new();

    let response = fixture.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(body_bytes(response).await, b"<h1>Netzone</h1>");

    let response = fixture.get("/contact").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<h1>Contact</h1>");
}

#[tokio::test]
async fn unknown_path_is_404_page() {
    let fixture = Fixture::new();

    let response = fixture.get("/nonexistent").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"<h1>Not found</h1>");
}

#[tokio::test]
async fn missing_page_template_is_500_page() {
    let fixture = Fixture::new();
    fixture.remove("templates/contact.html");

    let response = fixture.get("/contact").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"<h1>Not found</h1>");
}

#[tokio::test]
async fn unreadable_secret_is_500_page() {
    let fixture = Fixture::new();
    // A directory where the secret file should be cannot be read as text.
    fixture.remove("data/secret_key.txt");
    std::fs::create_dir(fixture.dir.path().join("data/secret_key.txt")).unwrap();

    let response = fixture.get(&v2rays_uri(PUBLIC_KEY, SECRET)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"<h1>Not found</h1>");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let fixture = Fixture::new();

    let response = fixture
        .send(
            Request::builder()
                .uri("/api/apps")
                .header(header::ORIGIN, "https://netzone.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
