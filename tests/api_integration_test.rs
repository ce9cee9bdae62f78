use atheris_api::config::Settings;
use atheris_api::infrastructure::database;
use atheris_api::services::storage::LocalStorageService;
use atheris_api::{AppState, create_app};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "atheris-test-boundary";

async fn setup_app() -> (Router, TempDir) {
    setup_app_with_limit(4096).await
}

async fn setup_app_with_limit(max_upload_size: usize) -> (Router, TempDir) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let root = tempfile::tempdir().unwrap();
    let settings = Settings {
        max_upload_size,
        storage_root: root.path().to_path_buf(),
        ..Settings::default()
    };
    let storage = Arc::new(LocalStorageService::new(root.path()));

    (create_app(AppState::new(db, storage, settings)), root)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a multipart slide submission; text parts come before the file.
fn text_part(name: &str, value: &str) -> Vec<u8> {
    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
        .into_bytes()
}

fn file_part(file: &[u8], mime: &str) -> Vec<u8> {
    let mut part = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"banner.png\"\r\nContent-Type: {mime}\r\n\r\n"
    )
    .into_bytes();
    part.extend_from_slice(file);
    part.extend_from_slice(b"\r\n");
    part
}

fn multipart_request(parts: Vec<Vec<u8>>) -> Request<Body> {
    let mut body = parts.concat();
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/product_slide")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn slide_text_parts(title: &str, slide_info: &str) -> Vec<Vec<u8>> {
    vec![
        text_part("title", title),
        text_part("desc", "¡Nuestras mejores prendas!"),
        text_part("slideInfo", slide_info),
    ]
}

fn slide_request(title: &str, slide_info: &str, file: &[u8], mime: &str) -> Request<Body> {
    let mut parts = slide_text_parts(title, slide_info);
    parts.push(file_part(file, mime));
    multipart_request(parts)
}

/// Same fields as `slide_request`, with the file sent before any text part.
fn slide_request_file_first(
    title: &str,
    slide_info: &str,
    file: &[u8],
    mime: &str,
) -> Request<Body> {
    let mut parts = vec![file_part(file, mime)];
    parts.extend(slide_text_parts(title, slide_info));
    multipart_request(parts)
}

fn slide_info() -> String {
    json!({
        "slide_title": "Comodidad, durabilidad y estilo",
        "slide_desc": "¡Personaliza tus camisetas!",
        "specifications": [
            {"specification_title": "Comodidad", "specification_desc": "Sin costuras."}
        ]
    })
    .to_string()
}

fn customer_body() -> Value {
    let product = |status: bool| {
        json!({
            "primaryColor": "Negro", "secondColor": "Blanco",
            "chestWidth": 50, "waistWidth": 45, "neckToHipHeight": 70,
            "sleeveLengthShirt": 20, "sleeveLengthHoodie": 60,
            "age": 30, "height": 170, "weight": 70, "shoeSize": 40, "bodyType": 2,
            "status": status
        })
    };
    json!({
        "customer": {
            "documentNumber": "1020304050",
            "names": "ana maría",
            "cellPhoneNumber": "3001234567",
            "email": "Ana@Example.com",
            "city": "medellín",
            "address": "carrera 5 # 1-2"
        },
        "productList": [product(true), product(false)]
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _root) = setup_app().await;
    let (status, body) = send_json(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["storage"], "ready");
}

#[tokio::test]
async fn test_rating_create_and_list() {
    let (app, _root) = setup_app().await;

    for (comment, qualification) in [("Excelente calidad", 5.0), ("Llegó tarde", 2.0)] {
        let (status, body) = send_json(
            &app,
            post_json(
                "/api/rating",
                json!({"comment": comment, "qualification": qualification}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"rating": "OK"}));
    }

    let (status, body) = send_json(&app, get("/api/rating?limit=10&page=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["average"], 3.5);

    let (_, body) = send_json(&app, get("/api/rating?limit=10&comment=excel")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["comment"], "Excelente calidad");
}

#[tokio::test]
async fn test_rating_defaults_to_single_item_page() {
    let (app, _root) = setup_app().await;
    let (status, body) = send_json(&app, get("/api/rating")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["per_page"], 1);
    assert_eq!(body["total"], 0);
    assert_eq!(body["num_pages"], 0);
}

#[tokio::test]
async fn test_rating_is_clamped() {
    let (app, _root) = setup_app().await;
    send(
        &app,
        post_json("/api/rating", json!({"comment": "Wow", "qualification": 9})),
    )
    .await;

    let (_, body) = send_json(&app, get("/api/rating")).await;
    assert_eq!(body["results"][0]["qualification"], 5.0);
}

#[tokio::test]
async fn test_invalid_rating_is_rejected() {
    let (app, _root) = setup_app().await;

    let (status, body) = send_json(
        &app,
        post_json("/api/rating", json!({"comment": "", "qualification": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "comment");
    assert_eq!(body["detail"][1]["field"], "qualification");

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/rating")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(&app, malformed).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_array());
}

#[tokio::test]
async fn test_customer_tracking() {
    let (app, _root) = setup_app().await;

    let (status, body) = send_json(&app, post_json("/api/customer", customer_body())).await;
    assert_eq!(status, StatusCode::OK);
    let hash = body["hash"].as_str().unwrap().to_string();

    let (status, body) = send_json(&app, get(&format!("/api/track?track={}", hash))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"total": 2, "ready": 1, "status": 1, "rating": false})
    );

    let (status, _) = send_json(
        &app,
        post_json(
            "/api/rating",
            json!({"comment": "Muy bonito", "qualification": 4, "owner": hash}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send_json(&app, get(&format!("/api/track?track={}", hash))).await;
    assert_eq!(body["rating"], true);
}

#[tokio::test]
async fn test_track_unknown_customer() {
    let (app, _root) = setup_app().await;
    let (status, body) = send_json(&app, get("/api/track?track=missing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"total": 0, "ready": 0, "status": 0, "rating": false})
    );
}

#[tokio::test]
async fn test_invalid_customer_is_rejected() {
    let (app, _root) = setup_app().await;
    let mut request = customer_body();
    request["customer"]["cellPhoneNumber"] = json!("12345");

    let (status, body) = send_json(&app, post_json("/api/customer", request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "cellPhoneNumber");
}

#[tokio::test]
async fn test_rating_with_unknown_owner() {
    let (app, _root) = setup_app().await;
    let (status, body) = send_json(
        &app,
        post_json(
            "/api/rating",
            json!({"comment": "Hola", "qualification": 3, "owner": "nobody"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "owner");
}

#[tokio::test]
async fn test_slide_upload_list_and_read() {
    let (app, _root) = setup_app().await;
    let banner = b"\x89PNG\r\n\x1a\nbanner pixels".to_vec();

    let (status, body) = send_json(
        &app,
        slide_request("Camisetas", &slide_info(), &banner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"slide": "OK"}));

    let (status, body) = send_json(&app, get("/api/product_slide?title=cami")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let slide = &body["results"][0];
    assert_eq!(slide["title"], "Camisetas");
    assert_eq!(slide["slideInfo"]["specifications"][0]["specification_title"], "Comodidad");

    let banner_url = slide["banner"].as_str().unwrap();
    assert!(banner_url.starts_with("/api/read_slide?hash="));

    let response = app.clone().oneshot(get(banner_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), banner.as_slice());
}

#[tokio::test]
async fn test_duplicate_banner_conflicts() {
    let (app, _root) = setup_app().await;
    let banner = b"same banner".to_vec();

    let (status, _) = send(
        &app,
        slide_request("Camisetas", &slide_info(), &banner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &app,
        slide_request("Sudaderas", &slide_info(), &banner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"][0]["field"], "generalScope");
}

#[tokio::test]
async fn test_slide_rejections() {
    let (app, _root) = setup_app().await;

    let (status, body) = send_json(
        &app,
        slide_request("Camisetas", "{not json", b"bytes", "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        json!([{"field": "slideInfo", "msg": "La información del slide no es válida"}])
    );

    let (status, _) = send(
        &app,
        slide_request("Gifs", &slide_info(), b"GIF89a", "image/gif"),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, _) = send(
        &app,
        slide_request("Grande", &slide_info(), &vec![1u8; 5000], "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, body) = send_json(&app, get("/api/product_slide")).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_read_unknown_slide() {
    let (app, _root) = setup_app().await;
    let (status, body) = send_json(&app, get("/api/read_slide?hash=doesnotexist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"][0]["field"], "generalScope");
}

#[tokio::test]
async fn test_slide_upload_with_file_first() {
    let (app, _root) = setup_app().await;
    let banner = b"\x89PNG\r\n\x1a\nfile first".to_vec();

    let (status, body) = send_json(
        &app,
        slide_request_file_first("Vestidos", &slide_info(), &banner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"slide": "OK"}));

    let (_, body) = send_json(&app, get("/api/product_slide?title=vest")).await;
    assert_eq!(body["total"], 1);
    let banner_url = body["results"][0]["banner"].as_str().unwrap().to_string();

    let (status, bytes) = send(&app, get(&banner_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, banner);
}

#[tokio::test]
async fn test_file_first_with_invalid_fields_stores_nothing() {
    let (app, root) = setup_app().await;
    let banner = b"rejected banner".to_vec();

    let (status, body) = send_json(
        &app,
        slide_request_file_first("Vestidos", "{not json", &banner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"][0]["field"], "slideInfo");

    let slides_dir = root.path().join("uploads/slides");
    let stored = std::fs::read_dir(&slides_dir).map(|e| e.count()).unwrap_or(0);
    assert_eq!(stored, 0);

    // The rejected banner was never recorded, so it can still be uploaded.
    let (status, _) = send(
        &app,
        slide_request_file_first("Vestidos", &slide_info(), &banner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_slide_without_file_is_rejected() {
    let (app, _root) = setup_app().await;

    let (status, body) = send_json(
        &app,
        multipart_request(slide_text_parts("Camisetas", &slide_info())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"][0]["field"], "file");
}

#[tokio::test]
async fn test_oversized_text_part_is_payload_too_large() {
    let (app, _root) = setup_app().await;
    let title = "a".repeat(1_200_000);

    let (status, _) = send(
        &app,
        slide_request(&title, &slide_info(), b"bytes", "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unbounded_upload_limit_serves_requests() {
    let (app, _root) = setup_app_with_limit(usize::MAX).await;

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        slide_request("Camisetas", &slide_info(), b"small banner", "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}
