//! HTTP tests for the pod registry router.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`, with
//! the client address supplied by `MockConnectInfo`.

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode, header},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use pod_registry::server::{AppState, create_router};
use pod_registry::{AdminCredentials, MemoryStore, PodNumber, Registry};
use serde_json::Value;
use std::net::SocketAddr;
use tower::ServiceExt;

const CLIENT: [u8; 4] = [192, 0, 2, 10];

fn setup(max_pods: u32) -> (AppState, Router) {
    let registry = Registry::open(MemoryStore::new(), max_pods).unwrap();
    let state = AppState::new(registry, AdminCredentials::new("admin", "s3cret"));
    let app = create_router(state.clone())
        .layer(MockConnectInfo(SocketAddr::from((CLIENT, 50000))));
    (state, app)
}

fn pod(n: u32) -> PodNumber {
    PodNumber::new(n).unwrap()
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn get_json(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str, auth: Option<String>) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn accept_json(mut request: Request<Body>) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    request
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_register_and_fetch_student() {
    let (_state, app) = setup(255);

    let response = send(&app, post_form("/", "name=Kurt", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/1");

    let response = send(&app, get_json("/student/1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["url"], "/student/1");
    assert_eq!(json["username"], "Kurt");
    assert_eq!(json["pod_number"], 1);
    assert_eq!(json["addr_wan"], "192.0.2.10");
    assert_eq!(json["addr_lo0"], "10.255.255.1/32");
    assert_eq!(json["addr_st0"], "10.255.1.2/30");
}

#[tokio::test]
async fn test_student_page_is_html_by_default() {
    let (state, app) = setup(255);
    state.registry.insert_with_pod("Rob", pod(10), None).unwrap();

    let request = Request::get("/student/10")
        .header(header::ACCEPT, "text/html,*/*")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Rob"));
    assert!(html.contains("10.255.10.2/30"));
}

#[tokio::test]
async fn test_index_redirects_known_address() {
    let (_state, app) = setup(255);

    let response = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("name=\"name\""));

    send(&app, post_form("/", "name=John", None)).await;

    let response = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/1");
}

#[tokio::test]
async fn test_missing_student_is_not_found() {
    let (_state, app) = setup(255);

    let response = send(&app, get_json("/student/9")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not found"));

    let response = send(&app, get_json("/student/999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, Request::get("/nowhere").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("404 Not Found"));

    let response = send(&app, get_json("/nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, serde_json::json!({"error": "not found"}));
}

#[tokio::test]
async fn test_list_students_json_and_redirect() {
    let (state, app) = setup(255);
    state.registry.insert_with_pod("Erin", pod(21), None).unwrap();
    state.registry.insert_with_pod("John", pod(5), None).unwrap();

    let json = body_json(send(&app, get_json("/student/")).await).await;
    let pods: Vec<u64> = json["pods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["pod_number"].as_u64().unwrap())
        .collect();
    assert_eq!(pods, vec![5, 21]);

    let response = send(&app, Request::get("/student/").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_registration_rejected_when_exhausted() {
    let (_state, app) = setup(1);
    send(&app, post_form("/", "name=first", None)).await;

    let mut request = post_form("/", "name=second", None);
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no pods remain"));
}

#[tokio::test]
async fn test_blank_name_is_bad_request() {
    let (state, app) = setup(255);
    let response = send(&app, post_form("/", "name=+++", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn test_admin_requires_credentials() {
    let (_state, app) = setup(255);

    let response = send(&app, Request::get("/admin/").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"pod-registry\""
    );

    let request = Request::get("/admin/")
        .header(header::AUTHORIZATION, basic("admin", "wrong"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);

    let request = Request::get("/admin/")
        .header(header::AUTHORIZATION, basic("admin", "s3cret"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("0 of 255 pods assigned"));
}

#[tokio::test]
async fn test_delete_frees_pod_for_reuse() {
    let (state, app) = setup(255);
    for name in ["a", "b", "c"] {
        state.registry.register(name, None).unwrap();
    }

    let response = send(&app, post_form("/admin/delete/2", "", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.registry.len(), 3);

    let response = send(
        &app,
        post_form("/admin/delete/2", "", Some(basic("admin", "s3cret"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/");
    assert!(state.registry.get(pod(2)).is_err());

    let response = send(&app, post_form("/", "name=d", None)).await;
    assert_eq!(location(&response), "/student/2");
}

#[tokio::test]
async fn test_admin_update_moves_student() {
    let (state, app) = setup(255);
    let kurt = state.registry.register("Kurt", None).unwrap();
    state.registry.register("Rob", None).unwrap();

    let form = format!("id={}&username=Kurt+W&pod_number=40&addr_wan=198.51.100.7", kurt.id);
    let response = send(&app, post_form("/student/1", &form, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        post_form("/student/1", &form, Some(basic("admin", "s3cret"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student/40");

    let moved = state.registry.get(pod(40)).unwrap();
    assert_eq!(moved.id, kurt.id);
    assert_eq!(moved.username, "Kurt W");
    assert_eq!(moved.addr_wan.as_deref(), Some("198.51.100.7"));
    assert!(state.registry.get(pod(1)).is_err());

    let form = format!("id={}&username=Kurt&pod_number=2&addr_wan=", kurt.id);
    let mut request = post_form("/student/40", &form, Some(basic("admin", "s3cret")));
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(state.registry.get(pod(40)).unwrap(), moved);
}

#[tokio::test]
async fn test_health() {
    let (state, app) = setup(100);
    state.registry.register("a", None).unwrap();

    let response = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["pods"], 1);
    assert_eq!(json["max_pods"], 100);
}

#[tokio::test]
async fn test_malformed_forms_are_negotiated_bad_requests() {
    let (state, app) = setup(255);

    let response = send(&app, accept_json(post_form("/", "nom=x", None))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("name"));
    assert!(state.registry.is_empty());

    let response = send(&app, post_form("/", "", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("400 Bad Request"));

    state.registry.insert_with_pod("Kurt", pod(9), None).unwrap();
    let response = send(
        &app,
        accept_json(post_form(
            "/student/9",
            "username=Kurt",
            Some(basic("admin", "s3cret")),
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_edit_to_out_of_range_pod_is_bad_request() {
    let (state, app) = setup(255);
    let kurt = state.registry.insert_with_pod("Kurt", pod(1), None).unwrap();

    let body = format!("id={}&username=Kurt&pod_number=300", kurt.id);
    let response = send(
        &app,
        accept_json(post_form("/student/1", &body, Some(basic("admin", "s3cret")))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("300"));
    assert_eq!(state.registry.get(pod(1)).unwrap(), kurt);
}
