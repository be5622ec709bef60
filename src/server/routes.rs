//! Route handlers for the pod registry web server.
//!
//! This module contains all the HTTP route handlers and related types for the Axum server.

use axum::{
    Form, Router,
    extract::{ConnectInfo, Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AdminCredentials;
use crate::pod::{PodError, PodNumber, Registry, StudentId, StudentJson, StudentUpdate};
use crate::server::auth::AdminUser;
use crate::server::error::ApiError;
use crate::server::negotiate::ResponseFormat;
use crate::server::pages;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub admin: Arc<AdminCredentials>,
}

impl AppState {
    pub fn new(registry: Registry, admin: AdminCredentials) -> Self {
        AppState {
            registry: Arc::new(registry),
            admin: Arc::new(admin),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub pods: usize,
    pub max_pods: u32,
}

#[derive(Serialize)]
pub struct PodList {
    pub pods: Vec<StudentJson>,
}

#[derive(Deserialize, Debug)]
pub struct RegisterForm {
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateForm {
    pub id: StudentId,
    pub username: String,
    pub pod_number: u32,
    #[serde(default)]
    pub addr_wan: String,
}

/// Runs a registry mutation off the async workers; it may write the snapshot file.
async fn run_blocking<T, F>(format: ResponseFormat, op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PodError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result.map_err(|e| ApiError::from_pod(e, format)),
        Err(e) => {
            error!("Registry task failed: {}", e);
            Err(ApiError::internal(format))
        }
    }
}

/// Out-of-range numbers can never be assigned, so they are just missing.
fn lookup_pod(pod: u32, format: ResponseFormat) -> Result<PodNumber, ApiError> {
    PodNumber::new(pod).map_err(|_| ApiError::not_found(format))
}

/// Basic health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running!".to_string(),
        pods: state.registry.len(),
        max_pods: state.registry.max_pods(),
    })
}

/// Unwraps a form body, answering a missing or malformed one with a negotiated 400.
fn form_body<T>(form: Result<Form<T>, FormRejection>, format: ResponseFormat) -> Result<T, ApiError> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(rejection) => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            rejection.body_text(),
            format,
        )),
    }
}

/// Registration form, unless this address already holds a pod.
pub async fn index(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
) -> Response {
    match state.registry.find_by_addr(&remote.ip().to_string()) {
        Some(student) => Redirect::to(&student.url()).into_response(),
        None => Html(pages::index_page()).into_response(),
    }
}

/// Assigns the next free pod to the submitted name.
pub async fn register(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    format: ResponseFormat,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let form = form_body(form, format)?;
    let registry = Arc::clone(&state.registry);
    let addr_wan = remote.ip().to_string();
    let student = run_blocking(format, move || registry.register(&form.name, Some(addr_wan))).await?;

    info!(
        "Registered '{}' from {} on pod {}",
        student.username, remote, student.pod_number
    );
    Ok(Redirect::to(&student.url()))
}

/// All assignments for JSON clients; everyone else goes to their own page.
pub async fn list_students(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    format: ResponseFormat,
) -> Response {
    if format == ResponseFormat::Json {
        let pods = state.registry.list().iter().map(|s| s.to_json()).collect();
        return Json(PodList { pods }).into_response();
    }

    match state.registry.find_by_addr(&remote.ip().to_string()) {
        Some(student) => Redirect::to(&student.url()).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

pub async fn get_student(
    State(state): State<AppState>,
    format: ResponseFormat,
    Path(pod): Path<u32>,
) -> Result<Response, ApiError> {
    let pod = lookup_pod(pod, format)?;
    let student = state
        .registry
        .get(pod)
        .map_err(|e| ApiError::from_pod(e, format))?;

    Ok(match format {
        ResponseFormat::Json => Json(student.to_json()).into_response(),
        ResponseFormat::Html => Html(pages::student_page(&student)).into_response(),
    })
}

/// Admin edit of a student, addressed by row id in the form.
pub async fn update_student(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    format: ResponseFormat,
    Path(pod): Path<u32>,
    form: Result<Form<UpdateForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let form = form_body(form, format)?;
    let pod = lookup_pod(pod, format)?;
    state
        .registry
        .get(pod)
        .map_err(|e| ApiError::from_pod(e, format))?;

    let update = StudentUpdate {
        username: form.username,
        pod_number: PodNumber::new(form.pod_number).map_err(|e| ApiError::from_pod(e, format))?,
        addr_wan: Some(form.addr_wan.trim().to_string()).filter(|addr| !addr.is_empty()),
    };

    let registry = Arc::clone(&state.registry);
    let id = form.id;
    let student = run_blocking(format, move || registry.update(id, update)).await?;

    info!("Admin '{}' updated student {}", admin, student.id);
    Ok(Redirect::to(&student.url()))
}

/// Assignment table for the admin.
pub async fn admin(AdminUser(_): AdminUser, State(state): State<AppState>) -> Html<String> {
    Html(pages::admin_page(&state.registry.list(), state.registry.max_pods()))
}

pub async fn delete_student(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    format: ResponseFormat,
    Path(pod): Path<u32>,
) -> Result<Redirect, ApiError> {
    let pod = lookup_pod(pod, format)?;
    let registry = Arc::clone(&state.registry);
    if let Some(student) = run_blocking(format, move || registry.delete(pod)).await? {
        info!("Admin '{}' deleted '{}' from pod {}", admin, student.username, pod);
    }
    Ok(Redirect::to("/admin/"))
}

pub async fn not_found(format: ResponseFormat) -> ApiError {
    ApiError::not_found(format)
}

/// Creates and configures the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(register))
        .route("/health", get(health))
        .route("/student/", get(list_students))
        .route("/student/:pod", get(get_student).post(update_student))
        .route("/admin/", get(admin))
        .route("/admin/delete/:pod", post(delete_student))
        .fallback(not_found)
        .with_state(state)
}
