use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use cadence_core::export;
use cadence_core::generator::TextGenerator;
use cadence_core::models::{Calendar, Comment, Post, SpamReport};
use cadence_core::{CalendarError, CalendarInput, CalendarStore, generate_calendar};

/// Characters of a post body echoed back in the generate response.
const SUMMARY_BODY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", err.into()),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::Input(e) => Self::bad_request(e.to_string()),
            CalendarError::NotFound(_) => Self::not_found(err.to_string()),
            CalendarError::Generation { .. } => Self::internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub store: CalendarStore,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            store: CalendarStore::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub post_id: String,
    pub title: String,
    pub body: String,
    pub subreddit: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub quality_score: f64,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<&Post> for PostSummary {
    fn from(p: &Post) -> Self {
        Self {
            post_id: p.post_id.clone(),
            title: p.title.clone(),
            body: truncate_body(&p.body),
            subreddit: p.channel.clone(),
            author: p.author.clone(),
            timestamp: p.instant,
            quality_score: p.quality_score,
            keywords: p.keyword_ids.clone(),
            warning: p.warning.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentSummary {
    pub comment_id: String,
    pub post_id: String,
    pub author: String,
}

impl From<&Comment> for CommentSummary {
    fn from(c: &Comment) -> Self {
        Self {
            comment_id: c.comment_id.clone(),
            post_id: c.post_id.clone(),
            author: c.author.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub session_id: String,
    pub week_number: u32,
    pub posts: Vec<PostSummary>,
    pub comments: Vec<CommentSummary>,
    pub total_posts: usize,
    pub total_comments: usize,
    pub average_quality: f64,
    pub spam_check: SpamReport,
}

impl From<&Calendar> for GenerateResponse {
    fn from(cal: &Calendar) -> Self {
        Self {
            success: true,
            session_id: cal.session_id.clone(),
            week_number: cal.week_number,
            posts: cal.posts.iter().map(PostSummary::from).collect(),
            comments: cal.comments.iter().map(CommentSummary::from).collect(),
            total_posts: cal.total_posts,
            total_comments: cal.total_comments,
            average_quality: cal.average_quality,
            spam_check: cal.spam_report.clone(),
        }
    }
}

/// First [`SUMMARY_BODY_CHARS`] characters followed by an ellipsis.
fn truncate_body(body: &str) -> String {
    let mut out: String = body.chars().take(SUMMARY_BODY_CHARS).collect();
    out.push_str("...");
    out
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/generate/week", post(generate_week))
        .route("/api/download/{session_id}", get(download))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(generator: Arc<dyn TextGenerator>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(AppState::new(generator));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("cadence serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("cadence serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "cadence",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /api/health",
            "generate": "POST /api/generate/week",
            "download": "GET /api/download/{sessionId}",
        }
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_week(
    State(state): State<AppState>,
    payload: Result<Json<CalendarInput>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(input) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let request = input.validate().map_err(CalendarError::from)?;

    tracing::info!(
        week = request.week_number,
        company = %request.company.name,
        "generate request"
    );

    let mut rng = StdRng::from_os_rng();
    let calendar = generate_calendar(&request, state.generator.as_ref(), &mut rng)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "calendar generation failed");
            AppError::from(e)
        })?;

    let calendar = state.store.insert(calendar).await;
    tracing::info!(
        session_id = %calendar.session_id,
        posts = calendar.total_posts,
        comments = calendar.total_comments,
        "calendar stored"
    );

    Ok(Json(GenerateResponse::from(calendar.as_ref())).into_response())
}

async fn download(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let calendar = state.store.get(&session_id).await?;
    let bytes = export::to_bytes(&calendar).map_err(AppError::internal)?;
    let disposition = format!(
        "attachment; filename={}",
        export::download_filename(calendar.week_number)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use cadence_core::export::read_sheet;
    use cadence_core::generator::TemplateGenerator;
    use cadence_test_utils::{FailingGenerator, ScriptedGenerator, input};

    use super::{AppState, build_router, truncate_body};

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn template_state() -> AppState {
        AppState::new(Arc::new(TemplateGenerator::new()))
    }

    async fn get(state: AppState, uri: &str) -> axum::response::Response {
        build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(state: AppState, uri: &str, body: String) -> axum::response::Response {
        build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), 4 * 1_048_576)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn valid_body(posts: usize, week: u32) -> String {
        serde_json::to_string(&input(posts, week)).unwrap()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = get(template_state(), "/api/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let resp = get(template_state(), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["endpoints"]["generate"], "POST /api/generate/week");
    }

    #[tokio::test]
    async fn generate_returns_summary_and_stores_calendar() {
        let state = template_state();
        let resp = post_json(state.clone(), "/api/generate/week", valid_body(3, 2)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["weekNumber"], 2);
        assert_eq!(json["totalPosts"], 3);
        assert_eq!(json["totalComments"], 9);
        assert_eq!(json["posts"].as_array().unwrap().len(), 3);
        assert_eq!(json["comments"].as_array().unwrap().len(), 9);
        assert!(json["averageQuality"].as_f64().is_some());
        assert!(json["spamCheck"].get("has_issues").is_some());

        let first = &json["posts"][0];
        assert_eq!(first["post_id"], "P1");
        assert!(first["body"].as_str().unwrap().ends_with("..."));
        let comment = &json["comments"][0];
        assert!(comment.get("comment_id").is_some());
        assert!(comment.get("text").is_none());

        let session_id = json["sessionId"].as_str().unwrap();
        assert!(session_id.starts_with("week2-"));
        assert!(state.store.get(session_id).await.is_ok());
    }

    #[tokio::test]
    async fn download_returns_sheet_for_stored_session() {
        let state = template_state();
        let resp = post_json(state.clone(), "/api/generate/week", valid_body(2, 3)).await;
        let session_id = body_json(resp).await["sessionId"]
            .as_str()
            .unwrap()
            .to_string();

        let resp = get(state, &format!("/api/download/{session_id}")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .expect("should have content-disposition header")
            .to_str()
            .unwrap()
            .to_string();
        assert!(
            disposition.contains("content_calendar_week_3.csv"),
            "unexpected disposition: {disposition}"
        );

        let text = String::from_utf8(body_bytes(resp).await).unwrap();
        let sheet = read_sheet(&text).unwrap();
        assert_eq!(sheet.posts.len(), 2);
        assert_eq!(sheet.comments.len(), 6);
    }

    #[tokio::test]
    async fn download_unknown_session_is_not_found() {
        let resp = get(template_state(), "/api/download/week1-missing").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("week1-missing"));
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let body = serde_json::json!({ "company": input(3, 1).company }).to_string();
        let resp = post_json(template_state(), "/api/generate/week", body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "missing required fields: personas, keywords");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let resp = post_json(template_state(), "/api/generate/week", "{not json".into()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await.get("error").is_some());
    }

    #[tokio::test]
    async fn generation_failure_is_internal_error() {
        let state = AppState::new(Arc::new(FailingGenerator));
        let resp = post_json(state.clone(), "/api/generate/week", valid_body(2, 1)).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("post P1"));
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn scripted_generator_is_called_once_per_artifact() {
        let generator = Arc::new(ScriptedGenerator::new());
        let state = AppState::new(generator.clone());
        let resp = post_json(state, "/api/generate/week", valid_body(2, 1)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(generator.post_calls(), 2);
        assert_eq!(generator.comment_calls(), 6);
    }

    #[test]
    fn truncate_body_keeps_first_200_chars() {
        let long = "é".repeat(250);
        let out = truncate_body(&long);
        assert_eq!(out.chars().count(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short...");
    }
}
