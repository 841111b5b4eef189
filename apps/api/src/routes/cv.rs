//! Axum route handlers for the CV rendering API.
//!
//! Every render owns its canvas and cursor and runs on the blocking pool, so
//! concurrent requests share nothing but the read-only `LayoutConfig`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::canvas::RecordedPage;
use crate::layout::markdown::render_markdown;
use crate::layout::normalize::{normalize, single_line};
use crate::layout::{
    lay_out, render_document, LayoutError, PdfCanvas, RecordingCanvas, RenderSummary,
};
use crate::models::cv::CvRecord;
use crate::state::AppState;

const X_PAGE_COUNT: HeaderName = HeaderName::from_static("x-page-count");
const X_TRUNCATED: HeaderName = HeaderName::from_static("x-truncated");
const X_RENDER_ID: HeaderName = HeaderName::from_static("x-render-id");

const PREVIEW_INDENT: &[u8] = b"    ";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LayoutPreview {
    pub render_id: Uuid,
    #[serde(flatten)]
    pub summary: RenderSummary,
    pub pages: Vec<RecordedPage>,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/pdf
///
/// Renders a CV record to a PDF of at most `page_limit` pages.
pub async fn handle_render_pdf(
    State(state): State<AppState>,
    payload: Result<Json<CvRecord>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(cv) = payload?;
    let render_id = Uuid::new_v4();
    let file_name = cv.pdf_file_name();
    let layout = state.layout.clone();
    let corrector = state.corrector.clone();

    let outcome = run_render(render_id, move || {
        let canvas = PdfCanvas::new(layout.geometry).with_title(single_line(&cv.name));
        render_document(&cv, canvas, &layout, corrector.as_ref())
    })
    .await?;

    info!(
        %render_id,
        pages = outcome.summary.page_count,
        truncated = outcome.summary.truncated,
        bytes = outcome.bytes.len(),
        "Rendered CV PDF"
    );

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid file name header: {e}")))?;
    let truncated = if outcome.summary.truncated { "true" } else { "false" };
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
        (header::CONTENT_DISPOSITION, disposition),
        (X_PAGE_COUNT, HeaderValue::from(outcome.summary.page_count)),
        (X_TRUNCATED, HeaderValue::from_static(truncated)),
        (X_RENDER_ID, render_id_header(render_id)),
    ];
    Ok((headers, Bytes::from(outcome.bytes)).into_response())
}

/// POST /api/v1/cv/layout
///
/// Same layout as the PDF endpoint, returned as positioned draw commands.
pub async fn handle_render_layout(
    State(state): State<AppState>,
    payload: Result<Json<CvRecord>, JsonRejection>,
) -> Result<Json<LayoutPreview>, AppError> {
    let Json(cv) = payload?;
    let render_id = Uuid::new_v4();
    let layout = state.layout.clone();
    let corrector = state.corrector.clone();

    let (summary, report) = run_render(render_id, move || {
        let laid = lay_out(&cv, RecordingCanvas::new(), &layout, corrector.as_ref())?;
        Ok((laid.summary, laid.canvas.into_report()))
    })
    .await?;

    info!(
        %render_id,
        pages = summary.page_count,
        truncated = summary.truncated,
        "Rendered CV layout preview"
    );

    Ok(Json(LayoutPreview {
        render_id,
        summary,
        pages: report.pages,
    }))
}

/// POST /api/v1/cv/markdown
pub async fn handle_render_markdown(
    State(state): State<AppState>,
    payload: Result<Json<CvRecord>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(cv) = payload?;
    let markdown = render_markdown(&cv, state.corrector.as_ref());
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/markdown; charset=utf-8"),
        )],
        markdown,
    )
        .into_response())
}

/// POST /api/v1/cv/normalize
///
/// Exposes the text normalizer for clients that preview field edits.
pub async fn handle_normalize(
    payload: Result<Json<NormalizeRequest>, JsonRejection>,
) -> Result<Json<NormalizeResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(NormalizeResponse {
        text: normalize(&request.text),
    }))
}

/// POST /api/v1/cv/preview
///
/// Shows the record the way the renderer reads it, after lenient parsing, as
/// an HTML page of indented JSON.
pub async fn handle_preview_json(
    payload: Result<Json<CvRecord>, JsonRejection>,
) -> Result<Html<String>, AppError> {
    let Json(cv) = payload?;
    let pretty = to_indented_json(&cv)?;
    Ok(Html(format!(
        "<!DOCTYPE html><html><head><title>CV JSON Preview</title>\
         <style>body {{ font-family: monospace; white-space: pre-wrap; }}</style>\
         </head><body><pre>{}</pre></body></html>",
        escape_html(&pretty)
    )))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Runs a CPU-bound render on the blocking pool inside a span tagged with
/// `render_id`.
async fn run_render<T, F>(render_id: Uuid, job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, LayoutError> + Send + 'static,
    T: Send + 'static,
{
    let span = info_span!("render", %render_id);
    let result = tokio::task::spawn_blocking(move || span.in_scope(job))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))?;
    Ok(result?)
}

fn render_id_header(render_id: Uuid) -> HeaderValue {
    // Hyphenated UUIDs are always valid header values.
    HeaderValue::from_str(&render_id.to_string()).unwrap_or(HeaderValue::from_static("unknown"))
}

fn to_indented_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(PREVIEW_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .context("failed to serialize CV preview")?;
    String::from_utf8(out).context("CV preview is not UTF-8")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
