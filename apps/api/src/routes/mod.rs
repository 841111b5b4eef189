pub mod cv;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        // CV API
        .route("/api/v1/cv/pdf", post(cv::handle_render_pdf))
        .route("/api/v1/cv/layout", post(cv::handle_render_layout))
        .route("/api/v1/cv/markdown", post(cv::handle_render_markdown))
        .route("/api/v1/cv/normalize", post(cv::handle_normalize))
        .route("/api/v1/cv/preview", post(cv::handle_preview_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::correction::PassthroughCorrector;
    use crate::layout::LayoutConfig;

    fn test_state(config: Config) -> AppState {
        AppState {
            config,
            layout: Arc::new(LayoutConfig::default()),
            corrector: Arc::new(PassthroughCorrector),
        }
    }

    async fn post_raw(config: Config, path: &str, body: String) -> Response {
        build_router(test_state(config))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn post_json(path: &str, body: Value) -> Response {
        post_raw(Config::default(), path, body.to_string()).await
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn header_str<'a>(response: &'a Response, name: &str) -> &'a str {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn sample_cv() -> Value {
        json!({
            "name": "Jane Doe",
            "job_title": "Platform Engineer",
            "contact": { "email": "jane@example.com", "phone": "+44 20 7946 0000" },
            "profile_summary": "Engineer with a decade of experience building reliable systems.",
            "skills": [{ "category": "Languages", "items": ["Rust", "Go"] }],
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "duration": "2020 - 2023",
                "responsibilities": ["Built the billing pipeline"]
            }]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state(Config::default()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "atscv-api");
    }

    #[tokio::test]
    async fn test_render_pdf() {
        let response = post_json("/api/v1/cv/pdf", sample_cv()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "content-type"), "application/pdf");
        assert_eq!(
            header_str(&response, "content-disposition"),
            "attachment; filename=\"Jane_Doe_CV.pdf\""
        );
        assert_eq!(header_str(&response, "x-page-count"), "1");
        assert_eq!(header_str(&response, "x-truncated"), "false");
        assert!(!header_str(&response, "x-render-id").is_empty());

        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"%PDF-"), "body must be a PDF");
    }

    #[tokio::test]
    async fn test_render_pdf_truncates_long_cv() {
        let jobs: Vec<Value> = (0..40)
            .map(|i| {
                json!({
                    "title": format!("Engineer {i}"),
                    "company": "Acme",
                    "duration": "2019",
                    "responsibilities": ["Shipped things", "Fixed things", "Reviewed things"]
                })
            })
            .collect();
        let response = post_json("/api/v1/cv/pdf", json!({ "name": "Long", "experience": jobs })).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "x-page-count"), "2");
        assert_eq!(header_str(&response, "x-truncated"), "true");
    }

    #[tokio::test]
    async fn test_lenient_record_still_renders() {
        let body = json!({ "name": 42, "skills": "Rust", "experience": null, "unknown": [1, 2] });
        let response = post_json("/api/v1/cv/pdf", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_str(&response, "content-disposition"),
            "attachment; filename=\"42_CV.pdf\""
        );
    }

    #[tokio::test]
    async fn test_unmeasurable_text_is_422() {
        let body = json!({ "name": "Jane", "profile_summary": "Fluent in 日本語" });
        let response = post_json("/api/v1/cv/pdf", body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let response = post_raw(Config::default(), "/api/v1/cv/pdf", "{not json".into()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_body_limit_is_413() {
        let config = Config {
            max_body_bytes: 64,
            ..Config::default()
        };
        let body = json!({ "profile_summary": "x".repeat(500) }).to_string();
        let response = post_raw(config, "/api/v1/cv/pdf", body).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_render_layout_preview() {
        let response = post_json("/api/v1/cv/layout", sample_cv()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["page_count"], 1);
        assert_eq!(body["truncated"], false);
        assert_eq!(body["sections"][0], "header");
        let first = &body["pages"][0]["commands"][0];
        assert_eq!(first["op"], "text");
        assert_eq!(first["text"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_render_markdown() {
        let response = post_json("/api/v1/cv/markdown", sample_cv()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_str(&response, "content-type").starts_with("text/markdown"));
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.starts_with("# Jane Doe\n"));
        assert!(text.contains("- Engineer, Acme (2020 - 2023)\n"));
    }

    #[tokio::test]
    async fn test_normalize_endpoint() {
        let response = post_json(
            "/api/v1/cv/normalize",
            json!({ "text": "skills,teamwork  andDedicated" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], "skills, teamwork and Dedicated");
    }

    #[tokio::test]
    async fn test_preview_json_page() {
        let body = json!({ "name": "Jane <Doe>", "job_title": "R&D Lead" });
        let response = post_json("/api/v1/cv/preview", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_str(&response, "content-type").starts_with("text/html"));

        let page = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>CV JSON Preview</title>"));
        assert!(page.contains("<pre>{\n    &quot;name&quot;: &quot;Jane &lt;Doe&gt;&quot;"));
        assert!(page.contains("&quot;job_title&quot;: &quot;R&amp;D Lead&quot;"));
        assert!(page.ends_with("</pre></body></html>"));
    }

    #[tokio::test]
    async fn test_preview_json_rejects_malformed_body() {
        let response = post_raw(Config::default(), "/api/v1/cv/preview", "[1,".into()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
