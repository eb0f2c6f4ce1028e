// src/server/routes.rs

//! Request handlers.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use serde::Deserialize;

use crate::models::{AnalysisKind, AnalysisRequest, FormInput};
use crate::pipeline::run_analysis;

use super::AppState;
use super::render;

/// Urlencoded form body; each analysis kind is its own checkbox.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeForm {
    handle: String,
    limit: String,
    username: String,
    password: String,
    language: String,
    model: String,
    main_topics: Option<String>,
    aggressive_language: Option<String>,
}

impl AnalyzeForm {
    fn into_input(self) -> FormInput {
        let mut kinds = Vec::new();
        if self.main_topics.is_some() {
            kinds.push(AnalysisKind::MainTopics);
        }
        if self.aggressive_language.is_some() {
            kinds.push(AnalysisKind::AggressiveLanguage);
        }
        FormInput {
            handle: self.handle,
            limit: self.limit,
            username: self.username,
            password: self.password,
            language: self.language,
            model: self.model,
            kinds,
        }
    }
}

pub async fn form(State(state): State<AppState>) -> Html<String> {
    Html(render::form_page(
        &state.config.form,
        None,
        &FormInput::default(),
    ))
}

pub async fn analyze(
    State(state): State<AppState>,
    Form(submission): Form<AnalyzeForm>,
) -> (StatusCode, Html<String>) {
    let input = submission.into_input();

    let request = match AnalysisRequest::from_form(&input, &state.config.form) {
        Ok(request) => request,
        Err(e) if e.is_user_input() => {
            let page = render::form_page(&state.config.form, Some(&e.to_string()), &input);
            return (StatusCode::BAD_REQUEST, Html(page));
        }
        Err(e) => {
            log::error!("Rejected form submission: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::error_page(&e.to_string())),
            );
        }
    };

    let _running = state.run_lock.lock().await;
    match run_analysis(
        &state.config,
        &request,
        state.drivers.as_ref(),
        state.analyst.as_ref(),
    )
    .await
    {
        Ok(result) => (StatusCode::OK, Html(render::result_page(&result))),
        Err(e) => {
            log::error!("Analysis of @{} failed: {e}", request.handle);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::error_page(&e.to_string())),
            )
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use crate::models::Config;
    use crate::server::router;
    use crate::testing::{EchoAnalyst, ScriptedDriver, ScriptedFactory, page};

    use super::*;

    fn state(driver: ScriptedDriver) -> (AppState, ScriptedFactory, EchoAnalyst) {
        let mut config = Config::default();
        config.collector.pause_ms = 0;
        let factory = ScriptedFactory::new(driver);
        let analyst = EchoAnalyst::default();
        let state = AppState::new(config, Arc::new(factory.clone()), Arc::new(analyst.clone()));
        (state, factory, analyst)
    }

    fn submit(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (state, _, _) = state(ScriptedDriver::default());
        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn index_renders_the_form() {
        let (state, _, _) = state(ScriptedDriver::default());
        let response = router(state)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("action=\"/analyze\""));
        assert!(html.contains("<option value=\"Turkish\">Turkish</option>"));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_launch() {
        let (state, factory, _) = state(ScriptedDriver::default());
        let response = router(state)
            .oneshot(submit("handle=alice&limit=50&username=&password="))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Please fill out all required fields."));
        assert!(html.contains("value=\"alice\""));
        assert_eq!(factory.launch_count(), 0);
    }

    #[tokio::test]
    async fn out_of_range_limit_is_a_bad_request() {
        let (state, factory, _) = state(ScriptedDriver::default());
        let response = router(state)
            .oneshot(submit("handle=alice&limit=500&username=u&password=p"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(factory.launch_count(), 0);
    }

    #[tokio::test]
    async fn successful_run_renders_sections() {
        let driver = ScriptedDriver::new(vec![page(&["@alice", "·", "hello", "@alice"])]);
        let (state, factory, analyst) = state(driver.clone());
        let response = router(state)
            .oneshot(submit(
                "handle=%40alice&limit=20&username=u&password=p&language=Turkish\
                 &model=gpt-4o&main_topics=on&aggressive_language=on",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Fetched 1 posts."));
        assert!(html.contains("<h2>Main_topics Analysis</h2>"));
        assert!(html.contains("<h2>Aggressive_language Analysis</h2>"));
        assert!(html.contains("main_topics analysis of 1 posts"));

        assert_eq!(factory.launch_count(), 1);
        assert_eq!(driver.log().opened, vec!["https://x.com/alice"]);
        assert_eq!(driver.log().closes, 1);
        let prompts = analyst.requests.lock().unwrap();
        assert!(prompts[0].prompt.ends_with("Please respond in Turkish."));
    }

    #[tokio::test]
    async fn automation_failure_is_a_server_error() {
        let mut driver = ScriptedDriver::new(Vec::new());
        driver.fail_login = true;
        let (state, _, analyst) = state(driver.clone());
        let response = router(state)
            .oneshot(submit("handle=alice&username=u&password=p&main_topics=on"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = body_text(response).await;
        assert!(html.contains("Analysis failed"));
        assert!(!html.contains("Fetched"));
        assert!(analyst.requests.lock().unwrap().is_empty());
        assert_eq!(driver.log().closes, 1);
    }
}
