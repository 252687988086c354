#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use std::sync::Arc;

use tutorhub::{app::build_app, config::AppConfig, state::AppState};

pub const BOUNDARY: &str = "tutorhub-test-boundary";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_state(AppState::fake())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::from_state(AppState::in_memory(Arc::new(config)))
    }

    fn from_state(state: AppState) -> Self {
        let router = build_app(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("auth_token={token}"));
        }
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn upload(&self, token: &str, filename: &str, data: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/users/me/avatar")
            .header(header::COOKIE, format!("auth_token={token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Registers a user and returns `(user_id, token)`.
    pub async fn register(&self, email: &str) -> (String, String) {
        let res = self
            .json(
                Method::POST,
                "/users",
                None,
                Some(json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": email,
                    "password": "tutor1234",
                    "gender": "Female",
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.json());
        let body = res.json();
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }
}

pub fn profile_body() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "headline": "Maths made friendly",
        "experiences": [
            {
                "title": "Teacher",
                "employmentType": "Full-Time",
                "companyName": "Riverside High",
                "locationType": "On-Site",
                "startDateMonth": "September",
                "startDateYear": 2018,
                "currentlyWorking": true
            }
        ],
        "education": [
            {
                "school": "University of London",
                "degree": "BSc",
                "major": "Mathematics",
                "startDateMonth": "October",
                "startDateYear": 2014,
                "endDateMonth": "June",
                "endDateYear": 2017,
                "gpa": 3.8
            }
        ],
        "skills": ["Algebra", "Calculus"],
        "languages": [{ "language": "English", "proficiency": "Native Speaker" }],
        "hourlyRate": 40,
        "sex": "Female",
        "lessonMethod": "In-Person",
        "lessonLocation": "London",
        "aboutMe": "I love numbers.",
        "aboutLesson": "Worked examples first.",
        "subjects": [{ "subject": "Mathematics", "teachingLevels": "GCSE" }]
    })
}
