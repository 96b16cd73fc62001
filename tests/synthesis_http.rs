//! Integration tests for the REST surface.
//!
//! Each test spins up an Axum server on a random port and exercises the real
//! HTTP contract with reqwest.

mod common;

use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::timeout;

use common::{Behavior, ServerOptions, StubLlm, TEST_TIMEOUT, start_server};

fn blog_body() -> Value {
    json!({
        "templateType": "blog",
        "inputs": {
            "topic": "AI 윤리",
            "targetAudience": "대학생",
            "tone": "전문적으로",
            "constraints": "없음"
        }
    })
}

async fn post(port: u16, path: &str, body: &Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}{path}"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

// ── /api/generate-prompt ─────────────────────────────────────────────

#[tokio::test]
async fn blog_inputs_produce_final_artifact() {
    timeout(TEST_TIMEOUT, async {
        let llm = StubLlm::new(Behavior::Reply("대학생을 위한 AI 윤리 이야기"));
        let port = start_server(llm.clone(), ServerOptions::default()).await;

        let (status, json) = post(port, "/api/generate-prompt", &blog_body()).await;
        assert_eq!(status, 200);
        assert_eq!(json["finalArtifact"], "대학생을 위한 AI 윤리 이야기");
        assert_eq!(llm.calls(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn missing_topic_is_invalid_input_naming_the_field() {
    timeout(TEST_TIMEOUT, async {
        let llm = StubLlm::new(Behavior::Reply("unused"));
        let port = start_server(llm.clone(), ServerOptions::default()).await;

        let mut body = blog_body();
        body["inputs"].as_object_mut().unwrap().remove("topic");
        let (status, json) = post(port, "/api/generate-prompt", &body).await;

        assert_eq!(status, 400);
        assert_eq!(json["error"], "INVALID_INPUT");
        assert!(json["fields"]["topic"].as_array().is_some_and(|m| !m.is_empty()));
        assert_eq!(llm.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_template_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let llm = StubLlm::new(Behavior::Reply("unused"));
        let port = start_server(llm.clone(), ServerOptions::default()).await;

        let body = json!({ "templateType": "poem", "inputs": { "topic": "가을" } });
        let (status, json) = post(port, "/api/generate-prompt", &body).await;

        assert_eq!(status, 400);
        assert_eq!(json["error"], "INVALID_TEMPLATE_TYPE");
        assert_eq!(json["message"], "지원하지 않는 템플릿 종류입니다.");
        assert!(json.get("fields").is_none());
        assert_eq!(llm.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_body_is_invalid_input_without_fields() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server(StubLlm::new(Behavior::Reply("x")), ServerOptions::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/generate-prompt"))
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["error"], "INVALID_INPUT");
        assert_eq!(json["message"], "필수 입력값이 누락되었습니다.");
        assert!(json.get("fields").is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn eleventh_request_in_window_is_throttled() {
    timeout(TEST_TIMEOUT, async {
        let llm = StubLlm::new(Behavior::Reply("ok"));
        let port = start_server(llm.clone(), ServerOptions::default()).await;

        for i in 0..10 {
            let (status, _) = post(port, "/api/generate-prompt", &blog_body()).await;
            assert_eq!(status, 200, "request {i}");
        }

        // Invalid inputs would be a 400, but admission runs first.
        let body = json!({ "templateType": "poem", "inputs": {} });
        let (status, json) = post(port, "/api/generate-prompt", &body).await;
        assert_eq!(status, 429);
        assert_eq!(json["error"], "TOO_MANY_REQUESTS");
        assert_eq!(llm.calls(), 10);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn callers_are_limited_independently_by_forwarded_address_behind_proxy() {
    timeout(TEST_TIMEOUT, async {
        let options = ServerOptions {
            rate_limit: 1,
            trust_forwarded: true,
            ..Default::default()
        };
        let port = start_server(StubLlm::new(Behavior::Reply("ok")), options).await;
        let client = reqwest::Client::new();
        let url = format!("http://127.0.0.1:{port}/api/generate-prompt");

        let send = |ip: &'static str| {
            client
                .post(&url)
                .header("x-forwarded-for", ip)
                .json(&blog_body())
                .send()
        };
        assert_eq!(send("203.0.113.1").await.unwrap().status().as_u16(), 200);
        assert_eq!(send("203.0.113.1").await.unwrap().status().as_u16(), 429);
        assert_eq!(send("203.0.113.2").await.unwrap().status().as_u16(), 200);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rotated_forwarded_headers_share_the_peer_bucket() {
    timeout(TEST_TIMEOUT, async {
        let options = ServerOptions {
            rate_limit: 1,
            ..Default::default()
        };
        let llm = StubLlm::new(Behavior::Reply("ok"));
        let port = start_server(llm.clone(), options).await;
        let client = reqwest::Client::new();
        let url = format!("http://127.0.0.1:{port}/api/generate-prompt");

        let mut statuses = Vec::new();
        for i in 1..=5 {
            let resp = client
                .post(&url)
                .header("x-forwarded-for", format!("198.51.100.{i}"))
                .header("x-real-ip", format!("198.51.100.{i}"))
                .json(&blog_body())
                .send()
                .await
                .unwrap();
            statuses.push(resp.status().as_u16());
        }
        assert_eq!(statuses, vec![200, 429, 429, 429, 429]);
        assert_eq!(llm.calls(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn blank_template_type_is_invalid_input() {
    timeout(TEST_TIMEOUT, async {
        let llm = StubLlm::new(Behavior::Reply("unused"));
        let port = start_server(llm.clone(), ServerOptions::default()).await;

        for tag in ["", "   "] {
            let body = json!({ "templateType": tag, "inputs": { "topic": "x" } });
            let (status, json) = post(port, "/api/generate-prompt", &body).await;
            assert_eq!(status, 400, "tag: {tag:?}");
            assert_eq!(json["error"], "INVALID_INPUT");
            assert_eq!(json["message"], "필수 입력값이 누락되었습니다.");
            assert!(json.get("fields").is_none());
        }
        assert_eq!(llm.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn backend_failure_is_generic() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server(StubLlm::new(Behavior::Fail), ServerOptions::default()).await;

        let (status, json) = post(port, "/api/generate-prompt", &blog_body()).await;
        assert_eq!(status, 500);
        assert_eq!(json["error"], "GENERATION_FAILED");
        assert_eq!(json["message"], "프롬프트 생성에 실패했습니다.");
        assert!(!json.to_string().contains("sk-ant-secret"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn hung_backend_times_out_as_generation_failed() {
    timeout(TEST_TIMEOUT, async {
        let options = ServerOptions {
            generation_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let port = start_server(StubLlm::new(Behavior::Hang), options).await;

        let (status, json) = post(port, "/api/generate-prompt", &blog_body()).await;
        assert_eq!(status, 500);
        assert_eq!(json["error"], "GENERATION_FAILED");
    })
    .await
    .expect("test timed out");
}

// ── /api/templates, /health ──────────────────────────────────────────

#[tokio::test]
async fn templates_endpoint_lists_flows() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server(StubLlm::new(Behavior::Reply("x")), ServerOptions::default()).await;

        let json: Value = reqwest::get(format!("http://127.0.0.1:{port}/api/templates"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let templates = json["templates"].as_array().unwrap();
        let tags: Vec<&str> = templates
            .iter()
            .map(|t| t["templateType"].as_str().unwrap())
            .collect();
        assert_eq!(tags, vec!["blog", "email", "naming", "journal"]);

        let blog_steps = templates[0]["steps"].as_array().unwrap();
        let last = blog_steps.last().unwrap();
        assert_eq!(last["terminal"], true);
        assert_eq!(last["suggestions"][0]["label"], "✨ 프롬프트 생성하기");
        assert_eq!(last["suggestions"][0]["triggersFinal"], true);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server(StubLlm::new(Behavior::Reply("x")), ServerOptions::default()).await;
        let json: Value = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["status"], "ok");
    })
    .await
    .expect("test timed out");
}

// ── /api/conversation/step ───────────────────────────────────────────

#[tokio::test]
async fn stateless_steps_walk_a_blog_conversation() {
    timeout(TEST_TIMEOUT, async {
        let llm = StubLlm::new(Behavior::Reply("완성된 초안"));
        let port = start_server(llm.clone(), ServerOptions::default()).await;

        let (status, greeting) = post(port, "/api/conversation/step", &json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(greeting["phase"], "idle");
        assert_eq!(greeting["suggestions"].as_array().unwrap().len(), 4);

        let turns = [
            json!({ "type": "suggestion", "label": "블로그 글쓰기" }),
            json!({ "type": "text", "text": "AI 윤리" }),
            json!({ "type": "suggestion", "label": "대학생" }),
            json!({ "type": "suggestion", "label": "전문적으로" }),
            json!({ "type": "text", "text": "없음" }),
        ];
        let mut state = greeting["state"].clone();
        for input in turns {
            let (status, json) =
                post(port, "/api/conversation/step", &json!({ "state": state, "input": input })).await;
            assert_eq!(status, 200);
            state = json["state"].clone();
        }
        assert_eq!(state["stepIndex"], 4);
        assert_eq!(state["collectedInputs"]["constraints"], "없음");

        let trigger = json!({ "type": "suggestion", "label": "✨ 프롬프트 생성하기" });
        let (status, json) =
            post(port, "/api/conversation/step", &json!({ "state": state, "input": trigger })).await;
        assert_eq!(status, 200);
        assert_eq!(json["phase"], "idle");
        let fin = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["kind"] == "final")
            .unwrap();
        assert_eq!(fin["text"], "완성된 초안");
        assert_eq!(json["state"], json!({ "stepIndex": 0, "collectedInputs": {} }));
        assert_eq!(llm.calls(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn short_answer_is_rejected_over_http() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server(StubLlm::new(Behavior::Reply("x")), ServerOptions::default()).await;

        let state = json!({ "templateType": "blog", "stepIndex": 0, "collectedInputs": {} });
        let input = json!({ "type": "text", "text": "AI" });
        let (status, json) =
            post(port, "/api/conversation/step", &json!({ "state": state, "input": input })).await;
        assert_eq!(status, 200);
        assert_eq!(json["phase"], "collecting");
        assert_eq!(json["messages"][0]["kind"], "rejection");
        assert_eq!(json["state"]["stepIndex"], 0);
        assert_eq!(json["state"]["rejectedField"], "topic");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn inconsistent_state_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server(StubLlm::new(Behavior::Reply("x")), ServerOptions::default()).await;

        let state = json!({ "templateType": "email", "stepIndex": 1, "collectedInputs": { "topic": "x" } });
        let input = json!({ "type": "text", "text": "안녕하세요 회의 일정 변경 요청" });
        let (status, json) =
            post(port, "/api/conversation/step", &json!({ "state": state, "input": input })).await;
        assert_eq!(status, 400);
        assert_eq!(json["error"], "INVALID_INPUT");
    })
    .await
    .expect("test timed out");
}
