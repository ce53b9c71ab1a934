//! Pipeline driven by the real HTTP client against a mockito backend.

mod common;

use common::{test_chat, test_settings, MockBot};
use llm_client::{EnvLlmConfig, HttpBackendClient};
use mockito::Matcher;
use relay_bot::{PhraseBook, PipelineOutcome, SessionRegistry, StreamingPipeline};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const CHAT_PATH: &str = "/v1/chat/completions";

fn sse_event(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"choices": [{"delta": {"content": content}}]})
    )
}

fn pipeline(bot: &Arc<MockBot>, base_url: String) -> StreamingPipeline {
    let config = EnvLlmConfig {
        base_url,
        ..EnvLlmConfig::default()
    };
    let backend = HttpBackendClient::new(config, Arc::new(|| "fallback".to_string())).unwrap();
    let mut settings = test_settings();
    settings.min_edit_interval = Duration::ZERO;
    let sessions = Arc::new(SessionRegistry::new(&settings));
    StreamingPipeline::new(
        bot.clone(),
        Arc::new(backend),
        sessions,
        Arc::new(PhraseBook::with_defaults()),
        settings,
    )
}

/// **Test: SSE answer with a think section ends as formatted MarkdownV2**
///
/// **Setup:** Backend streams a think section, then `**НГУ** находится в Новосибирске.`
/// **Expected:** Final edit `*НГУ* находится в Новосибирске\.`; no edit shows the reasoning.
#[tokio::test]
async fn test_streamed_answer_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let body = [
        sse_event("<think>"),
        sse_event("пользователь спрашивает"),
        sse_event("</think>"),
        sse_event("**НГУ**"),
        sse_event(" находится в Новосибирске."),
        "data: [DONE]\n\n".to_string(),
    ]
    .concat();
    let mock = server
        .mock("POST", CHAT_PATH)
        .match_query(Matcher::UrlEncoded("stream".into(), "true".into()))
        .match_body(Matcher::PartialJson(json!({
            "stream": true,
            "user": test_chat().id.to_string(),
            "messages": [{"role": "user", "content": "Где НГУ?"}]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let bot = MockBot::new();
    let pipeline = pipeline(&bot, server.url());
    let outcome = pipeline.handle_message(&test_chat(), 7, "Где НГУ?").await;

    mock.assert_async().await;
    assert_eq!(outcome, PipelineOutcome::Completed);
    assert_eq!(
        bot.last_markdown_edit().as_deref(),
        Some(r"*НГУ* находится в Новосибирске\.")
    );
    assert!(bot.edits().iter().all(|e| !e.text.contains("спрашивает")));
}

/// **Test: Failed stream falls back to the non-streaming endpoint**
///
/// **Setup:** Streaming request answers 500; plain request answers 200 with content.
/// **Expected:** Non-streaming answer is delivered and recorded.
#[tokio::test]
async fn test_stream_failure_falls_back_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _stream = server
        .mock("POST", CHAT_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(500)
        .create_async()
        .await;
    let plain = server
        .mock("POST", CHAT_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({"stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Академгородок"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let bot = MockBot::new();
    let pipeline = pipeline(&bot, server.url());
    let outcome = pipeline.handle_message(&test_chat(), 7, "Где НГУ?").await;

    plain.assert_async().await;
    assert_eq!(outcome, PipelineOutcome::FallbackCompleted);
    assert_eq!(bot.last_markdown_edit().as_deref(), Some("Академгородок"));
    assert_eq!(pipeline.sessions().history.len(test_chat().id), 2);
}
