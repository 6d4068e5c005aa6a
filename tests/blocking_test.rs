use ollama_client::blocking::OllamaClient;
use ollama_client::{ChatMessage, ClientConfig, Error};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock server on its own runtime; the blocking client runs outside it.
fn start_server(runtime: &Runtime, mocks: Vec<Mock>) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            mock.mount(&server).await;
        }
        server
    })
}

fn client_for(server: &MockServer) -> OllamaClient {
    let config = ClientConfig::new(server.uri()).unwrap().with_model("llama3");
    OllamaClient::new(config).unwrap()
}

#[test]
fn test_blocking_generate_and_models() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![
            Mock::given(method("POST"))
                .and(path("/api/generate"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "X"}))),
            Mock::given(method("GET"))
                .and(path("/api/tags"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "models": [{"name": "llama3"}, {"name": "mistral"}]
                }))),
            Mock::given(method("POST"))
                .and(path("/api/pull"))
                .and(body_json(json!({"name": "mistral"})))
                .respond_with(ResponseTemplate::new(200).set_body_string("{\"status\":\"success\"}\n")),
            Mock::given(method("DELETE"))
                .and(path("/api/delete"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({}))),
        ],
    );

    let client = client_for(&server);
    assert_eq!(client.generate("hi").unwrap(), "X");
    assert_eq!(client.list_models().unwrap(), vec!["llama3", "mistral"]);
    assert!(client.pull_model("mistral").unwrap());
    assert_eq!(client.delete_model("mistral").unwrap(), json!({}));
}

#[test]
fn test_blocking_chat_stream() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"message\":{\"content\":\"a\"}}\n\n{\"message\":{\"content\":\"b\"}}",
            ))],
    );

    let fragments: Vec<String> = client_for(&server)
        .chat_stream(vec![ChatMessage::user("hi")])
        .unwrap()
        .map(|fragment| fragment.unwrap().into_string())
        .collect();
    assert_eq!(
        fragments,
        vec![
            "{\"message\":{\"content\":\"a\"}}",
            "{\"message\":{\"content\":\"b\"}}"
        ]
    );
}

#[test]
fn test_blocking_server_error() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)],
    );

    match client_for(&server).chat(vec![ChatMessage::user("hi")]) {
        Err(Error::Server { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("Expected server error, got {other:?}"),
    }
}
