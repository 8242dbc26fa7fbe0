use super::*;
use crate::chat::ChatResponse;
use crate::chat::message::UserBackground;
use crate::test_utils::test_helpers::{
    CannedResponse, CannedServer, request_body, request_line, run_async,
};
use std::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn chat_body(message: &str) -> ChatBody {
    ChatBody {
        message: message.to_string(),
        session_id: None,
        user_background: UserBackground::default(),
        top_k: 3,
    }
}

fn drain(rx: &mpsc::Receiver<ChatResponse>) -> Vec<ChatResponse> {
    rx.try_iter().collect()
}

#[test]
fn test_new_trims_trailing_slash() {
    let client = BackendClient::new("http://localhost:8000/api/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api");
}

#[test]
fn test_api_error_display() {
    let err = GatewayError::Api {
        code: 503,
        message: "down".to_string(),
    };
    assert_eq!(err.to_string(), "HTTP error! status: 503");
}

#[test]
fn test_stream_tokens_split_across_reads() {
    let server = CannedServer::start(vec![CannedResponse::event_stream(&[
        "data: {\"type\":\"session\",\"session_id\":\"s-1\"}\n\ndata: {\"type\":\"tok",
        "en\",\"content\":\"Hel\"}\n\n",
        "data: {\"type\":\"token\",\"content\":\"lo\"}\n\ndata: {\"type\":\"done\"}\n\n",
    ])]);
    let client = BackendClient::new(&server.base_url).unwrap();
    let (tx, rx) = mpsc::channel();

    let result = run_async(client.stream_with_cancel(
        &chat_body("Hi"),
        7,
        CancellationToken::new(),
        tx,
    ));
    assert!(result.is_ok());

    let responses = drain(&rx);
    assert_eq!(
        responses,
        vec![
            ChatResponse::Opened { request_id: 7 },
            ChatResponse::Session {
                session_id: "s-1".to_string(),
                request_id: 7
            },
            ChatResponse::Token {
                text: "Hel".to_string(),
                request_id: 7
            },
            ChatResponse::Token {
                text: "lo".to_string(),
                request_id: 7
            },
            ChatResponse::Done { request_id: 7 },
        ]
    );

    let requests = server.finish();
    assert_eq!(request_line(&requests[0]), "POST /api/rag/chat/stream HTTP/1.1");
    let body = request_body(&requests[0]);
    assert_eq!(body["message"], "Hi");
    assert!(body["session_id"].is_null());
    assert_eq!(body["top_k"], 3);
    assert_eq!(body["user_background"]["preferred_language"], "en");
}

#[test]
fn test_stream_parses_final_line_without_newline() {
    let server = CannedServer::start(vec![CannedResponse::event_stream(&[
        "data: {\"type\":\"token\",\"content\":\"A\"}\n",
        "data: {\"type\":\"done\"}",
    ])]);
    let client = BackendClient::new(&server.base_url).unwrap();
    let (tx, rx) = mpsc::channel();

    run_async(client.stream_with_cancel(&chat_body("q"), 1, CancellationToken::new(), tx))
        .unwrap();

    let responses = drain(&rx);
    assert_eq!(responses.last(), Some(&ChatResponse::Done { request_id: 1 }));
    server.finish();
}

#[test]
fn test_stream_non_success_status() {
    let server = CannedServer::start(vec![CannedResponse::json(500, "{\"detail\":\"boom\"}")]);
    let client = BackendClient::new(&server.base_url).unwrap();
    let (tx, rx) = mpsc::channel();

    let result = run_async(client.stream_with_cancel(
        &chat_body("q"),
        1,
        CancellationToken::new(),
        tx,
    ));

    match result {
        Err(GatewayError::Api { code, .. }) => assert_eq!(code, 500),
        other => panic!("expected Api error, got {:?}", other),
    }
    // Nothing was opened, so no empty assistant message may appear
    assert!(drain(&rx).is_empty());
    server.finish();
}

#[test]
fn test_stream_pre_cancelled_never_connects() {
    let client = BackendClient::new("http://127.0.0.1:9/api").unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let (tx, rx) = mpsc::channel();

    let result = run_async(client.stream_with_cancel(&chat_body("q"), 1, token, tx));

    assert!(matches!(result, Err(GatewayError::Cancelled)));
    assert!(drain(&rx).is_empty());
}

#[test]
fn test_stream_cancelled_mid_stream() {
    let server = CannedServer::start(vec![
        CannedResponse::event_stream(&[
            "data: {\"type\":\"token\",\"content\":\"first\"}\n\n",
            "data: {\"type\":\"token\",\"content\":\"second\"}\n\n",
        ])
        .with_delay(std::time::Duration::from_millis(300)),
    ]);
    let client = BackendClient::new(&server.base_url).unwrap();
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel();

    let cancel = token.clone();
    let result = run_async(async move {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            cancel.cancel();
        });
        client.stream_with_cancel(&chat_body("q"), 3, token, tx).await
    });

    assert!(matches!(result, Err(GatewayError::Cancelled)));
    let responses = drain(&rx);
    assert!(
        !responses
            .iter()
            .any(|r| matches!(r, ChatResponse::Token { .. })),
        "no tokens should arrive after cancellation: {:?}",
        responses
    );
}

#[test]
fn test_send_chat_route() {
    let server = CannedServer::start(vec![CannedResponse::json(
        200,
        r#"{"message":"ROS 2 is middleware.","session_id":"s-5","sources":[]}"#,
    )]);
    let client = BackendClient::new(&server.base_url).unwrap();

    let reply = run_async(client.send(&SendRoute::Chat(chat_body("What is ROS 2?")))).unwrap();

    assert_eq!(reply.content, "ROS 2 is middleware.");
    assert_eq!(reply.session_id.as_deref(), Some("s-5"));
    let requests = server.finish();
    assert_eq!(request_line(&requests[0]), "POST /api/rag/chat HTTP/1.1");
}

#[test]
fn test_send_strict_selection_route() {
    let server = CannedServer::start(vec![CannedResponse::json(
        200,
        r#"{"answer":"It describes a PID loop."}"#,
    )]);
    let client = BackendClient::new(&server.base_url).unwrap();
    let route = SendRoute::AnswerFromSelection(SelectionAnswerBody {
        selected_text: "PID control".to_string(),
        question: "Explain this: \"PID control\"".to_string(),
        user_background: UserBackground::default(),
    });

    let reply = run_async(client.send(&route)).unwrap();

    assert_eq!(reply.content, "It describes a PID loop.");
    assert_eq!(reply.session_id, None);
    let requests = server.finish();
    assert_eq!(
        request_line(&requests[0]),
        "POST /api/rag/answer-from-selection HTTP/1.1"
    );
    let body = request_body(&requests[0]);
    assert_eq!(body["selected_text"], "PID control");
    assert!(body.get("top_k").is_none());
}

#[test]
fn test_send_selection_query_route() {
    let server = CannedServer::start(vec![CannedResponse::json(200, r#"{"answer":"ok"}"#)]);
    let client = BackendClient::new(&server.base_url).unwrap();
    let route = SendRoute::SelectionQuery(SelectionQueryBody {
        selected_text: "kinematics".to_string(),
        question: "Explain this: \"kinematics\"".to_string(),
        user_background: UserBackground::default(),
        top_k: 3,
    });

    run_async(client.send(&route)).unwrap();

    let requests = server.finish();
    assert_eq!(request_line(&requests[0]), "POST /api/rag/selection-query HTTP/1.1");
    assert_eq!(request_body(&requests[0])["top_k"], 3);
}

#[test]
fn test_send_non_success_status() {
    let server = CannedServer::start(vec![CannedResponse::json(404, "{}")]);
    let client = BackendClient::new(&server.base_url).unwrap();

    let err = run_async(client.send(&SendRoute::Chat(chat_body("q")))).unwrap_err();

    assert_eq!(err.to_string(), "HTTP error! status: 404");
    server.finish();
}

#[test]
fn test_send_unreachable_backend_is_network_error() {
    // Port 9 (discard) is not listening on loopback in test environments
    let client = BackendClient::new("http://127.0.0.1:9/api").unwrap();

    let err = run_async(client.send(&SendRoute::Chat(chat_body("q")))).unwrap_err();

    assert!(matches!(err, GatewayError::Network { .. }), "got {:?}", err);
}

#[test]
fn test_health() {
    let server = CannedServer::start(vec![CannedResponse::json(200, r#"{"status":"healthy"}"#)]);
    let client = BackendClient::new(&server.base_url).unwrap();

    let health = run_async(client.health()).unwrap();

    assert_eq!(health.status, "healthy");
    let requests = server.finish();
    assert_eq!(request_line(&requests[0]), "GET /api/health HTTP/1.1");
}
