use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{
    Message,
    handshake::server::{ErrorResponse, Request, Response},
    http::StatusCode,
};
use uuid::Uuid;

use crate::actor::model::{CommandRequest, ResponseSignal};
use crate::api::auth::TokenVerifier;
use crate::api::model::{ApiRequest, TRAIN_METHOD};

pub async fn accept_connection(
    stream: TcpStream,
    commands: mpsc::Sender<CommandRequest>,
    verifier: Arc<TokenVerifier>,
) {
    let addr = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(_) => "unknown".to_string(),
    };
    let id = Uuid::new_v4();

    let callback = |req: &Request, response: Response| {
        if is_authorized(req, &verifier) {
            return Ok(response);
        }
        tracing::warn!("Rejected unauthorized handshake from {}", addr);
        let mut rejection = ErrorResponse::new(Some("unauthorized".to_string()));
        *rejection.status_mut() = StatusCode::UNAUTHORIZED;
        Err(rejection)
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("WebSocket handshake failed for address {}: {}", addr, e);
            return;
        }
    };

    tracing::debug!("Accepted connection with ID: {}, address: {}", id, addr);

    let (mut write, mut read) = ws_stream.split();
    let (response_tx, mut response_rx) = mpsc::channel::<ResponseSignal>(100);

    let writer_handle = tokio::spawn(async move {
        while let Some(response) = response_rx.recv().await {
            if let ResponseSignal::Stop = response {
                tracing::debug!("Stopping response handler for ID: {}", id);
                break;
            }

            if let Err(e) = write.send(Message::Text(response.to_string().into())).await {
                tracing::error!("Failed to send response to {}: {}", id, e);
                break;
            }
        }
    });

    while let Some(message) = read.next().await {
        let msg = match message {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("Error reading message from {}: {}", id, e);
                break;
            }
        };
        if !msg.is_text() {
            continue;
        }

        if !handle_text(&msg.to_string(), id, &commands, &response_tx).await {
            break;
        }
    }

    let _ = response_tx.send(ResponseSignal::Stop).await;
    let _ = writer_handle.await;
    tracing::debug!("Connection {} closed", id);
}

fn is_authorized(req: &Request, verifier: &TokenVerifier) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|presented| verifier.verify(presented.trim()))
}

/// Parses one text frame and queues it. A `deferred` frame is sent only once a
/// queue slot is held, so every acknowledged command gets exactly one reply.
/// Returns false when the connection's writer is gone.
async fn handle_text(
    raw: &str,
    owner: Uuid,
    commands: &mpsc::Sender<CommandRequest>,
    response_tx: &mpsc::Sender<ResponseSignal>,
) -> bool {
    let response = match parse_command(raw, owner, response_tx.clone()) {
        Ok(command) => match commands.reserve().await {
            Ok(permit) => {
                let ack = ResponseSignal::Deferred {
                    id: command.request_id.clone(),
                };
                // Ack goes out before the command can reach a worker
                if response_tx.send(ack).await.is_err() {
                    return false;
                }
                permit.send(command);
                return true;
            }
            Err(_) => {
                tracing::warn!("Command intake closed, turning away request from {}", owner);
                ResponseSignal::Error {
                    message: "server is shutting down".to_string(),
                }
            }
        },
        Err(message) => {
            tracing::warn!("Rejected message from {}: {}", owner, message);
            ResponseSignal::Error { message }
        }
    };

    response_tx.send(response).await.is_ok()
}

fn parse_command(
    raw: &str,
    owner: Uuid,
    respond_to: mpsc::Sender<ResponseSignal>,
) -> Result<CommandRequest, String> {
    let request = serde_json::from_str::<ApiRequest>(raw).map_err(|e| e.to_string())?;
    if request.method != TRAIN_METHOD {
        return Err(format!("unknown method `{}`", request.method));
    }

    Ok(CommandRequest {
        owner,
        request_id: request.id,
        command: request.params,
        respond_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handshake(auth: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("ws://localhost/");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_authorization_header() {
        let verifier = TokenVerifier::new("secret").unwrap();
        assert!(is_authorized(&handshake(Some("Bearer secret")), &verifier));
        assert!(!is_authorized(&handshake(Some("Bearer wrong")), &verifier));
        assert!(!is_authorized(&handshake(Some("secret")), &verifier));
        assert!(!is_authorized(&handshake(None), &verifier));
    }

    const TRAIN_FRAME: &str =
        r#"{"id":"9","method":"train","params":{"tier":"t5","unit":"mage","amount":1}}"#;

    #[tokio::test]
    async fn test_handle_text_acks_then_queues() {
        let (commands, mut intake) = mpsc::channel(1);
        let (response_tx, mut response_rx) = mpsc::channel(4);

        assert!(handle_text(TRAIN_FRAME, Uuid::new_v4(), &commands, &response_tx).await);

        assert_eq!(
            response_rx.try_recv().unwrap(),
            ResponseSignal::Deferred { id: "9".to_string() }
        );
        assert_eq!(intake.try_recv().unwrap().request_id, "9");
    }

    #[tokio::test]
    async fn test_handle_text_closed_intake_is_not_acknowledged() {
        let (commands, mut intake) = mpsc::channel::<CommandRequest>(1);
        intake.close();
        let (response_tx, mut response_rx) = mpsc::channel(4);

        assert!(handle_text(TRAIN_FRAME, Uuid::new_v4(), &commands, &response_tx).await);

        assert_eq!(
            response_rx.try_recv().unwrap(),
            ResponseSignal::Error {
                message: "server is shutting down".to_string()
            }
        );
        assert!(response_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_text_bad_frame() {
        let (commands, mut intake) = mpsc::channel(1);
        let (response_tx, mut response_rx) = mpsc::channel(4);

        assert!(handle_text("{}", Uuid::new_v4(), &commands, &response_tx).await);

        assert!(matches!(response_rx.try_recv(), Ok(ResponseSignal::Error { .. })));
        assert!(intake.try_recv().is_err());
    }

    #[test]
    fn test_parse_command() {
        let (tx, _rx) = mpsc::channel(1);
        let owner = Uuid::new_v4();
        let raw = r#"{"id":"42","method":"train","params":{"tier":"t5","unit":"mage","amount":3,"buff":"20"}}"#;

        let command = parse_command(raw, owner, tx).unwrap();
        assert_eq!(command.owner, owner);
        assert_eq!(command.request_id, "42");
        assert_eq!(command.command.amount, 3);
    }

    #[test]
    fn test_parse_command_unknown_method() {
        let (tx, _rx) = mpsc::channel(1);
        let raw = r#"{"id":"1","method":"build","params":{"tier":"t5","unit":"mage","amount":3}}"#;

        assert_eq!(
            parse_command(raw, Uuid::new_v4(), tx).unwrap_err(),
            "unknown method `build`"
        );
    }

    #[test]
    fn test_parse_command_bad_json() {
        let (tx, _rx) = mpsc::channel(1);
        assert!(parse_command("not json", Uuid::new_v4(), tx).is_err());
    }
}
