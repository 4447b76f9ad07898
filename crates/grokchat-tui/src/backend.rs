//! Background task that runs chat turns.

use grokchat_client::{ChatClient, ChatTransport};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::event::{BackendCommand, UiEvent};

/// Run the backend loop.
///
/// This function runs in a separate thread with its own tokio runtime. Each
/// `SendConversation` drives one turn, forwarding its events to the UI
/// thread as they arrive. A quit command interrupts a turn in flight.
pub async fn run_backend<T: ChatTransport>(
    client: ChatClient<T>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    mut cmd_rx: mpsc::Receiver<BackendCommand>,
) {
    info!(session = ?client.session_id().map(|id| id.as_str()), "Backend started");

    while let Some(cmd) = cmd_rx.recv().await {
        let messages = match cmd {
            BackendCommand::SendConversation(messages) => messages,
            BackendCommand::Quit => {
                info!("Received quit command, shutting down backend");
                return;
            }
        };

        debug!(count = messages.len(), "Sending conversation");
        let turn_tx = ui_tx.clone();
        let turn = client.stream_turn(messages, move |event| {
            let _ = turn_tx.send(UiEvent::Turn(event));
        });
        tokio::pin!(turn);

        loop {
            tokio::select! {
                _ = &mut turn => break,

                cmd = cmd_rx.recv() => match cmd {
                    Some(BackendCommand::SendConversation(_)) => {
                        warn!("Ignoring message sent while a reply is streaming");
                        let _ = ui_tx.send(UiEvent::Status(
                            "Wait for the current reply to finish".to_string(),
                        ));
                    }
                    Some(BackendCommand::Quit) | None => {
                        info!("Quit during an outstanding turn, abandoning it");
                        return;
                    }
                },
            }
        }
    }

    debug!("Command channel closed");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use grokchat_client::{ByteStream, ClientError};
    use grokchat_core::{ChatRole, SessionId, TurnEvent, WireMessage};

    use super::*;

    /// Replies with a fixed body, or never finishes when `body` is `None`.
    struct FixedTransport {
        body: Option<&'static str>,
    }

    #[async_trait]
    impl ChatTransport for FixedTransport {
        async fn send_conversation(
            &self,
            _messages: &[WireMessage],
            _session_id: Option<&SessionId>,
        ) -> Result<ByteStream, ClientError> {
            let body: ByteStream = match self.body {
                Some(body) => {
                    let chunks: Vec<Result<Vec<u8>, ClientError>> =
                        vec![Ok(body.as_bytes().to_vec())];
                    Box::pin(tokio_stream::iter(chunks))
                }
                None => Box::pin(tokio_stream::pending::<Result<Vec<u8>, ClientError>>()),
            };
            Ok(body)
        }
    }

    fn hello() -> Vec<WireMessage> {
        vec![WireMessage {
            role: ChatRole::User,
            content: "hello".into(),
        }]
    }

    #[tokio::test]
    async fn test_turn_events_forwarded() {
        let client = ChatClient::new(
            FixedTransport {
                body: Some("data: Hi\n\ndata: [DONE]\n\n"),
            },
            None,
        );
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let backend = tokio::spawn(run_backend(client, ui_tx, cmd_rx));

        cmd_tx
            .send(BackendCommand::SendConversation(hello()))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Some(UiEvent::Turn(event)) = ui_rx.recv().await {
            let finished = matches!(event, TurnEvent::Completed | TurnEvent::Failed(_));
            events.push(event);
            if finished {
                break;
            }
        }

        cmd_tx.send(BackendCommand::Quit).await.unwrap();
        backend.await.unwrap();

        assert_eq!(
            events,
            vec![
                TurnEvent::Started,
                TurnEvent::Fragment("Hi".into()),
                TurnEvent::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_quit_interrupts_stalled_turn() {
        let client = ChatClient::new(FixedTransport { body: None }, None);
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        cmd_tx
            .send(BackendCommand::SendConversation(hello()))
            .await
            .unwrap();
        cmd_tx.send(BackendCommand::Quit).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), run_backend(client, ui_tx, cmd_rx))
            .await
            .expect("backend should stop on quit");

        // Quit may win the race before the request is even sent.
        while let Ok(event) = ui_rx.try_recv() {
            assert!(matches!(event, UiEvent::Turn(TurnEvent::Started)));
        }
    }

    #[tokio::test]
    async fn test_closed_channel_stops_backend() {
        let client = ChatClient::new(FixedTransport { body: None }, None);
        let (ui_tx, _ui_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(8);
        drop(cmd_tx);

        run_backend(client, ui_tx, cmd_rx).await;
    }
}
