//! Turn driver: sends the history and turns the reply stream into
//! conversation events.

use grokchat_core::{SessionId, TurnError, TurnEvent, WireMessage};
use tracing::{debug, info, warn};

use crate::decoder::{decode_stream, StreamEvent};
use crate::transport::ChatTransport;

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed(TurnError),
}

/// Chat client bound to one transport and session.
pub struct ChatClient<T> {
    transport: T,
    session_id: Option<SessionId>,
}

impl<T: ChatTransport> ChatClient<T> {
    pub fn new(transport: T, session_id: Option<SessionId>) -> Self {
        Self {
            transport,
            session_id,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Run one turn.
    ///
    /// `on_event` sees `Started` once the response is accepted, then each
    /// fragment in arrival order, then exactly one `Completed` or `Failed`.
    /// A transport failure skips `Started`.
    pub async fn stream_turn<F>(&self, messages: Vec<WireMessage>, mut on_event: F) -> TurnOutcome
    where
        F: FnMut(TurnEvent),
    {
        let outcome = self.drive(&messages, &mut on_event).await;
        match &outcome {
            TurnOutcome::Completed => {
                info!("Turn completed");
                on_event(TurnEvent::Completed);
            }
            TurnOutcome::Failed(err) => {
                warn!(error = %err, "Turn failed");
                on_event(TurnEvent::Failed(err.clone()));
            }
        }
        outcome
    }

    async fn drive<F>(&self, messages: &[WireMessage], on_event: &mut F) -> TurnOutcome
    where
        F: FnMut(TurnEvent),
    {
        let body = match self
            .transport
            .send_conversation(messages, self.session_id.as_ref())
            .await
        {
            Ok(body) => body,
            Err(e) => return TurnOutcome::Failed(e.into()),
        };
        on_event(TurnEvent::Started);

        let mut reader = decode_stream(body);
        let mut fragments = 0usize;
        while let Some(item) = reader.next_event().await {
            match item {
                Ok(StreamEvent::Fragment(text)) => {
                    fragments += 1;
                    on_event(TurnEvent::Fragment(text));
                }
                Ok(StreamEvent::Done) => {
                    debug!(fragments, "Stream completed");
                    return TurnOutcome::Completed;
                }
                Ok(StreamEvent::Error(detail)) => {
                    return TurnOutcome::Failed(TurnError::stream(detail));
                }
                Ok(StreamEvent::Truncated) => {
                    debug!(fragments, "Stream ended without completion sentinel");
                    return TurnOutcome::Failed(TurnError::ClosedEarly);
                }
                Err(e) => return TurnOutcome::Failed(e.into()),
            }
        }

        TurnOutcome::Failed(TurnError::ClosedEarly)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use grokchat_core::{ChatRole, Conversation};

    use super::*;
    use crate::error::ClientError;
    use crate::transport::ByteStream;

    /// Transport that replays canned chunks and records what it was sent.
    struct ScriptedTransport {
        status: Option<u16>,
        chunks: Vec<Vec<u8>>,
        sent: Mutex<Vec<(Vec<WireMessage>, Option<SessionId>)>>,
    }

    impl ScriptedTransport {
        fn replying(body: &str) -> Self {
            Self::chunked(vec![body.as_bytes().to_vec()])
        }

        fn chunked(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                status: None,
                chunks,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                status: Some(status),
                ..Self::chunked(Vec::new())
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send_conversation(
            &self,
            messages: &[WireMessage],
            session_id: Option<&SessionId>,
        ) -> Result<ByteStream, ClientError> {
            self.sent
                .lock()
                .unwrap()
                .push((messages.to_vec(), session_id.cloned()));
            if let Some(status) = self.status {
                return Err(ClientError::Status(status));
            }
            let chunks: Vec<Result<Vec<u8>, ClientError>> =
                self.chunks.iter().cloned().map(Ok).collect();
            Ok(Box::pin(tokio_stream::iter(chunks)))
        }
    }

    async fn send(
        client: &ChatClient<ScriptedTransport>,
        conversation: &mut Conversation,
        text: &str,
    ) -> TurnOutcome {
        conversation.append_user_message(text).unwrap();
        let messages = conversation.wire_messages();
        client
            .stream_turn(messages, |event| conversation.apply(event).unwrap())
            .await
    }

    fn contents(conversation: &Conversation) -> Vec<(ChatRole, String)> {
        conversation
            .messages()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_reply() {
        let client = ChatClient::new(
            ScriptedTransport::replying("data: Hi\n\ndata: there\n\ndata: [DONE]\n\n"),
            Some(SessionId::new("session-1")),
        );
        let mut conversation = Conversation::new();

        let outcome = send(&client, &mut conversation, "hi").await;

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(
            contents(&conversation),
            vec![
                (ChatRole::User, "hi".to_string()),
                (ChatRole::Assistant, "Hi there".to_string()),
            ]
        );
        assert!(!conversation.is_loading());
        assert!(conversation.last_error().is_none());

        let sent = client.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].0,
            vec![WireMessage {
                role: ChatRole::User,
                content: "hi".into(),
            }]
        );
        assert_eq!(sent[0].1, Some(SessionId::new("session-1")));
    }

    #[tokio::test]
    async fn test_second_turn_sends_full_history() {
        let client = ChatClient::new(
            ScriptedTransport::replying("data: ok\n\ndata: [DONE]\n\n"),
            None,
        );
        let mut conversation = Conversation::new();

        send(&client, &mut conversation, "one").await;
        send(&client, &mut conversation, "two").await;

        let sent = client.transport.sent.lock().unwrap();
        let roles: Vec<ChatRole> = sent[1].0.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(sent[1].1, None);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_status() {
        let client = ChatClient::new(ScriptedTransport::failing(500), None);
        let mut conversation = Conversation::new();

        let outcome = send(&client, &mut conversation, "hi").await;

        assert_eq!(
            outcome,
            TurnOutcome::Failed(TurnError::Transport { status: 500 })
        );
        assert_eq!(conversation.last_error(), Some("Chat API error: 500"));
        assert_eq!(conversation.messages().len(), 1);
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_stream_error_detail() {
        let client = ChatClient::new(
            ScriptedTransport::replying("data: Partial\n\ndata: [ERROR] disk full\n\n"),
            None,
        );
        let mut conversation = Conversation::new();

        send(&client, &mut conversation, "hi").await;

        assert_eq!(conversation.last_error(), Some("disk full"));
        assert_eq!(conversation.messages()[1].content, "Partial");
    }

    #[tokio::test]
    async fn test_blank_stream_error_shows_unknown_error() {
        let client = ChatClient::new(ScriptedTransport::replying("data: [ERROR]   \n\n"), None);
        let mut conversation = Conversation::new();

        let outcome = send(&client, &mut conversation, "hi").await;

        assert_eq!(
            outcome,
            TurnOutcome::Failed(TurnError::Unknown("Unknown error".into()))
        );
        assert_eq!(conversation.last_error(), Some("Unknown error"));
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_closed_early_keeps_partial_content() {
        let client = ChatClient::new(
            ScriptedTransport::chunked(vec![
                b"data: Hello\n\n".to_vec(),
                b"data: wor".to_vec(),
            ]),
            None,
        );
        let mut conversation = Conversation::new();

        let outcome = send(&client, &mut conversation, "hi").await;

        assert_eq!(outcome, TurnOutcome::Failed(TurnError::ClosedEarly));
        assert_eq!(conversation.messages()[1].content, "Hello");
        assert_eq!(
            conversation.last_error(),
            Some("Connection closed before the reply completed")
        );
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let client = ChatClient::new(
            ScriptedTransport::chunked(vec![
                b"data: a\n".to_vec(),
                b"\ndata: b\n\nda".to_vec(),
                b"ta: [DONE]\n\n".to_vec(),
            ]),
            None,
        );

        let mut events = Vec::new();
        client
            .stream_turn(Vec::new(), |event| events.push(event))
            .await;

        assert_eq!(
            events,
            vec![
                TurnEvent::Started,
                TurnEvent::Fragment("a".into()),
                TurnEvent::Fragment("b".into()),
                TurnEvent::Completed,
            ]
        );
    }
}
