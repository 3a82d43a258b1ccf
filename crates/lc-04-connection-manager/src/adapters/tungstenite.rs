//! # Tungstenite Dialer
//!
//! One task per socket pumps frames both ways, answers pings and reports
//! the end of the socket as a [`LinkEvent`].

use crate::domain::ConnectionError;
use crate::ports::{LinkEvent, WebSocketDialer, WebSocketLink};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use shared_types::Node;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::debug;

/// Dials nodes over `ws://` or `wss://` with tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteDialer;

#[async_trait]
impl WebSocketDialer for TungsteniteDialer {
    async fn dial(&self, node: &Node) -> Result<WebSocketLink, ConnectionError> {
        let url = node.websocket_url();
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ConnectionError::Dial {
                node: node.clone(),
                reason: e.to_string(),
            })?;
        debug!(node = %node, url = %url, "Websocket handshake complete");

        let (mut write, mut read) = stream.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<String>();
        let (incoming_tx, incoming) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = outgoing_rx.recv() => match frame {
                        Some(text) => {
                            if let Err(e) = write.send(Message::Text(text.into())).await {
                                let _ = incoming_tx.send(LinkEvent::Failed(e.to_string()));
                                break;
                            }
                        }
                        None => {
                            let _ = write.send(Message::Close(None)).await;
                            let _ = incoming_tx.send(LinkEvent::Closed);
                            break;
                        }
                    },
                    message = read.next() => match message {
                        Some(Ok(Message::Text(text))) => {
                            if incoming_tx.send(LinkEvent::Text(text.as_str().to_owned())).is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            let _ = incoming_tx.send(LinkEvent::Closed);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = incoming_tx.send(LinkEvent::Failed(e.to_string()));
                            break;
                        }
                    },
                }
            }
        });

        Ok(WebSocketLink { outgoing, incoming })
    }
}
