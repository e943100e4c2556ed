use crate::config::GameConfig;
use crate::error::BridgeError;
use crate::network::protocol::{parse_reply, AiReply, MoveRequest};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

const REQUEST_BUFFER: usize = 8;

/// What the bridge reports back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    Connected,
    Disconnected,
    Reply(AiReply),
}

/// Sending side of the bridge, held by the session.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    tx: mpsc::Sender<MoveRequest>,
}

impl BridgeHandle {
    pub fn new(tx: mpsc::Sender<MoveRequest>) -> Self {
        Self { tx }
    }

    /// Queues a request without blocking. Returns false if it was dropped.
    pub fn request(&self, req: MoveRequest) -> bool {
        match self.tx.try_send(req) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("AI request dropped: {}", e);
                false
            }
        }
    }
}

/// Persistent websocket session to the move-generating AI.
///
/// Reconnects forever with a fixed delay. Requests queued while disconnected
/// are dropped on reconnect; the session asks again after `Connected`.
pub struct AiBridge {
    endpoint: String,
    board_size: usize,
    reconnect_delay: Duration,
}

impl AiBridge {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            board_size: config.board_size,
            reconnect_delay: config.reconnect_delay(),
        }
    }

    /// Runs the bridge on its own task. It stops once every `BridgeHandle`
    /// is dropped or the event receiver goes away.
    pub fn spawn(self, events: mpsc::Sender<BridgeEvent>) -> (BridgeHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        let handle = tokio::spawn(self.run(rx, events));
        (BridgeHandle::new(tx), handle)
    }

    async fn run(
        self,
        mut requests: mpsc::Receiver<MoveRequest>,
        events: mpsc::Sender<BridgeEvent>,
    ) {
        loop {
            let mut connected = false;
            match self.session(&mut requests, &events, &mut connected).await {
                Ok(()) => return,
                Err(e) => tracing::warn!("AI bridge: {}", e),
            }
            if connected && events.send(BridgeEvent::Disconnected).await.is_err() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// One connection lifetime. `Ok` means shut down, `Err` means retry.
    async fn session(
        &self,
        requests: &mut mpsc::Receiver<MoveRequest>,
        events: &mpsc::Sender<BridgeEvent>,
        connected: &mut bool,
    ) -> Result<(), BridgeError> {
        let (ws, _) = tokio_tungstenite::connect_async(self.endpoint.as_str()).await?;
        tracing::info!("connected to AI at {}", self.endpoint);
        *connected = true;

        while requests.try_recv().is_ok() {}
        if events.send(BridgeEvent::Connected).await.is_err() {
            return Ok(());
        }

        let (mut sink, mut stream) = ws.split();
        loop {
            tokio::select! {
                req = requests.recv() => {
                    let Some(req) = req else {
                        let _ = sink.close().await;
                        return Ok(());
                    };
                    let text = serde_json::to_string(&req)
                        .map_err(|e| BridgeError::MalformedMessage(e.to_string()))?;
                    tracing::debug!("AI request: {}", text);
                    sink.send(Message::Text(text)).await?;
                }
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => match parse_reply(&text, self.board_size) {
                        Ok(reply) => {
                            tracing::debug!("AI reply: {:?}", reply);
                            if events.send(BridgeEvent::Reply(reply)).await.is_err() {
                                return Ok(());
                            }
                        }
                        Err(e) => tracing::warn!("discarding AI message: {}", e),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        return Err(tungstenite::Error::ConnectionClosed.into());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThinkTime;
    use crate::core::{Board, Position};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn next_event(rx: &mut mpsc::Receiver<BridgeEvent>) -> BridgeEvent {
        timeout(WAIT, rx.recv())
            .await
            .expect("bridge event timed out")
            .expect("bridge closed")
    }

    #[tokio::test]
    async fn test_exchange_and_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // First connection: greet, answer one request, then hang up.
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(r#"{"message":"welcome"}"#.to_string()))
                .await
                .unwrap();
            let request = loop {
                match ws.next().await.unwrap().unwrap() {
                    Message::Text(text) => break text,
                    _ => continue,
                }
            };
            let req: MoveRequest = serde_json::from_str(&request).unwrap();
            assert_eq!(req.time, "3");
            assert_eq!(req.board.len(), 9);
            ws.send(Message::Text("[2,3]".to_string())).await.unwrap();
            ws.close(None).await.unwrap();

            // Second connection: stay up until the client leaves.
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text("[-1,-1]".to_string())).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let config = GameConfig {
            endpoint: format!("ws://{}", addr),
            reconnect_delay_ms: 50,
            ..GameConfig::default()
        };
        let (events_tx, mut events) = mpsc::channel(16);
        let (handle, task) = AiBridge::new(&config).spawn(events_tx);

        assert_eq!(next_event(&mut events).await, BridgeEvent::Connected);
        assert!(handle.request(MoveRequest::new(&Board::new(9), ThinkTime::default())));
        // The greeting is not a move and never surfaces.
        assert_eq!(
            next_event(&mut events).await,
            BridgeEvent::Reply(AiReply::Play(Position::new(2, 3)))
        );
        assert_eq!(next_event(&mut events).await, BridgeEvent::Disconnected);
        assert_eq!(next_event(&mut events).await, BridgeEvent::Connected);
        assert_eq!(
            next_event(&mut events).await,
            BridgeEvent::Reply(AiReply::Decline)
        );

        drop(handle);
        timeout(WAIT, task).await.unwrap().unwrap();
        timeout(WAIT, server).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_keeps_retrying_without_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = GameConfig {
            endpoint: format!("ws://{}", addr),
            reconnect_delay_ms: 10,
            ..GameConfig::default()
        };
        let (events_tx, mut events) = mpsc::channel(16);
        let (_handle, task) = AiBridge::new(&config).spawn(events_tx);

        // Never connected, so nothing is reported and the task stays alive.
        assert!(timeout(Duration::from_millis(200), events.recv()).await.is_err());
        assert!(!task.is_finished());
        task.abort();
    }
}
