//! Solana WebSocket Subscriptions Module
//!
//! Real-time launch detection for pump.fun tokens.
//! Subscribes to logs mentioning the bonding curve program, so new
//! launches show up instantly instead of waiting for the next poll.
//!
//! Best Practices:
//! - HTTPS for JSON-RPC, WebSockets ONLY for subscriptions
//! - Reconnection with exponential backoff
//! - Handle connection drops gracefully

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::utils::constants::PUMPFUN_PROGRAM;

// ============================================
// WEBSOCKET CONSTANTS
// ============================================

/// Reconnection base delay (milliseconds)
const WS_RECONNECT_BASE_MS: u64 = 1000;

/// Maximum reconnection delay (milliseconds)
const WS_RECONNECT_MAX_MS: u64 = 30000;

/// Maximum reconnection attempts before giving up
const WS_MAX_RECONNECT_ATTEMPTS: u32 = 10;

// ============================================
// EVENT TYPES
// ============================================

/// A transaction that created a new bonding curve
#[derive(Debug, Clone)]
pub struct LaunchEvent {
    pub signature: String,
    pub slot: u64,
}

/// Unified stream event enum
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Connected,
    Disconnected,
    NewLaunch(LaunchEvent),
    Error(String),
}

// ============================================
// STREAM CLIENT
// ============================================

/// Solana WebSocket client for pump.fun launch detection
pub struct LaunchStream {
    ws_url: String,
    is_connected: Arc<AtomicBool>,
}

impl LaunchStream {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            is_connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    /// Subscribe to pump.fun program logs
    ///
    /// Returns a channel receiver for launch events. The subscription task
    /// reconnects on drops and stops once the receiver is dropped.
    pub fn subscribe_launches(&self) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(100);
        let url = self.ws_url.clone();
        let is_connected = self.is_connected.clone();

        tokio::spawn(async move {
            Self::run_subscription(url, tx, is_connected).await;
        });

        rx
    }

    /// Internal: run subscription with reconnection logic
    async fn run_subscription(
        url: String,
        tx: mpsc::Sender<StreamEvent>,
        is_connected: Arc<AtomicBool>,
    ) {
        let mut reconnect_attempts = 0;
        let mut reconnect_delay = WS_RECONNECT_BASE_MS;

        loop {
            match connect_async(&url).await {
                Ok((ws_stream, _)) => {
                    info!("🔌 WebSocket connected to Solana RPC");
                    is_connected.store(true, Ordering::SeqCst);
                    reconnect_attempts = 0;
                    reconnect_delay = WS_RECONNECT_BASE_MS;

                    let _ = tx.send(StreamEvent::Connected).await;

                    let (mut write, mut read) = ws_stream.split();

                    let subscribe_msg = json!({
                        "jsonrpc": "2.0",
                        "method": "logsSubscribe",
                        "params": [
                            {"mentions": [PUMPFUN_PROGRAM]},
                            {"commitment": "confirmed"}
                        ],
                        "id": 1
                    });

                    // A failed subscribe falls through to the backoff below
                    if let Err(e) = write.send(Message::Text(subscribe_msg.to_string())).await {
                        error!("❌ Failed to send subscription: {}", e);
                    } else {
                        while let Some(msg_result) = read.next().await {
                            match msg_result {
                                Ok(Message::Text(text)) => {
                                    debug!("📨 WS message: {}", &text[..text.len().min(200)]);

                                    if let Some(event) = Self::parse_launch(&text) {
                                        if tx.send(StreamEvent::NewLaunch(event)).await.is_err() {
                                            info!("📪 Receiver dropped, stopping subscription");
                                            return;
                                        }
                                    }
                                }
                                Ok(Message::Ping(data)) => {
                                    let _ = write.send(Message::Pong(data)).await;
                                }
                                Ok(Message::Close(_)) => {
                                    warn!("🔌 WebSocket closed by server");
                                    break;
                                }
                                Err(e) => {
                                    error!("❌ WebSocket error: {}", e);
                                    break;
                                }
                                _ => {}
                            }
                        }
                    }

                    is_connected.store(false, Ordering::SeqCst);
                    let _ = tx.send(StreamEvent::Disconnected).await;
                }
                Err(e) => {
                    error!("❌ WebSocket connection failed: {}", e);
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                }
            }

            // Nobody is listening anymore, so there is no point reconnecting
            if tx.is_closed() {
                info!("📪 Receiver dropped, stopping subscription");
                return;
            }

            reconnect_attempts += 1;
            if reconnect_attempts >= WS_MAX_RECONNECT_ATTEMPTS {
                error!("❌ Max reconnection attempts reached, giving up");
                let _ = tx
                    .send(StreamEvent::Error(
                        "Max reconnection attempts reached".to_string(),
                    ))
                    .await;
                return;
            }

            warn!(
                "🔄 Reconnecting in {}ms (attempt {}/{})",
                reconnect_delay, reconnect_attempts, WS_MAX_RECONNECT_ATTEMPTS
            );
            tokio::time::sleep(std::time::Duration::from_millis(reconnect_delay)).await;

            reconnect_delay = (reconnect_delay * 2).min(WS_RECONNECT_MAX_MS);
        }
    }

    /// Parse a logsNotification into a launch event.
    ///
    /// A launch is a successful transaction whose logs contain the
    /// bonding curve "Instruction: Create" line.
    fn parse_launch(msg: &str) -> Option<LaunchEvent> {
        let json: Value = serde_json::from_str(msg).ok()?;
        let params = json.get("params")?;
        let result = params.get("result")?;

        let slot = result
            .get("context")?
            .get("slot")
            .and_then(|s| s.as_u64())?;

        let value = result.get("value")?;

        // Failed transactions carry an err object
        if !value.get("err")?.is_null() {
            return None;
        }

        let logs = value.get("logs")?.as_array()?;
        let is_create = logs.iter().any(|l| {
            l.as_str()
                .map(|s| s.contains("Instruction: Create"))
                .unwrap_or(false)
        });
        if !is_create {
            return None;
        }

        Some(LaunchEvent {
            signature: value.get("signature")?.as_str()?.to_string(),
            slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(err: Value, logs: Vec<&str>) -> String {
        json!({
            "jsonrpc": "2.0",
            "method": "logsNotification",
            "params": {
                "result": {
                    "context": {"slot": 301234567u64},
                    "value": {
                        "signature": "5h2abc",
                        "err": err,
                        "logs": logs
                    }
                },
                "subscription": 1
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_launch_create() {
        let msg = notification(
            Value::Null,
            vec![
                "Program 6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P invoke [1]",
                "Program log: Instruction: Create",
                "Program 6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P success",
            ],
        );

        let event = LaunchStream::parse_launch(&msg).expect("should parse");
        assert_eq!(event.signature, "5h2abc");
        assert_eq!(event.slot, 301234567);
    }

    #[test]
    fn test_parse_launch_ignores_buys() {
        let msg = notification(
            Value::Null,
            vec![
                "Program 6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P invoke [1]",
                "Program log: Instruction: Buy",
            ],
        );
        assert!(LaunchStream::parse_launch(&msg).is_none());
    }

    #[test]
    fn test_parse_launch_ignores_failed_tx() {
        let msg = notification(
            json!({"InstructionError": [0, "Custom"]}),
            vec!["Program log: Instruction: Create"],
        );
        assert!(LaunchStream::parse_launch(&msg).is_none());
    }

    #[tokio::test]
    async fn test_subscription_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Connection refused plus a closed channel must terminate the loop
        // instead of burning reconnect attempts.
        let finished = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            LaunchStream::run_subscription(
                "ws://127.0.0.1:1".to_string(),
                tx,
                Arc::new(AtomicBool::new(false)),
            ),
        )
        .await;

        assert!(finished.is_ok());
    }
}
