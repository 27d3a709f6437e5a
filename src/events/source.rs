//! Event bus subscribers.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};

use crate::config::EventsConfig;
use crate::events::decode::{decode_line, RelayEvent};
use crate::events::hub::EventHub;
use crate::resilience::backoff::calculate_backoff;

/// Something that yields relay events. `None` means the source is exhausted.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Option<RelayEvent>;
}

/// Reads newline framed messages from the bus and reconnects with backoff.
pub struct TcpLineSource {
    address: String,
    base_delay_ms: u64,
    max_delay_ms: u64,
    failures: u32,
    lines: Option<Lines<BufReader<TcpStream>>>,
}

impl TcpLineSource {
    pub fn new(config: &EventsConfig) -> Self {
        Self {
            address: config.bus_address.clone(),
            base_delay_ms: config.reconnect_base_ms,
            max_delay_ms: config.reconnect_max_ms,
            failures: 0,
            lines: None,
        }
    }

    async fn connect(&mut self) -> Lines<BufReader<TcpStream>> {
        loop {
            if self.failures > 0 {
                let delay = calculate_backoff(self.failures, self.base_delay_ms, self.max_delay_ms);
                tracing::debug!(address = %self.address, delay = ?delay, "Waiting before reconnect");
                tokio::time::sleep(delay).await;
            }
            match TcpStream::connect(&self.address).await {
                Ok(stream) => {
                    tracing::info!(address = %self.address, "Connected to event bus");
                    self.failures = 0;
                    return BufReader::new(stream).lines();
                }
                Err(e) => {
                    self.failures = self.failures.saturating_add(1);
                    tracing::warn!(address = %self.address, attempt = self.failures, error = %e, "Event bus connection failed");
                }
            }
        }
    }
}

#[async_trait]
impl EventSource for TcpLineSource {
    async fn next_event(&mut self) -> Option<RelayEvent> {
        loop {
            let lines = match self.lines.as_mut() {
                Some(lines) => lines,
                None => {
                    let lines = self.connect().await;
                    self.lines.insert(lines)
                }
            };

            let next = lines.next_line().await;
            match next {
                Ok(Some(line)) => match decode_line(&line) {
                    Ok(event) => return Some(event),
                    Err(e) => tracing::debug!(error = %e, "Dropping undecodable bus message"),
                },
                Ok(None) => {
                    tracing::warn!(address = %self.address, "Event bus closed the connection");
                    self.lines = None;
                    self.failures = 1;
                }
                Err(e) => {
                    tracing::warn!(address = %self.address, error = %e, "Event bus read failed");
                    self.lines = None;
                    self.failures = 1;
                }
            }
        }
    }
}

/// In-process source fed with raw bus lines.
pub struct ChannelSource {
    rx: mpsc::Receiver<String>,
}

impl ChannelSource {
    pub fn new(buffer: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<RelayEvent> {
        while let Some(line) = self.rx.recv().await {
            match decode_line(&line) {
                Ok(event) => return Some(event),
                Err(e) => tracing::debug!(error = %e, "Dropping undecodable bus message"),
            }
        }
        None
    }
}

/// Pump events from `source` into `hub` until the source ends or shutdown
/// is signalled.
pub async fn run_relay<S: EventSource>(mut source: S, hub: EventHub, mut shutdown: broadcast::Receiver<()>) {
    tracing::info!("Event relay started");
    loop {
        tokio::select! {
            event = source.next_event() => match event {
                Some(event) => {
                    hub.broadcast(&event);
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
    tracing::info!("Event relay stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_channel_source_skips_garbage() {
        let (tx, mut source) = ChannelSource::new(8);
        tx.send("garbage".into()).await.unwrap();
        tx.send("EVENT HOST 1/MONITORED <HOST><ID>1</ID></HOST>".into()).await.unwrap();
        drop(tx);

        let event = source.next_event().await.unwrap();
        assert_eq!(event.command, "EVENT HOST 1/MONITORED");
        assert!(source.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_relay_broadcasts_to_hub() {
        let hub = EventHub::new();
        let (_, mut client) = hub.register();
        let (tx, source) = ChannelSource::new(8);
        let (_stop_tx, stop_rx) = broadcast::channel(1);
        let relay = tokio::spawn(run_relay(source, hub.clone(), stop_rx));

        tx.send("EVENT VM 2/ACTIVE/RUNNING <VM><ID>2</ID></VM>".into()).await.unwrap();
        let text = client.recv().await.unwrap();
        let event: RelayEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(event.data, json!({"VM": {"ID": "2"}}));

        drop(tx);
        relay.await.unwrap();
    }

    #[tokio::test]
    async fn test_tcp_source_reads_and_reconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let payload = STANDARD.encode("<VM><ID>7</ID></VM>");

        let line = format!("EVENT VM 7/ACTIVE/RUNNING {payload}\n");
        tokio::spawn(async move {
            for _ in 0..2 {
                let (mut socket, _) = listener.accept().await.unwrap();
                socket.write_all(line.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        let mut source = TcpLineSource::new(&EventsConfig {
            enabled: true,
            bus_address: address,
            reconnect_base_ms: 5,
            reconnect_max_ms: 20,
        });
        for _ in 0..2 {
            let event = source.next_event().await.unwrap();
            assert_eq!(event.data, json!({"VM": {"ID": "7"}}));
        }
    }
}
