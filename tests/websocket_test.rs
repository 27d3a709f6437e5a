//! Event relay over WebSocket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_tungstenite::{connect_async, tungstenite};

use fireedge_gateway::events::{run_relay, ChannelSource, EventHub, RelayEvent};

use common::{spawn_with, token_for, zone, EchoBackend};

async fn wait_for_clients(hub: &EventHub, count: usize) {
    for _ in 0..100 {
        if hub.client_count() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} relay clients, found {}", hub.client_count());
}

#[tokio::test]
async fn test_authenticated_client_receives_events() {
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], Arc::new(EchoBackend::new())).await;
    let token = token_for("oneadmin", "t", 600);

    let (mut socket, _) = connect_async(gateway.ws_url(&format!("?token={token}")))
        .await
        .unwrap();
    wait_for_clients(&gateway.hub, 1).await;

    let event = RelayEvent {
        command: "EVENT VM 3/ACTIVE/RUNNING".into(),
        data: json!({"VM": {"ID": "3"}}),
    };
    assert_eq!(gateway.hub.broadcast(&event), 1);

    let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let received: Value = serde_json::from_str(message.to_text().unwrap()).unwrap();
    assert_eq!(received, json!({"command": "EVENT VM 3/ACTIVE/RUNNING", "data": {"VM": {"ID": "3"}}}));

    socket.close(None).await.unwrap();
    wait_for_clients(&gateway.hub, 0).await;
}

#[tokio::test]
async fn test_bus_lines_reach_client() {
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], Arc::new(EchoBackend::new())).await;
    let (tx, source) = ChannelSource::new(4);
    let (_stop, stop_rx) = broadcast::channel(1);
    tokio::spawn(run_relay(source, gateway.hub.clone(), stop_rx));

    let token = token_for("oneadmin", "t", 600);
    let (mut socket, _) = connect_async(gateway.ws_url(&format!("?token={token}")))
        .await
        .unwrap();
    wait_for_clients(&gateway.hub, 1).await;

    tx.send("EVENT HOST 4/MONITORED <HOST><ID>4</ID><STATE>2</STATE></HOST>".into())
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let received: RelayEvent = serde_json::from_str(message.to_text().unwrap()).unwrap();
    assert_eq!(received.command, "EVENT HOST 4/MONITORED");
    assert_eq!(received.data, json!({"HOST": {"ID": "4", "STATE": "2"}}));
}

#[tokio::test]
async fn test_invalid_token_refused_before_upgrade() {
    let gateway = spawn_with(vec![zone(0, "http://zone0/RPC2")], Arc::new(EchoBackend::new())).await;

    for query in ["", "?token=garbage"] {
        match connect_async(gateway.ws_url(query)).await {
            Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
            other => panic!("expected HTTP 401, got {:?}", other.map(|_| ())),
        }
    }
    assert_eq!(gateway.hub.client_count(), 0);
}
