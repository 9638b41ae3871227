//! Push transport tests against a minimal socket.io websocket server.

use std::sync::OnceLock;
use std::time::Duration;

use catalog::InventoryFeed;
use common::ProductId;
use futures_util::{SinkExt, StreamExt};
use metrics_exporter_prometheus::PrometheusHandle;
use storefront::PushTransport;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn expect_text<S>(ws: &mut S, expected: &str)
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("client went quiet")
        .expect("client disconnected")
        .expect("websocket error");
    match frame {
        Message::Text(text) => assert_eq!(text.as_str(), expected),
        other => panic!("expected text frame {expected:?}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_ping_and_product_updates() {
    let metrics = get_metrics_handle();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        ws.send(Message::Text(
            r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#.into(),
        ))
        .await
        .unwrap();
        expect_text(&mut ws, "40").await;
        ws.send(Message::Text(r#"40{"sid":"n1"}"#.into())).await.unwrap();

        ws.send(Message::Text("2".into())).await.unwrap();
        expect_text(&mut ws, "3").await;

        // A malformed frame is skipped, not fatal.
        ws.send(Message::Text(r#"42["productUpdated",{"bad":true}]"#.into()))
            .await
            .unwrap();
        ws.send(Message::Text(r#"42["chat","hello"]"#.into()))
            .await
            .unwrap();
        let lamp = r#"[{"id":7,"name":"Lamp","description":"","price":40,"quantity":1}]"#;
        ws.send(Message::Text(format!(r#"42["productUpdated",{lamp}]"#).into()))
            .await
            .unwrap();

        expect_text(&mut ws, "41").await;
    });

    let feed = InventoryFeed::new(8);
    let mut rx = feed.receiver();
    let url = Url::parse(&format!(
        "ws://{addr}/socket.io/?EIO=4&transport=websocket"
    ))
    .unwrap();
    let handle = PushTransport::new(url, feed.clone()).spawn();

    let batch = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no batch published")
        .unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, ProductId::new(7));
    assert_eq!(batch[0].available_stock, 1);
    assert!(handle.is_running());

    handle.stop().await;
    server.await.unwrap();

    let rendered = metrics.render();
    assert!(rendered.contains("push_batches_received_total"));
    assert!(rendered.contains("push_frames_skipped_total"));
}

#[tokio::test]
async fn test_stop_while_server_unreachable() {
    // Bind and drop to get a port nothing listens on.
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let url = Url::parse(&format!("ws://{addr}/socket.io/?EIO=4&transport=websocket")).unwrap();

    let metrics = get_metrics_handle();
    let handle = PushTransport::new(url, InventoryFeed::default()).spawn();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_running());

    tokio::time::timeout(Duration::from_secs(2), handle.stop())
        .await
        .expect("transport did not stop");
    assert!(metrics.render().contains("push_reconnects_total"));
}
