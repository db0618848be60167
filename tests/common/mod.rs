//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use firehose_gateway::config::GatewayConfig;
use firehose_gateway::lifecycle::Gateway;

pub const ACCESS_KEY: &str = "test-secret";

/// One Message-mode entry as the receiver decoded it: `[tag, time, record, option]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardEntry(pub String, pub i64, pub Value, pub Value);

/// A Fluent Forward receiver that decodes every entry it is sent.
pub struct MockReceiver {
    pub addr: SocketAddr,
    entries: Arc<Mutex<Vec<ForwardEntry>>>,
}

impl MockReceiver {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let entries = Arc::new(Mutex::new(Vec::new()));

        let sink = entries.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        let sink = sink.clone();
                        tokio::spawn(async move {
                            let mut pending = Vec::new();
                            let mut chunk = [0u8; 4096];
                            loop {
                                match socket.read(&mut chunk).await {
                                    Ok(0) | Err(_) => break,
                                    Ok(n) => pending.extend_from_slice(&chunk[..n]),
                                }
                                drain_entries(&mut pending, &sink);
                            }
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, entries }
    }

    pub fn entries(&self) -> Vec<ForwardEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Poll until at least `count` entries arrived or two seconds pass.
    pub async fn wait_for(&self, count: usize) -> Vec<ForwardEntry> {
        for _ in 0..200 {
            let entries = self.entries();
            if entries.len() >= count {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.entries()
    }
}

/// Decode every complete entry at the front of `pending`.
fn drain_entries(pending: &mut Vec<u8>, sink: &Mutex<Vec<ForwardEntry>>) {
    loop {
        let mut cursor = Cursor::new(pending.as_slice());
        match rmp_serde::from_read::<_, ForwardEntry>(&mut cursor) {
            Ok(entry) => {
                let used = cursor.position() as usize;
                sink.lock().unwrap().push(entry);
                pending.drain(..used);
            }
            Err(_) => return,
        }
    }
}

/// A started gateway and the handle that stops it.
pub struct TestGateway {
    pub addr: SocketAddr,
    stop: Option<tokio::sync::oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl TestGateway {
    pub async fn start(forward: SocketAddr) -> Self {
        Self::start_with(forward, |_| {}).await
    }

    pub async fn start_with(forward: SocketAddr, tweak: impl FnOnce(&mut GatewayConfig)) -> Self {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.forward.address = forward.to_string();
        config.firehose.access_key = ACCESS_KEY.into();
        config.health.dial_timeout_ms = 500;
        tweak(&mut config);

        let gateway = Gateway::start(config).await.unwrap();
        let addr = gateway.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            gateway
                .serve(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            stop: Some(tx),
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.task)
            .await
            .unwrap()
            .unwrap();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A delivery request with valid credentials and request ID `r1`.
pub fn delivery(
    client: &reqwest::Client,
    gateway: &TestGateway,
    event_type: &str,
    records: Vec<Value>,
) -> reqwest::RequestBuilder {
    client
        .post(gateway.url("/"))
        .header("X-Amz-Firehose-Access-Key", ACCESS_KEY)
        .header("X-Amz-Firehose-Request-Id", "r1")
        .header(
            "X-Amz-Firehose-Common-Attributes",
            json!({ "commonAttributes": { "X-EVENT-TYPE": event_type } }).to_string(),
        )
        .json(&json!({
            "requestId": "r1",
            "timestamp": 1_700_000_000_000i64,
            "records": records,
        }))
}

pub fn cloudfront_record(line: &str) -> Value {
    json!({ "data": base64::engine::general_purpose::STANDARD.encode(line) })
}

pub fn cloudwatch_record(messages: &[(&str, i64)]) -> Value {
    let events: Vec<Value> = messages
        .iter()
        .enumerate()
        .map(|(i, (message, timestamp))| {
            json!({ "id": i.to_string(), "message": message, "timestamp": timestamp })
        })
        .collect();
    let envelope = json!({
        "owner": "123456789012",
        "logGroup": "/aws/lambda/demo",
        "logStream": "2024/01/01/[$LATEST]abc",
        "messageType": "DATA_MESSAGE",
        "subscriptionFilters": ["all"],
        "logEvents": events,
    });

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(envelope.to_string().as_bytes()).unwrap();
    let gzipped = encoder.finish().unwrap();
    json!({ "data": base64::engine::general_purpose::STANDARD.encode(gzipped) })
}
