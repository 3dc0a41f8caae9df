//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use annotation_service::config::{AttributeConfig, ServiceConfig};
use annotation_service::{AppState, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A running service bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub client: reqwest::Client,
    shutdown: Shutdown,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(config: ServiceConfig) -> Self {
        let state = AppState::new(config);
        let server = HttpServer::new(state.clone()).expect("route tables are valid");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            let _ = server.run(listener, rx).await;
        });

        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        Self {
            addr,
            state,
            client,
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Open a session through the API and return the `Cookie` header value.
    pub async fn login(&self, user: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/session"))
            .json(&serde_json::json!({ "user": user }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);

        let set_cookie = res
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .expect("session cookie")
            .to_string();
        set_cookie
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

/// Small catalog used across tests.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.annotations.attributes = vec![AttributeConfig {
        name: "color".to_string(),
        description: "Dominant color".to_string(),
        values: vec!["red".to_string(), "blue".to_string()],
    }];
    config.annotations.items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    config.annotations.batch_size = 2;
    config.annotations.annotations_per_item = 2;
    config
}
