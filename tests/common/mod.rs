//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use portfolio_api::config::AppConfig;
use portfolio_api::store::MemoryStore;
use portfolio_api::{AppServer, Limiters, Shutdown};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const PROFILE_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

/// A server running on an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub limiters: Limiters,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn profile_url(&self, suffix: &str) -> String {
        self.url(&format!("/api/v1/profiles/{PROFILE_ID}{suffix}"))
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
            .expect("server returned an error");
    }
}

pub fn seed_store() -> MemoryStore {
    MemoryStore::from_seed(json!({
        "profiles": [{
            "id": PROFILE_ID,
            "name": "Ada Lovelace",
            "photoUrl": "https://cdn.example/ada.png",
            "title": "Analyst",
            "aboutMe": "First programmer.",
            "firstExperienceDate": "2015-03-01T00:00:00Z",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-02-01T00:00:00Z"
        }],
        "skills": [
            {"id": "s1", "profileId": PROFILE_ID, "name": "Rust", "category": "backend", "proficiency": "advanced"},
            {"id": "s2", "profileId": PROFILE_ID, "name": "Figma", "category": "tools", "proficiency": "occasional"},
            {"id": "s3", "profileId": PROFILE_ID, "name": "Axum", "category": "backend", "proficiency": "advanced"}
        ],
        "projects": [
            {"id": "p1", "profileId": PROFILE_ID, "name": "Engine", "visible": true,
             "techStack": ["rust"], "createdAt": "2023-01-01T00:00:00Z"},
            {"id": "p2", "profileId": PROFILE_ID, "name": "Draft", "visible": false,
             "createdAt": "2024-01-01T00:00:00Z"}
        ],
        "certificates": [
            {"id": "c1", "profileId": PROFILE_ID, "name": "Zeta", "issuer": "Z", "skills": []},
            {"id": "c2", "profileId": PROFILE_ID, "name": "Alpha", "issuer": "A", "skills": ["rust"]}
        ]
    }))
    .expect("seed data is valid")
}

/// Start a server with `config` on 127.0.0.1:0 over a seeded store.
pub async fn spawn_app(mut config: AppConfig) -> TestApp {
    config.server.bind_address = "127.0.0.1:0".to_string();
    config.server.shutdown_timeout_secs = 2;

    let store = Arc::new(seed_store());
    let limiters = Limiters::spawn(&config.rate_limit).expect("valid limiter config");
    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let shutdown = Shutdown::new();
    let server = AppServer::new(&config, store.clone(), limiters.clone());
    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    TestApp {
        addr,
        store,
        limiters,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
