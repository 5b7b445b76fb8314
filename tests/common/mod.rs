//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use versioned_router::config::{ServerConfig, VersioningType};
use versioned_router::lifecycle::{startup, Shutdown};
use versioned_router::routing::{Advisory, ChannelNotifier, Notifier};
use versioned_router::HttpServer;

/// A running server on an ephemeral port. Stops when dropped.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    advisories: mpsc::Receiver<Advisory>,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Advisories emitted since the last call.
    pub fn take_advisories(&mut self) -> Vec<Advisory> {
        let mut taken = Vec::new();
        while let Ok(advisory) = self.advisories.try_recv() {
            taken.push(advisory);
        }
        taken
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the bundled application with the given versioning settings.
#[allow(dead_code)]
pub async fn start_server(kind: VersioningType) -> TestServer {
    start_server_with(|config| config.versioning.kind = kind).await
}

#[allow(dead_code)]
pub async fn start_server_with<F>(configure: F) -> TestServer
where
    F: FnOnce(&mut ServerConfig),
{
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    configure(&mut config);

    let (notifier, advisories) = ChannelNotifier::channel(16);
    let router = Arc::new(startup::build_router(&config, Arc::new(notifier)).unwrap());

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, router);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        advisories,
        shutdown,
    }
}

/// Notifier that keeps every advisory in memory.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    advisories: Mutex<Vec<Advisory>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.advisories.lock().unwrap().len()
    }

    pub fn take(&self) -> Vec<Advisory> {
        std::mem::take(&mut *self.advisories.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn advise(&self, advisory: Advisory) {
        self.advisories.lock().unwrap().push(advisory);
    }
}
