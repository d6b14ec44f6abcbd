#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::AuthSettings;
use chirpy::session::SessionService;
use chirpy::startup::run;
use chirpy::store::InMemoryStore;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub store: InMemoryStore,
}

pub fn test_settings() -> AuthSettings {
    AuthSettings {
        bcrypt_cost: 4,
        ..AuthSettings::with_secret(SECRET)
    }
}

pub fn session_service(store: &InMemoryStore) -> SessionService {
    SessionService::new(Arc::new(store.clone()), Arc::new(store.clone()), test_settings())
        .expect("Failed to build session service")
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = InMemoryStore::new();
    let server = run(listener, session_service(&store)).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, store }
}
