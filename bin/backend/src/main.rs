//! Match Server Binary
//!
//! Serves room creation, joining, and live match WebSockets.
//! Runs on BIND_ADDR (e.g. 0.0.0.0:8080).

#[tokio::main]
async fn main() {
    bzp_core::log();
    bzp_server::run().await.unwrap();
}
