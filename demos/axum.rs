/* demos/axum.rs */

use axum::{Json, Router, extract::ConnectInfo, routing::get};
use real_client_ip::{
    ChainStrategy, ClientIp, ClientIpLayer, RangeSet, RemoteAddrStrategy,
    RightmostTrustedRangeStrategy, SingleIpHeaderStrategy, ranges,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = create_app();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    println!("Server starting on http://localhost:3000");
    println!("Test endpoints:");
    println!("  • GET /ip      - address from the Cloudflare/X-Real-IP/peer chain");
    println!("  • GET /debug   - resolved address next to the raw connection info");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'X-Real-IP: 203.0.113.42' http://localhost:3000/ip");
    println!("  curl -H 'X-Forwarded-For: 198.51.100.1, 104.16.0.1' http://localhost:3000/ip");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn create_app() -> Router {
    let cloudflare = RangeSet::compile(ranges::CLOUDFLARE).unwrap();

    let strategy = ChainStrategy::default()
        .with(RightmostTrustedRangeStrategy::new("X-Forwarded-For", cloudflare).unwrap())
        .with(SingleIpHeaderStrategy::new("X-Real-IP").unwrap())
        .with(RemoteAddrStrategy);

    Router::new()
        .route("/ip", get(ip_handler))
        .route("/debug", get(debug_handler))
        .layer(ClientIpLayer::new(strategy))
}

/// Handler that returns IP information in JSON format
async fn ip_handler(client_ip: Option<ClientIp>) -> Json<serde_json::Value> {
    match client_ip {
        Some(client_ip) => Json(json!({
            "client_ip": client_ip.address().to_string(),
            "ip_version": match client_ip.ip() {
                std::net::IpAddr::V4(_) => "IPv4",
                std::net::IpAddr::V6(_) => "IPv6",
            },
            "is_private": client_ip.address().is_private_or_local(),
        })),
        None => Json(json!({ "error": "Could not determine client IP" })),
    }
}

/// Debug handler showing the resolved address next to the connection info
async fn debug_handler(
    client_ip: Option<ClientIp>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: axum::http::HeaderMap,
) -> Json<serde_json::Value> {
    let forwarding_headers: Vec<_> = ["x-real-ip", "x-forwarded-for", "forwarded"]
        .iter()
        .flat_map(|name| {
            headers
                .get_all(*name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .map(move |value| json!({ "name": name, "value": value }))
        })
        .collect();

    Json(json!({
        "client_ip": client_ip.map(|ip| ip.address().to_string()),
        "connection_info": {
            "remote_addr": addr.to_string(),
            "remote_port": addr.port(),
        },
        "forwarding_headers": forwarding_headers,
    }))
}
