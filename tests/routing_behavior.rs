//! End-to-end routing, rewriting, and header behavior.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eazybank_gateway::config::schema::GatewayConfig;

mod common;

#[tokio::test]
async fn unmatched_path_returns_404_without_backend_contact() {
    let backend_addr: SocketAddr = "127.0.0.1:29181".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29182".parse().unwrap();

    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    common::start_programmable_backend(backend_addr, move |_| {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (200, "account".into())
        }
    })
    .await;

    let mut config = GatewayConfig::default();
    config.services.push(common::service("account", backend_addr));
    config
        .routes
        .push(common::route("account_route", "/eazybank/account/", "account"));

    let shutdown = common::start_gateway(config, gateway_addr).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/totally/unknown", gateway_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 404);
    assert_eq!(call_count.load(Ordering::SeqCst), 0, "backend must not be contacted");

    shutdown.trigger();
}

#[tokio::test]
async fn rewrites_path_before_forwarding() {
    let backend_addr: SocketAddr = "127.0.0.1:29281".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29282".parse().unwrap();

    // Echo the path the backend actually received.
    common::start_programmable_backend(backend_addr, move |seen| async move {
        (200, seen.path)
    })
    .await;

    let mut config = GatewayConfig::default();
    config.services.push(common::service("account", backend_addr));
    config
        .routes
        .push(common::route("account_route", "/eazybank/account/", "account"));

    let shutdown = common::start_gateway(config, gateway_addr).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/eazybank/account/fetch?x=1", gateway_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "/fetch?x=1");

    shutdown.trigger();
}

#[tokio::test]
async fn first_registered_route_wins_on_overlap() {
    let broad_addr: SocketAddr = "127.0.0.1:29381".parse().unwrap();
    let narrow_addr: SocketAddr = "127.0.0.1:29382".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29383".parse().unwrap();

    common::start_programmable_backend(broad_addr, |_| async { (200, "broad".into()) }).await;
    common::start_programmable_backend(narrow_addr, |_| async { (200, "narrow".into()) }).await;

    let mut config = GatewayConfig::default();
    config.services.push(common::service("broad", broad_addr));
    config.services.push(common::service("narrow", narrow_addr));
    config.routes.push(common::route("broad_route", "/eazybank/", "broad"));
    config
        .routes
        .push(common::route("narrow_route", "/eazybank/account/", "narrow"));

    let shutdown = common::start_gateway(config, gateway_addr).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/eazybank/account/fetch", gateway_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.text().await.unwrap(), "broad");

    shutdown.trigger();
}

#[tokio::test]
async fn correlation_id_is_forwarded_unmodified() {
    let backend_addr: SocketAddr = "127.0.0.1:29481".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29482".parse().unwrap();

    let seen_requests = Arc::new(Mutex::new(Vec::new()));
    let seen = seen_requests.clone();
    common::start_programmable_backend(backend_addr, move |request| {
        let seen = seen.clone();
        async move {
            seen.lock().unwrap().push(request);
            (200, "ok".into())
        }
    })
    .await;

    let mut config = GatewayConfig::default();
    config.services.push(common::service("account", backend_addr));
    config
        .routes
        .push(common::route("account_route", "/eazybank/account/", "account"));

    let shutdown = common::start_gateway(config, gateway_addr).await;
    let client = common::client();

    client
        .get(format!("http://{}/eazybank/account/fetch", gateway_addr))
        .header("eazybank-correlation-id", "trace-42")
        .send()
        .await
        .unwrap();

    // Without an inbound id, the gateway stamps one at the edge.
    client
        .get(format!("http://{}/eazybank/account/fetch", gateway_addr))
        .send()
        .await
        .unwrap();

    let requests = seen_requests.lock().unwrap();
    assert_eq!(
        requests[0].header("eazybank-correlation-id"),
        Some("trace-42"),
        "inbound correlation id must cross the hop unmodified"
    );
    let generated = requests[1]
        .header("eazybank-correlation-id")
        .expect("gateway must generate a correlation id");
    assert_eq!(generated.len(), 36, "generated id should be a UUID");

    shutdown.trigger();
}

#[tokio::test]
async fn backend_status_and_body_pass_through() {
    let backend_addr: SocketAddr = "127.0.0.1:29581".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29582".parse().unwrap();

    common::start_programmable_backend(backend_addr, |_| async {
        (404, "no such account".into())
    })
    .await;

    let mut config = GatewayConfig::default();
    config.services.push(common::service("account", backend_addr));
    config
        .routes
        .push(common::route("account_route", "/eazybank/account/", "account"));

    let shutdown = common::start_gateway(config, gateway_addr).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/eazybank/account/fetch", gateway_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert!(res.headers().get("x-response-time").is_some());
    assert_eq!(res.text().await.unwrap(), "no such account");

    shutdown.trigger();
}

#[tokio::test]
async fn response_time_stamps_are_non_decreasing() {
    let backend_addr: SocketAddr = "127.0.0.1:29681".parse().unwrap();
    let gateway_addr: SocketAddr = "127.0.0.1:29682".parse().unwrap();

    common::start_programmable_backend(backend_addr, |_| async { (200, "ok".into()) }).await;

    let mut config = GatewayConfig::default();
    config.services.push(common::service("account", backend_addr));
    config
        .routes
        .push(common::route("account_route", "/eazybank/account/", "account"));

    let shutdown = common::start_gateway(config, gateway_addr).await;
    let client = common::client();

    let url = format!("http://{}/eazybank/account/fetch", gateway_addr);
    let first = client.get(&url).send().await.unwrap();
    let first_stamp = first
        .headers()
        .get("x-response-time")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let second = client.get(&url).send().await.unwrap();
    let second_stamp = second
        .headers()
        .get("x-response-time")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    // RFC 3339 UTC timestamps with fixed precision order lexicographically.
    assert!(
        second_stamp > first_stamp,
        "expected {} > {}",
        second_stamp,
        first_stamp
    );

    shutdown.trigger();
}
