/* demos/demo.rs */

use real_client_ip::{
    ChainStrategy, HeaderMap, LeftmostNonPrivateStrategy, RangeSet, RemoteAddrStrategy,
    RightmostNonPrivateStrategy, RightmostTrustedCountStrategy, RightmostTrustedRangeStrategy,
    SingleIpHeaderStrategy, Strategy, ranges,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("=== Client IP Strategy Examples ===\n");

    // Example 1: Directly exposed service
    example_1_remote_addr();

    // Example 2: Single header written by a trusted proxy
    example_2_single_header();

    // Example 3: Leftmost vs rightmost
    example_3_leftmost_vs_rightmost();

    // Example 4: Known number of proxies
    example_4_trusted_count();

    // Example 5: Behind Cloudflare
    example_5_trusted_range();

    // Example 6: Chain with fallback
    example_6_chain();

    // Example 7: Configuration errors
    example_7_config_errors();

    println!("=== All examples completed! ===");
}

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        if let Ok(value) = value.parse() {
            map.append(*name, value);
        }
    }
    map
}

fn show(label: &str, strategy: &dyn Strategy, headers: &HeaderMap, remote_addr: &str) {
    match strategy.resolve(headers, remote_addr) {
        Some(addr) => println!("{label}: {addr}"),
        None => println!("{label}: no trustworthy client IP"),
    }
}

fn example_1_remote_addr() {
    println!("Example 1: Peer address only");

    let spoofed = headers(&[("x-forwarded-for", "1.2.3.4")]);
    show("IPv4 peer", &RemoteAddrStrategy, &spoofed, "203.0.113.45:50122");
    show("IPv6 peer", &RemoteAddrStrategy, &spoofed, "[2001:db8::45]:443");
    show("Unix socket", &RemoteAddrStrategy, &spoofed, "@");
    println!();
}

fn example_2_single_header() {
    println!("Example 2: X-Real-IP set by nginx");

    let strategy = SingleIpHeaderStrategy::new("X-Real-IP").unwrap();
    show(
        "Header present",
        &strategy,
        &headers(&[("x-real-ip", "198.51.100.42")]),
        "10.0.0.1:80",
    );
    show("Header missing", &strategy, &HeaderMap::new(), "10.0.0.1:80");
    println!();
}

fn example_3_leftmost_vs_rightmost() {
    println!("Example 3: Leftmost vs rightmost non-private");

    let map = headers(&[("x-forwarded-for", "6.6.6.6, 203.0.113.1, 192.168.1.10, 10.0.0.5")]);
    println!("X-Forwarded-For: 6.6.6.6, 203.0.113.1, 192.168.1.10, 10.0.0.5");

    let leftmost = LeftmostNonPrivateStrategy::new("X-Forwarded-For").unwrap();
    let rightmost = RightmostNonPrivateStrategy::new("X-Forwarded-For").unwrap();
    show("Leftmost (spoofable)", &leftmost, &map, "10.0.0.6:80");
    show("Rightmost", &rightmost, &map, "10.0.0.6:80");
    println!();
}

fn example_4_trusted_count() {
    println!("Example 4: Two proxies, each appending to Forwarded");

    let strategy = RightmostTrustedCountStrategy::new("Forwarded", 2).unwrap();
    let map = headers(&[
        ("forwarded", r#"for=6.6.6.6, for="[2001:db8:cafe::17]:4711""#),
        ("forwarded", "for=10.0.0.9;proto=https"),
    ]);
    show("Client", &strategy, &map, "10.0.0.10:80");

    let short = headers(&[("forwarded", "for=10.0.0.9")]);
    show("List too short", &strategy, &short, "10.0.0.10:80");
    println!();
}

fn example_5_trusted_range() {
    println!("Example 5: Behind Cloudflare");

    let trusted = RangeSet::compile(ranges::CLOUDFLARE).unwrap();
    let strategy = RightmostTrustedRangeStrategy::new("X-Forwarded-For", trusted).unwrap();

    let map = headers(&[("x-forwarded-for", "6.6.6.6, 198.51.100.7, 172.64.1.1")]);
    show("Client", &strategy, &map, "162.158.1.1:443");

    let forged = headers(&[("x-forwarded-for", "198.51.100.7, nope, 172.64.1.1")]);
    show("Malformed boundary", &strategy, &forged, "162.158.1.1:443");
    println!();
}

fn example_6_chain() {
    println!("Example 6: Chain with peer address fallback");

    let chain = ChainStrategy::default()
        .with(SingleIpHeaderStrategy::new("CF-Connecting-IP").unwrap())
        .with(RightmostNonPrivateStrategy::new("X-Forwarded-For").unwrap())
        .with(RemoteAddrStrategy);

    show(
        "Cloudflare header",
        &chain,
        &headers(&[("cf-connecting-ip", "192.0.2.100")]),
        "10.0.0.1:80",
    );
    show(
        "X-Forwarded-For",
        &chain,
        &headers(&[("x-forwarded-for", "192.0.2.50, 10.0.0.2")]),
        "10.0.0.1:80",
    );
    show("No headers", &chain, &HeaderMap::new(), "192.0.2.123:4711");
    println!();
}

fn example_7_config_errors() {
    println!("Example 7: Configuration errors surface at construction");

    if let Err(err) = SingleIpHeaderStrategy::new("X-Forwarded-For") {
        println!("SingleIpHeader(X-Forwarded-For): {err}");
    }
    if let Err(err) = RightmostTrustedCountStrategy::new("X-Forwarded-For", 0) {
        println!("RightmostTrustedCount(0): {err}");
    }
    if let Err(err) = RangeSet::compile(["10.0.0.0/8", "fe80::1%eth0"]) {
        println!("RangeSet with zone: {err}");
    }
    println!();
}
