//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and exercises the catalog client
//! over real HTTP twice: once through the host-does-IO path with `ureq`
//! executing the built requests, and once through the async `Fetcher` with
//! the `reqwest` transport. A silent listener that accepts connections but
//! never answers covers timeouts and cancellation.

use std::net::SocketAddr;
use std::time::Duration;

use catalog_core::{
    with_cancellation, ApiError, CatalogClient, ClientConfig, Dimensions, Fetcher, HttpMethod,
    HttpRequest, HttpResponse,
};
use tokio_util::sync::CancellationToken;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data, letting the core client interpret them.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut request = match req.method {
        HttpMethod::Get => agent.get(&req.path),
    };
    for (key, value) in &req.headers {
        request = request.header(key.as_str(), value.as_str());
    }
    let mut response = request.call().expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    HttpResponse::new(status, body)
}

/// Start the mock server on its own thread and return its address.
fn spawn_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

/// A server that accepts connections and never writes a byte.
async fn spawn_silent_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            if let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        }
    });
    addr
}

fn fetcher(addr: SocketAddr) -> Fetcher<catalog_core::ReqwestTransport> {
    Fetcher::from_config(&ClientConfig::new(&format!("http://{addr}"))).unwrap()
}

#[test]
fn host_driven_round_trips() {
    let addr = spawn_mock_server();
    let client = CatalogClient::new(&format!("http://{addr}"));

    // Single product with every field present.
    let product = client
        .parse_product(execute(client.build_get_product(1)))
        .unwrap();
    assert_eq!(product.id, 1);
    assert_eq!(product.brand, "Essence");
    assert_eq!(product.reviews.len(), 3);
    assert_eq!(product.display_price(), "$9.99");

    // Missing product.
    let err = client
        .parse_product(execute(client.build_get_product(999_999)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Pagination.
    let page = client
        .parse_product_page(execute(client.build_list_products(5, 0)))
        .unwrap();
    assert_eq!(page.products.len(), 5);
    assert_eq!(page.total, 12);
    assert!(page.has_more());

    // Search.
    let hits = client
        .parse_products(execute(client.build_search_products("phone", 30, 0)))
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|p| p.id).collect();
    assert_eq!(ids, [5, 6, 11]);

    // Category.
    let furniture = client
        .parse_products(execute(client.build_products_by_category("furniture", 0, 0)))
        .unwrap();
    assert!(furniture.iter().all(|p| p.category == "furniture"));
    assert_eq!(furniture.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn fetcher_operations_over_http() {
    let addr = spawn_mock_server();
    let f = fetcher(addr);

    let products = f.get_products(10, 0).await.unwrap();
    assert_eq!(products.len(), 10);

    let all = f.get_all_products().await.unwrap();
    assert_eq!(all.len(), 12);

    let second_page = f.get_products_page(5, 5).await.unwrap();
    assert_eq!(second_page.current_page(), 2);
    assert_eq!(second_page.products[0].id, 6);

    let out_of_stock = f.get_product(5).await.unwrap();
    assert!(!out_of_stock.is_in_stock());

    let err = f.get_product(999_999).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let everything = f.search_products("").await.unwrap();
    assert_eq!(everything.len(), 12);

    let beauty = f.get_products_by_category("beauty", 2, 0).await.unwrap();
    assert_eq!(beauty.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn drifted_record_decodes_with_defaults() {
    let addr = spawn_mock_server();
    let product = fetcher(addr).get_product(12).await.unwrap();

    assert_eq!(product.price, 14.99);
    assert_eq!(product.stock, 3);
    assert_eq!(product.rating, 0.0);
    assert_eq!(product.sku, "12012");
    assert!(product.tags.is_empty());
    assert_eq!(product.dimensions, Dimensions::default());
    assert_eq!(product.images.len(), 1);
    assert_eq!(product.thumbnail, "");
    assert_eq!(product.reviews.len(), 3);
    assert_eq!(product.reviews[0].date, None);
    assert_eq!(product.reviews[1].rating, 0);
    assert_eq!(product.reviews[2].rating, 5);
    assert!(product.reviews[2].date.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_calls_are_independent() {
    let addr = spawn_mock_server();
    let f = fetcher(addr);

    let (a, b, c) = tokio::join!(f.get_product(1), f.get_product(2), f.get_product(404_404));
    assert_eq!(a.unwrap().id, 1);
    assert_eq!(b.unwrap().id, 2);
    assert!(matches!(c.unwrap_err(), ApiError::NotFound));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_is_transport_error() {
    // Bind then drop so nothing is listening on the port.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let err = fetcher(addr).get_products(10, 0).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: None, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn transport_timeout_is_transport_error() {
    let addr = spawn_silent_server().await;
    let config =
        ClientConfig::new(&format!("http://{addr}")).with_timeout(Duration::from_millis(200));
    let f = Fetcher::from_config(&config).unwrap();

    let err = f.get_product(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: None, .. }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_aborts_pending_request() {
    let addr = spawn_silent_server().await;
    let f = fetcher(addr);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        with_cancellation(&token, f.get_all_products()),
    )
    .await
    .expect("cancelled request should resolve promptly");
    assert!(matches!(result, Err(ApiError::Cancelled)));
}
