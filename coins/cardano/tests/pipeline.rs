//! End-to-end lookups against a mock indexer.

use std::sync::Arc;
use std::time::Duration;

use adalens_cardano::{
    BlockBound, CardanoError, CardanoLookup, HttpClientConfig, LookupConfig, LookupSession, Network,
    Order, Quantity, ReconcileMode, TransactionQuery,
};
use adalens_testing::{fixtures, EdgeCaseAddresses, MockIndexer};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const PROJECT_ID: &str = "preview-test-project";

fn lookup(indexer: &MockIndexer, config: LookupConfig) -> CardanoLookup {
    CardanoLookup::new(config.with_base_url(indexer.uri()), PROJECT_ID).unwrap()
}

fn q(value: &str) -> Quantity {
    value.parse().unwrap()
}

/// `(path, query)` of every request the indexer saw
async fn requests(indexer: &MockIndexer) -> Vec<(String, String)> {
    indexer
        .server()
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| (r.url.path().to_string(), r.url.query().unwrap_or_default().to_string()))
        .collect()
}

// ============================================================================
// Balance resolution
// ============================================================================

#[tokio::test]
async fn test_balance_walks_every_utxo_page() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(1);
    indexer
        .mount_address_info(&address, fixtures::address_info(&address, &[("lovelace", "137000000")], None))
        .await;
    indexer
        .mount_utxo_pages(&address, fixtures::lovelace_utxos(&address, 137, "1000000"), 100)
        .await;

    let balance = lookup(&indexer, LookupConfig::new(Network::Preview))
        .resolve_balance(&address)
        .await
        .unwrap();

    assert_eq!(balance.utxo_count, 137);
    assert_eq!(balance.lovelace(), q("137000000"));
    assert_eq!(balance.native_assets().count(), 0);

    let utxo_pages: Vec<String> = requests(&indexer)
        .await
        .into_iter()
        .filter(|(path, _)| path.ends_with("/utxos"))
        .map(|(_, query)| query)
        .collect();
    assert_eq!(utxo_pages.len(), 2);
    assert!(utxo_pages.contains(&"count=100&page=1".to_string()));
    assert!(utxo_pages.contains(&"count=100&page=2".to_string()));
}

#[tokio::test]
async fn test_balance_sends_project_id_header() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(2);
    indexer
        .mount_address_info(&address, fixtures::address_info(&address, &[], None))
        .await;
    indexer.mount_utxo_pages(&address, vec![], 100).await;

    lookup(&indexer, LookupConfig::default())
        .resolve_balance(&address)
        .await
        .unwrap();

    let received = indexer.server().received_requests().await.unwrap();
    assert!(!received.is_empty());
    for request in received {
        assert_eq!(request.headers.get("project_id").unwrap(), PROJECT_ID);
    }
}

#[tokio::test]
async fn test_reconcile_modes_over_http() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(3);
    let token = format!("{}{}", adalens_testing::SAMPLE_POLICIES[0], hex::encode("HOSKY"));
    indexer
        .mount_address_info(
            &address,
            fixtures::address_info(&address, &[("lovelace", "1000000"), (token.as_str(), "50")], Some("stake_test1uabc")),
        )
        .await;
    indexer
        .mount_utxo_pages(
            &address,
            vec![fixtures::utxo(&address, &fixtures::tx_hash(0), 0, &[("lovelace", "2000000")])],
            100,
        )
        .await;

    let authoritative = lookup(&indexer, LookupConfig::default())
        .resolve_balance(&address)
        .await
        .unwrap();
    assert_eq!(authoritative.lovelace(), q("2000000"));
    // Only reported in the base balance: carried over.
    assert_eq!(authoritative.totals_by_unit[&token], q("50"));
    assert_eq!(authoritative.stake_address.as_deref(), Some("stake_test1uabc"));

    let additive = lookup(&indexer, LookupConfig::default().with_reconcile(ReconcileMode::Additive))
        .resolve_balance(&address)
        .await
        .unwrap();
    assert_eq!(additive.lovelace(), q("3000000"));
    assert_eq!(additive.totals_by_unit[&token], q("50"));
}

#[tokio::test]
async fn test_balance_beyond_u128_is_exact() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(4);
    let token = adalens_testing::SAMPLE_POLICIES[1];
    indexer
        .mount_address_info(&address, fixtures::address_info(&address, &[], None))
        .await;
    indexer
        .mount_utxo_pages(
            &address,
            vec![
                fixtures::utxo(&address, &fixtures::tx_hash(0), 0, &[(token, "340282366920938463463374607431768211455")]),
                fixtures::utxo(&address, &fixtures::tx_hash(1), 0, &[(token, "1")]),
            ],
            100,
        )
        .await;

    let balance = lookup(&indexer, LookupConfig::default())
        .resolve_balance(&address)
        .await
        .unwrap();
    assert_eq!(
        balance.totals_by_unit[token].to_string(),
        "340282366920938463463374607431768211456"
    );
}

#[tokio::test]
async fn test_unknown_address_is_not_found() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(5);
    indexer
        .mount_error(
            &format!("/addresses/{address}"),
            404,
            fixtures::error_body(404, "Not Found", "The requested component has not been found."),
        )
        .await;

    let err = lookup(&indexer, LookupConfig::default())
        .resolve_balance(&address)
        .await
        .unwrap_err();
    assert!(matches!(err, CardanoError::AddressNotFound(ref a) if *a == address));
    assert!(err.is_user_correctable());
}

#[tokio::test]
async fn test_server_error_propagates_with_message() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(6);
    indexer
        .mount_error(
            &format!("/addresses/{address}"),
            500,
            fixtures::error_body(500, "Internal Server Error", "An unexpected response was received from the backend."),
        )
        .await;
    indexer.mount_utxo_pages(&address, vec![], 100).await;

    let err = lookup(&indexer, LookupConfig::default())
        .resolve_balance(&address)
        .await
        .unwrap_err();
    match &err {
        CardanoError::RemoteApi { status_code, message } => {
            assert_eq!(*status_code, 500);
            assert_eq!(message, "An unexpected response was received from the backend.");
        }
        other => panic!("expected RemoteApi, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_utxo_quantity_fails_balance() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(7);
    indexer
        .mount_address_info(&address, fixtures::address_info(&address, &[], None))
        .await;
    indexer
        .mount_utxo_pages(
            &address,
            vec![fixtures::utxo(&address, &fixtures::tx_hash(0), 0, &[("lovelace", "12.5")])],
            100,
        )
        .await;

    let err = lookup(&indexer, LookupConfig::default())
        .resolve_balance(&address)
        .await
        .unwrap_err();
    assert!(matches!(err, CardanoError::MalformedQuantity { ref value } if value == "12.5"));
}

// ============================================================================
// Address pre-check
// ============================================================================

#[tokio::test]
async fn test_invalid_addresses_never_reach_the_indexer() {
    let indexer = MockIndexer::start().await;
    let lookup = lookup(&indexer, LookupConfig::new(Network::Preview));

    let mut candidates: Vec<String> = EdgeCaseAddresses::invalid().into_iter().map(String::from).collect();
    candidates.push(EdgeCaseAddresses::mainnet(1));
    candidates.push(EdgeCaseAddresses::stake_testnet(1));

    for address in &candidates {
        let err = lookup.resolve_balance(address).await.unwrap_err();
        assert!(matches!(err, CardanoError::InvalidAddressFormat { .. }), "{address:?}");
        let err = lookup
            .list_transactions(address, &TransactionQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CardanoError::InvalidAddressFormat { .. }), "{address:?}");
    }
    assert_eq!(indexer.request_count().await, 0);
}

// ============================================================================
// Transaction enrichment
// ============================================================================

/// Mounts a transaction paying `lovelace` to `address`
async fn mount_payment(indexer: &MockIndexer, address: &str, hash: &str, lovelace: &str) {
    indexer.mount_transaction(hash, fixtures::transaction(hash, 100, "170000")).await;
    indexer
        .mount_tx_utxos(
            hash,
            fixtures::tx_utxos(
                hash,
                vec![fixtures::tx_io("addr_test1sender", &[("lovelace", "90000000")])],
                vec![
                    fixtures::tx_io(address, &[("lovelace", lovelace)]),
                    fixtures::tx_io("addr_test1sender", &[("lovelace", "1000")]),
                ],
            ),
        )
        .await;
}

#[tokio::test]
async fn test_failed_transaction_is_dropped_not_fatal() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(10);
    let (a, b, c) = (fixtures::tx_hash(1), fixtures::tx_hash(2), fixtures::tx_hash(3));
    indexer
        .mount_transactions(
            &address,
            vec![fixtures::tx_stub(&a, 3, 0), fixtures::tx_stub(&b, 2, 0), fixtures::tx_stub(&c, 1, 0)],
        )
        .await;
    mount_payment(&indexer, &address, &a, "1000000").await;
    mount_payment(&indexer, &address, &c, "3000000").await;
    indexer.mount_transaction(&b, fixtures::transaction(&b, 2, "170000")).await;
    indexer
        .mount_error(
            &format!("/txs/{b}/utxos"),
            500,
            fixtures::error_body(500, "Internal Server Error", "boom"),
        )
        .await;

    let lookup = lookup(&indexer, LookupConfig::default());
    let page = lookup
        .list_transactions_page(&address, &TransactionQuery::default())
        .await
        .unwrap();

    let hashes: Vec<&str> = page.records.iter().map(|r| r.hash.as_str()).collect();
    assert_eq!(hashes, vec![a.as_str(), c.as_str()]);
    assert_eq!(page.records[0].received_amount["lovelace"], q("1000000"));
    assert_eq!(page.records[1].received_amount["lovelace"], q("3000000"));
    assert_eq!(page.dropped.len(), 1);
    assert_eq!(page.dropped[0].hash, b);
    assert!(page.dropped[0].error.contains("500"));

    let records = lookup
        .list_transactions(&address, &TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

/// Lists `[a, b, c]` for a fresh address with `a` and `c` fully mounted;
/// the caller decides how `b` breaks
async fn mount_three_with_gap(indexer: &MockIndexer, seed: u8) -> (String, String, String, String) {
    let address = EdgeCaseAddresses::testnet(seed);
    let (a, b, c) = (fixtures::tx_hash(1), fixtures::tx_hash(2), fixtures::tx_hash(3));
    indexer
        .mount_transactions(
            &address,
            vec![fixtures::tx_stub(&a, 3, 0), fixtures::tx_stub(&b, 2, 0), fixtures::tx_stub(&c, 1, 0)],
        )
        .await;
    mount_payment(indexer, &address, &a, "1000000").await;
    mount_payment(indexer, &address, &c, "3000000").await;
    (address, a, b, c)
}

async fn assert_only_middle_dropped(lookup: &CardanoLookup, address: &str, a: &str, b: &str, c: &str) {
    let page = lookup
        .list_transactions_page(address, &TransactionQuery::default())
        .await
        .unwrap();
    let hashes: Vec<&str> = page.records.iter().map(|r| r.hash.as_str()).collect();
    assert_eq!(hashes, vec![a, c]);
    assert_eq!(page.dropped.len(), 1);
    assert_eq!(page.dropped[0].hash, b);
}

#[tokio::test]
async fn test_transaction_without_utxo_data_is_dropped() {
    let indexer = MockIndexer::start().await;
    let (address, a, b, c) = mount_three_with_gap(&indexer, 20).await;
    indexer.mount_transaction(&b, fixtures::transaction(&b, 2, "170000")).await;
    indexer.mount_tx_utxos(&b, serde_json::json!({ "hash": b })).await;

    let lookup = lookup(&indexer, LookupConfig::default());
    assert_only_middle_dropped(&lookup, &address, &a, &b, &c).await;
}

#[tokio::test]
async fn test_failed_transaction_details_are_dropped() {
    let indexer = MockIndexer::start().await;
    let (address, a, b, c) = mount_three_with_gap(&indexer, 21).await;
    indexer
        .mount_error(&format!("/txs/{b}"), 500, fixtures::error_body(500, "Internal Server Error", "boom"))
        .await;
    indexer.mount_tx_utxos(&b, fixtures::tx_utxos(&b, vec![], vec![])).await;

    let lookup = lookup(&indexer, LookupConfig::default());
    assert_only_middle_dropped(&lookup, &address, &a, &b, &c).await;
}

#[tokio::test]
async fn test_non_json_transaction_details_are_dropped() {
    let indexer = MockIndexer::start().await;
    let (address, a, b, c) = mount_three_with_gap(&indexer, 22).await;
    indexer.mount_raw(&format!("/txs/{b}"), 200, "<html>maintenance</html>").await;
    indexer.mount_tx_utxos(&b, fixtures::tx_utxos(&b, vec![], vec![])).await;

    let lookup = lookup(&indexer, LookupConfig::default());
    assert_only_middle_dropped(&lookup, &address, &a, &b, &c).await;
}

#[tokio::test]
async fn test_wrong_shape_transaction_details_are_dropped() {
    let indexer = MockIndexer::start().await;
    let (address, a, b, c) = mount_three_with_gap(&indexer, 23).await;
    indexer.mount_transaction(&b, serde_json::json!({ "hash": b, "fees": 17 })).await;
    indexer.mount_tx_utxos(&b, fixtures::tx_utxos(&b, vec![], vec![])).await;

    let lookup = lookup(&indexer, LookupConfig::default());
    assert_only_middle_dropped(&lookup, &address, &a, &b, &c).await;
}

#[tokio::test]
async fn test_timed_out_transaction_is_dropped() {
    let indexer = MockIndexer::start().await;
    let (address, a, b, c) = mount_three_with_gap(&indexer, 24).await;
    indexer.mount_transaction(&b, fixtures::transaction(&b, 2, "170000")).await;
    Mock::given(method("GET"))
        .and(path(format!("/txs/{b}/utxos")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::tx_utxos(&b, vec![], vec![]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(indexer.server())
        .await;

    let http = HttpClientConfig {
        request_timeout_secs: 1,
        ..HttpClientConfig::default()
    };
    let lookup = lookup(&indexer, LookupConfig::default().with_http(http));
    assert_only_middle_dropped(&lookup, &address, &a, &b, &c).await;
}

#[tokio::test]
async fn test_indexer_hash_that_is_not_hex_is_dropped_unfetched() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(25);
    let (a, c) = (fixtures::tx_hash(1), fixtures::tx_hash(3));
    let bogus = "../addresses/x?count=1";
    indexer
        .mount_transactions(
            &address,
            vec![fixtures::tx_stub(&a, 3, 0), fixtures::tx_stub(bogus, 2, 0), fixtures::tx_stub(&c, 1, 0)],
        )
        .await;
    mount_payment(&indexer, &address, &a, "1000000").await;
    mount_payment(&indexer, &address, &c, "3000000").await;

    let lookup = lookup(&indexer, LookupConfig::default());
    assert_only_middle_dropped(&lookup, &address, &a, bogus, &c).await;
    let paths = indexer.request_paths().await;
    assert!(paths.iter().all(|p| p.starts_with("/txs/") || p.ends_with("/transactions")), "{paths:?}");
    assert_eq!(paths.iter().filter(|p| p.starts_with("/txs/")).count(), 4);
}

#[tokio::test]
async fn test_records_keep_hash_list_order_under_fan_out() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(11);
    let hashes: Vec<String> = (0..12).map(fixtures::tx_hash).collect();
    indexer
        .mount_transactions(
            &address,
            hashes.iter().enumerate().map(|(i, h)| fixtures::tx_stub(h, 100 - i as u64, 0)).collect(),
        )
        .await;
    for (i, hash) in hashes.iter().enumerate() {
        mount_payment(&indexer, &address, hash, &(i + 1).to_string()).await;
    }

    let records = lookup(&indexer, LookupConfig::default().with_max_concurrent_fetches(4))
        .list_transactions(&address, &TransactionQuery::default().with_count(12))
        .await
        .unwrap();

    let got: Vec<&String> = records.iter().map(|r| &r.hash).collect();
    assert_eq!(got, hashes.iter().collect::<Vec<_>>());
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.received_amount["lovelace"], Quantity::from(i as u64 + 1));
    }
}

#[tokio::test]
async fn test_payment_to_others_has_empty_received_amount() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(12);
    let hash = fixtures::tx_hash(1);
    indexer.mount_transactions(&address, vec![fixtures::tx_stub(&hash, 1, 0)]).await;
    indexer.mount_transaction(&hash, fixtures::transaction(&hash, 1, "170000")).await;
    indexer
        .mount_tx_utxos(
            &hash,
            fixtures::tx_utxos(
                &hash,
                vec![fixtures::tx_io(&address, &[("lovelace", "5000000")])],
                vec![fixtures::tx_io("addr_test1payee", &[("lovelace", "4830000")])],
            ),
        )
        .await;

    let records = lookup(&indexer, LookupConfig::default())
        .list_transactions(&address, &TransactionQuery::default())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].received_amount.is_empty());
    assert_eq!(records[0].spent_amount["lovelace"], q("5000000"));
    assert_eq!(records[0].fees, q("170000"));
}

#[tokio::test]
async fn test_empty_hash_list_returns_immediately() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(13);
    indexer.mount_transactions(&address, vec![]).await;

    let page = lookup(&indexer, LookupConfig::default())
        .list_transactions_page(&address, &TransactionQuery::default())
        .await
        .unwrap();

    assert!(page.records.is_empty());
    assert!(page.dropped.is_empty());
    assert_eq!(indexer.request_count().await, 1);
}

#[tokio::test]
async fn test_hash_list_failure_propagates() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(14);
    indexer
        .mount_error(
            &format!("/addresses/{address}/transactions"),
            403,
            fixtures::error_body(403, "Forbidden", "Invalid project token."),
        )
        .await;

    let err = lookup(&indexer, LookupConfig::default())
        .list_transactions(&address, &TransactionQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CardanoError::RemoteApi { status_code: 403, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_hash_list_not_found() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(15);

    let err = lookup(&indexer, LookupConfig::default())
        .list_transactions(&address, &TransactionQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CardanoError::AddressNotFound(_)));
}

#[tokio::test]
async fn test_query_forwarded_without_absent_bounds() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(16);
    indexer.mount_transactions(&address, vec![]).await;

    let query = TransactionQuery::new()
        .with_page(2)
        .with_count(10)
        .with_order(Order::Asc)
        .from_block(BlockBound::at(8_929_261, 1));
    lookup(&indexer, LookupConfig::default())
        .list_transactions(&address, &query)
        .await
        .unwrap();

    let sent = requests(&indexer).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, format!("/addresses/{address}/transactions"));
    assert_eq!(sent[0].1, "count=10&page=2&order=asc&from=8929261%3A1");
}

#[tokio::test]
async fn test_invalid_query_never_reaches_the_indexer() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(17);
    let lookup = lookup(&indexer, LookupConfig::default());

    for query in [
        TransactionQuery::new().with_page(0),
        TransactionQuery::new().with_count(0),
        TransactionQuery::new().with_count(101),
    ] {
        let err = lookup.list_transactions(&address, &query).await.unwrap_err();
        assert!(matches!(err, CardanoError::InvalidQuery(_)));
    }
    assert_eq!(indexer.request_count().await, 0);
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_session_returns_latest_lookup() {
    let indexer = MockIndexer::start().await;
    let address = EdgeCaseAddresses::testnet(20);
    indexer
        .mount_address_info(&address, fixtures::address_info(&address, &[], None))
        .await;
    indexer
        .mount_utxo_pages(&address, fixtures::lovelace_utxos(&address, 3, "5"), 100)
        .await;

    let lookup = lookup(&indexer, LookupConfig::default());
    let session = Arc::new(LookupSession::new());
    let balance = session
        .run({
            let lookup = lookup.clone();
            let address = address.clone();
            async move { lookup.resolve_balance(&address).await }
        })
        .await
        .expect("lookup was not superseded")
        .unwrap();
    assert_eq!(balance.lovelace(), q("15"));
}
