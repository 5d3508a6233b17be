//! Mock indexer backed by wiremock

use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A local HTTP server answering Blockfrost-shaped routes
pub struct MockIndexer {
    server: MockServer,
}

impl MockIndexer {
    /// Starts a server on a random local port
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Base URL to point a gateway at
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying server, for custom mounts
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    async fn mount_json(&self, route: String, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// `GET /addresses/{address}`
    pub async fn mount_address_info(&self, address: &str, body: Value) {
        self.mount_json(format!("/addresses/{address}"), 200, body).await;
    }

    /// Splits `utxos` into pages of `page_size` on `GET /addresses/{address}/utxos`.
    ///
    /// A trailing empty page is mounted when the last page is full.
    pub async fn mount_utxo_pages(&self, address: &str, utxos: Vec<Value>, page_size: usize) {
        let route = format!("/addresses/{address}/utxos");
        let mut pages: Vec<Vec<Value>> = utxos.chunks(page_size.max(1)).map(<[Value]>::to_vec).collect();
        if pages.last().map_or(true, |p| p.len() == page_size) {
            pages.push(Vec::new());
        }
        for (i, page) in pages.into_iter().enumerate() {
            Mock::given(method("GET"))
                .and(path(route.clone()))
                .and(query_param("page", (i + 1).to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(page)))
                .mount(&self.server)
                .await;
        }
    }

    /// `GET /addresses/{address}/transactions`
    pub async fn mount_transactions(&self, address: &str, stubs: Vec<Value>) {
        self.mount_json(format!("/addresses/{address}/transactions"), 200, Value::Array(stubs))
            .await;
    }

    /// `GET /txs/{hash}`
    pub async fn mount_transaction(&self, hash: &str, body: Value) {
        self.mount_json(format!("/txs/{hash}"), 200, body).await;
    }

    /// `GET /txs/{hash}/utxos`
    pub async fn mount_tx_utxos(&self, hash: &str, body: Value) {
        self.mount_json(format!("/txs/{hash}/utxos"), 200, body).await;
    }

    /// Any route answering with an error status and JSON body
    pub async fn mount_error(&self, route: &str, status: u16, body: Value) {
        self.mount_json(route.to_string(), status, body).await;
    }

    /// Any route answering with a non-JSON body
    pub async fn mount_raw(&self, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "text/html")
                    .set_body_string(body.to_string()),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |r| r.len())
    }

    /// Paths of requests received so far, in arrival order
    pub async fn request_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_indexer_has_no_requests() {
        let indexer = MockIndexer::start().await;
        assert_eq!(indexer.request_count().await, 0);
        assert!(indexer.request_paths().await.is_empty());
        assert!(indexer.uri().starts_with("http://"));
    }
}
