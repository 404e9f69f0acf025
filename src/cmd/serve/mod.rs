// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod handlers;
pub mod server;

#[cfg(test)]
mod tests {
    use portpicker::pick_unused_port;
    use reqwest::StatusCode;
    use revise_core::error::ErrorReport;
    use revise_core::error::Fallible;
    use revise_core::types::item::SchedulingScheme;
    use revise_core::types::timestamp::Timestamp;
    use serde_json::Value;
    use serde_json::json;
    use tokio::spawn;

    use crate::cmd::add::add_item;
    use crate::cmd::serve::server::ServerConfig;
    use crate::cmd::serve::server::start_server;
    use crate::collection::Collection;
    use crate::helper::create_tmp_directory;
    use crate::helper::wait_for_server;

    const TEST_HOST: &str = "127.0.0.1";

    fn http(e: reqwest::Error) -> ErrorReport {
        ErrorReport::new(format!("HTTP error: {e}"))
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let config = ServerConfig {
            directory: Some("./derpherp".to_string()),
            host: TEST_HOST.to_string(),
            port,
        };
        let result = start_server(config).await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let directory = create_tmp_directory()?.display().to_string();
        let id = {
            let collection = Collection::new(Some(directory.clone()))?;
            add_item(
                &collection.db,
                "pattern matching",
                SchedulingScheme::Adaptive,
                Timestamp::now(),
            )?
        };
        let config = ServerConfig {
            directory: Some(directory),
            host: TEST_HOST.to_string(),
            port,
        };
        spawn(async move { start_server(config).await });
        wait_for_server(TEST_HOST, port).await?;
        let base = format!("http://{TEST_HOST}:{port}");
        let client = reqwest::Client::new();

        // Hit the not found endpoint.
        let response = reqwest::get(format!("{base}/herp-derp")).await.map_err(http)?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // List the items.
        let response = reqwest::get(format!("{base}/items")).await.map_err(http)?;
        assert!(response.status().is_success());
        let items: Value = response.json().await.map_err(http)?;
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["id"], id.to_hex());

        // Fetch the item by a prefix of its id.
        let prefix = &id.to_hex()[..8];
        let response = reqwest::get(format!("{base}/items/{prefix}")).await.map_err(http)?;
        assert!(response.status().is_success());
        let item: Value = response.json().await.map_err(http)?;
        assert_eq!(item["status"], "active");

        // A new item is due, so it is in the queue.
        let response = reqwest::get(format!("{base}/queue?limit=5")).await.map_err(http)?;
        assert!(response.status().is_success());
        let queue: Value = response.json().await.map_err(http)?;
        assert_eq!(queue[0]["item"]["id"], id.to_hex());
        assert_eq!(queue[0]["retention"], 100.0);

        // Review it.
        let response = client
            .post(format!("{base}/items/{}/review", id.to_hex()))
            .json(&json!({ "rating": "good", "time_spent_seconds": 12 }))
            .send()
            .await
            .map_err(http)?;
        assert!(response.status().is_success());
        let item: Value = response.json().await.map_err(http)?;
        assert_eq!(item["interval"], 1);
        assert_eq!(item["repetition"], 1);
        assert_eq!(item["review_history"][0]["time_spent_seconds"], 12);

        // Reviewed today with a one-day interval: no longer due.
        let response = reqwest::get(format!("{base}/queue")).await.map_err(http)?;
        let queue: Value = response.json().await.map_err(http)?;
        assert!(queue.as_array().unwrap().is_empty());

        // An unknown rating is rejected.
        let response = client
            .post(format!("{base}/items/{}/review", id.to_hex()))
            .json(&json!({ "rating": "perfect" }))
            .send()
            .await
            .map_err(http)?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.map_err(http)?;
        assert!(body["error"].as_str().unwrap().contains("perfect"));

        // An unknown item is not found.
        let response = client
            .post(format!("{base}/items/{}/review", "0".repeat(64)))
            .json(&json!({ "rating": "good" }))
            .send()
            .await
            .map_err(http)?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Nothing has graduated, so the sweep is a no-op.
        let response = client
            .post(format!("{base}/sweep"))
            .send()
            .await
            .map_err(http)?;
        assert!(response.status().is_success());
        let report: Value = response.json().await.map_err(http)?;
        assert_eq!(report["archived"], json!([]));
        assert_eq!(report["deleted"], json!([]));
        Ok(())
    }
}
