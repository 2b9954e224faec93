// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests: real registry over TCP, fake broker management API.

use std::time::Duration;

use tokend_specs::{registry_config, FakeBrokerMgmt, Registry};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn issue_revoke_evicts_the_principal() -> anyhow::Result<()> {
    let mgmt = FakeBrokerMgmt::spawn().await?;
    let registry = Registry::spawn(registry_config(0, mgmt.url())).await?;
    let client = reqwest::Client::new();

    let issued: serde_json::Value = client
        .post(registry.url("/api/v1/tokens"))
        .json(&serde_json::json!({ "device_id": 11, "ttl_secs": 3600 }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(issued["principal"], "device_11");
    let id = issued["id"].as_str().unwrap_or_default().to_owned();

    let revoked: serde_json::Value = client
        .delete(registry.url(&format!("/api/v1/tokens/{id}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(revoked["removed"], true);

    let calls = mgmt.wait_for_calls(1, TIMEOUT).await?;
    assert_eq!(calls, ["device_11"]);

    let tokens: serde_json::Value =
        client.get(registry.url("/api/v1/tokens")).send().await?.json().await?;
    assert_eq!(tokens.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn revocation_survives_a_dead_broker() -> anyhow::Result<()> {
    // Nothing listens on this URL; eviction cannot reach anyone.
    let registry = Registry::spawn(registry_config(0, "http://127.0.0.1:1".to_owned())).await?;
    let client = reqwest::Client::new();

    let issued: serde_json::Value = client
        .post(registry.url("/api/v1/tokens"))
        .json(&serde_json::json!({ "device_id": 3, "ttl_secs": 3600 }))
        .send()
        .await?
        .json()
        .await?;
    let id = issued["id"].as_str().unwrap_or_default().to_owned();

    let resp = client.delete(registry.url(&format!("/api/v1/tokens/{id}"))).send().await?;
    assert!(resp.status().is_success());
    let revoked: serde_json::Value = resp.json().await?;
    assert_eq!(revoked["removed"], true);

    let tokens: serde_json::Value =
        client.get(registry.url("/api/v1/tokens")).send().await?.json().await?;
    assert_eq!(tokens.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn background_sweep_purges_expired_tokens() -> anyhow::Result<()> {
    let mgmt = FakeBrokerMgmt::spawn().await?;
    let mut config = registry_config(0, mgmt.url());
    config.sweep_interval_secs = 1;
    let registry = Registry::spawn(config).await?;
    let client = reqwest::Client::new();

    // Already expired on arrival.
    let resp = client
        .post(registry.url("/api/v1/tokens"))
        .json(&serde_json::json!({ "device_id": 8, "exp": 1 }))
        .send()
        .await?;
    assert!(resp.status().is_success());

    let calls = mgmt.wait_for_calls(1, TIMEOUT).await?;
    assert_eq!(calls, ["device_8"]);

    let tokens: serde_json::Value =
        client.get(registry.url("/api/v1/tokens")).send().await?.json().await?;
    assert_eq!(tokens.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn manual_sweep_reports_purge_count() -> anyhow::Result<()> {
    let mgmt = FakeBrokerMgmt::spawn().await?;
    let registry = Registry::spawn(registry_config(0, mgmt.url())).await?;
    let client = reqwest::Client::new();

    for (device_id, exp) in [(1u64, 1u64), (2, 2)] {
        let resp = client
            .post(registry.url("/api/v1/tokens"))
            .json(&serde_json::json!({ "device_id": device_id, "exp": exp }))
            .send()
            .await?;
        assert!(resp.status().is_success());
    }

    let swept: serde_json::Value =
        client.post(registry.url("/api/v1/tokens/sweep")).send().await?.json().await?;
    assert_eq!(swept["purged"], 2);

    let mut calls = mgmt.wait_for_calls(2, TIMEOUT).await?;
    calls.sort();
    assert_eq!(calls, ["device_1", "device_2"]);

    Ok(())
}
