// tests/integration_vault.rs

use std::collections::HashMap;
use std::time::Duration;
use vault_lite::{SecretsClient, TokenCreateRequest, VaultError, blocking};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn mock_client(mock_server: &MockServer) -> SecretsClient {
    SecretsClient::new(mock_server.uri(), TOKEN)
}

fn secret(key: &str, value: &str) -> HashMap<String, String> {
    HashMap::from([(key.to_string(), value.to_string())])
}

#[tokio::test]
async fn test_read_secret() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/foo"))
        .and(header("X-Vault-Token", TOKEN))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "request_id": "test-request-id",
            "lease_id": "",
            "renewable": false,
            "lease_duration": 2764800,
            "data": {"value": "bar"},
            "wrap_info": null,
            "warnings": null,
            "auth": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = mock_client(&mock_server)
        .read("secret/foo")
        .await
        .expect("should read secret");

    assert_eq!(resp.get("value"), Some(&serde_json::json!("bar")));
    assert_eq!(resp.lease_duration(), Duration::from_secs(2764800));
}

#[tokio::test]
async fn test_read_missing_secret() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": ["no value found"]
        })))
        .mount(&mock_server)
        .await;

    let err = mock_client(&mock_server)
        .read("secret/missing")
        .await
        .unwrap_err();

    assert!(
        matches!(&err, VaultError::Operation { status: 404, errors } if errors == &["no value found"]),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_write_secret() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/secret/foo"))
        .and(header("X-Vault-Token", TOKEN))
        .and(body_json(serde_json::json!({"value": "bar"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = mock_client(&mock_server)
        .write("secret/foo", &secret("value", "bar"))
        .await
        .expect("204 should be a success");

    assert!(resp.data.is_empty());
}

#[tokio::test]
async fn test_write_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/secret/foo"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "errors": ["missing client token"]
        })))
        .mount(&mock_server)
        .await;

    let err = mock_client(&mock_server)
        .write("secret/foo", &secret("value", "bar"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.errors(), ["missing client token".to_string()]);
}

#[tokio::test]
async fn test_delete_only_accepts_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/secret/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/secret/bar"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);

    let err = client.delete("secret/foo").await.unwrap_err();
    assert_eq!(err.status(), Some(200));
    assert!(err.errors().is_empty());

    client
        .delete("secret/bar")
        .await
        .expect("204 should be a success");
}

#[tokio::test]
async fn test_renew_and_revoke_lease() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/sys/renew/database/creds/app/abc"))
        .and(body_json(serde_json::json!({"increment": "3600"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lease_id": "database/creds/app/abc",
            "renewable": true,
            "lease_duration": 3600,
            "data": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v1/sys/revoke/database/creds/app/abc"))
        .and(body_json(serde_json::json!({})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);

    let resp = client
        .renew("database/creds/app/abc", &secret("increment", "3600"))
        .await
        .expect("should renew lease");
    assert_eq!(resp.lease_id, "database/creds/app/abc");
    assert!(resp.renewable);

    client
        .revoke("database/creds/app/abc")
        .await
        .expect("should revoke lease");
}

#[tokio::test]
async fn test_renew_unknown_lease() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/sys/renew/unknown"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "errors": ["lease not found or lease is not renewable"]
        })))
        .mount(&mock_server)
        .await;

    let err = mock_client(&mock_server)
        .renew("unknown", &HashMap::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_seal_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/seal-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "shamir",
            "initialized": true,
            "sealed": false,
            "t": 3,
            "n": 5,
            "progress": 0,
            "nonce": "",
            "version": "1.15.2",
            "cluster_name": "vault-cluster-1",
            "cluster_id": "c2b1"
        })))
        .mount(&mock_server)
        .await;

    let status = mock_client(&mock_server)
        .status()
        .await
        .expect("should get seal status");

    assert!(!status.sealed);
    assert_eq!(status.shares, 5);
    assert_eq!(status.threshold, 3);
    assert_eq!(status.progress, 0);
    assert_eq!(status.cluster_name.as_deref(), Some("vault-cluster-1"));
}

#[tokio::test]
async fn test_lookup_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup/s.lookedup"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "accessor": "8609694a",
                "creation_time": 1523979354,
                "creation_ttl": 2764800,
                "display_name": "token-ci",
                "id": "s.lookedup",
                "num_uses": 0,
                "policies": ["default", "ci"],
                "renewable": true,
                "ttl": 2764790
            }
        })))
        .mount(&mock_server)
        .await;

    let resp = mock_client(&mock_server)
        .lookup_token("s.lookedup")
        .await
        .expect("should look up token");

    let info = resp.data.expect("lookup should return token data");
    assert_eq!(info.id, "s.lookedup");
    assert_eq!(info.display_name, "token-ci");
    assert_eq!(info.policies, vec!["default", "ci"]);
    assert!(info.renewable);
}

#[tokio::test]
async fn test_lookup_unknown_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup/s.unknown"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "errors": ["bad token"]
        })))
        .mount(&mock_server)
        .await;

    let err = mock_client(&mock_server)
        .lookup_token("s.unknown")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(err.errors(), ["bad token".to_string()]);
}

#[tokio::test]
async fn test_create_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/token/create"))
        .and(header("X-Vault-Token", TOKEN))
        .and(body_json(serde_json::json!({
            "policies": ["ci", "web"],
            "no_parent": true,
            "ttl": "3600s",
            "display_name": "deploy"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lease_id": "",
            "renewable": false,
            "lease_duration": 0,
            "data": null,
            "auth": {
                "client_token": "s.created",
                "accessor": "acc-1",
                "policies": ["ci", "default", "web"],
                "token_policies": ["ci", "default", "web"],
                "metadata": null,
                "lease_duration": 3600,
                "renewable": true
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = TokenCreateRequest::builder()
        .policies(["web", "ci"])
        .no_parent(true)
        .ttl(Duration::from_secs(3600))
        .display_name("deploy")
        .build();

    let resp = mock_client(&mock_server)
        .create_token(&request)
        .await
        .expect("should create token");

    let auth = resp.auth.expect("creation should return auth block");
    assert_eq!(auth.client_token, "s.created");
    assert_eq!(auth.lease_duration, 3600);
    assert!(resp.data.is_none());
}

#[tokio::test]
async fn test_server_unreachable() {
    // Nothing listens on port 1.
    let client = SecretsClient::new("http://127.0.0.1:1", TOKEN);

    let err = client.status().await.unwrap_err();

    assert!(
        matches!(err, VaultError::RequestError(_)),
        "transport failure should not be an operation error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_custom_http_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/seal-status"))
        .and(header("User-Agent", "billing-service"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sealed": true, "t": 1, "n": 1, "progress": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let client = SecretsClient::builder()
        .base_url(mock_server.uri())
        .token(TOKEN)
        .application_name("billing-service")
        .http_client(http)
        .build()
        .unwrap();

    let status = client.status().await.expect("should get seal status");
    assert!(status.sealed);
}

#[tokio::test]
async fn test_with_http_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/foo"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"value": "bar"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let client = SecretsClient::with_http_client(mock_server.uri(), TOKEN, http);

    let resp = client.read("secret/foo").await.expect("should read secret");
    assert_eq!(resp.get("value"), Some(&serde_json::json!("bar")));
}

#[test]
fn test_blocking_with_http_client() {
    // The blocking client owns its runtime, so the mock server runs on a separate one.
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(MockServer::start());

    runtime.block_on(
        Mock::given(method("DELETE"))
            .and(path("/v1/secret/foo"))
            .and(header("X-Vault-Token", TOKEN))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server),
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let client = blocking::SecretsClient::with_http_client(mock_server.uri(), TOKEN, http).unwrap();

    client.delete("secret/foo").expect("204 should be a success");

    runtime.block_on(mock_server.verify());
}
