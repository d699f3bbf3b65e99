use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Generic Vault response envelope for secret reads, writes and renewals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lease_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lease_duration: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub renewable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(default)]
    pub auth: Option<AuthInfo>,
}

impl SecretResponse {
    pub fn lease_duration(&self) -> Duration {
        Duration::from_secs(self.lease_duration)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

/// Seal status of the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub sealed: bool,
    #[serde(rename = "n")]
    pub shares: u32,
    #[serde(rename = "t")]
    pub threshold: u32,
    pub progress: u32,
    #[serde(default)]
    pub initialized: Option<bool>,
    #[serde(default, rename = "type")]
    pub seal_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<String>,
}

/// Token metadata as returned by a token lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub accessor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub policies: Vec<String>,
    pub ttl: u64,
    pub creation_time: i64,
    pub creation_ttl: u64,
    pub explicit_max_ttl: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    pub num_uses: u32,
    pub orphan: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    pub renewable: bool,
    pub meta: Option<HashMap<String, String>>,
}

impl TokenInfo {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    /// Creation time, `None` if the server reported an out-of-range timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.creation_time, 0)
    }
}

/// The `auth` block returned when a token is issued
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthInfo {
    pub client_token: String,
    pub accessor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub policies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub token_policies: Vec<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub lease_duration: u64,
    pub renewable: bool,
    pub orphan: bool,
}

/// Envelope for token endpoints: lookups fill `data`, creation fills `auth`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lease_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lease_duration: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub renewable: bool,
    #[serde(default)]
    pub data: Option<TokenInfo>,
    #[serde(default)]
    pub auth: Option<AuthInfo>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Options for `POST /v1/auth/token/create`.
///
/// Unset options are left out of the payload so the server applies its own
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_parent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_default_policy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewable: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration"
    )]
    pub ttl: Option<Duration>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration"
    )]
    pub explicit_max_ttl: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_uses: Option<u32>,
}

impl TokenCreateRequest {
    pub fn builder() -> TokenCreateRequestBuilder {
        TokenCreateRequestBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct TokenCreateRequestBuilder {
    request: TokenCreateRequest,
}

impl TokenCreateRequestBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.request.id = Some(id.into());
        self
    }

    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.request
            .policies
            .get_or_insert_with(BTreeSet::new)
            .insert(policy.into());
        self
    }

    pub fn policies<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request
            .policies
            .get_or_insert_with(BTreeSet::new)
            .extend(policies.into_iter().map(Into::into));
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .meta
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn no_parent(mut self, no_parent: bool) -> Self {
        self.request.no_parent = Some(no_parent);
        self
    }

    pub fn no_default_policy(mut self, no_default_policy: bool) -> Self {
        self.request.no_default_policy = Some(no_default_policy);
        self
    }

    pub fn renewable(mut self, renewable: bool) -> Self {
        self.request.renewable = Some(renewable);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.request.ttl = Some(ttl);
        self
    }

    pub fn explicit_max_ttl(mut self, ttl: Duration) -> Self {
        self.request.explicit_max_ttl = Some(ttl);
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.request.display_name = Some(name.into());
        self
    }

    pub fn num_uses(mut self, num_uses: u32) -> Self {
        self.request.num_uses = Some(num_uses);
        self
    }

    pub fn build(self) -> TokenCreateRequest {
        self.request
    }
}

/// Error body sent by the server on failure
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Vault parses "<n>s" as a duration in seconds.
fn serialize_duration<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_str(&format!("{}s", duration.as_secs())),
        None => serializer.serialize_none(),
    }
}
