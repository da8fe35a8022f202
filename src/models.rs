use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Public profile fields of a GitHub user, as returned by `/users/{username}`.
///
/// Every field is optional on the wire: a missing or `null` key decodes to
/// the empty string or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub followers: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub following: u64,
}

impl ProfileRecord {
    /// Decodes a response body, which must be a JSON object.
    ///
    /// The derived visitor also takes sequences, so `[]` would otherwise pass
    /// as an empty profile.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        let object: Map<String, Value> = serde_json::from_slice(body)?;
        Self::deserialize(Value::Object(object))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error body GitHub sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
