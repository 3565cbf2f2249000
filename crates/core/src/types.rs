use serde::Deserialize;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Arbitrary extra JSON fields preserved when re-serializing a backend payload.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// Deserialize a field that the backend may send as `null`, treating
/// `null` like a missing field. Pair with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
