use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A track as returned by `GET /tracks`. Every field may be absent or of an
/// unexpected type; either way it reads as `None`. Unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub artists_title: Option<String>,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub bpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub release_date: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(v).ok())
}
