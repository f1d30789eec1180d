use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::api::client::is_truthy;
use crate::api::CommandResult;

/// Player status as reported by `/remote/status.json`.
///
/// `playing` follows JSON truthiness and `track` is only present when it is
/// a non-empty object. Every other field of the result is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Status {
    #[serde(deserialize_with = "deserialize_truthy")]
    pub playing: bool,
    #[serde(deserialize_with = "deserialize_non_empty_object")]
    pub track: Option<Track>,
}

/// The current track and the resources it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Track {
    #[serde(deserialize_with = "deserialize_non_empty_object")]
    pub track_resource: Option<Resource>,
    #[serde(deserialize_with = "deserialize_non_empty_object")]
    pub artist_resource: Option<Resource>,
    #[serde(deserialize_with = "deserialize_non_empty_object")]
    pub album_resource: Option<Resource>,
}

/// A named entity with its URI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub uri: Option<String>,
}

impl Status {
    /// Read a status result. A result that is not an object reads as
    /// stopped with no track.
    pub fn from_result(result: &CommandResult) -> Self {
        if !result.is_object() {
            return Self::default();
        }
        Status::deserialize(result).unwrap_or_default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Resource {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn uri(&self) -> &str {
        self.uri.as_deref().unwrap_or("")
    }
}

fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| is_truthy(&value))
}

fn deserialize_non_empty_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Object(fields) if !fields.is_empty() => T::deserialize(Value::Object(fields))
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Strings as-is, other scalars in their JSON form, null as absent
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
