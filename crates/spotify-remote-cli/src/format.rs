use serde_json::Value;
use spotify_remote_core::models::{Resource, Status};

/// Format a labelled resource as `Label: name [uri]`.
/// Missing resources print with empty name and URI.
pub fn format_resource(label: &str, resource: Option<&Resource>) -> String {
    let empty = Resource::default();
    let resource = resource.unwrap_or(&empty);
    format!("{}: {} [{}]", label, resource.name(), resource.uri())
}

/// Lines describing the current track
pub fn format_track(status: &Status) -> Vec<String> {
    match status.track {
        Some(ref track) => vec![
            format_resource("Artist", track.artist_resource.as_ref()),
            format_resource("Album", track.album_resource.as_ref()),
            format_resource("Title", track.track_resource.as_ref()),
        ],
        None => vec!["No track info available".to_string()],
    }
}

/// One-line summary of a version result
pub fn format_version(version: &Value) -> String {
    let service = version.get("version").map(Value::to_string);
    let client = version.get("client_version").and_then(Value::as_str);

    match (service, client) {
        (Some(service), Some(client)) => format!("Version: {} (client {})", service, client),
        (Some(service), None) => format!("Version: {}", service),
        (None, Some(client)) => format!("Client version: {}", client),
        (None, None) => "No version info available".to_string(),
    }
}
