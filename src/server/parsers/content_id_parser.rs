use crate::server::models::{ContentRequest, MediaType};

/// splits `base[:season:episode]` into a request
///
/// the third segment is what makes it an episode, two segments are treated like a bare id. an
/// empty base id is passed through as-is and resolves to nothing later on
pub fn parse_content_id(raw_id: &str, requested: MediaType) -> ContentRequest {
    let parts: Vec<&str> = raw_id.split(':').collect();
    let base_id = parts.first().copied().unwrap_or_default().trim().to_string();

    if parts.len() >= 3 {
        return ContentRequest {
            base_id,
            season: Some(parts[1].trim().to_string()),
            episode: Some(parts[2].trim().to_string()),
            media_type: MediaType::Series,
        };
    }

    ContentRequest {
        base_id,
        season: None,
        episode: None,
        media_type: requested,
    }
}
