//! YouTube link helpers.

/// Extract the video id from a watch, short or embed link.
///
/// A bare id (six or more of `[A-Za-z0-9_-]`) is returned as is.
pub fn video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(url) = url::Url::parse(input) {
        let host = url.host_str().unwrap_or("");
        if host.ends_with("youtube.com") {
            if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
                return valid_id(&v);
            }
            let mut segments = url.path_segments()?;
            return match segments.next() {
                Some("embed") | Some("shorts") | Some("live") => segments.next().and_then(valid_id),
                _ => None,
            };
        }
        if host.ends_with("youtu.be") {
            return url
                .path_segments()?
                .filter(|s| !s.is_empty())
                .last()
                .and_then(valid_id);
        }
        return None;
    }
    valid_id(input)
}

/// Embeddable player URL for a YouTube link; other inputs are returned unchanged.
pub fn embed_url(video_url: &str) -> String {
    if video_url.is_empty() || url::Url::parse(video_url).is_err() {
        return video_url.to_string();
    }
    match video_id(video_url) {
        Some(id) => format!("https://www.youtube.com/embed/{id}"),
        None => video_url.to_string(),
    }
}

fn valid_id(s: &str) -> Option<String> {
    let ok = s.len() >= 6
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    ok.then(|| s.to_string())
}
