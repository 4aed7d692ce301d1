//! crates/ministry_core/src/video.rs
//!
//! Helpers for presenting a lesson's video: the embeddable player URL and a
//! short duration label.

use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|[?&]v=)([A-Za-z0-9_-]+)").expect("valid YouTube pattern")
});

static VIMEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/([^?/]+)").expect("valid Vimeo pattern"));

/// Turns a watch URL into the URL of an embeddable player.
///
/// YouTube links are routed through the privacy-enhanced domain; Vimeo links
/// point at the Vimeo player. Anything else is returned unchanged.
pub fn embed_url(video_url: &str) -> String {
    if video_url.contains("youtube.com") || video_url.contains("youtu.be") {
        if let Some(id) = YOUTUBE_ID.captures(video_url).and_then(|c| c.get(1)) {
            return format!(
                "https://www.youtube-nocookie.com/embed/{}?enablejsapi=1&rel=0&modestbranding=1",
                id.as_str()
            );
        }
    }
    if video_url.contains("vimeo.com") {
        if let Some(id) = VIMEO_ID.captures(video_url).and_then(|c| c.get(1)) {
            return format!("https://player.vimeo.com/video/{}", id.as_str());
        }
    }
    video_url.to_string()
}

/// Whole minutes, rounded down, e.g. `"12 min"`.
pub fn duration_label(duration_secs: u32) -> String {
    format!("{} min", duration_secs / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_and_short_links_embed_the_same_video() {
        let expected =
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?enablejsapi=1&rel=0&modestbranding=1";
        assert_eq!(embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"), expected);
        assert_eq!(embed_url("https://youtu.be/dQw4w9WgXcQ?si=abc"), expected);
    }

    #[test]
    fn vimeo_links_use_the_player() {
        assert_eq!(
            embed_url("https://vimeo.com/76979871?share=copy"),
            "https://player.vimeo.com/video/76979871"
        );
    }

    #[test]
    fn other_urls_pass_through() {
        let url = "https://cdn.example.org/aula1.mp4";
        assert_eq!(embed_url(url), url);
    }

    #[test]
    fn duration_is_rounded_down_to_minutes() {
        assert_eq!(duration_label(0), "0 min");
        assert_eq!(duration_label(119), "1 min");
        assert_eq!(duration_label(3600), "60 min");
    }
}
