//! Per-site video adapters. The renderer only sees the
//! [`VideoProcessor`] trait; site specifics stay here.

use regex::Regex;
use std::{fmt, sync::OnceLock};

use crate::{
    model::{CaptionContainer, CaptionDataContainer},
    render::Dimensions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// The site's own watch page.
    Watch,
    /// A player embedded in a third-party page.
    Embed,
    Other,
}

pub trait VideoProcessor: fmt::Debug {
    /// Stable site tag stored with captions, e.g. `"youtube"`.
    fn video_source(&self) -> &'static str;

    fn video_id(&self, url: &str) -> Option<String>;

    fn page_type(&self, url: &str) -> PageType;

    fn generate_video_link(&self, video_id: &str) -> String;

    /// Area the video actually occupies inside the player container.
    fn retrieve_video_dimensions(&self, container: Dimensions) -> Dimensions {
        container
    }

    /// Whether the player exposes a video element the external ASS
    /// renderer can attach to.
    fn supports_advanced_renderer(&self) -> bool {
        true
    }
}

fn youtube_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})",
        )
        .expect("valid regex")
    })
}

fn vimeo_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("valid regex"))
}

fn niconico_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"nicovideo\.jp/watch/((?:sm|nm|so)?\d+)").expect("valid regex"))
}

fn first_capture(re: &Regex, url: &str) -> Option<String> {
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YoutubeProcessor;

impl VideoProcessor for YoutubeProcessor {
    fn video_source(&self) -> &'static str {
        "youtube"
    }

    fn video_id(&self, url: &str) -> Option<String> {
        first_capture(youtube_re(), url)
    }

    fn page_type(&self, url: &str) -> PageType {
        match self.video_id(url) {
            Some(_) if url.contains("/embed/") => PageType::Embed,
            Some(_) => PageType::Watch,
            None => PageType::Other,
        }
    }

    fn generate_video_link(&self, video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={video_id}")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VimeoProcessor;

impl VideoProcessor for VimeoProcessor {
    fn video_source(&self) -> &'static str {
        "vimeo"
    }

    fn video_id(&self, url: &str) -> Option<String> {
        first_capture(vimeo_re(), url)
    }

    fn page_type(&self, url: &str) -> PageType {
        match self.video_id(url) {
            Some(_) if url.contains("player.vimeo.com") => PageType::Embed,
            Some(_) => PageType::Watch,
            None => PageType::Other,
        }
    }

    fn generate_video_link(&self, video_id: &str) -> String {
        format!("https://vimeo.com/{video_id}")
    }
}

/// niconico draws into a fixed 16:9 stage and renders video on a canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiconicoProcessor;

impl VideoProcessor for NiconicoProcessor {
    fn video_source(&self) -> &'static str {
        "niconico"
    }

    fn video_id(&self, url: &str) -> Option<String> {
        first_capture(niconico_re(), url)
    }

    fn page_type(&self, url: &str) -> PageType {
        match self.video_id(url) {
            Some(_) if url.contains("embed.nicovideo.jp") => PageType::Embed,
            Some(_) => PageType::Watch,
            None => PageType::Other,
        }
    }

    fn generate_video_link(&self, video_id: &str) -> String {
        format!("https://www.nicovideo.jp/watch/{video_id}")
    }

    fn retrieve_video_dimensions(&self, container: Dimensions) -> Dimensions {
        container.fit_aspect(16.0 / 9.0)
    }

    fn supports_advanced_renderer(&self) -> bool {
        false
    }
}

/// A plain `<video>` element or local file; the source URL is the id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectVideoProcessor;

impl VideoProcessor for DirectVideoProcessor {
    fn video_source(&self) -> &'static str {
        "direct"
    }

    fn video_id(&self, url: &str) -> Option<String> {
        let url = url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }

    fn page_type(&self, _url: &str) -> PageType {
        PageType::Other
    }

    fn generate_video_link(&self, video_id: &str) -> String {
        video_id.to_string()
    }
}

/// Picks the site adapter for `url`.
pub fn processor_for_url(url: &str) -> Option<Box<dyn VideoProcessor>> {
    let candidates: [Box<dyn VideoProcessor>; 3] = [
        Box::new(YoutubeProcessor),
        Box::new(VimeoProcessor),
        Box::new(NiconicoProcessor),
    ];
    candidates.into_iter().find(|p| p.video_id(url).is_some())
}

impl CaptionContainer {
    /// Wraps a user-loaded document for the video at `url`.
    pub fn for_video(
        processor: &dyn VideoProcessor,
        url: &str,
        data: CaptionDataContainer,
    ) -> Option<Self> {
        let video_id = processor.video_id(url)?;
        Some(Self {
            data,
            video_id,
            video_source: processor.video_source().to_string(),
            loaded_by_user: true,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_urls() {
        let p = YoutubeProcessor;
        assert_eq!(
            p.video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            p.video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(p.video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            p.page_type("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            PageType::Embed
        );
        assert_eq!(p.page_type("https://www.youtube.com/feed"), PageType::Other);
        assert_eq!(
            p.generate_video_link("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn vimeo_and_niconico_urls() {
        assert_eq!(
            VimeoProcessor.video_id("https://vimeo.com/76979871").as_deref(),
            Some("76979871")
        );
        assert_eq!(
            VimeoProcessor.page_type("https://player.vimeo.com/video/76979871"),
            PageType::Embed
        );
        assert_eq!(
            NiconicoProcessor.video_id("https://www.nicovideo.jp/watch/sm9").as_deref(),
            Some("sm9")
        );
        assert!(!NiconicoProcessor.supports_advanced_renderer());
    }

    #[test]
    fn picks_processor_by_url() {
        let p = processor_for_url("https://vimeo.com/1234").expect("processor");
        assert_eq!(p.video_source(), "vimeo");
        assert!(processor_for_url("https://example.com/video.mp4").is_none());
    }

    #[test]
    fn niconico_fits_sixteen_by_nine() {
        let d = NiconicoProcessor.retrieve_video_dimensions(Dimensions::new(1000.0, 1000.0));
        assert_eq!(d.width, 1000.0);
        assert_eq!(d.height, 562.5);
    }

    #[test]
    fn wraps_user_caption() {
        let c = CaptionContainer::for_video(
            &YoutubeProcessor,
            "https://youtu.be/dQw4w9WgXcQ",
            CaptionDataContainer::new_empty(),
        )
        .expect("container");
        assert_eq!(c.video_source, "youtube");
        assert!(c.is_editable());
    }
}
