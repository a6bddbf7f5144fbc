use crate::model::{CaptionContainer, CaptionDataContainer};

use super::{
    clock::TimeSource,
    layout::{Dimensions, FontSizing},
    sync::{Capacity, SessionContext, Synchronizer},
};

/// External engine that renders ASS/SSA scripts itself. It gets the raw
/// script and the playback time and nothing else.
pub trait SubtitleEngine {
    fn load(&mut self, raw: &str, fonts: &[String]);
    fn set_time(&mut self, time_ms: i64);
    fn resize(&mut self, video: Dimensions);
    fn dispose(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Default,
    AdvancedOctopus,
}

/// The advanced path is used for ASS/SSA sources kept as raw text, as
/// long as the player can host the external engine.
pub fn select_renderer(
    caption: &CaptionContainer,
    convert_requested: bool,
    supports_advanced: bool,
) -> RendererKind {
    match &caption.raw {
        Some(raw) if raw.format.is_advanced() && !convert_requested && supports_advanced => {
            RendererKind::AdvancedOctopus
        }
        _ => RendererKind::Default,
    }
}

/// Pass-through driver for a [`SubtitleEngine`].
pub struct AdvancedRenderer<T: TimeSource, E: SubtitleEngine> {
    ctx: SessionContext<T>,
    engine: E,
    last_time: Option<i64>,
}

impl<T: TimeSource, E: SubtitleEngine> AdvancedRenderer<T, E> {
    pub fn new(ctx: SessionContext<T>, mut engine: E, raw: &str, fonts: &[String]) -> Self {
        engine.load(raw, fonts);
        engine.resize(ctx.video_dimensions());
        Self {
            ctx,
            engine,
            last_time: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn time_source_mut(&mut self) -> &mut T {
        &mut self.ctx.time_source
    }

    pub fn tick(&mut self) -> bool {
        let mut jumped = false;
        while let Some(event) = self.ctx.time_source.poll_event() {
            jumped |= event.is_discontinuity();
        }
        let time = self.ctx.time_source.current_time_ms();
        if !jumped && self.last_time == Some(time) {
            return false;
        }
        self.last_time = Some(time);
        self.engine.set_time(time);
        true
    }

    pub fn on_resize(&mut self) {
        self.engine.resize(self.ctx.video_dimensions());
    }
}

impl<T: TimeSource, E: SubtitleEngine> Drop for AdvancedRenderer<T, E> {
    fn drop(&mut self) {
        self.engine.dispose();
    }
}

/// The renderer chosen for one caption on one page.
pub enum CaptionRenderer<T: TimeSource, E: SubtitleEngine> {
    Default {
        sync: Synchronizer<T>,
        data: CaptionDataContainer,
    },
    AdvancedOctopus(AdvancedRenderer<T, E>),
}

impl<T: TimeSource, E: SubtitleEngine> CaptionRenderer<T, E> {
    pub fn new(
        ctx: SessionContext<T>,
        caption: &CaptionContainer,
        convert_requested: bool,
        engine: E,
        fonts: &[String],
        capacity: Capacity,
        font_sizing: FontSizing,
    ) -> Self {
        let supports = ctx.processor.supports_advanced_renderer();
        match (select_renderer(caption, convert_requested, supports), &caption.raw) {
            (RendererKind::AdvancedOctopus, Some(raw)) => {
                tracing::info!(
                    format = %raw.format,
                    bytes = raw.data.len(),
                    "using advanced renderer"
                );
                CaptionRenderer::AdvancedOctopus(AdvancedRenderer::new(
                    ctx, engine, &raw.data, fonts,
                ))
            }
            _ => {
                let mut sync = Synchronizer::new(ctx, capacity, font_sizing);
                sync.load(&caption.data);
                CaptionRenderer::Default {
                    sync,
                    data: caption.data.clone(),
                }
            }
        }
    }

    pub fn kind(&self) -> RendererKind {
        match self {
            CaptionRenderer::Default { .. } => RendererKind::Default,
            CaptionRenderer::AdvancedOctopus(_) => RendererKind::AdvancedOctopus,
        }
    }

    pub fn tick(&mut self) -> bool {
        match self {
            CaptionRenderer::Default { sync, data } => sync.tick(data),
            CaptionRenderer::AdvancedOctopus(r) => r.tick(),
        }
    }

    pub fn on_resize(&mut self) {
        match self {
            CaptionRenderer::Default { sync, data } => {
                sync.on_resize(data);
            }
            CaptionRenderer::AdvancedOctopus(r) => r.on_resize(),
        }
    }

    pub fn time_source_mut(&mut self) -> &mut T {
        match self {
            CaptionRenderer::Default { sync, .. } => sync.time_source_mut(),
            CaptionRenderer::AdvancedOctopus(r) => r.time_source_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        formats::CaptionFormat,
        model::{Cue, RawCaptionData},
        processor::{DirectVideoProcessor, NiconicoProcessor, VideoProcessor},
        render::{clock::VideoClock, sync::FixedContainer},
    };
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct Calls {
        loaded: Vec<String>,
        times: Vec<i64>,
        disposed: bool,
    }

    #[derive(Default, Clone)]
    struct RecordingEngine(Rc<RefCell<Calls>>);

    impl SubtitleEngine for RecordingEngine {
        fn load(&mut self, raw: &str, _fonts: &[String]) {
            self.0.borrow_mut().loaded.push(raw.to_string());
        }
        fn set_time(&mut self, time_ms: i64) {
            self.0.borrow_mut().times.push(time_ms);
        }
        fn resize(&mut self, _video: Dimensions) {}
        fn dispose(&mut self) {
            self.0.borrow_mut().disposed = true;
        }
    }

    fn ctx(processor: Box<dyn VideoProcessor>) -> SessionContext<VideoClock> {
        SessionContext::new(
            VideoClock::new(None),
            Box::new(FixedContainer(Dimensions::new(640.0, 360.0))),
            processor,
        )
    }

    fn ass_caption() -> CaptionContainer {
        CaptionContainer {
            data: CaptionDataContainer::single_track(vec![Cue::new(0, 1_000, "converted")]),
            raw: Some(RawCaptionData::new(CaptionFormat::Ass, "[Events]\n")),
            ..CaptionContainer::default()
        }
    }

    #[test]
    fn selection_rules() {
        let caption = ass_caption();
        assert_eq!(select_renderer(&caption, false, true), RendererKind::AdvancedOctopus);
        assert_eq!(select_renderer(&caption, true, true), RendererKind::Default);
        assert_eq!(select_renderer(&caption, false, false), RendererKind::Default);
        assert_eq!(
            select_renderer(&CaptionContainer::default(), false, true),
            RendererKind::Default
        );
    }

    #[test]
    fn advanced_path_passes_raw_text_and_time() {
        let engine = RecordingEngine::default();
        let calls = engine.0.clone();
        let mut r = CaptionRenderer::new(
            ctx(Box::new(DirectVideoProcessor)),
            &ass_caption(),
            false,
            engine,
            &[],
            Capacity::default(),
            FontSizing::default(),
        );
        assert_eq!(r.kind(), RendererKind::AdvancedOctopus);
        r.time_source_mut().play();
        r.time_source_mut().advance(250);
        assert!(r.tick());
        assert!(!r.tick());
        drop(r);

        let calls = calls.borrow();
        assert_eq!(calls.loaded, vec!["[Events]\n".to_string()]);
        assert_eq!(calls.times, vec![250]);
        assert!(calls.disposed);
    }

    #[test]
    fn unsupported_player_falls_back_to_default() {
        let mut r = CaptionRenderer::new(
            ctx(Box::new(NiconicoProcessor)),
            &ass_caption(),
            false,
            RecordingEngine::default(),
            &[],
            Capacity::default(),
            FontSizing::default(),
        );
        assert_eq!(r.kind(), RendererKind::Default);
        r.tick();
        match &r {
            CaptionRenderer::Default { sync, .. } => {
                let shown: Vec<&str> = sync.visible().map(|(_, _, d)| d.text.as_str()).collect();
                assert_eq!(shown, vec!["converted"]);
            }
            CaptionRenderer::AdvancedOctopus(_) => unreachable!(),
        }
    }
}
