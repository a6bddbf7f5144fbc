//! Playback-synchronized rendering.
//!
//! ```text
//! TimeSource ──► Synchronizer ──► DisplaySlot[track][slot]
//!   (video / iframe proxy)   │
//!                            └─ locator on play/seek/resize
//! raw ASS ─────► AdvancedRenderer ──► SubtitleEngine (external)
//! ```

mod advanced;
mod clock;
mod layout;
mod sync;

pub use advanced::{
    AdvancedRenderer, CaptionRenderer, RendererKind, SubtitleEngine, select_renderer,
};
pub use clock::{PlaybackEvent, ProxyClock, ProxyMessage, TimeSource, VideoClock};
pub use layout::{
    DEFAULT_EDGE_MARGIN, DEFAULT_FONT_SCALE, Dimensions, FontSizing, Placement, TextAlign, place,
};
pub use sync::{
    Capacity, ContainerElement, DisplaySlot, FixedContainer, MAX_CONCURRENT_CAPTIONS, MAX_TRACKS,
    SessionContext, Synchronizer,
};
