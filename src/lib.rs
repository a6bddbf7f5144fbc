//! Caption overlay core: the caption document model, format import and
//! SRT export, a pure edit engine with undo, and the playback-driven
//! renderer that decides which cues are on screen.

pub mod edit;
pub mod formats;
pub mod locator;
pub mod model;
pub mod processor;
pub mod raw;
pub mod render;
