//! Format codecs: external caption files in, SRT (or the native JSON
//! document) out.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

use crate::model::CaptionDataContainer;

pub mod ass;
pub mod bidi;
pub mod json;
pub mod sbv;
pub mod srt;
pub mod time;
pub mod txt;

pub use ass::{AssCompiler, ScriptCompiler};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("export to {0} is not supported")]
    UnsupportedExport(CaptionFormat),
    #[error("unknown caption format: {0}")]
    UnknownFormat(String),
    #[error("JSON document error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    Srt,
    Vtt,
    Sbv,
    Txt,
    Ass,
    Ssa,
    Json,
}

impl CaptionFormat {
    pub fn extension(self) -> &'static str {
        match self {
            CaptionFormat::Srt => "srt",
            CaptionFormat::Vtt => "vtt",
            CaptionFormat::Sbv => "sbv",
            CaptionFormat::Txt => "txt",
            CaptionFormat::Ass => "ass",
            CaptionFormat::Ssa => "ssa",
            CaptionFormat::Json => "json",
        }
    }

    /// Formats whose full fidelity only the advanced renderer reproduces.
    pub fn is_advanced(self) -> bool {
        matches!(self, CaptionFormat::Ass | CaptionFormat::Ssa)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for CaptionFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(CaptionFormat::Srt),
            "vtt" => Ok(CaptionFormat::Vtt),
            "sbv" => Ok(CaptionFormat::Sbv),
            "txt" => Ok(CaptionFormat::Txt),
            "ass" => Ok(CaptionFormat::Ass),
            "ssa" => Ok(CaptionFormat::Ssa),
            "json" => Ok(CaptionFormat::Json),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Imports `content`. Never fails: input that cannot be read at all
/// yields a container with no tracks.
pub fn parse(format: CaptionFormat, content: &str) -> CaptionDataContainer {
    parse_with(format, content, &ScriptCompiler)
}

pub fn parse_with(
    format: CaptionFormat,
    content: &str,
    compiler: &dyn AssCompiler,
) -> CaptionDataContainer {
    let span = tracing::debug_span!("parse", %format, bytes = content.len());
    let _g = span.enter();

    let parsed = match format {
        CaptionFormat::Srt | CaptionFormat::Vtt => {
            srt::parse_srt_or_vtt(content, format == CaptionFormat::Vtt)
        }
        CaptionFormat::Sbv => Some(sbv::parse_sbv(content)),
        CaptionFormat::Txt => Some(txt::parse_txt(content)),
        CaptionFormat::Ass | CaptionFormat::Ssa => Some(ass::parse_ass(content, compiler)),
        CaptionFormat::Json => match json::parse_json(content) {
            Ok(c) => Some(c),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read JSON caption document");
                None
            }
        },
    };

    parsed.unwrap_or_else(|| {
        tracing::warn!(%format, "unreadable caption input; using empty document");
        CaptionDataContainer::default()
    })
}

pub fn stringify(
    format: CaptionFormat,
    container: &CaptionDataContainer,
) -> Result<String, FormatError> {
    match format {
        CaptionFormat::Srt => Ok(srt::write_srt(container)),
        CaptionFormat::Json => json::write_json(container),
        other => Err(FormatError::UnsupportedExport(other)),
    }
}
