use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use std::io::{Read, Write};

use crate::{formats::CaptionFormat, model::RawCaptionData};

#[derive(Debug, thiserror::Error)]
pub enum RawError {
    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored caption is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Raw captions larger than this are not offered to the basic editor.
pub const DEFAULT_RAW_EDIT_CUTOFF_BYTES: usize = 1_000_000;

pub fn compress(text: &str) -> Result<Vec<u8>, RawError> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(text.as_bytes())?;
    Ok(enc.finish()?)
}

pub fn decompress(bytes: &[u8]) -> Result<String, RawError> {
    let mut dec = ZlibDecoder::new(bytes);
    let mut buf = Vec::new();
    dec.read_to_end(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

impl RawCaptionData {
    pub fn new(format: CaptionFormat, data: impl Into<String>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }

    pub fn compress(&self) -> Result<Vec<u8>, RawError> {
        compress(&self.data)
    }

    pub fn decompress(format: CaptionFormat, bytes: &[u8]) -> Result<Self, RawError> {
        Ok(Self::new(format, decompress(bytes)?))
    }

    /// Editing a large stringified advanced script is not feasible, so
    /// such captions only play.
    pub fn allows_basic_editor(&self, cutoff_bytes: usize) -> bool {
        self.data.len() <= cutoff_bytes
    }
}
