//! QR code rendering for loyalty cards
//!
//! Renders a payload string (the customer profile URL) to a PNG on disk
//! and hands back the path. Callers store the path with the card record.

use std::path::{Path, PathBuf};

use image::Luma;
use qrcode::QrCode;
use thiserror::Error;
use tracing::debug;

const QR_MIN_DIMENSIONS: u32 = 300;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("QR encoding error: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type QrResult<T> = Result<T, QrError>;

/// Renders QR code PNGs into a fixed output directory.
#[derive(Debug, Clone)]
pub struct QrGenerator {
    output_dir: PathBuf,
}

impl QrGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `payload` as a PNG named `filename` inside the output
    /// directory, creating the directory on first use.
    pub fn generate(&self, payload: &str, filename: &str) -> QrResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let code = QrCode::new(payload.as_bytes())?;
        let rendering = code
            .render::<Luma<u8>>()
            .min_dimensions(QR_MIN_DIMENSIONS, QR_MIN_DIMENSIONS)
            .build();

        let path = self.output_dir.join(filename);
        rendering.save(&path)?;
        debug!(path = %path.display(), "QR code rendered");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_png_for_a_profile_url() {
        let dir = std::env::temp_dir().join("carelink-qr-test");
        let generator = QrGenerator::new(&dir);

        let path = generator
            .generate("https://carelink.dev/profile/42", "test_card.png")
            .unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        std::fs::remove_file(path).unwrap();
    }
}
