//! Forensic waves: [`ExifForensicsWave`] (priority 90) sniffs the
//! container format independently of [`super::identity::IdentityWave`]
//! and checks whether a JPEG carries an EXIF APP1 segment, feeding the
//! `exif_format_mismatch` contradiction rule. [`DigitalFingerprintWave`]
//! (priority 85) stamps a durable fast-hash fingerprint and a coarse
//! byte-entropy estimate used as a `screenshot_vs_photo_noise` proxy —
//! real sensor-noise analysis needs decoded pixels, out of scope here
//! (spec.md §1).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, ContentHash, CoreError, CoreReason, Signal, Wave};

fn sniff_container_format(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpeg"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "unknown"
    }
}

/// A JPEG carries EXIF in an APP1 marker (`0xFFE1`) immediately followed
/// by the ASCII signature `Exif\0\0`. Scans only the first few markers —
/// EXIF, if present, is always near the start of the stream.
fn has_exif_app1(bytes: &[u8]) -> bool {
    let mut i = 2; // skip SOI
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            break;
        }
        let marker = bytes[i + 1];
        if marker == 0xD8 || marker == 0xD9 {
            i += 2;
            continue;
        }
        if i + 4 > bytes.len() {
            break;
        }
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if marker == 0xE1 && i + 4 + 6 <= bytes.len() && &bytes[i + 4..i + 4 + 6] == b"Exif\0\0" {
            return true;
        }
        if marker == 0xDA || len < 2 {
            break;
        }
        i += 2 + len;
    }
    false
}

#[derive(Default)]
pub struct ExifForensicsWave {
    tags: Vec<String>,
}

impl ExifForensicsWave {
    pub fn new() -> Self {
        ExifForensicsWave { tags: vec!["forensics".to_string()] }
    }
}

#[async_trait]
impl Wave for ExifForensicsWave {
    fn name(&self) -> &str {
        "ExifForensics"
    }

    fn priority(&self) -> i32 {
        priority::EXIF_FORENSICS
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        image_path: &str,
        _ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(format!("reading {image_path}: {e}")))?;

        let container_format = sniff_container_format(&bytes);
        let present = container_format == "jpeg" && has_exif_app1(&bytes);

        Ok(vec![
            Signal::new("exif.present", present, 1.0, "ExifForensics")?,
            Signal::new("exif.container_format", container_format, 1.0, "ExifForensics")?,
        ])
    }
}

/// Shannon entropy over the byte-frequency histogram, normalized to
/// `[0, 1]` by dividing by 8 (the max entropy for a byte alphabet).
/// Compressed photographic content tends toward the high end; flat
/// UI/screenshot regions compress into a narrower byte distribution.
fn byte_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let mut counts = [0u64; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let len = bytes.len() as f64;
    let entropy = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum::<f64>();
    (entropy / 8.0).clamp(0.0, 1.0)
}

#[derive(Default)]
pub struct DigitalFingerprintWave {
    tags: Vec<String>,
}

impl DigitalFingerprintWave {
    pub fn new() -> Self {
        DigitalFingerprintWave { tags: vec!["forensics".to_string()] }
    }
}

#[async_trait]
impl Wave for DigitalFingerprintWave {
    fn name(&self) -> &str {
        "DigitalFingerprint"
    }

    fn priority(&self) -> i32 {
        priority::DIGITAL_FINGERPRINT
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        image_path: &str,
        _ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(format!("reading {image_path}: {e}")))?;

        let fingerprint = ContentHash::of_bytes(&bytes);
        let noise_level = byte_entropy(&bytes);

        Ok(vec![
            Signal::new("forensics.fingerprint", fingerprint.fast.to_string(), 1.0, "DigitalFingerprint")?,
            Signal::new("forensics.noise_level", noise_level, 0.6, "DigitalFingerprint")?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_with_exif_app1_is_detected() {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.push(0xFF);
        bytes.push(0xE1);
        let segment_len = 6u16 + 2;
        bytes.extend_from_slice(&segment_len.to_be_bytes());
        bytes.extend_from_slice(b"Exif\0\0");
        assert!(has_exif_app1(&bytes));
    }

    #[test]
    fn jpeg_without_app1_is_not_detected() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert!(!has_exif_app1(&bytes));
    }

    #[test]
    fn uniform_bytes_have_low_entropy() {
        let bytes = vec![0u8; 1000];
        assert!(byte_entropy(&bytes) < 0.1);
    }

    #[test]
    fn varied_bytes_have_higher_entropy() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert!(byte_entropy(&bytes) > 0.9);
    }
}
