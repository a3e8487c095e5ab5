//! IdentityWave (priority 110, tag `identity`): sniffs container format
//! and dimensions from the file header and stamps the foundational
//! `identity.*` signals every other wave reads.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, CoreError, CoreReason, Signal, Wave};

pub struct IdentityWave {
    tags: Vec<String>,
}

impl Default for IdentityWave {
    fn default() -> Self {
        IdentityWave { tags: vec!["identity".to_string()] }
    }
}

/// Best-effort magic-byte sniff across the accepted extensions (spec.md
/// §6): `.gif .png .jpg .jpeg .webp .bmp .tiff .tif`.
fn sniff_format(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpeg"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else if bytes.starts_with(b"BM") {
        "bmp"
    } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        "tiff"
    } else {
        "unknown"
    }
}

/// PNG IHDR is at a fixed offset: 8-byte signature + 4-byte length + 4-byte
/// "IHDR" + width(u32 BE) + height(u32 BE).
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}

/// GIF logical screen descriptor: 6-byte signature, then width/height as
/// little-endian u16. Frame count is approximated by counting Image
/// Descriptor blocks (`0x2C`) — a simplification of the full GIF block
/// grammar, sufficient to detect "animated vs. static".
fn gif_dimensions_and_frames(bytes: &[u8]) -> Option<(u32, u32, u32)> {
    if bytes.len() < 10 {
        return None;
    }
    let width = u16::from_le_bytes(bytes[6..8].try_into().ok()?) as u32;
    let height = u16::from_le_bytes(bytes[8..10].try_into().ok()?) as u32;
    let frame_count = bytes.iter().filter(|&&b| b == 0x2C).count().max(1) as u32;
    Some((width, height, frame_count))
}

#[async_trait]
impl Wave for IdentityWave {
    fn name(&self) -> &str {
        "Identity"
    }

    fn priority(&self) -> i32 {
        priority::IDENTITY
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(format!("reading {image_path}: {e}")))?;

        let sniffed = sniff_format(&bytes);
        let fallback_width = ctx.get_cached::<u32>("request.width").copied().unwrap_or(0);
        let fallback_height = ctx.get_cached::<u32>("request.height").copied().unwrap_or(0);
        let fallback_format = ctx.get_cached::<String>("request.format").cloned().unwrap_or_default();

        let (width, height, frame_count) = match sniffed {
            "png" => png_dimensions(&bytes).map(|(w, h)| (w, h, 1)).unwrap_or((fallback_width, fallback_height, 1)),
            "gif" => gif_dimensions_and_frames(&bytes).unwrap_or((fallback_width, fallback_height, 1)),
            _ => (fallback_width, fallback_height, 1),
        };
        let format = if sniffed == "unknown" { fallback_format } else { sniffed.to_string() };
        let is_animated = sniffed == "gif" && frame_count > 1;
        let pixel_count = (width as u64) * (height as u64);

        Ok(vec![
            Signal::new("identity.sha256", ctx.image_hash.clone(), 1.0, "Identity")?,
            Signal::new("identity.format", format, 1.0, "Identity")?,
            Signal::new("identity.width", width as i64, 1.0, "Identity")?,
            Signal::new("identity.height", height as i64, 1.0, "Identity")?,
            Signal::new("identity.pixel_count", pixel_count as i64, 1.0, "Identity")?,
            Signal::new("identity.is_animated", is_animated, 1.0, "Identity")?,
            Signal::new("identity.frame_count", frame_count as i64, 1.0, "Identity")?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_png_signature() {
        let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(&50u32.to_be_bytes());
        assert_eq!(sniff_format(&bytes), "png");
        assert_eq!(png_dimensions(&bytes), Some((100, 50)));
    }

    #[test]
    fn counts_gif_frames_via_image_descriptors() {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&20u16.to_le_bytes());
        bytes.extend_from_slice(&10u16.to_le_bytes());
        bytes.push(0x2C);
        bytes.push(0x2C);
        bytes.push(0x2C);
        assert_eq!(gif_dimensions_and_frames(&bytes), Some((20, 10, 3)));
    }

    #[test]
    fn unknown_bytes_fall_back_to_request_metadata() {
        assert_eq!(sniff_format(b"not an image"), "unknown");
    }
}
