//! JPEG encoding and multipart framing for the live stream.

use actix_web::web::Bytes;
use anyhow::{Result, anyhow};
use image::{RgbImage, codecs::jpeg::JpegEncoder};

pub(crate) const STREAM_BOUNDARY: &str = "frame";

pub(crate) fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(|err| anyhow!("JPEG encode failed: {err}"))?;
    Ok(buffer)
}

/// Wrap one JPEG in a `multipart/x-mixed-replace` part.
pub(crate) fn multipart_chunk(jpeg: &[u8]) -> Bytes {
    build_part(jpeg, "")
}

/// Part for a published frame, tagged with its sequence number and capture
/// time.
pub(crate) fn frame_chunk(jpeg: &[u8], frame_number: u64, timestamp_ms: i64) -> Bytes {
    build_part(
        jpeg,
        &format!("X-Sequence: {frame_number}\r\nX-Timestamp: {timestamp_ms}\r\n"),
    )
}

fn build_part(jpeg: &[u8], extra_headers: &str) -> Bytes {
    let mut payload = Vec::with_capacity(jpeg.len() + extra_headers.len() + 64);
    payload.extend_from_slice(b"--");
    payload.extend_from_slice(STREAM_BOUNDARY.as_bytes());
    payload.extend_from_slice(b"\r\n");
    payload.extend_from_slice(extra_headers.as_bytes());
    payload.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    payload.extend_from_slice(jpeg);
    payload.extend_from_slice(b"\r\n");
    Bytes::from(payload)
}

pub(crate) fn stream_content_type() -> String {
    format!("multipart/x-mixed-replace; boundary={STREAM_BOUNDARY}")
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn encodes_a_decodable_jpeg() {
        let image = RgbImage::from_pixel(32, 24, Rgb([200, 30, 30]));
        let jpeg = encode_jpeg(&image, 90).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }

    #[test]
    fn out_of_range_quality_is_clamped() {
        let image = RgbImage::new(8, 8);
        assert!(encode_jpeg(&image, 0).is_ok());
    }

    #[test]
    fn chunk_is_delimited_by_the_frame_boundary() {
        let chunk = multipart_chunk(b"JPEG");
        assert_eq!(
            chunk.as_ref(),
            b"--frame\r\nContent-Type: image/jpeg\r\n\r\nJPEG\r\n".as_slice()
        );
        assert_eq!(stream_content_type(), "multipart/x-mixed-replace; boundary=frame");
    }

    #[test]
    fn frame_parts_carry_sequence_and_capture_time() {
        let chunk = frame_chunk(b"JPEG", 42, 1_700_000_000_123);
        assert_eq!(
            chunk.as_ref(),
            b"--frame\r\nX-Sequence: 42\r\nX-Timestamp: 1700000000123\r\nContent-Type: image/jpeg\r\n\r\nJPEG\r\n"
                .as_slice()
        );
    }
}
