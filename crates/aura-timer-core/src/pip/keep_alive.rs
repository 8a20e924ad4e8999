//! Silent keep-alive clip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// A zero-sample 16-bit mono WAV, as a data URI.
pub const SILENT_AUDIO_URL: &str =
    "data:audio/wav;base64,UklGRigAAABXQVZFZm10IBIAAAABAAEARKwAAIhYAQACABAGZGF0YQAAAAA=";

/// Decoded bytes of [`SILENT_AUDIO_URL`].
pub fn silent_clip() -> Result<Vec<u8>, base64::DecodeError> {
    let payload = SILENT_AUDIO_URL
        .split_once(',')
        .map(|(_, data)| data)
        .unwrap_or_default();
    STANDARD.decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_is_a_wav() {
        let clip = silent_clip().unwrap();
        assert_eq!(&clip[0..4], b"RIFF");
        assert_eq!(&clip[8..12], b"WAVE");
    }
}
