//! # Barcode Decoding
//!
//! The image decoder is supplied by the host (camera SDK, zbar binding,
//! browser decoder, …). This module only defines the seam and runs it off
//! the async executor.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use greenbill_core::validation::validate_barcode;

/// An uploaded or captured image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    /// Encoded image bytes (JPEG, PNG, …).
    pub bytes: Vec<u8>,

    /// MIME type if known, e.g. `image/jpeg`.
    pub media_type: Option<String>,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, media_type: Option<String>) -> Self {
        ImageData { bytes, media_type }
    }
}

/// Extracts a barcode from an image.
///
/// Decoding is CPU bound and synchronous; callers run it on the blocking
/// pool via [`decode_image`].
pub trait BarcodeDecoder: Send + Sync {
    /// Returns the decoded barcode text, or `None` if nothing was found.
    fn decode(&self, image: &ImageData) -> Option<String>;
}

/// Decodes `image` on the blocking pool and validates the result.
///
/// ## Errors
/// - `NO_BARCODE` if the decoder found nothing (not retried)
/// - `VALIDATION_ERROR` if the decoded text is not a usable barcode
/// - `INTERNAL` if the decode task panicked
pub async fn decode_image(
    decoder: Arc<dyn BarcodeDecoder>,
    image: ImageData,
) -> Result<String, ApiError> {
    debug!(bytes = image.bytes.len(), media_type = ?image.media_type, "Decoding image");

    let decoded = tokio::task::spawn_blocking(move || decoder.decode(&image))
        .await
        .map_err(|e| ApiError::internal(format!("Decoder task failed: {}", e)))?;

    let Some(raw) = decoded else {
        warn!("No barcode found in image");
        return Err(ApiError::no_barcode());
    };

    validate_barcode(&raw).map_err(|e| ApiError::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    /// Treats the image bytes as the barcode text.
    struct TextDecoder;

    impl BarcodeDecoder for TextDecoder {
        fn decode(&self, image: &ImageData) -> Option<String> {
            String::from_utf8(image.bytes.clone())
                .ok()
                .filter(|s| !s.is_empty())
        }
    }

    struct PanickingDecoder;

    impl BarcodeDecoder for PanickingDecoder {
        fn decode(&self, _image: &ImageData) -> Option<String> {
            panic!("decoder crashed");
        }
    }

    #[tokio::test]
    async fn test_decode_trims_result() {
        let image = ImageData::new(b" 5901234123457 ".to_vec(), None);
        let barcode = decode_image(Arc::new(TextDecoder), image).await.unwrap();
        assert_eq!(barcode, "5901234123457");
    }

    #[tokio::test]
    async fn test_nothing_decoded_is_no_barcode() {
        let image = ImageData::new(Vec::new(), Some("image/png".into()));
        let err = decode_image(Arc::new(TextDecoder), image).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoBarcode);
    }

    #[tokio::test]
    async fn test_garbage_decoded_is_validation_error() {
        let image = ImageData::new(b"59 01".to_vec(), None);
        let err = decode_image(Arc::new(TextDecoder), image).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_decoder_panic_is_internal() {
        let image = ImageData::new(b"111".to_vec(), None);
        let err = decode_image(Arc::new(PanickingDecoder), image).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }
}
