//! Port for reading frame numbers from photos.
//!
//! The adapter only transports the image to a vision model and returns the
//! model's raw answer; interpretation happens in
//! [`crate::domain::FrameNumberReading`].

use async_trait::async_trait;

use crate::domain::OcrImage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by vision gateways.
    pub enum FrameNumberReaderError {
        /// Gateway not configured for this deployment.
        NotConfigured => "frame number recognition is not configured",
        /// Gateway unreachable or timed out.
        Unavailable { message: String } =>
            "vision gateway unavailable: {message}",
        /// Gateway answered with an unexpected status or body.
        InvalidResponse { message: String } =>
            "vision gateway returned an invalid response: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameNumberReader: Send + Sync {
    /// Raw model answer for `image`.
    async fn read(&self, image: &OcrImage) -> Result<String, FrameNumberReaderError>;
}

/// Reader used when no gateway is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredFrameNumberReader;

#[async_trait]
impl FrameNumberReader for UnconfiguredFrameNumberReader {
    async fn read(&self, _image: &OcrImage) -> Result<String, FrameNumberReaderError> {
        Err(FrameNumberReaderError::not_configured())
    }
}
