//! Vision gateway adapters.
//!
//! A thin HTTP implementation of the `FrameNumberReader` port against an
//! OpenAI-compatible chat completions endpoint.

mod dto;
mod http_reader;

pub use http_reader::{HttpFrameNumberReader, VisionGatewayConfig};
