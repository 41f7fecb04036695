//! Inbound adapters (HTTP, WebSocket) that translate external requests into
//! domain port calls while keeping framework details at the edge.

pub mod http;
pub mod ws;
