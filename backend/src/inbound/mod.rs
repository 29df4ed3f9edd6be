//! Inbound adapters (HTTP, WebSocket) that translate external requests into
//! domain service calls while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; live listing notifications are served
//! by [`ws`].

pub mod http;
pub mod ws;
