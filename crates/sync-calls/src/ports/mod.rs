//! Ports Layer
//!
//! - Driving Ports (inbound) - entry points for the transport receive side and
//!   the connection lifecycle
//! - Driven Ports (outbound) - the transport that carries requests out

pub mod inbound;
pub mod outbound;

pub use inbound::{ConnectionLifecycle, ReplyRouter, RouteResult};
pub use outbound::RequestTransport;
