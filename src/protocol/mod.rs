//! JSON-lines protocol.
//!
//! One request object per input line, tagged by `cmd`, and one response
//! object per output line.

pub mod handler;
pub mod parser;
pub mod response;

pub use handler::handle;
pub use parser::{parse_request, ProtocolError, Request};
pub use response::{GameEvents, Payload, Response};
