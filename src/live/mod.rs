mod protocol;
mod registry;

pub use protocol::{ClientMessage, ConnectionId, ServerMessage};
pub use registry::{EventSink, LiveSessionRegistry};
