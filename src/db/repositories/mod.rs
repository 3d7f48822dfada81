mod incidents;
mod metrics;
mod room_sessions;
