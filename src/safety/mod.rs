mod monitor;

pub use monitor::SafetyMonitor;
