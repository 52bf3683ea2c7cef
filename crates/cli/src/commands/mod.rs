pub mod monitor;

pub use monitor::MonitorArgs;
