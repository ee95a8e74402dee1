pub mod actor;
pub mod registry;
pub mod universe;

pub use actor::{spawn_scan_timer, ScanReport, ScannerActor, ScannerAsk, ScannerReply, ScannerSettings, ScannerStats, ScannerTell};
pub use registry::{LastSeenRegistry, TrackingKey};
pub use universe::{default_timeframes, TimeframeMapping, Universe, UniverseSource};
