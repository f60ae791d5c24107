pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::client::run_with_config;
pub use interface_adapters::{ArcadeWorld, LocalStore, WsStore};
pub use use_cases::{LocalSimulation, PaintballScene, ReplicationBridge};
