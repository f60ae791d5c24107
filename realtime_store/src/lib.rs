pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{StoreError, StorePath};
pub use frameworks::config::http_port;
pub use frameworks::server::{router, run, run_with_config};
pub use interface_adapters::protocol::{ClientMessage, ServerMessage};
pub use use_cases::StoreHub;
