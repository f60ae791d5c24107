// Interface adapters: engine host, store clients and terminal input.

pub mod engine;
pub mod feed;
pub mod local_store;
pub mod stdin;
pub mod ws_store;

pub use engine::ArcadeWorld;
pub use local_store::LocalStore;
pub use ws_store::WsStore;
