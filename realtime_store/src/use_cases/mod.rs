// Use cases layer: the shared store and its change notifications.

pub mod hub;

pub use hub::StoreHub;
