// Domain layer: the value tree, its addressing rules and key generation.

pub mod errors;
pub mod keys;
pub mod path;
pub mod tree;

pub use errors::StoreError;
pub use path::StorePath;
pub use tree::ValueTree;
