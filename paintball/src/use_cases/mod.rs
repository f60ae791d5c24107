// Use cases layer: the local game loop and its replication.

pub mod game;
pub mod input;
pub mod replication;
pub mod simulation;
pub mod throttle;

pub use game::{PaintballScene, client_task};
pub use input::{Button, InputCommand, InputState, Key};
pub use replication::{Feeds, ReplicationBridge};
pub use simulation::LocalSimulation;
