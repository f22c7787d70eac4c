pub mod actor_techniques;
pub mod actors;
pub mod alerts;
pub mod connection;
pub mod events;
pub mod jobs;
pub mod risk;
pub mod schedule;
pub mod techniques;

pub use connection::Database;
