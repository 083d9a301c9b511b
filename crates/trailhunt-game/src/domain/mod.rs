//! Domain model of a scavenger hunt.

pub mod events;
pub mod game;
pub mod hint;
pub mod location;
pub mod proof;
pub mod replies;
pub mod task;
pub mod team;
