//! Trailhunt: game progression.
//!
//! Responsible for the location chain each team walks, the proof-of-presence
//! check that gates every location, the tasks that must be solved there, and
//! the hunt-wide operations that start and end the game for all teams.

pub mod application;
pub mod domain;
