//! Application services: course assembly and the hunt dispatcher.

pub mod course;
pub mod hunt;
