pub mod schedule;
pub mod staff;
pub mod tour;
