pub mod log;
pub mod project;
pub mod review;
pub mod schedule;
pub mod staff;
pub mod student;
pub mod team;
