pub mod auth;
pub mod diary;
pub mod health;
pub mod logs;
pub mod projects;
pub mod reviews;
pub mod schedules;
pub mod staff;
pub mod teams;
