pub mod appointment;
pub mod auth;
pub mod business;
pub mod user;
