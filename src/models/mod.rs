//! Domain models and request/response types

pub mod activity_log;
pub mod category;
pub mod employee;
pub mod equipment;
pub mod permission;
pub mod request;
pub mod role;
pub mod transaction;
pub mod user;
