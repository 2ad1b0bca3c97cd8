#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
pub mod state;
