#![forbid(unsafe_code)]

pub mod fallback;
pub mod model;
