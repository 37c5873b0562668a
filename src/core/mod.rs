pub mod engine;
pub mod error;
pub mod io;
pub mod metrics;
pub mod model;
pub mod table;
pub mod validate;
