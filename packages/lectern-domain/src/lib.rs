pub mod projection;
pub mod query;
