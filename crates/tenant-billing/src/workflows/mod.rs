pub mod billing;
pub mod lease;
