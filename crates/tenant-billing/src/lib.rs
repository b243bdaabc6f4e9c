//! Billing period resolution, late fee assessment, and lease lifecycle rules for the
//! property management platform.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
