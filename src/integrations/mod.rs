//! Integrations with the systems being observed

pub mod postgres;
pub mod system;
