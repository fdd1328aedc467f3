//! Collection loop, frames and the render/input task

pub mod app;
pub mod collector;
pub mod events;
pub mod frame;
pub mod state;
