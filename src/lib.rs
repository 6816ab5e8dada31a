pub mod animator;
pub mod config;
pub mod error;
pub mod grid;
pub mod interp;
pub mod mesh;
pub mod plugin;
pub mod readout;
pub mod run;
pub mod surface;
pub mod timeline;
pub mod transfer;
pub mod types;

pub use plugin::ZPlanePlugin;
