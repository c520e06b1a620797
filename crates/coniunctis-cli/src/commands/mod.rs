pub mod config;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;
