//! TUI module for terminal user interfaces

mod progress;

pub use progress::ProgressApp;
