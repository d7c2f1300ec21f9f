// The typing session and its collaborators; the binary only wires them to a terminal.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod keymap;
pub mod logging;
pub mod metrics;
pub mod passages;
pub mod render;
pub mod runtime;
pub mod session;
pub mod store;
pub mod ui;
