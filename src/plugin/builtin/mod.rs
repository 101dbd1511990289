//! Built-in Plugins
//!
//! Each built-in registers itself with `register_plugin!` from its own module.
//!
//! - `system_info`: host, CPU and memory information

pub mod system_info;

pub use system_info::SystemInfoPlugin;
