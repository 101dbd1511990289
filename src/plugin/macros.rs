//! Plugin Registration Macros
//!
//! Convenience macro for registering plugins with the MCP server. It wraps the
//! `inventory::submit!` boilerplate and records the registering source file.
//!
//! # Example
//!
//! ```ignore
//! use mcp_server::plugin::prelude::*;
//! use mcp_server::register_plugin;
//!
//! #[derive(Default)]
//! pub struct ClipboardPlugin;
//!
//! // impl Plugin for ClipboardPlugin { ... }
//!
//! register_plugin!(ClipboardPlugin::default);
//! ```

/// Register a plugin with the server.
///
/// # Arguments
///
/// * `$factory_fn` - Constructor with signature `fn() -> T` where `T: Plugin`.
///   It must not acquire resources; that belongs in `Plugin::initialize`.
///
/// The source file of the invocation is recorded as the registration unit.
/// Files whose name starts with `__` are treated as internal and never loaded.
#[macro_export]
macro_rules! register_plugin {
    ($factory_fn:expr) => {
        ::inventory::submit! {
            $crate::plugin::registry::PluginConstructor::new(file!(), || {
                let plugin: ::std::boxed::Box<dyn $crate::plugin::capabilities::Plugin> =
                    ::std::boxed::Box::new(($factory_fn)());
                plugin
            })
        }
    };
}
