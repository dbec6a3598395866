//! Configuration for kbswitch
//!
//! - **profile**: the named layout profiles stored in the mappings file
//! - **settings**: paths and external programs resolved at startup

pub mod profile;
pub mod settings;

// Re-export commonly used types
pub use profile::{LayoutDescriptor, Profile};
pub use settings::Settings;
