//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// On-disk state locations
pub mod config {
    /// Directory under the user's config dir (`$XDG_CONFIG_HOME`)
    pub const APP_DIR: &str = "keyboard-switch";

    /// One JSON record per line, in cycle order
    pub const MAPPINGS_FILENAME: &str = "mappings";

    /// Decimal index of the current mapping
    pub const CURRENT_FILENAME: &str = "current";

    /// Suffix used for write-then-rename saves
    pub const TEMP_SUFFIX: &str = "tmp";
}

/// Environment variables read at startup
pub mod env {
    /// Overrides the state directory (same as `--config-dir`)
    pub const CONFIG_DIR: &str = "KBSWITCH_CONFIG_DIR";

    /// Overrides the layout utility binary
    pub const SETXKBMAP: &str = "KBSWITCH_SETXKBMAP";

    /// Overrides the notification binary
    pub const NOTIFY_SEND: &str = "KBSWITCH_NOTIFY_SEND";

    /// Log verbosity (trace, debug, info, warn, error)
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// External programs
pub mod programs {
    /// X keyboard layout utility
    pub const SETXKBMAP: &str = "setxkbmap";

    /// Verbosity flag that makes setxkbmap print the active rules
    pub const QUERY_ARGS: [&str; 2] = ["-v", "9"];

    /// libnotify command line client
    pub const NOTIFY_SEND: &str = "notify-send";
}

/// Desktop notification text
pub mod notification {
    /// Summary line and application name
    pub const APP_NAME: &str = "keyboard-switch";

    /// Freedesktop icon name
    pub const ICON: &str = "dialog-information";
}

/// User-facing messages
pub mod messages {
    pub const EMPTY_REGISTRY: &str = "No keyboard mapping were found.\n\
        Add a new mapping using `kbswitch -a <name>`.\n\
        See help with `kbswitch -h`.";
}
