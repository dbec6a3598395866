//! Keyboard layout profiles
//!
//! A profile is a named set of the four XKB facets that `setxkbmap`
//! understands. It is also the unit persisted in the mappings file,
//! one record per line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four XKB facets of a layout, without a name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub model: String,
    pub layout: String,
    pub variant: String,
    pub option: String,
}

/// A named layout profile
///
/// Field order matters: it is the key order of the persisted record, with
/// the facets first and `name` last. Missing facets deserialize to the
/// empty string, which `setxkbmap` treats as "leave unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub option: String,
    pub name: String,
}

impl Profile {
    /// Create a profile from a name and parsed layout facets
    pub fn new(name: impl Into<String>, descriptor: LayoutDescriptor) -> Self {
        Self {
            model: descriptor.model,
            layout: descriptor.layout,
            variant: descriptor.variant,
            option: descriptor.option,
            name: name.into(),
        }
    }

    /// Profile with only a layout set, the other facets left open
    #[cfg(test)]
    pub fn with_layout(name: impl Into<String>, layout: impl Into<String>) -> Self {
        Self::new(
            name,
            LayoutDescriptor {
                layout: layout.into(),
                ..LayoutDescriptor::default()
            },
        )
    }

    /// `setxkbmap` arguments in model, layout, variant, option order
    ///
    /// Every facet is passed, empty or not.
    pub fn setxkbmap_args(&self) -> [String; 8] {
        [
            "-model".to_string(),
            self.model.clone(),
            "-layout".to_string(),
            self.layout.clone(),
            "-variant".to_string(),
            self.variant.clone(),
            "-option".to_string(),
            self.option.clone(),
        ]
    }
}

/// Multi-line detail view used by `--current` and `--details`
impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n  model:\t{}\n  layout:\t{}\n  variant:\t{}\n  options:\t{}",
            self.name, self.model, self.layout, self.variant, self.option
        )
    }
}
