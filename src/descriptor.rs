//! Parser for `setxkbmap -v 9` output.
//!
//! The verbose dump contains, among a lot of noise, lines such as
//!
//! ```text
//! model:      pc105
//! layout:     us,de
//! variant:    ,nodeadkeys
//! options:    grp:alt_shift_toggle
//! ```
//!
//! A line counts only when it is exactly `label:` followed by a single
//! token. Later lines override earlier ones.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::LayoutDescriptor;

static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(model|layout|variant|options):\s*(\S+)$").expect("field regex is valid")
});

/// Extract the layout facets from raw utility output.
///
/// Facets that never appear stay empty.
pub fn parse(text: &str) -> LayoutDescriptor {
    let mut descriptor = LayoutDescriptor::default();

    for line in text.lines() {
        let Some(captures) = FIELD_LINE.captures(line) else {
            continue;
        };
        let token = captures[2].to_string();

        match &captures[1] {
            "model" => descriptor.model = token,
            "layout" => descriptor.layout = token,
            "variant" => descriptor.variant = token,
            "options" => descriptor.option = token,
            _ => unreachable!("regex only captures known labels"),
        }
    }

    descriptor
}
