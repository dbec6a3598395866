//! `setxkbmap` integration
//!
//! The switcher only talks to the [`LayoutApplier`] trait so tests can
//! record calls instead of touching the running X server.

use anyhow::{Context, Result, bail};
use std::process::Command;
use tracing::{debug, info};

use crate::config::Profile;
use crate::constants::programs;

/// Reads and changes the active keyboard layout
pub trait LayoutApplier {
    /// Raw text describing the active layout, in `setxkbmap -v 9` format
    fn query(&self) -> Result<String>;

    /// Activate all four facets of `profile`
    fn apply(&self, profile: &Profile) -> Result<()>;
}

/// Shells out to `setxkbmap`
#[derive(Debug, Clone)]
pub struct Setxkbmap {
    program: String,
}

impl Setxkbmap {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl LayoutApplier for Setxkbmap {
    fn query(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(programs::QUERY_ARGS)
            .output()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        if !output.status.success() {
            bail!(
                "'{} {}' exited with {}: {}",
                self.program,
                programs::QUERY_ARGS.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        debug!(program = %self.program, bytes = output.stdout.len(), "Queried active layout");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn apply(&self, profile: &Profile) -> Result<()> {
        let status = Command::new(&self.program)
            .args(profile.setxkbmap_args())
            .status()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        if !status.success() {
            bail!("'{}' exited with {} while applying '{}'", self.program, status, profile.name);
        }

        info!(
            profile = %profile.name,
            model = %profile.model,
            layout = %profile.layout,
            variant = %profile.variant,
            option = %profile.option,
            "Applied keyboard layout"
        );
        Ok(())
    }
}
