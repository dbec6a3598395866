//! Desktop notification after a layout switch

use anyhow::{Context, Result, bail};
use std::process::Command;
use tracing::{info, warn};

use crate::config::Profile;
use crate::constants::notification;

/// Notification body: name on the first line, layout in brackets below
pub fn message_body(profile: &Profile) -> String {
    format!("{}\n[{}]", profile.name, profile.layout)
}

/// Sends notifications through a `notify-send` compatible client
#[derive(Debug, Clone)]
pub struct Notifier {
    program: String,
}

impl Notifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn send(&self, profile: &Profile) -> Result<()> {
        let status = Command::new(&self.program)
            .args(["--app-name", notification::APP_NAME])
            .args(["--icon", notification::ICON])
            .arg(notification::APP_NAME)
            .arg(message_body(profile))
            .status()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        if !status.success() {
            bail!("'{}' exited with {}", self.program, status);
        }

        info!(profile = %profile.name, "Sent switch notification");
        Ok(())
    }

    /// Notifications are best effort; failures are only logged
    pub fn notify(&self, profile: &Profile) {
        if let Err(e) = self.send(profile) {
            let reason = format!("{e:#}");
            warn!(error = %reason, "Failed to show notification");
        }
    }
}
