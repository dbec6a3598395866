//! Layout switching session
//!
//! Owns the registry for one invocation and keeps the store and the running
//! layout in step with it: every structural change is saved immediately,
//! every selection change is applied and then saved.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Profile;
use crate::descriptor;
use crate::persistence::Store;
use crate::registry::{ProfileRegistry, RegistryError};
use crate::xkb::LayoutApplier;

pub struct Switcher<A> {
    registry: ProfileRegistry,
    store: Store,
    applier: A,
}

impl<A: LayoutApplier> Switcher<A> {
    /// Load saved state from `store`
    pub fn open(store: Store, applier: A) -> Result<Self> {
        let registry = store
            .load()
            .with_context(|| format!("Failed to load keyboard mappings from {}", store.dir().display()))?;
        Ok(Self { registry, store, applier })
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn applier(&self) -> &A {
        &self.applier
    }

    /// Capture the running layout under `name` and switch to it
    pub fn add_current_layout(&mut self, name: &str, at: Option<usize>) -> Result<Profile> {
        let raw = self.applier.query().context("Failed to query the active layout")?;
        let profile = Profile::new(name, descriptor::parse(&raw));
        self.add_profile(profile, at)
    }

    /// Store `profile` (replacing one with the same name) and switch to it
    pub fn add_profile(&mut self, profile: Profile, at: Option<usize>) -> Result<Profile> {
        let name = profile.name.clone();
        let index = self.registry.add_or_update(profile, at)?;
        info!(profile = %name, index = index, "Stored keyboard mapping");

        self.store.save_profiles(&self.registry)?;

        let selected = self.registry.set_current(index as isize)?.clone();
        self.activate(&selected)?;
        Ok(selected)
    }

    /// Remove the profile at `index`; `None` if there is none
    pub fn remove_by_index(&mut self, index: usize) -> Result<Option<Profile>> {
        let result = self.registry.remove_by_index(index);
        self.after_remove(result)
    }

    /// Remove the profile called `name`; `None` if there is none
    pub fn remove_by_name(&mut self, name: &str) -> Result<Option<Profile>> {
        let result = self.registry.remove_by_name(name);
        self.after_remove(result)
    }

    fn after_remove(&mut self, result: Result<Profile, RegistryError>) -> Result<Option<Profile>> {
        match result {
            Ok(removed) => {
                info!(profile = %removed.name, remaining = self.registry.len(), "Removed keyboard mapping");
                self.store.save(&self.registry)?;
                Ok(Some(removed))
            }
            Err(e) => {
                debug!(reason = %e, "Nothing to remove");
                Ok(None)
            }
        }
    }

    /// Move the profile at `from` to `to`. The selection resets to the first profile.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        match self.registry.reorder(from, to) {
            Ok(index) => info!(from = from, to = index, "Reordered keyboard mappings"),
            Err(e) => debug!(reason = %e, "Nothing to reorder"),
        }
        self.store.save(&self.registry)?;
        Ok(())
    }

    /// Switch by position; negative selects the last profile
    pub fn select_index(&mut self, index: isize) -> Result<Option<Profile>> {
        let result = self.registry.set_current(index).cloned();
        self.after_select(result)
    }

    pub fn select_name(&mut self, name: &str) -> Result<Option<Profile>> {
        let result = self.registry.set_current_by_name(name).cloned();
        self.after_select(result)
    }

    pub fn next(&mut self) -> Result<Option<Profile>> {
        let result = self.registry.cycle_next().cloned();
        self.after_select(result)
    }

    pub fn previous(&mut self) -> Result<Option<Profile>> {
        let result = self.registry.cycle_previous().cloned();
        self.after_select(result)
    }

    fn after_select(&mut self, result: Result<Profile, RegistryError>) -> Result<Option<Profile>> {
        match result {
            Ok(profile) => {
                self.activate(&profile)?;
                Ok(Some(profile))
            }
            Err(e) => {
                debug!(reason = %e, "Selection unchanged");
                Ok(None)
            }
        }
    }

    fn activate(&mut self, profile: &Profile) -> Result<()> {
        self.applier
            .apply(profile)
            .with_context(|| format!("Failed to apply keyboard mapping '{}'", profile.name))?;
        self.store.save_current(&self.registry)?;
        info!(profile = %profile.name, index = self.registry.current_index(), "Switched keyboard mapping");
        Ok(())
    }
}
