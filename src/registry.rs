//! Ordered profile registry
//!
//! Profiles live in a single `Vec` in cycle order and are looked up by
//! their own `name`, so the name set and the order can never drift apart.
//! The only other state is the index of the current selection.
//!
//! The registry performs no I/O. Every operation that would be a no-op
//! reports why through [`RegistryError`]; callers decide whether that is
//! worth telling the user about.

use std::fmt;

use crate::config::Profile;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no keyboard mapping named '{0}'")]
    NotFound(String),
    #[error("no keyboard mapping at position {0}")]
    IndexOutOfRange(usize),
    #[error("no keyboard mappings registered")]
    EmptyRegistry,
    #[error("mapping name must not be empty")]
    EmptyName,
}

/// One line of the ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub is_current: bool,
}

impl fmt::Display for OrderEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_current { '+' } else { ' ' };
        write!(f, "{} {:>2} {}", marker, self.index, self.name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
    current: usize,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Index of the current selection. Meaningless while empty.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Insert a new profile or replace an existing one with the same name.
    ///
    /// An existing profile keeps its slot and `at` is ignored. A new one is
    /// inserted at `at`, or appended when `at` is `None` or past the end.
    /// Returns the profile's index.
    pub fn add_or_update(&mut self, profile: Profile, at: Option<usize>) -> Result<usize, RegistryError> {
        if profile.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        if let Some(index) = self.position(&profile.name) {
            self.profiles[index] = profile;
            return Ok(index);
        }

        Ok(self.insert_clamped(profile, at))
    }

    fn insert_clamped(&mut self, profile: Profile, at: Option<usize>) -> usize {
        match at {
            Some(index) if index <= self.profiles.len() => {
                self.profiles.insert(index, profile);
                index
            }
            _ => {
                self.profiles.push(profile);
                self.profiles.len() - 1
            }
        }
    }

    /// Remove the profile at `index` and return it.
    ///
    /// The selection follows the profile it pointed at. When the selected
    /// profile itself goes away its successor takes over, wrapping to the
    /// first profile when the last slot was removed.
    pub fn remove_by_index(&mut self, index: usize) -> Result<Profile, RegistryError> {
        if index >= self.profiles.len() {
            return Err(RegistryError::IndexOutOfRange(index));
        }

        let removed = self.profiles.remove(index);

        if index < self.current {
            self.current -= 1;
        }
        if self.current >= self.profiles.len() {
            self.current = 0;
        }

        Ok(removed)
    }

    pub fn remove_by_name(&mut self, name: &str) -> Result<Profile, RegistryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        self.remove_by_index(index)
    }

    /// Move the profile at `from` to `to` and return its new index.
    ///
    /// `to` past the end appends. The selection always resets to the first
    /// profile, even when `from` is out of range and nothing moved.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<usize, RegistryError> {
        self.current = 0;

        if from >= self.profiles.len() {
            return Err(RegistryError::IndexOutOfRange(from));
        }

        let profile = self.profiles.remove(from);
        Ok(self.insert_clamped(profile, Some(to)))
    }

    /// Select by position. Any negative index selects the last profile.
    pub fn set_current(&mut self, index: isize) -> Result<&Profile, RegistryError> {
        if self.profiles.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }

        let resolved = usize::try_from(index).unwrap_or(self.profiles.len() - 1);
        if resolved >= self.profiles.len() {
            return Err(RegistryError::IndexOutOfRange(resolved));
        }

        self.current = resolved;
        Ok(&self.profiles[resolved])
    }

    pub fn set_current_by_name(&mut self, name: &str) -> Result<&Profile, RegistryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        self.select(index)
    }

    pub fn cycle_next(&mut self) -> Result<&Profile, RegistryError> {
        let len = self.profiles.len();
        if len == 0 {
            return Err(RegistryError::EmptyRegistry);
        }
        self.select((self.current + 1) % len)
    }

    pub fn cycle_previous(&mut self) -> Result<&Profile, RegistryError> {
        let len = self.profiles.len();
        if len == 0 {
            return Err(RegistryError::EmptyRegistry);
        }
        self.select((self.current + len - 1) % len)
    }

    fn select(&mut self, index: usize) -> Result<&Profile, RegistryError> {
        let profile = self
            .profiles
            .get(index)
            .ok_or(RegistryError::IndexOutOfRange(index))?;
        self.current = index;
        Ok(profile)
    }

    /// Restore a persisted selection without applying it.
    ///
    /// Out-of-range values leave the selection at its current value.
    pub fn restore_current(&mut self, index: usize) -> Result<(), RegistryError> {
        if index >= self.profiles.len() {
            return Err(RegistryError::IndexOutOfRange(index));
        }
        self.current = index;
        Ok(())
    }

    pub fn current_profile(&self) -> Result<&Profile, RegistryError> {
        self.profiles
            .get(self.current)
            .ok_or(RegistryError::EmptyRegistry)
    }

    /// Look up a profile for display.
    ///
    /// An empty registry and an unknown name are reported differently.
    pub fn describe(&self, name: &str) -> Result<&Profile, RegistryError> {
        if self.profiles.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn list_order(&self) -> Vec<OrderEntry<'_>> {
        self.profiles
            .iter()
            .enumerate()
            .map(|(index, profile)| OrderEntry {
                index,
                name: &profile.name,
                is_current: index == self.current,
            })
            .collect()
    }
}
