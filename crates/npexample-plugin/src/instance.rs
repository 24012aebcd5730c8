//! Per-instance types.
//!
//! An instance is one embedded use of the plugin (one `<object>` element).
//! The host names it with an opaque handle; the plugin only ever keeps that
//! handle as a key and never frees what it points to.

use std::fmt;

/// Opaque host-assigned instance handle (the address of the host's `NPP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub usize);

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// How the host embeds the instance (`NP_EMBED` / `NP_FULL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceMode {
    Embed,
    Full,
    Unknown(u16),
}

impl From<u16> for InstanceMode {
    fn from(mode: u16) -> Self {
        match mode {
            1 => Self::Embed,
            2 => Self::Full,
            other => Self::Unknown(other),
        }
    }
}

/// Attribute name/value pairs from the embedding element.
///
/// Only logged; nothing from here is kept once creation returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationArgs(Vec<(String, String)>);

impl CreationArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for CreationArgs {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

/// Data a destroyed instance may hand back for a later instance at the same
/// URL. This plugin never produces any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedData(pub Vec<u8>);

/// State kept for an active instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceState {
    windowless: bool,
}

impl InstanceState {
    pub fn windowless() -> Self {
        Self { windowless: true }
    }

    pub fn is_windowless(&self) -> bool {
        self.windowless
    }
}
