//! Build-time configuration for a [`crate::tree::Tree`].

use crate::hash::MAX_RESOLUTION;
use crate::node::DupesPolicy;

//------------ Config -----------------------------------------------------------

/// Options controlling how points are encoded and inserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Geohash resolution used when points are encoded from coordinates.
    /// Must be `<= MAX_RESOLUTION`.
    resolution: usize,
    /// What to do when two points encode to the same full-resolution hash.
    dupes: DupesPolicy,
}

impl Config {
    pub fn new(resolution: usize, dupes: DupesPolicy) -> Self {
        Config { resolution: resolution.min(MAX_RESOLUTION), dupes }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn dupes(&self) -> DupesPolicy {
        self.dupes
    }
}

impl Default for Config {
    fn default() -> Self {
        Config { resolution: MAX_RESOLUTION, dupes: DupesPolicy::No }
    }
}
