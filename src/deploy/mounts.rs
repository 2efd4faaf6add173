// ABOUTME: Translates declared mounts into engine mount specs.
// ABOUTME: Order is preserved; unknown kinds become bind mounts.

use crate::runtime::{MountKind, MountSpec};

use super::request::Mount;

/// Engine mount specs for the declared mounts. `None` means no mounts.
pub fn mount_specs(mounts: Option<&[Mount]>) -> Vec<MountSpec> {
    mounts
        .unwrap_or_default()
        .iter()
        .map(|m| MountSpec {
            source: m.source.clone(),
            target: m.target.clone(),
            kind: MountKind::parse(&m.kind),
        })
        .collect()
}
