// ABOUTME: Property tests for mount translation.
// ABOUTME: Order, count, and kind parsing hold for arbitrary declared mounts.

use ascend::deploy::{Mount, mount_specs};
use ascend::runtime::MountKind;
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("bind".to_string()),
        Just("Volume".to_string()),
        Just("TMPFS".to_string()),
        Just("cluster".to_string()),
        Just("npipe".to_string()),
        "[a-z]{0,8}",
    ]
}

fn mount_strategy() -> impl Strategy<Value = Mount> {
    ("/[a-z]{1,10}", "/[a-z]{1,10}", kind_strategy()).prop_map(|(source, target, kind)| Mount {
        source,
        target,
        kind,
    })
}

proptest! {
    #[test]
    fn translation_preserves_order_and_paths(mounts in prop::collection::vec(mount_strategy(), 0..8)) {
        let specs = mount_specs(Some(mounts.as_slice()));
        prop_assert_eq!(specs.len(), mounts.len());
        for (spec, mount) in specs.iter().zip(&mounts) {
            prop_assert_eq!(&spec.source, &mount.source);
            prop_assert_eq!(&spec.target, &mount.target);
            prop_assert_eq!(spec.kind, MountKind::parse(&mount.kind));
        }
    }

    #[test]
    fn kind_parsing_ignores_case(kind in kind_strategy()) {
        prop_assert_eq!(
            MountKind::parse(&kind.to_uppercase()),
            MountKind::parse(&kind.to_lowercase())
        );
    }

    #[test]
    fn unknown_kinds_are_binds(kind in "x[a-z]{0,6}") {
        prop_assert_eq!(MountKind::parse(&kind), MountKind::Bind);
    }
}

#[test]
fn absent_mounts_mean_none() {
    assert!(mount_specs(None).is_empty());
}

#[test]
fn every_kind_parses_from_its_display_name() {
    for kind in MountKind::ALL {
        assert_eq!(MountKind::parse(&kind.to_string()), kind);
        assert_eq!(MountKind::parse(&kind.to_string().to_uppercase()), kind);
    }
}
