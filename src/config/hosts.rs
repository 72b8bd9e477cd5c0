//! Static host application bindings.
//!
//! Everything the engine knows about the two hosts lives here: where their
//! checkouts sit relative to the add-on source tree, which commit window is
//! supported, which file extensions get mirrored, and which files get
//! patched. The commit ids and patch anchors are coupled to the supported
//! host revisions and are revised together when the hosts move.

use crate::compat::VersionRange;
use crate::resources::patch::{Anchor, PatchDescriptor, PatchOp};

/// Identifies one of the two host applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// The Klipper firmware daemon.
    Klippy,
    /// The KlipperScreen touchscreen UI.
    Screen,
}

impl Host {
    /// The static binding for this host.
    #[must_use]
    pub const fn spec(self) -> &'static HostSpec {
        match self {
            Self::Klippy => &KLIPPY,
            Self::Screen => &SCREEN,
        }
    }

    /// Both hosts, in deployment order (firmware first).
    pub const ALL: [Self; 2] = [Self::Klippy, Self::Screen];
}

/// Static description of a host application deployment.
#[derive(Debug)]
pub struct HostSpec {
    /// Human-readable host name.
    pub name: &'static str,
    /// Module directory that receives the symlink mirror, relative to the
    /// host root.
    pub module_dir: &'static str,
    /// Add-on subtree that is mirrored, relative to the add-on source root.
    pub source_subtree: &'static str,
    /// File extensions mirrored into the module directory.
    pub extensions: &'static [&'static str],
    /// Oldest supported commit in the host's history.
    pub oldest: &'static str,
    /// Latest known-supported commit, if declared.
    pub latest: Option<&'static str>,
    /// Anchored edits applied to host files, grouped per target at run time.
    pub patches: &'static [PatchDescriptor],
    /// Whether an install can proceed without this host.
    pub required: bool,
}

impl HostSpec {
    /// The supported commit window as a [`VersionRange`].
    #[must_use]
    pub const fn range(&self) -> VersionRange<'static> {
        VersionRange::new(self.oldest, self.latest)
    }
}

/// Klipper: mirror the firmware-side modules and relax the neopixel timing
/// constants the MMS LED chains need.
pub static KLIPPY: HostSpec = HostSpec {
    name: "Klipper",
    module_dir: "klippy/extras/mms",
    source_subtree: "klippy/extras/mms",
    extensions: &["py"],
    oldest: "9f0d30f2d10c8ab28d38a3cf3ba03e87b509c56b",
    latest: Some("c93c046d301d80f5b6587aff0c1e06d0dcf55c97"),
    patches: &[
        PatchDescriptor {
            target: "klippy/extras/neopixel.py",
            anchor: Anchor::Line("BIT_MAX_TIME=.000004"),
            op: PatchOp::CommentAndReplace,
            payload: "BIT_MAX_TIME=.000030",
        },
        PatchDescriptor {
            target: "klippy/extras/neopixel.py",
            anchor: Anchor::Line("RESET_MIN_TIME=.000050"),
            op: PatchOp::CommentAndReplace,
            payload: "RESET_MIN_TIME=.000250",
        },
    ],
    required: true,
};

/// KlipperScreen: mirror the panel package and splice the panel loader into
/// the main screen module; keep add-on internals out of the file dialogs.
pub static SCREEN: HostSpec = HostSpec {
    name: "KlipperScreen",
    module_dir: "vivid",
    source_subtree: "KlipperScreen/vivid",
    extensions: &["py", "css", "svg"],
    oldest: "e2d0a7f3f1a2c55d3a5ed81c9f7a3b43dc50c268",
    latest: Some("412ea50dd3a2ebd8770e2c6a07fd8ea304fbb1d6"),
    patches: &[
        PatchDescriptor {
            target: "screen.py",
            anchor: Anchor::Line("from ks_includes.KlippyGtk import KlippyGtk"),
            op: PatchOp::InsertAfter,
            payload: "from vivid.installer import install_vivid",
        },
        PatchDescriptor {
            target: "screen.py",
            anchor: Anchor::Contains("self.base_panel = BasePanel(self)"),
            op: PatchOp::InsertAfter,
            payload: "        install_vivid(self.base_panel)",
        },
        PatchDescriptor {
            target: "ks_includes/files.py",
            anchor: Anchor::Contains("def add_file(self"),
            op: PatchOp::InsertAfter,
            payload: "        if filepath.startswith('vivid/'):\n            return",
        },
    ],
    required: false,
};
