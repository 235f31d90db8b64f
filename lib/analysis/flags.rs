use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// The per-bit use/set flags.
    ///
    /// Union is the only merge operation: a flag, once set, is never
    /// cleared for the remainder of the pipeline. This monotonicity is a
    /// system-wide invariant; every consumer relies on it.
    #[derive(Default, Deserialize, Serialize)]
    pub struct UseSet: u8 {
        /// The bit is read by some construct within its own module.
        const TRULY_USED   = 0b00_0001;
        /// The bit is driven by some construct within its own module.
        const TRULY_SET    = 0b00_0010;
        /// Declared with a direction implying a read, but never read.
        const FALSELY_USED = 0b00_0100;
        /// Declared with a direction implying a drive, but never driven.
        const FALSELY_SET  = 0b00_1000;
        /// The corresponding formal port bit is read by an instantiator.
        const USED_ABOVE   = 0b01_0000;
        /// The corresponding formal port bit is driven by an instantiator.
        const SET_ABOVE    = 0b10_0000;

        /// The flags contributed only by pass 2.
        const ABOVE = 0b11_0000;
    }
}

impl UseSet {
    /// This bit's flags with the pass-2 contributions removed.
    pub fn local(self) -> UseSet {
        self - UseSet::ABOVE
    }

    /// True when the bit is read locally or from above.
    pub fn used_anywhere(self) -> bool {
        self.intersects(UseSet::TRULY_USED | UseSet::USED_ABOVE)
    }

    /// True when the bit is driven locally or from above.
    pub fn set_anywhere(self) -> bool {
        self.intersects(UseSet::TRULY_SET | UseSet::SET_ABOVE)
    }
}

#[test]
fn union_is_monotonic_and_commutative() {
    let a = UseSet::TRULY_USED | UseSet::FALSELY_SET;
    let b = UseSet::TRULY_SET;

    assert_eq!(a | b, b | a);
    assert_eq!(a | a, a);
    assert!((a | b).contains(a));
    assert!((a | b).contains(b));
}

#[test]
fn local_strips_exactly_the_above_flags() {
    let flags = UseSet::all();
    let local = flags.local();
    assert!(local.contains(UseSet::TRULY_USED));
    assert!(local.contains(UseSet::TRULY_SET));
    assert!(local.contains(UseSet::FALSELY_USED));
    assert!(local.contains(UseSet::FALSELY_SET));
    assert!(!local.intersects(UseSet::ABOVE));
}
