use crate::il::Bit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A wire alist: the mapping from each declared wire name to its ordered,
/// most-significant-first list of per-bit identifiers.
///
/// Wire alists are built by the declaration-expansion collaborator, before
/// analysis begins. [`WireAlist::declare`] is the reference expansion for a
/// `[msb:lsb]` declaration and is what tests and callers normally use.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct WireAlist {
    wires: BTreeMap<String, Vec<Bit>>,
}

impl WireAlist {
    pub fn new() -> WireAlist {
        WireAlist {
            wires: BTreeMap::new(),
        }
    }

    /// Bind a wire name to an explicit, msb-first list of bits.
    pub fn insert<S>(&mut self, wire: S, bits: Vec<Bit>)
    where
        S: Into<String>,
    {
        self.wires.insert(wire.into(), bits);
    }

    /// Expand a `[msb:lsb]` declaration into per-bit identifiers and bind
    /// them, msb first. `declare("a", 3, 0)` binds `a[3], a[2], a[1], a[0]`.
    pub fn declare<S>(&mut self, wire: S, msb: usize, lsb: usize)
    where
        S: Into<String>,
    {
        let wire = wire.into();
        let mut bits = Vec::with_capacity(msb.max(lsb) - msb.min(lsb) + 1);
        if msb >= lsb {
            for index in (lsb..=msb).rev() {
                bits.push(Bit::new(wire.clone(), index));
            }
        } else {
            for index in msb..=lsb {
                bits.push(Bit::new(wire.clone(), index));
            }
        }
        self.wires.insert(wire, bits);
    }

    /// The msb-first bits of a declared wire.
    pub fn bits(&self, wire: &str) -> Option<&[Bit]> {
        self.wires.get(wire).map(|bits| bits.as_slice())
    }

    pub fn contains(&self, wire: &str) -> bool {
        self.wires.contains_key(wire)
    }

    /// Every declared wire name, in deterministic order.
    pub fn wires(&self) -> impl Iterator<Item = &str> {
        self.wires.keys().map(|name| name.as_str())
    }

    /// Every declared bit of every wire.
    pub fn all_bits(&self) -> impl Iterator<Item = &Bit> {
        self.wires.values().flat_map(|bits| bits.iter())
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }
}

impl fmt::Display for WireAlist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (wire, bits) in &self.wires {
            writeln!(f, "{}: {} bits", wire, bits.len())?;
        }
        Ok(())
    }
}

#[test]
fn declare_is_msb_first() {
    let mut alist = WireAlist::new();
    alist.declare("a", 3, 0);
    let bits = alist.bits("a").unwrap();
    assert_eq!(bits.len(), 4);
    assert_eq!(bits[0], Bit::new("a", 3));
    assert_eq!(bits[3], Bit::new("a", 0));
}

#[test]
fn declare_ascending_range() {
    let mut alist = WireAlist::new();
    alist.declare("b", 0, 2);
    let bits = alist.bits("b").unwrap();
    assert_eq!(bits.len(), 3);
    assert_eq!(bits[0], Bit::new("b", 0));
    assert_eq!(bits[2], Bit::new("b", 2));
}
