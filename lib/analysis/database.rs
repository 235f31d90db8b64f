use crate::analysis::{UseSet, Warning};
use crate::il::{Bit, WireAlist};
use crate::Error;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// The per-module bit database: a mapping from bit identifier to its
/// accumulated use/set flags.
///
/// A database is created at the start of its module's pass-1 processing with
/// every declared bit bound to the empty flag set, mutated by the marking
/// engine and the port/instance resolver during pass 1, mutated again (above
/// flags only) during pass 2, then frozen for classification.
#[derive(Clone, Debug, Default)]
pub struct BitDatabase {
    flags: FxHashMap<Bit, UseSet>,
}

impl BitDatabase {
    /// A database with every bit of the wire alist bound to the empty set.
    pub fn initialize(alist: &WireAlist) -> BitDatabase {
        let mut flags = FxHashMap::default();
        for bit in alist.all_bits() {
            flags.insert(bit.clone(), UseSet::empty());
        }
        BitDatabase { flags }
    }

    /// Union `mask` into the flags of each bit.
    ///
    /// Marking is idempotent and commutative: repeated marks with the same
    /// arguments, or marks applied in any order, accumulate to the same
    /// final flags. A bit which was never declared gets a fresh binding and
    /// a fudging warning.
    pub fn mark(&mut self, bits: &[Bit], mask: UseSet, warnings: &mut Vec<Warning>) {
        for bit in bits {
            match self.flags.get_mut(bit) {
                Some(flags) => {
                    flags.insert(mask);
                }
                None => {
                    warnings.push(Warning::fudging(format!(
                        "bit {} was marked but never declared",
                        bit
                    )));
                    self.flags.insert(bit.clone(), mask);
                }
            }
        }
    }

    /// The accumulated flags of a bit; empty when the bit is unknown.
    pub fn query(&self, bit: &Bit) -> UseSet {
        self.flags.get(bit).copied().unwrap_or_else(UseSet::empty)
    }

    pub fn contains(&self, bit: &Bit) -> bool {
        self.flags.contains_key(bit)
    }

    /// Freeze the database for classification.
    ///
    /// The original accumulated duplicate bindings and resolved them most
    /// recent first; under hash-backed storage each bit has exactly one
    /// binding that already holds the full union, so there is nothing left
    /// to resolve. Kept as the explicit boundary between mutation and
    /// classification.
    pub fn shrink(&mut self) {
        self.flags.shrink_to_fit();
    }

    pub fn bits(&self) -> impl Iterator<Item = (&Bit, UseSet)> {
        self.flags.iter().map(|(bit, flags)| (bit, *flags))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// The design-wide table of bit databases, keyed by module name.
#[derive(Clone, Debug, Default)]
pub struct DatabaseTable {
    databases: BTreeMap<String, BitDatabase>,
}

impl DatabaseTable {
    pub fn new() -> DatabaseTable {
        DatabaseTable {
            databases: BTreeMap::new(),
        }
    }

    pub fn insert<S>(&mut self, module: S, database: BitDatabase)
    where
        S: Into<String>,
    {
        self.databases.insert(module.into(), database);
    }

    pub fn database(&self, module: &str) -> Option<&BitDatabase> {
        self.databases.get(module)
    }

    pub fn database_mut(&mut self, module: &str) -> Option<&mut BitDatabase> {
        self.databases.get_mut(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BitDatabase)> {
        self.databases
            .iter()
            .map(|(name, database)| (name.as_str(), database))
    }

    /// Serialize the table for downstream tooling: module name to bit
    /// identifier to raw flag bits.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut table: BTreeMap<&str, BTreeMap<String, u8>> = BTreeMap::new();
        for (module, database) in &self.databases {
            let entry = table.entry(module).or_default();
            for (bit, flags) in database.bits() {
                entry.insert(bit.identifier(), flags.bits());
            }
        }
        Ok(serde_json::to_string(&table)?)
    }
}

#[test]
fn mark_accumulates_and_never_clears() {
    let mut alist = WireAlist::new();
    alist.declare("a", 1, 0);

    let mut db = BitDatabase::initialize(&alist);
    let mut warnings = Vec::new();
    let bits = alist.bits("a").unwrap().to_vec();

    db.mark(&bits, UseSet::TRULY_USED, &mut warnings);
    db.mark(&bits, UseSet::TRULY_SET, &mut warnings);
    db.mark(&bits, UseSet::TRULY_USED, &mut warnings);

    for bit in &bits {
        assert_eq!(db.query(bit), UseSet::TRULY_USED | UseSet::TRULY_SET);
    }
    assert!(warnings.is_empty());
}

#[test]
fn mark_order_is_irrelevant() {
    let mut alist = WireAlist::new();
    alist.declare("a", 0, 0);
    let bits = alist.bits("a").unwrap().to_vec();

    let mut forward = BitDatabase::initialize(&alist);
    let mut backward = BitDatabase::initialize(&alist);
    let mut warnings = Vec::new();

    forward.mark(&bits, UseSet::TRULY_USED, &mut warnings);
    forward.mark(&bits, UseSet::SET_ABOVE, &mut warnings);
    backward.mark(&bits, UseSet::SET_ABOVE, &mut warnings);
    backward.mark(&bits, UseSet::TRULY_USED, &mut warnings);

    assert_eq!(forward.query(&bits[0]), backward.query(&bits[0]));
}

#[test]
fn marking_an_undeclared_bit_warns() {
    let alist = WireAlist::new();
    let mut db = BitDatabase::initialize(&alist);
    let mut warnings = Vec::new();

    db.mark(&[Bit::new("ghost", 0)], UseSet::TRULY_USED, &mut warnings);

    assert_eq!(warnings.len(), 1);
    assert_eq!(db.query(&Bit::new("ghost", 0)), UseSet::TRULY_USED);
}
