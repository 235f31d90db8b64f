//! The dependency-ordered driver: pass 1 walks modules leaf-to-root and
//! builds each module's bit database, pass 2 walks the exact reverse order
//! and applies the recorded notes to push used/set-from-above information
//! into submodules.

use crate::analysis::{classify, resolve_instance, BitDatabase, DatabaseTable, Marker, Note, UseSet, Warning};
use crate::il;
use crate::Error;
use log::{trace, warn};
use std::collections::{BTreeMap, BTreeSet};

/// The result of the two-pass use/set analysis over a design.
///
/// Holds the final per-module bit databases and the warnings each module
/// accumulated. Call [`UseSetAnalysis::classify`] to turn the databases into
/// per-wire diagnostics.
#[derive(Clone, Debug, Default)]
pub struct UseSetAnalysis {
    pub(crate) databases: DatabaseTable,
    pub(crate) warnings: BTreeMap<String, Vec<Warning>>,
    pub(crate) order: Vec<String>,
}

impl UseSetAnalysis {
    /// The final database table, for downstream tooling to query per-bit
    /// used/set status directly.
    pub fn databases(&self) -> &DatabaseTable {
        &self.databases
    }

    pub fn database(&self, module: &str) -> Option<&BitDatabase> {
        self.databases.database(module)
    }

    /// The warnings attached to one module.
    pub fn warnings(&self, module: &str) -> Option<&[Warning]> {
        self.warnings.get(module).map(|warnings| warnings.as_slice())
    }

    /// Every module's warnings, in dependency order.
    pub fn all_warnings(&self) -> impl Iterator<Item = (&str, &[Warning])> {
        self.order.iter().filter_map(move |module| {
            self.warnings
                .get(module)
                .map(|warnings| (module.as_str(), warnings.as_slice()))
        })
    }

    /// The dependency order the analysis ran in.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Shrink the databases and classify every remaining bit, appending
    /// use/set diagnostics to each module's warnings.
    pub fn classify(&mut self, design: &il::Design) {
        classify::classify(self, design)
    }
}

fn validate_order(design: &il::Design, order: &[String]) -> Result<(), Error> {
    let mut seen = BTreeSet::new();
    for name in order {
        if design.module(name).is_none() {
            return Err(Error::DependencyOrder(format!(
                "`{}` is not a module of the design",
                name
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::DependencyOrder(format!(
                "`{}` appears more than once",
                name
            )));
        }
    }
    if seen.len() != design.len() {
        let missing = design
            .module_names()
            .find(|name| !seen.contains(name))
            .unwrap_or("?");
        return Err(Error::DependencyOrder(format!(
            "module `{}` is missing from the order",
            missing
        )));
    }
    Ok(())
}

/// Run the two-pass use/set analysis.
///
/// `order` is the externally computed dependency order: every instantiated
/// submodule precedes its instantiator. Pass 1 consumes it forward, pass 2
/// consumes it in exact reverse. A malformed module degrades to warnings on
/// that module; only an unusable `order` is an error.
pub fn use_set_analysis(design: &il::Design, order: &[String]) -> Result<UseSetAnalysis, Error> {
    validate_order(design, order)?;

    let tops = design
        .top_modules()
        .into_iter()
        .map(|name| name.to_string())
        .collect::<BTreeSet<String>>();

    let mut databases = DatabaseTable::new();
    let mut notes_table: BTreeMap<String, Vec<Note>> = BTreeMap::new();
    let mut all_warnings: BTreeMap<String, Vec<Warning>> = BTreeMap::new();

    // Pass 1, leaf to root.
    for name in order {
        trace!("pass 1: {}", name);
        let module = design
            .module(name)
            .ok_or_else(|| Error::UnknownModule(name.to_string()))?;
        let alist = module.wire_alist();

        let mut warnings = Vec::new();
        let mut notes = Vec::new();
        let mut database = BitDatabase::initialize(alist);

        // A top-level module's ports face the outside world: assume its
        // inputs are driven and its outputs are consumed.
        if tops.contains(name.as_str()) {
            match module.port_pattern() {
                Some(pattern) => {
                    for (port, bits) in module.ports().iter().zip(pattern) {
                        let mut mask = UseSet::empty();
                        if port.direction().is_input_like() {
                            mask |= UseSet::SET_ABOVE;
                        }
                        if port.direction().is_output_like() {
                            mask |= UseSet::USED_ABOVE;
                        }
                        database.mark(&bits, mask, &mut warnings);
                    }
                }
                None => warnings.push(Warning::structural(format!(
                    "could not generate a port pattern for top-level module `{}`",
                    name
                ))),
            }
        }

        {
            let mut marker = Marker::new(&mut database, alist, &mut warnings);
            for declaration in module.net_declarations() {
                marker.net_declaration(declaration);
            }
            for assign in module.assigns() {
                marker.assign(assign);
            }
            for gate in module.gates() {
                marker.gate(gate);
            }
            for procedural in module.procedurals() {
                marker.statement(procedural.statement());
            }
        }

        for instance in module.instances() {
            resolve_instance(
                instance,
                alist,
                design,
                &databases,
                &mut database,
                &mut notes,
                &mut warnings,
            );
        }

        // False inouts: directions promise a read or a drive that never
        // happened locally.
        for declaration in module.port_declarations() {
            let bits = match alist.bits(declaration.name()) {
                Some(bits) => bits.to_vec(),
                None => {
                    warnings.push(Warning::fudging(format!(
                        "port `{}` has no wire-alist entry; its bits have no database entries",
                        declaration.name()
                    )));
                    continue;
                }
            };
            for bit in &bits {
                let flags = database.query(bit);
                if declaration.direction().is_input_like()
                    && !flags.contains(UseSet::TRULY_USED)
                {
                    database.mark(
                        std::slice::from_ref(bit),
                        UseSet::FALSELY_USED,
                        &mut warnings,
                    );
                }
                if declaration.direction().is_output_like() && !flags.contains(UseSet::TRULY_SET)
                {
                    database.mark(
                        std::slice::from_ref(bit),
                        UseSet::FALSELY_SET,
                        &mut warnings,
                    );
                }
            }
        }

        for warning in warnings.iter().filter(|warning| warning.is_fatal()) {
            warn!("{}: {}", name, warning);
        }

        databases.insert(name.clone(), database);
        notes_table.insert(name.clone(), notes);
        all_warnings.insert(name.clone(), warnings);
    }

    // Pass 2, exact reverse: apply each module's notes against the
    // already-built databases of its submodules. Only above flags move.
    for name in order.iter().rev() {
        trace!("pass 2: {}", name);
        let notes = notes_table.remove(name).unwrap_or_default();
        for note in notes {
            let union = {
                let database = match databases.database(name) {
                    Some(database) => database,
                    None => continue,
                };
                note.actuals()
                    .iter()
                    .fold(UseSet::empty(), |union, bit| union | database.query(bit))
            };

            let mut above = UseSet::empty();
            if union.intersects(UseSet::TRULY_SET | UseSet::SET_ABOVE) {
                above |= UseSet::SET_ABOVE;
            }
            if union.intersects(UseSet::TRULY_USED | UseSet::USED_ABOVE) {
                above |= UseSet::USED_ABOVE;
            }
            if above.is_empty() {
                continue;
            }

            let warnings = all_warnings.entry(name.clone()).or_default();
            match databases.database_mut(note.submodule()) {
                Some(sub_database) => {
                    sub_database.mark(note.formals(), above, warnings);
                }
                None => warnings.push(Warning::fudging(format!(
                    "no database for `{}` while applying a note",
                    note.submodule()
                ))),
            }
        }
    }

    Ok(UseSetAnalysis {
        databases,
        warnings: all_warnings,
        order: order.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::{Bit, Direction, Port, PortDeclaration};

    fn leaf() -> il::Module {
        let mut module = il::Module::new("leaf");
        module.add_port(Port::new("out", Direction::Output));
        module.add_port(Port::new("in", Direction::Input));
        module.add_port_declaration(PortDeclaration::new("out", Direction::Output));
        module.add_port_declaration(PortDeclaration::new("in", Direction::Input));
        module.declare_wire("out", 0, 0);
        module.declare_wire("in", 0, 0);
        module.add_assign(il::Assign::new(il::expr_wire("out"), il::expr_wire("in")));
        module
    }

    fn two_level_design() -> (il::Design, Vec<String>) {
        // module top(o, i); output o; input i; leaf u0(o, i); endmodule
        let mut top = il::Module::new("top");
        top.add_port(Port::new("o", Direction::Output));
        top.add_port(Port::new("i", Direction::Input));
        top.add_port_declaration(PortDeclaration::new("o", Direction::Output));
        top.add_port_declaration(PortDeclaration::new("i", Direction::Input));
        top.declare_wire("o", 0, 0);
        top.declare_wire("i", 0, 0);
        top.add_instance(il::Instance::ordered(
            "u0",
            "leaf",
            vec![il::expr_wire("o"), il::expr_wire("i")],
        ));

        let mut design = il::Design::new();
        design.add_module(leaf());
        design.add_module(top);
        (design, vec!["leaf".to_string(), "top".to_string()])
    }

    #[test]
    fn order_must_cover_the_design() {
        let (design, _) = two_level_design();

        let err = use_set_analysis(&design, &["leaf".to_string()]);
        assert!(matches!(err, Err(Error::DependencyOrder(_))));

        let err = use_set_analysis(
            &design,
            &["leaf".to_string(), "leaf".to_string(), "top".to_string()],
        );
        assert!(matches!(err, Err(Error::DependencyOrder(_))));

        let err = use_set_analysis(&design, &["leaf".to_string(), "ghost".to_string()]);
        assert!(matches!(err, Err(Error::DependencyOrder(_))));
    }

    #[test]
    fn every_port_bit_has_a_database_entry_after_pass_1() {
        let (design, order) = two_level_design();
        let analysis = use_set_analysis(&design, &order).unwrap();

        for module in design.modules() {
            let database = analysis.database(module.name()).unwrap();
            for port in module.ports() {
                for bit in module.wire_alist().bits(port.name()).unwrap() {
                    assert!(database.contains(bit), "{} missing {}", module.name(), bit);
                }
            }
        }
    }

    #[test]
    fn pass_2_only_adds_above_flags() {
        let (design, order) = two_level_design();

        // Pass 1 alone: reconstruct by running the analysis on a design
        // where `top` does not exist, so `leaf` sees no notes.
        let analysis = use_set_analysis(&design, &order).unwrap();
        let leaf_db = analysis.database("leaf").unwrap();

        let mut solo = il::Design::new();
        solo.add_module(leaf());
        let solo_analysis = use_set_analysis(&solo, &["leaf".to_string()]).unwrap();
        let solo_db = solo_analysis.database("leaf").unwrap();

        for (bit, flags) in leaf_db.bits() {
            let local = solo_db.query(bit).local();
            assert_eq!(
                flags.local() | local,
                flags.local(),
                "pass 2 altered local flags of {}",
                bit
            );
        }
    }

    #[test]
    fn above_flags_propagate_into_submodules() {
        let (design, order) = two_level_design();
        let analysis = use_set_analysis(&design, &order).unwrap();
        let leaf_db = analysis.database("leaf").unwrap();

        // `top` is top-level, so `i` is set from the outside and `o` is
        // used from the outside; the notes push both facts down to leaf.
        let out_flags = leaf_db.query(&Bit::new("out", 0));
        assert!(out_flags.contains(UseSet::USED_ABOVE));
        let in_flags = leaf_db.query(&Bit::new("in", 0));
        assert!(in_flags.contains(UseSet::SET_ABOVE));
    }

    #[test]
    fn leaf_module_round_trips_without_notes() {
        // For a design with no instances, pass 2 has nothing to apply; the
        // final database equals the pass-1 database.
        let mut design = il::Design::new();
        design.add_module(leaf());
        let order = vec!["leaf".to_string()];

        let analysis = use_set_analysis(&design, &order).unwrap();
        let database = analysis.database("leaf").unwrap();

        // leaf is top-level here: ports were seeded with above flags, used
        // and set locally by the pass-through assign, nothing falsely.
        assert_eq!(
            database.query(&Bit::new("in", 0)),
            UseSet::TRULY_USED | UseSet::SET_ABOVE
        );
        assert_eq!(
            database.query(&Bit::new("out", 0)),
            UseSet::TRULY_SET | UseSet::USED_ABOVE
        );
    }

    #[test]
    fn dead_output_is_falsely_set() {
        let mut module = il::Module::new("m");
        module.add_port(Port::new("dead", Direction::Output));
        module.add_port_declaration(PortDeclaration::new("dead", Direction::Output));
        module.declare_wire("dead", 0, 0);

        let mut design = il::Design::new();
        design.add_module(module);

        let analysis = use_set_analysis(&design, &["m".to_string()]).unwrap();
        let flags = analysis
            .database("m")
            .unwrap()
            .query(&Bit::new("dead", 0));
        assert!(flags.contains(UseSet::FALSELY_SET));
        assert!(!flags.contains(UseSet::TRULY_SET));
    }
}
