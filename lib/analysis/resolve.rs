//! The port/instance resolver: aligns a module instance's actual-argument
//! bits against the submodule's formal port bits.
//!
//! The bottom-up pass-1 order guarantees the submodule's database is final
//! before any of its instantiators are resolved. Whatever cannot be resolved
//! locally is recorded as a [`Note`] for pass-2 propagation.

use crate::analysis::{BitDatabase, DatabaseTable, UseSet, Warning};
use crate::il;
use crate::il::Bit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unresolved cross-module connection: the submodule's formal bits
/// aligned against the actual bits connected in the instantiating module.
///
/// Notes are produced during the instantiator's pass-1 processing and
/// consumed during pass 2, where the instantiator's final flags for the
/// actual bits decide the used/set-from-above flags of the formals.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Note {
    submodule: String,
    formals: Vec<Bit>,
    actuals: Vec<Bit>,
}

impl Note {
    pub fn new<S>(submodule: S, formals: Vec<Bit>, actuals: Vec<Bit>) -> Note
    where
        S: Into<String>,
    {
        Note {
            submodule: submodule.into(),
            formals,
            actuals,
        }
    }

    pub fn submodule(&self) -> &str {
        &self.submodule
    }

    pub fn formals(&self) -> &[Bit] {
        &self.formals
    }

    pub fn actuals(&self) -> &[Bit] {
        &self.actuals
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "note for {}: {} formal bits, {} actual bits",
            self.submodule,
            self.formals.len(),
            self.actuals.len()
        )
    }
}

/// Resolve one module instance against its submodule's final database.
///
/// `alist` and `database` belong to the instantiating module; `databases`
/// holds the finished pass-1 results of everything processed so far. Any
/// failure degrades to a warning; the instance (or the single affected
/// argument) is skipped and the caller continues.
pub(crate) fn resolve_instance(
    instance: &il::Instance,
    alist: &il::WireAlist,
    design: &il::Design,
    databases: &DatabaseTable,
    database: &mut BitDatabase,
    notes: &mut Vec<Note>,
    warnings: &mut Vec<Warning>,
) {
    let context = instance.to_string();

    if instance.range().is_some() {
        warnings.push(
            Warning::fudging("instance arrays are not supported; skipping the instance")
                .with_context(context),
        );
        return;
    }
    if !instance.parameters().is_empty() {
        warnings.push(
            Warning::fudging("parameterized instances are not supported; skipping the instance")
                .with_context(context),
        );
        return;
    }
    if instance.has_named_connections() {
        warnings.push(
            Warning::fudging(
                "instance has unresolved named connections; skipping the instance",
            )
            .with_context(context),
        );
        return;
    }

    let submodule = match design.module(instance.module()) {
        Some(submodule) => submodule,
        None => {
            warnings.push(
                Warning::fudging(format!(
                    "module `{}` was not found in the design",
                    instance.module()
                ))
                .with_context(context),
            );
            return;
        }
    };

    let sub_database = match databases.database(instance.module()) {
        Some(sub_database) => sub_database,
        None => {
            warnings.push(
                Warning::fudging(format!(
                    "no finished database for module `{}`; was the dependency order violated?",
                    instance.module()
                ))
                .with_context(context),
            );
            return;
        }
    };

    let pattern = match submodule.port_pattern() {
        Some(pattern) => pattern,
        None => {
            warnings.push(
                Warning::structural(format!(
                    "could not generate a port pattern for module `{}`",
                    instance.module()
                ))
                .with_context(context),
            );
            return;
        }
    };

    if instance.connections().len() != pattern.len() {
        warnings.push(
            Warning::structural(format!(
                "instance has {} arguments but `{}` has {} ports",
                instance.connections().len(),
                instance.module(),
                pattern.len()
            ))
            .with_context(context),
        );
        return;
    }

    for (connection, formals) in instance.connections().iter().zip(pattern) {
        let actual = connection.expression();

        let actual_length = match actual.bit_length(alist) {
            Some(length) => length,
            None => {
                warnings.push(
                    Warning::fudging("width of an instance argument could not be determined")
                        .with_context(actual.to_string()),
                );
                continue;
            }
        };
        if actual_length != formals.len() {
            warnings.push(
                Warning::structural(format!(
                    "instance argument `{}` is {} bits wide but its port is {} bits wide",
                    actual,
                    actual_length,
                    formals.len()
                ))
                .with_context(context.clone()),
            );
            continue;
        }

        match actual.lvalue_bits(alist) {
            Some(actuals) => {
                // Bit-for-bit alignment. The formal's local flags transfer
                // to the actual; above flags belong to the submodule's own
                // instantiation context and must not leak.
                for (actual_bit, formal_bit) in actuals.iter().zip(formals.iter()) {
                    let mask = sub_database.query(formal_bit).local();
                    database.mark(std::slice::from_ref(actual_bit), mask, warnings);
                }
                notes.push(Note::new(instance.module(), formals, actuals));
            }
            None => {
                // A non-decomposable expression feeds the port. Nothing can
                // be aligned bit-by-bit, and inferring "set" for the
                // expression's operands would be unsound.
                let mut union = UseSet::empty();
                for formal in &formals {
                    union |= sub_database.query(formal);
                }

                if union.contains(UseSet::TRULY_SET) {
                    warnings.push(
                        Warning::trainwreck(format!(
                            "`{}` drives a port that is connected to the non-lvalue `{}`",
                            instance.module(),
                            actual
                        ))
                        .with_context(context.clone()),
                    );
                }
                if union.contains(UseSet::FALSELY_SET) {
                    warnings.push(
                        Warning::future_trainwreck(format!(
                            "`{}` declares as output a port connected to the non-lvalue `{}`",
                            instance.module(),
                            actual
                        ))
                        .with_context(context.clone()),
                    );
                }

                for wire in actual.missing_wires(alist) {
                    warnings.push(
                        Warning::fudging(format!("wire `{}` has no wire-alist entry", wire))
                            .with_context(actual.to_string()),
                    );
                }

                let mask = (union - (UseSet::TRULY_SET | UseSet::FALSELY_SET)).local();
                let actuals = actual.source_bits(alist);
                database.mark(&actuals, mask, warnings);
                notes.push(Note::new(instance.module(), formals, actuals));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::{Direction, Port, PortDeclaration};

    fn leaf() -> il::Module {
        // module leaf(out, in); output out; input in; assign out = ~in;
        let mut module = il::Module::new("leaf");
        module.add_port(Port::new("out", Direction::Output));
        module.add_port(Port::new("in", Direction::Input));
        module.add_port_declaration(PortDeclaration::new("out", Direction::Output));
        module.add_port_declaration(PortDeclaration::new("in", Direction::Input));
        module.declare_wire("out", 0, 0);
        module.declare_wire("in", 0, 0);
        module.add_assign(il::Assign::new(
            il::expr_wire("out"),
            il::Expression::unary(il::UnaryOp::Not, il::expr_wire("in")),
        ));
        module
    }

    fn leaf_database(module: &il::Module) -> BitDatabase {
        let mut database = BitDatabase::initialize(module.wire_alist());
        let mut warnings = Vec::new();
        let mut marker =
            crate::analysis::Marker::new(&mut database, module.wire_alist(), &mut warnings);
        for assign in module.assigns() {
            marker.assign(assign);
        }
        assert!(warnings.is_empty());
        database
    }

    #[test]
    fn lvalue_actuals_inherit_local_flags() {
        let leaf = leaf();
        let mut databases = DatabaseTable::new();
        databases.insert("leaf", leaf_database(&leaf));

        let mut design = il::Design::new();
        design.add_module(leaf);

        let mut parent = il::Module::new("parent");
        parent.declare_wire("x", 0, 0);
        parent.declare_wire("y", 0, 0);
        parent.add_instance(il::Instance::ordered(
            "u0",
            "leaf",
            vec![il::expr_wire("y"), il::expr_wire("x")],
        ));

        let mut database = BitDatabase::initialize(parent.wire_alist());
        let mut notes = Vec::new();
        let mut warnings = Vec::new();
        resolve_instance(
            &parent.instances()[0],
            parent.wire_alist(),
            &design,
            &databases,
            &mut database,
            &mut notes,
            &mut warnings,
        );

        // leaf sets `out` and uses `in`; the connected wires inherit that.
        assert_eq!(database.query(&Bit::new("y", 0)), UseSet::TRULY_SET);
        assert_eq!(database.query(&Bit::new("x", 0)), UseSet::TRULY_USED);
        assert_eq!(notes.len(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn non_lvalue_driven_port_is_a_trainwreck() {
        let leaf = leaf();
        let mut databases = DatabaseTable::new();
        databases.insert("leaf", leaf_database(&leaf));

        let mut design = il::Design::new();
        design.add_module(leaf);

        // The driven output port is fed `a + b`.
        let mut parent = il::Module::new("parent");
        parent.declare_wire("a", 0, 0);
        parent.declare_wire("b", 0, 0);
        parent.declare_wire("x", 0, 0);
        parent.add_instance(il::Instance::ordered(
            "u0",
            "leaf",
            vec![
                il::Expression::binary(il::BinaryOp::Add, il::expr_wire("a"), il::expr_wire("b")),
                il::expr_wire("x"),
            ],
        ));

        let mut database = BitDatabase::initialize(parent.wire_alist());
        let mut notes = Vec::new();
        let mut warnings = Vec::new();
        resolve_instance(
            &parent.instances()[0],
            parent.wire_alist(),
            &design,
            &databases,
            &mut database,
            &mut notes,
            &mut warnings,
        );

        assert!(warnings
            .iter()
            .any(|w| w.kind() == crate::analysis::WarningKind::Trainwreck));
        // The unsound inference is suppressed: neither operand is set.
        assert!(!database.query(&Bit::new("a", 0)).contains(UseSet::TRULY_SET));
        assert!(!database.query(&Bit::new("b", 0)).contains(UseSet::TRULY_SET));
    }

    #[test]
    fn mixed_driven_and_undriven_formals_warn_both_ways() {
        // A 2-bit output port where only one bit is actually driven: the
        // non-lvalue connection is a trainwreck today for the driven bit and
        // a future trainwreck for the falsely-set one.
        let mut leaf = il::Module::new("leaf");
        leaf.add_port(Port::new("out", Direction::Output));
        leaf.add_port_declaration(PortDeclaration::new("out", Direction::Output));
        leaf.declare_wire("out", 1, 0);

        let mut sub_database = BitDatabase::initialize(leaf.wire_alist());
        let mut warnings = Vec::new();
        sub_database.mark(&[Bit::new("out", 1)], UseSet::TRULY_SET, &mut warnings);
        sub_database.mark(&[Bit::new("out", 0)], UseSet::FALSELY_SET, &mut warnings);

        let mut databases = DatabaseTable::new();
        databases.insert("leaf", sub_database);
        let mut design = il::Design::new();
        design.add_module(leaf);

        let mut parent = il::Module::new("parent");
        parent.declare_wire("a", 1, 0);
        parent.declare_wire("b", 1, 0);
        parent.add_instance(il::Instance::ordered(
            "u0",
            "leaf",
            vec![il::Expression::binary(
                il::BinaryOp::Or,
                il::expr_wire("a"),
                il::expr_wire("b"),
            )],
        ));

        let mut database = BitDatabase::initialize(parent.wire_alist());
        let mut notes = Vec::new();
        resolve_instance(
            &parent.instances()[0],
            parent.wire_alist(),
            &design,
            &databases,
            &mut database,
            &mut notes,
            &mut warnings,
        );

        assert!(warnings
            .iter()
            .any(|w| w.kind() == crate::analysis::WarningKind::Trainwreck));
        assert!(warnings
            .iter()
            .any(|w| w.kind() == crate::analysis::WarningKind::FutureTrainwreck));
    }

    #[test]
    fn width_mismatch_skips_only_the_bad_argument() {
        let leaf = leaf();
        let mut databases = DatabaseTable::new();
        databases.insert("leaf", leaf_database(&leaf));

        let mut design = il::Design::new();
        design.add_module(leaf);

        let mut parent = il::Module::new("parent");
        parent.declare_wire("wide", 3, 0);
        parent.declare_wire("x", 0, 0);
        parent.add_instance(il::Instance::ordered(
            "u0",
            "leaf",
            vec![il::expr_wire("wide"), il::expr_wire("x")],
        ));

        let mut database = BitDatabase::initialize(parent.wire_alist());
        let mut notes = Vec::new();
        let mut warnings = Vec::new();
        resolve_instance(
            &parent.instances()[0],
            parent.wire_alist(),
            &design,
            &databases,
            &mut database,
            &mut notes,
            &mut warnings,
        );

        let structural = warnings
            .iter()
            .filter(|w| w.kind() == crate::analysis::WarningKind::Structural)
            .collect::<Vec<&Warning>>();
        assert_eq!(structural.len(), 1);
        assert!(structural[0].is_fatal());
        // No flags inferred for the mismatched connection.
        assert_eq!(database.query(&Bit::new("wide", 0)), UseSet::empty());
        // The good argument still resolved.
        assert_eq!(database.query(&Bit::new("x", 0)), UseSet::TRULY_USED);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn ranged_and_parameterized_instances_are_fudged() {
        let leaf = leaf();
        let mut databases = DatabaseTable::new();
        databases.insert("leaf", leaf_database(&leaf));
        let mut design = il::Design::new();
        design.add_module(leaf);

        let mut parent = il::Module::new("parent");
        parent.declare_wire("x", 0, 0);
        parent.declare_wire("y", 0, 0);

        let ranged = il::Instance::ordered(
            "u0",
            "leaf",
            vec![il::expr_wire("y"), il::expr_wire("x")],
        )
        .with_range(3, 0);

        let mut database = BitDatabase::initialize(parent.wire_alist());
        let mut notes = Vec::new();
        let mut warnings = Vec::new();
        resolve_instance(
            &ranged,
            parent.wire_alist(),
            &design,
            &databases,
            &mut database,
            &mut notes,
            &mut warnings,
        );

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), crate::analysis::WarningKind::Fudging);
        assert!(notes.is_empty());
        assert_eq!(database.query(&Bit::new("x", 0)), UseSet::empty());
    }
}
