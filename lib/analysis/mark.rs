//! The marking engine: dataflow rules that mark sets of bits with use/set
//! flags, given a statement, expression, or declaration.
//!
//! Statement traversal recurses into sub-statements first, then applies the
//! construct's own extra marking. The order matters: an `if` contributes
//! marks for its controlling expression in addition to whatever its branches
//! already contributed.

use crate::analysis::{BitDatabase, UseSet, Warning};
use crate::il;

/// Walks one module's constructs and marks its bit database.
pub struct Marker<'a> {
    database: &'a mut BitDatabase,
    alist: &'a il::WireAlist,
    warnings: &'a mut Vec<Warning>,
}

impl<'a> Marker<'a> {
    pub fn new(
        database: &'a mut BitDatabase,
        alist: &'a il::WireAlist,
        warnings: &'a mut Vec<Warning>,
    ) -> Marker<'a> {
        Marker {
            database,
            alist,
            warnings,
        }
    }

    /// Mark every bit the expression reads as truly used.
    pub fn expression_used(&mut self, expression: &il::Expression) {
        for wire in expression.missing_wires(self.alist) {
            self.warnings.push(
                Warning::fudging(format!("wire `{}` has no wire-alist entry", wire))
                    .with_context(expression.to_string()),
            );
        }
        let bits = expression.source_bits(self.alist);
        self.database.mark(&bits, UseSet::TRULY_USED, self.warnings);
    }

    /// Mark every bit the lvalue addresses as truly set. Non-lvalues are
    /// skipped with a fudging warning; nothing can be soundly inferred about
    /// them as assignment targets.
    pub fn lvalue_set(&mut self, expression: &il::Expression) {
        match expression.lvalue_bits(self.alist) {
            Some(bits) => self.database.mark(&bits, UseSet::TRULY_SET, self.warnings),
            None => self.warnings.push(
                Warning::fudging("assignment target could not be decomposed into bits")
                    .with_context(expression.to_string()),
            ),
        }
    }

    /// Continuous or procedural assignment: rhs bits are used, lhs bits are
    /// set.
    pub fn assign(&mut self, assign: &il::Assign) {
        self.expression_used(assign.rhs());
        self.lvalue_set(assign.lhs());
    }

    /// Gate instance: argument marking follows the resolved direction.
    pub fn gate(&mut self, gate: &il::Gate) {
        for arg in gate.args() {
            match arg.direction() {
                il::GateArgDirection::Input => self.expression_used(arg.expression()),
                il::GateArgDirection::Output => self.lvalue_set(arg.expression()),
                il::GateArgDirection::Unknown => {
                    self.warnings.push(
                        Warning::fudging(format!(
                            "direction of a `{}` gate argument is unresolved; treating it as \
                             both used and set",
                            gate
                        ))
                        .with_context(arg.expression().to_string()),
                    );
                    self.expression_used(arg.expression());
                    self.lvalue_set(arg.expression());
                }
            }
        }
    }

    /// Net declaration: supply nets drive their bits by declaration alone.
    pub fn net_declaration(&mut self, declaration: &il::NetDeclaration) {
        if !declaration.kind().is_supply() {
            return;
        }
        match self.alist.bits(declaration.name()) {
            Some(bits) => {
                let bits = bits.to_vec();
                self.database.mark(&bits, UseSet::TRULY_SET, self.warnings);
            }
            None => self.warnings.push(Warning::fudging(format!(
                "{} `{}` has no wire-alist entry",
                declaration.kind(),
                declaration.name()
            ))),
        }
    }

    /// Walk a procedural statement: sub-statements first, then the
    /// construct's own marking.
    pub fn statement(&mut self, statement: &il::Statement) {
        match statement {
            il::Statement::Assign(assign) => self.assign(assign),
            il::Statement::Block {
                declarations,
                statements,
            } => {
                if !declarations.is_empty() {
                    self.warnings.push(Warning::fudging(
                        "block statements with local declarations are not supported; \
                         skipping the block",
                    ));
                    return;
                }
                for statement in statements {
                    self.statement(statement);
                }
            }
            il::Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch);
                }
                self.expression_used(condition);
            }
            il::Statement::Case {
                subject,
                arms,
                default,
            } => {
                for arm in arms {
                    self.statement(arm.body());
                }
                if let Some(default) = default {
                    self.statement(default);
                }
                self.expression_used(subject);
                for arm in arms {
                    for label in arm.labels() {
                        self.expression_used(label);
                    }
                }
            }
            il::Statement::For {
                init,
                test,
                step,
                body,
            } => {
                self.statement(body);
                self.lvalue_set(init.lhs());
                self.lvalue_set(step.lhs());
                self.expression_used(init.rhs());
                self.expression_used(step.rhs());
                self.expression_used(test);
            }
            il::Statement::While { condition, body }
            | il::Statement::Wait { condition, body } => {
                self.statement(body);
                self.expression_used(condition);
            }
            il::Statement::Repeat { count, body } => {
                self.statement(body);
                self.expression_used(count);
            }
            il::Statement::EventControl { triggers, body } => {
                self.statement(body);
                for trigger in triggers {
                    self.expression_used(trigger);
                }
            }
            il::Statement::DelayControl { delay, body } => {
                self.statement(body);
                self.expression_used(delay);
            }
            il::Statement::TaskEnable { name, .. } => {
                self.warnings.push(Warning::fudging(format!(
                    "task/function enable `{}` is not supported; skipping it",
                    name
                )));
            }
            il::Statement::Null => {}
        }
    }
}

#[cfg(test)]
fn marked(module_body: impl FnOnce(&mut il::Module)) -> (BitDatabase, Vec<Warning>) {
    let mut module = il::Module::new("m");
    module.declare_wire("a", 3, 0);
    module.declare_wire("b", 3, 0);
    module.declare_wire("c", 0, 0);
    module_body(&mut module);

    let mut database = BitDatabase::initialize(module.wire_alist());
    let mut warnings = Vec::new();
    {
        let mut marker = Marker::new(&mut database, module.wire_alist(), &mut warnings);
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
    (database, warnings)
}

#[test]
fn assignment_marks_rhs_used_lhs_set() {
    let (db, warnings) = marked(|module| {
        module.add_assign(il::Assign::new(il::expr_wire("a"), il::expr_wire("b")));
    });

    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::TRULY_SET);
    assert_eq!(db.query(&il::Bit::new("b", 0)), UseSet::TRULY_USED);
    assert!(warnings.is_empty());
}

#[test]
fn self_assignment_marks_both() {
    // The documented blind spot: `assign a = a;` looks used and set.
    let (db, _) = marked(|module| {
        module.add_assign(il::Assign::new(il::expr_wire("a"), il::expr_wire("a")));
    });

    assert_eq!(
        db.query(&il::Bit::new("a", 2)),
        UseSet::TRULY_USED | UseSet::TRULY_SET
    );
}

#[test]
fn if_condition_is_used_in_addition_to_branches() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::if_(
            il::expr_wire("c"),
            il::Statement::assign(il::expr_wire("a"), il::expr_wire("b")),
        ));
    });

    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_USED);
    assert_eq!(db.query(&il::Bit::new("a", 1)), UseSet::TRULY_SET);
    assert_eq!(db.query(&il::Bit::new("b", 1)), UseSet::TRULY_USED);
}

#[test]
fn for_loop_marks_init_and_step() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::for_(
            il::Assign::new(il::expr_wire("a"), il::expr_const(0, 4)),
            il::Expression::binary(il::BinaryOp::Cmplt, il::expr_wire("a"), il::expr_const(4, 4)),
            il::Assign::new(
                il::expr_wire("a"),
                il::Expression::binary(il::BinaryOp::Add, il::expr_wire("a"), il::expr_const(1, 4)),
            ),
            il::Statement::assign(il::expr_wire("c"), il::Expression::bit_select("b", il::expr_wire("a"))),
        ));
    });

    let a0 = db.query(&il::Bit::new("a", 0));
    assert!(a0.contains(UseSet::TRULY_SET));
    assert!(a0.contains(UseSet::TRULY_USED));
    assert!(db.query(&il::Bit::new("c", 0)).contains(UseSet::TRULY_SET));
}

#[test]
fn event_control_trigger_is_used() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::event_control(
            vec![il::expr_wire("c")],
            il::Statement::assign(il::expr_wire("a"), il::expr_wire("b")),
        ));
    });

    assert!(db.query(&il::Bit::new("c", 0)).contains(UseSet::TRULY_USED));
}

#[test]
fn case_subject_and_labels_are_used() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::case(
            il::expr_wire("a"),
            vec![il::CaseArm::new(
                vec![il::expr_wire("b")],
                il::Statement::assign(il::expr_wire("c"), il::expr_const(0, 1)),
            )],
            Some(il::Statement::assign(il::expr_wire("c"), il::expr_const(1, 1))),
        ));
    });

    assert!(db.query(&il::Bit::new("a", 0)).contains(UseSet::TRULY_USED));
    // The arm label contributes a use in addition to the subject.
    assert!(db.query(&il::Bit::new("b", 0)).contains(UseSet::TRULY_USED));
    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_SET);
}

#[test]
fn while_condition_is_used_not_set() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::while_(
            il::expr_wire("c"),
            il::Statement::assign(il::expr_wire("a"), il::expr_wire("b")),
        ));
    });

    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_USED);
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::TRULY_SET);
    assert_eq!(db.query(&il::Bit::new("b", 0)), UseSet::TRULY_USED);
}

#[test]
fn repeat_count_is_used() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::repeat(
            il::expr_wire("c"),
            il::Statement::assign(il::expr_wire("a"), il::expr_wire("b")),
        ));
    });

    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_USED);
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::TRULY_SET);
}

#[test]
fn wait_condition_is_used() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::wait(
            il::expr_wire("c"),
            il::Statement::assign(il::expr_wire("a"), il::expr_wire("b")),
        ));
    });

    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_USED);
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::TRULY_SET);
}

#[test]
fn delay_control_delay_is_used() {
    let (db, _) = marked(|module| {
        module.add_always(il::Statement::delay_control(
            il::expr_wire("c"),
            il::Statement::assign(il::expr_wire("a"), il::expr_wire("b")),
        ));
    });

    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_USED);
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::TRULY_SET);
}

#[test]
fn block_with_locals_is_fudged() {
    let (db, warnings) = marked(|module| {
        module.add_always(il::Statement::block_with_declarations(
            vec![il::NetDeclaration::new("tmp", il::NetKind::Reg)],
            vec![il::Statement::assign(il::expr_wire("a"), il::expr_wire("b"))],
        ));
    });

    assert!(warnings
        .iter()
        .any(|w| w.kind() == crate::analysis::WarningKind::Fudging));
    // The block's contents were skipped entirely.
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::empty());
    assert_eq!(db.query(&il::Bit::new("b", 0)), UseSet::empty());
}

#[test]
fn task_enable_is_fudged() {
    let (db, warnings) = marked(|module| {
        module.add_always(il::Statement::task_enable(
            "do_thing",
            vec![il::expr_wire("a")],
        ));
    });

    assert_eq!(warnings.len(), 1);
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::empty());
}

#[test]
fn gate_directions() {
    let (db, warnings) = marked(|module| {
        module.add_gate(il::Gate::new(
            il::GateKind::And,
            vec![
                il::GateArg::new(il::expr_wire("c"), il::GateArgDirection::Output),
                il::GateArg::new(il::expr_wire("a"), il::GateArgDirection::Input),
                il::GateArg::new(il::expr_wire("b"), il::GateArgDirection::Unknown),
            ],
        ));
    });

    assert_eq!(db.query(&il::Bit::new("c", 0)), UseSet::TRULY_SET);
    assert_eq!(db.query(&il::Bit::new("a", 0)), UseSet::TRULY_USED);
    assert_eq!(
        db.query(&il::Bit::new("b", 0)),
        UseSet::TRULY_USED | UseSet::TRULY_SET
    );
    assert_eq!(warnings.len(), 1);
}

#[test]
fn supply_nets_are_set() {
    let (db, _) = marked(|module| {
        module.declare_net("gnd", il::NetKind::Supply0, 0, 0);
    });

    assert_eq!(db.query(&il::Bit::new("gnd", 0)), UseSet::TRULY_SET);
}
