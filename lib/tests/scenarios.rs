//! End-to-end scenarios: build a small design, run both passes, classify,
//! and check the warnings that reach the user.

use crate::analysis::{use_set_analysis, UseSetAnalysis, WarningKind};
use crate::il;
use crate::il::{Direction, Port, PortDeclaration};

fn analyzed(design: &il::Design, order: &[&str]) -> UseSetAnalysis {
    let order = order
        .iter()
        .map(|name| name.to_string())
        .collect::<Vec<String>>();
    let mut analysis = use_set_analysis(design, &order).unwrap();
    analysis.classify(design);
    analysis
}

fn add_port(module: &mut il::Module, name: &str, direction: Direction, msb: usize) {
    module.add_port(Port::new(name, direction));
    module.add_port_declaration(PortDeclaration::new(name, direction));
    module.declare_wire(name, msb, 0);
}

#[test]
fn passthrough_design_is_clean() {
    let mut module = il::Module::new("pass");
    add_port(&mut module, "out", Direction::Output, 3);
    add_port(&mut module, "in", Direction::Input, 3);
    module.add_assign(il::Assign::new(il::expr_wire("out"), il::expr_wire("in")));

    let mut design = il::Design::new();
    design.add_module(module);

    let analysis = analyzed(&design, &["pass"]);
    assert!(analysis.warnings("pass").unwrap().is_empty());
}

#[test]
fn self_assignment_is_invisible() {
    // `assign a = a;` marks a as both used and set. The analysis is
    // syntactic and cannot see through it.
    let mut module = il::Module::new("m");
    module.declare_wire("a", 3, 0);
    module.add_assign(il::Assign::new(il::expr_wire("a"), il::expr_wire("a")));

    let mut design = il::Design::new();
    design.add_module(module);

    let analysis = analyzed(&design, &["m"]);
    assert!(analysis.warnings("m").unwrap().is_empty());
}

#[test]
fn dead_output_is_an_unnecessary_port() {
    // sub never drives its output, and parent wires it to a dead net.
    let mut sub = il::Module::new("sub");
    add_port(&mut sub, "dead", Direction::Output, 0);

    let mut parent = il::Module::new("parent");
    parent.declare_wire("w", 0, 0);
    parent.add_instance(il::Instance::ordered("u0", "sub", vec![il::expr_wire("w")]));

    let mut design = il::Design::new();
    design.add_module(sub);
    design.add_module(parent);

    let analysis = analyzed(&design, &["sub", "parent"]);
    assert!(analysis
        .warnings("sub")
        .unwrap()
        .iter()
        .any(|w| w.message().contains("output port dead is never driven")));
}

#[test]
fn undriven_input_is_an_unset_port() {
    let mut sub = il::Module::new("sub");
    add_port(&mut sub, "i", Direction::Input, 0);
    sub.declare_wire("t", 0, 0);
    sub.add_assign(il::Assign::new(il::expr_wire("t"), il::expr_wire("i")));

    // parent connects the input to a wire nothing drives.
    let mut parent = il::Module::new("parent");
    parent.declare_wire("w", 0, 0);
    parent.add_instance(il::Instance::ordered("u0", "sub", vec![il::expr_wire("w")]));

    let mut design = il::Design::new();
    design.add_module(sub);
    design.add_module(parent);

    let analysis = analyzed(&design, &["sub", "parent"]);
    assert!(analysis
        .warnings("sub")
        .unwrap()
        .iter()
        .any(|w| w.message().contains("read but never driven from above")));
}

#[test]
fn doubly_driven_input_is_a_trainwreck() {
    // sub drives its own input while parent drives the connected net.
    let mut sub = il::Module::new("sub");
    add_port(&mut sub, "i", Direction::Input, 0);
    sub.add_assign(il::Assign::new(il::expr_wire("i"), il::expr_const(1, 1)));

    let mut parent = il::Module::new("parent");
    parent.declare_wire("w", 0, 0);
    parent.declare_wire("c", 0, 0);
    parent.add_assign(il::Assign::new(il::expr_wire("w"), il::expr_wire("c")));
    parent.add_instance(il::Instance::ordered("u0", "sub", vec![il::expr_wire("w")]));

    let mut design = il::Design::new();
    design.add_module(sub);
    design.add_module(parent);

    let analysis = analyzed(&design, &["sub", "parent"]);
    assert!(analysis
        .warnings("sub")
        .unwrap()
        .iter()
        .any(|w| w.kind() == WarningKind::Trainwreck
            && w.message().contains("driven both internally and from above")));
}

#[test]
fn non_lvalue_on_driven_port_is_a_trainwreck() {
    let mut sub = il::Module::new("sub");
    add_port(&mut sub, "out", Direction::Output, 0);
    sub.add_assign(il::Assign::new(il::expr_wire("out"), il::expr_const(0, 1)));

    let mut parent = il::Module::new("parent");
    parent.declare_wire("a", 0, 0);
    parent.declare_wire("b", 0, 0);
    parent.add_instance(il::Instance::ordered(
        "u0",
        "sub",
        vec![il::Expression::binary(
            il::BinaryOp::And,
            il::expr_wire("a"),
            il::expr_wire("b"),
        )],
    ));

    let mut design = il::Design::new();
    design.add_module(sub);
    design.add_module(parent);

    let analysis = analyzed(&design, &["sub", "parent"]);
    assert!(analysis
        .warnings("parent")
        .unwrap()
        .iter()
        .any(|w| w.kind() == WarningKind::Trainwreck));
}

#[test]
fn conduit_hierarchy_is_clean() {
    // top -> mid -> leaf, where mid only forwards its ports. Use and set
    // information flows up during pass 1 and back down during pass 2;
    // nothing is flagged anywhere.
    let mut leaf = il::Module::new("leaf");
    add_port(&mut leaf, "out", Direction::Output, 0);
    add_port(&mut leaf, "in", Direction::Input, 0);
    leaf.add_assign(il::Assign::new(
        il::expr_wire("out"),
        il::Expression::unary(il::UnaryOp::Not, il::expr_wire("in")),
    ));

    let mut mid = il::Module::new("mid");
    add_port(&mut mid, "o", Direction::Output, 0);
    add_port(&mut mid, "i", Direction::Input, 0);
    mid.add_instance(il::Instance::ordered(
        "u0",
        "leaf",
        vec![il::expr_wire("o"), il::expr_wire("i")],
    ));

    let mut top = il::Module::new("top");
    add_port(&mut top, "o2", Direction::Output, 0);
    add_port(&mut top, "i2", Direction::Input, 0);
    top.add_instance(il::Instance::ordered(
        "u0",
        "mid",
        vec![il::expr_wire("o2"), il::expr_wire("i2")],
    ));

    let mut design = il::Design::new();
    design.add_module(leaf);
    design.add_module(mid);
    design.add_module(top);

    let analysis = analyzed(&design, &["leaf", "mid", "top"]);
    for (module, warnings) in analysis.all_warnings() {
        assert!(warnings.is_empty(), "{} was flagged: {:?}", module, warnings);
    }
}

#[test]
fn partially_driven_wire_is_reported_as_a_range() {
    let mut module = il::Module::new("m");
    module.declare_wire("w", 3, 0);
    module.declare_wire("o", 0, 0);
    module.add_assign(il::Assign::new(
        il::Expression::part_select("w", 3, 2),
        il::expr_const(1, 2),
    ));
    module.add_assign(il::Assign::new(
        il::expr_wire("o"),
        il::Expression::unary(il::UnaryOp::ReduceOr, il::expr_wire("w")),
    ));

    let mut design = il::Design::new();
    design.add_module(module);

    let analysis = analyzed(&design, &["m"]);
    assert!(analysis
        .warnings("m")
        .unwrap()
        .iter()
        .any(|w| w.message().contains("wire w[1:0] is used but never set")));
}

#[test]
fn width_mismatch_is_scoped_to_the_instance() {
    let mut leaf = il::Module::new("leaf");
    add_port(&mut leaf, "out", Direction::Output, 0);
    add_port(&mut leaf, "in", Direction::Input, 0);
    leaf.add_assign(il::Assign::new(il::expr_wire("out"), il::expr_wire("in")));

    let mut parent = il::Module::new("parent");
    parent.declare_wire("wide", 3, 0);
    parent.declare_wire("x", 0, 0);
    parent.add_instance(il::Instance::ordered(
        "u0",
        "leaf",
        vec![il::expr_wire("wide"), il::expr_wire("x")],
    ));

    let mut design = il::Design::new();
    design.add_module(leaf);
    design.add_module(parent);

    let analysis = analyzed(&design, &["leaf", "parent"]);

    // The mismatch is fatal for the instantiating module only.
    assert!(analysis
        .warnings("parent")
        .unwrap()
        .iter()
        .any(|w| w.kind() == WarningKind::Structural && w.is_fatal()));
    assert!(analysis
        .warnings("leaf")
        .unwrap()
        .iter()
        .all(|w| w.kind() != WarningKind::Structural));
}

#[test]
fn ignored_and_builtin_wires_are_not_reported() {
    let mut module = il::Module::new("m");
    module.declare_wire("vdd", 0, 0);
    module.declare_wire("dbg", 0, 0);
    module.declare_wire("u0.internal", 0, 0);
    module.ignore_wire("dbg");

    let mut design = il::Design::new();
    design.add_module(module);

    let analysis = analyzed(&design, &["m"]);
    assert!(analysis.warnings("m").unwrap().is_empty());
}
