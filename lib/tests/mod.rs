mod scenarios;

use crate::analysis;
use crate::il;

#[test]
fn database_json_export() {
    let mut module = il::Module::new("m");
    module.add_port(il::Port::new("out", il::Direction::Output));
    module.add_port_declaration(il::PortDeclaration::new("out", il::Direction::Output));
    module.declare_wire("out", 0, 0);
    module.add_assign(il::Assign::new(il::expr_wire("out"), il::expr_const(1, 1)));

    let mut design = il::Design::new();
    design.add_module(module);

    let result = analysis::use_set_analysis(&design, &["m".to_string()]).unwrap();
    let json = result.databases().to_json().unwrap();
    assert!(json.contains("\"m\""));
    assert!(json.contains("\"out[0]\""));
}

#[test]
fn empty_design_is_ok() {
    let design = il::Design::new();
    let result = analysis::use_set_analysis(&design, &[]).unwrap();
    assert!(result.order().is_empty());
}
