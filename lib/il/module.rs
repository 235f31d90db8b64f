use crate::il::{
    Assign, Bit, Gate, Instance, NetDeclaration, NetKind, Port, PortDeclaration, Procedural,
    Statement, WireAlist,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One module of a hardware design.
///
/// A module owns its wire alist (built by the declaration-expansion
/// collaborator) together with the constructs the analysis walks: port and
/// net declarations, continuous assignments, gate instances, submodule
/// instances, and procedural blocks.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Module {
    name: String,
    ports: Vec<Port>,
    port_declarations: Vec<PortDeclaration>,
    net_declarations: Vec<NetDeclaration>,
    assigns: Vec<Assign>,
    gates: Vec<Gate>,
    instances: Vec<Instance>,
    procedurals: Vec<Procedural>,
    wire_alist: WireAlist,
    ignore: BTreeSet<String>,
}

impl Module {
    pub fn new<S>(name: S) -> Module
    where
        S: Into<String>,
    {
        Module {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port_declarations(&self) -> &[PortDeclaration] {
        &self.port_declarations
    }

    pub fn net_declarations(&self) -> &[NetDeclaration] {
        &self.net_declarations
    }

    pub fn assigns(&self) -> &[Assign] {
        &self.assigns
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn procedurals(&self) -> &[Procedural] {
        &self.procedurals
    }

    pub fn wire_alist(&self) -> &WireAlist {
        &self.wire_alist
    }

    /// Wire names excluded from use/set reporting for this module.
    pub fn ignored_wires(&self) -> &BTreeSet<String> {
        &self.ignore
    }

    pub fn add_port(&mut self, port: Port) {
        self.ports.push(port);
    }

    pub fn add_port_declaration(&mut self, declaration: PortDeclaration) {
        self.port_declarations.push(declaration);
    }

    pub fn add_net_declaration(&mut self, declaration: NetDeclaration) {
        self.net_declarations.push(declaration);
    }

    /// Declare a wire over `[msb:lsb]`, expanding it into the wire alist.
    pub fn declare_wire<S>(&mut self, name: S, msb: usize, lsb: usize)
    where
        S: Into<String>,
    {
        let name = name.into();
        self.net_declarations
            .push(NetDeclaration::new(name.clone(), NetKind::Wire));
        self.wire_alist.declare(name, msb, lsb);
    }

    /// Declare a net of the given kind over `[msb:lsb]`.
    pub fn declare_net<S>(&mut self, name: S, kind: NetKind, msb: usize, lsb: usize)
    where
        S: Into<String>,
    {
        let name = name.into();
        self.net_declarations
            .push(NetDeclaration::new(name.clone(), kind));
        self.wire_alist.declare(name, msb, lsb);
    }

    pub fn add_assign(&mut self, assign: Assign) {
        self.assigns.push(assign);
    }

    pub fn add_gate(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn add_always(&mut self, statement: Statement) {
        self.procedurals.push(Procedural::Always(statement));
    }

    pub fn add_initial(&mut self, statement: Statement) {
        self.procedurals.push(Procedural::Initial(statement));
    }

    pub fn ignore_wire<S>(&mut self, name: S)
    where
        S: Into<String>,
    {
        self.ignore.insert(name.into());
    }

    /// The declared direction of a wire, when the wire is a port.
    pub fn port_direction(&self, wire: &str) -> Option<crate::il::Direction> {
        self.port_declarations
            .iter()
            .find(|declaration| declaration.name() == wire)
            .map(|declaration| declaration.direction())
            .or_else(|| {
                self.ports
                    .iter()
                    .find(|port| port.name() == wire)
                    .map(|port| port.direction())
            })
    }

    /// The ordered list of formal port-bit groups: one msb-first group per
    /// entry of the port list.
    ///
    /// Returns `None` when some port's wire has no binding in the wire
    /// alist; callers treat that as a structural failure for this module.
    pub fn port_pattern(&self) -> Option<Vec<Vec<Bit>>> {
        let mut pattern = Vec::with_capacity(self.ports.len());
        for port in &self.ports {
            pattern.push(self.wire_alist.bits(port.name())?.to_vec());
        }
        Some(pattern)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "module {}", self.name)
    }
}

#[test]
fn port_pattern_follows_port_order() {
    use crate::il::Direction;

    let mut module = Module::new("m");
    module.add_port(Port::new("b", Direction::Output));
    module.add_port(Port::new("a", Direction::Input));
    module.declare_wire("a", 1, 0);
    module.declare_wire("b", 0, 0);

    let pattern = module.port_pattern().unwrap();
    assert_eq!(pattern.len(), 2);
    assert_eq!(pattern[0], vec![Bit::new("b", 0)]);
    assert_eq!(pattern[1], vec![Bit::new("a", 1), Bit::new("a", 0)]);
}

#[test]
fn port_pattern_requires_declared_ports() {
    use crate::il::Direction;

    let mut module = Module::new("m");
    module.add_port(Port::new("a", Direction::Input));
    assert!(module.port_pattern().is_none());
}
