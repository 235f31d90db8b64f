use crate::il::Module;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A hierarchical hardware design: a collection of modules keyed by name.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Design {
    modules: BTreeMap<String, Module>,
}

impl Design {
    pub fn new() -> Design {
        Design {
            modules: BTreeMap::new(),
        }
    }

    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The names of modules instantiated nowhere in the design. These are
    /// the design's roots; their ports face the outside world.
    pub fn top_modules(&self) -> BTreeSet<&str> {
        let mut tops = self
            .modules
            .keys()
            .map(|name| name.as_str())
            .collect::<BTreeSet<&str>>();
        for module in self.modules.values() {
            for instance in module.instances() {
                tops.remove(instance.module());
            }
        }
        tops
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for name in self.modules.keys() {
            writeln!(f, "{}", name)?;
        }
        Ok(())
    }
}

#[test]
fn top_modules_are_uninstantiated() {
    use crate::il::{Expression, Instance};

    let mut leaf = Module::new("leaf");
    leaf.declare_wire("a", 0, 0);

    let mut top = Module::new("top");
    top.declare_wire("x", 0, 0);
    top.add_instance(Instance::ordered("u0", "leaf", vec![Expression::wire("x")]));

    let mut design = Design::new();
    design.add_module(leaf);
    design.add_module(top);

    let tops = design.top_modules();
    assert!(tops.contains("top"));
    assert!(!tops.contains("leaf"));
}
