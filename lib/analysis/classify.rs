//! The classifier/reporter: shrinks final databases, filters ignored and
//! hierarchical wires, and turns every remaining bit's flags into a
//! diagnostic category.

use crate::analysis::{UseSet, UseSetAnalysis, Warning};
use crate::il;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire names never reported, regardless of per-module ignore lists.
const BUILTIN_IGNORE: &[&str] = &["vdd", "vss"];

/// The diagnostic category of one bit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum UseClass {
    Fine,
    /// A non-port bit neither used nor set anywhere.
    Spurious,
    /// Set but never used.
    Unused,
    /// Used but never set.
    Unset,
    /// A port whose declared direction promises activity that never occurs
    /// on either side.
    UnnecessaryPort,
    /// A port read somewhere but driven nowhere.
    UnsetPort,
    /// A port driven from both the submodule and the instantiating side.
    Trainwreck,
}

impl fmt::Display for UseClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UseClass::Fine => write!(f, "fine"),
            UseClass::Spurious => write!(f, "spurious"),
            UseClass::Unused => write!(f, "unused"),
            UseClass::Unset => write!(f, "unset"),
            UseClass::UnnecessaryPort => write!(f, "unnecessary port"),
            UseClass::UnsetPort => write!(f, "unset port"),
            UseClass::Trainwreck => write!(f, "trainwreck"),
        }
    }
}

/// Classify a non-port bit from its local flags, with a "looks used/set
/// from above" annotation when the above flags disagree with the local
/// verdict.
fn classify_bit(flags: UseSet) -> (UseClass, String) {
    let used = flags.contains(UseSet::TRULY_USED);
    let set = flags.contains(UseSet::TRULY_SET);
    match (used, set) {
        (true, true) => (UseClass::Fine, String::new()),
        (false, false) => (UseClass::Spurious, "is neither used nor set".to_string()),
        (false, true) => {
            let mut description = "is set but never used".to_string();
            if flags.contains(UseSet::USED_ABOVE) {
                description.push_str(" (looks used from above)");
            }
            (UseClass::Unused, description)
        }
        (true, false) => {
            let mut description = "is used but never set".to_string();
            if flags.contains(UseSet::SET_ABOVE) {
                description.push_str(" (looks set from above)");
            }
            (UseClass::Unset, description)
        }
    }
}

/// Classify a port bit from its declared direction, its local flags, and
/// the flags its instantiators contributed.
///
/// An input with no local use is flagged unless it is used from above; an
/// output with no local set is flagged unless it is set from above. An
/// input driven both internally and from above, or an output consumed from
/// above while driven nowhere, is a trainwreck.
fn classify_port_bit(direction: il::Direction, flags: UseSet) -> (UseClass, String) {
    let used = flags.contains(UseSet::TRULY_USED);
    let set = flags.contains(UseSet::TRULY_SET);
    let used_above = flags.contains(UseSet::USED_ABOVE);
    let set_above = flags.contains(UseSet::SET_ABOVE);

    match direction {
        il::Direction::Input => {
            if set && set_above {
                (
                    UseClass::Trainwreck,
                    "is driven both internally and from above".to_string(),
                )
            } else if used {
                if set_above {
                    (UseClass::Fine, String::new())
                } else {
                    (
                        UseClass::UnsetPort,
                        "is read but never driven from above".to_string(),
                    )
                }
            } else if used_above {
                // The input only feeds through; its net is consumed above.
                (UseClass::Fine, String::new())
            } else {
                (UseClass::UnnecessaryPort, "is never used".to_string())
            }
        }
        il::Direction::Output => {
            // A driven output connected above always echoes back as
            // set-above, so set-above alone cannot indict a driven output.
            if set || set_above {
                (UseClass::Fine, String::new())
            } else if used_above {
                (
                    UseClass::Trainwreck,
                    "is consumed from above but never driven".to_string(),
                )
            } else {
                (UseClass::UnnecessaryPort, "is never driven".to_string())
            }
        }
        il::Direction::Inout => {
            let used_anywhere = used || used_above;
            let set_anywhere = set || set_above;
            match (used_anywhere, set_anywhere) {
                (true, true) => (UseClass::Fine, String::new()),
                (true, false) => (
                    UseClass::UnsetPort,
                    "is never driven on either side".to_string(),
                ),
                (false, true) => (
                    UseClass::UnnecessaryPort,
                    "is never used on either side".to_string(),
                ),
                (false, false) => (
                    UseClass::UnnecessaryPort,
                    "is neither used nor set on either side".to_string(),
                ),
            }
        }
    }
}

fn render_range(wire: &str, bits: &[il::Bit], first: usize, last: usize) -> String {
    if last - first == bits.len() {
        wire.to_string()
    } else if last - first == 1 {
        bits[first].identifier()
    } else {
        format!(
            "{}[{}:{}]",
            wire,
            bits[first].index(),
            bits[last - 1].index()
        )
    }
}

/// Shrink every database and append use/set diagnostics to each module's
/// warnings. Adjacent bits of one wire with the same verdict are reported
/// as a single range.
pub(crate) fn classify(analysis: &mut UseSetAnalysis, design: &il::Design) {
    let order = analysis.order.clone();

    for name in &order {
        if let Some(database) = analysis.databases.database_mut(name) {
            database.shrink();
        }
    }

    for name in &order {
        let module = match design.module(name) {
            Some(module) => module,
            None => continue,
        };
        let database = match analysis.databases.database(name) {
            Some(database) => database,
            None => continue,
        };

        let mut diagnostics = Vec::new();
        for wire in module.wire_alist().wires() {
            if BUILTIN_IGNORE.contains(&wire) || module.ignored_wires().contains(wire) {
                continue;
            }
            // Flattened hierarchical references are unanalyzable: their
            // activity belongs to another module's wires. Never flag them.
            if wire.contains('.') || wire.contains('/') {
                continue;
            }

            let bits = match module.wire_alist().bits(wire) {
                Some(bits) => bits,
                None => continue,
            };
            let direction = module.port_direction(wire);

            let verdicts = bits
                .iter()
                .map(|bit| {
                    let flags = database.query(bit);
                    match direction {
                        Some(direction) => classify_port_bit(direction, flags),
                        None => classify_bit(flags),
                    }
                })
                .collect::<Vec<(UseClass, String)>>();

            let mut first = 0;
            while first < bits.len() {
                let mut last = first + 1;
                while last < bits.len() && verdicts[last] == verdicts[first] {
                    last += 1;
                }
                let (class, description) = &verdicts[first];
                if *class != UseClass::Fine {
                    let range = render_range(wire, bits, first, last);
                    let subject = match direction {
                        Some(direction) => format!("{} port {}", direction, range),
                        None => format!("wire {}", range),
                    };
                    let message = format!("{} {}", subject, description);
                    let warning = if *class == UseClass::Trainwreck {
                        Warning::trainwreck(message)
                    } else {
                        Warning::use_set(message)
                    };
                    diagnostics.push(warning);
                }
                first = last;
            }
        }

        analysis
            .warnings
            .entry(name.clone())
            .or_default()
            .extend(diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_port_table() {
        assert_eq!(classify_bit(UseSet::empty()).0, UseClass::Spurious);
        assert_eq!(classify_bit(UseSet::TRULY_SET).0, UseClass::Unused);
        assert_eq!(classify_bit(UseSet::TRULY_USED).0, UseClass::Unset);
        assert_eq!(
            classify_bit(UseSet::TRULY_USED | UseSet::TRULY_SET).0,
            UseClass::Fine
        );
    }

    #[test]
    fn looks_used_annotation_is_informational() {
        let (class, description) = classify_bit(UseSet::TRULY_SET | UseSet::USED_ABOVE);
        assert_eq!(class, UseClass::Unused);
        assert!(description.contains("looks used from above"));
    }

    #[test]
    fn input_table() {
        use il::Direction::Input;

        // Used locally and driven from above: healthy.
        assert_eq!(
            classify_port_bit(Input, UseSet::TRULY_USED | UseSet::SET_ABOVE).0,
            UseClass::Fine
        );
        // Used locally but never driven from above: floating input.
        assert_eq!(
            classify_port_bit(Input, UseSet::TRULY_USED).0,
            UseClass::UnsetPort
        );
        // Never used anywhere.
        assert_eq!(
            classify_port_bit(Input, UseSet::FALSELY_USED | UseSet::SET_ABOVE).0,
            UseClass::UnnecessaryPort
        );
        // Feeds through to a consumer above.
        assert_eq!(
            classify_port_bit(Input, UseSet::FALSELY_USED | UseSet::USED_ABOVE).0,
            UseClass::Fine
        );
        // Driven internally while also driven from above.
        assert_eq!(
            classify_port_bit(Input, UseSet::TRULY_SET | UseSet::SET_ABOVE).0,
            UseClass::Trainwreck
        );
    }

    #[test]
    fn output_table() {
        use il::Direction::Output;

        assert_eq!(
            classify_port_bit(Output, UseSet::TRULY_SET | UseSet::USED_ABOVE).0,
            UseClass::Fine
        );
        // Undriven but fed from above: a conduit.
        assert_eq!(
            classify_port_bit(Output, UseSet::FALSELY_SET | UseSet::SET_ABOVE).0,
            UseClass::Fine
        );
        // Consumed above but driven nowhere.
        assert_eq!(
            classify_port_bit(Output, UseSet::FALSELY_SET | UseSet::USED_ABOVE).0,
            UseClass::Trainwreck
        );
        // Dead output.
        assert_eq!(
            classify_port_bit(Output, UseSet::FALSELY_SET).0,
            UseClass::UnnecessaryPort
        );
    }

    #[test]
    fn inout_table() {
        use il::Direction::Inout;

        assert_eq!(
            classify_port_bit(Inout, UseSet::TRULY_USED | UseSet::SET_ABOVE).0,
            UseClass::Fine
        );
        assert_eq!(
            classify_port_bit(Inout, UseSet::TRULY_USED).0,
            UseClass::UnsetPort
        );
        assert_eq!(
            classify_port_bit(Inout, UseSet::TRULY_SET).0,
            UseClass::UnnecessaryPort
        );
    }

    #[test]
    fn range_rendering_groups_adjacent_bits() {
        let bits = vec![
            il::Bit::new("w", 3),
            il::Bit::new("w", 2),
            il::Bit::new("w", 1),
            il::Bit::new("w", 0),
        ];
        assert_eq!(render_range("w", &bits, 0, 4), "w");
        assert_eq!(render_range("w", &bits, 1, 2), "w[2]");
        assert_eq!(render_range("w", &bits, 1, 4), "w[2:0]");
    }
}
