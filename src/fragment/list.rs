//! The instruction fragment: a linear list of instructions, labels, and
//! line-number markers.

use std::collections::HashMap;
use std::fmt::Display;

use super::label::{Label, LabelFactory};
use super::op::Op;

/// One element of a [`Fragment`].
#[derive(Debug, Clone)]
pub enum Node {
    /// A real (or pseudo-) instruction.
    Instruction(Op),
    /// A position marker referenced by jumps and switches.
    LabelDef(Label),
    /// A source-line marker, used to tag synthesized instructions with a
    /// distinctive line number for diagnosis.
    Line(u32),
}

/// A short, composable run of instructions with documented net stack
/// effect. Fragments are immutable after construction; the only way to
/// build a bigger one is [`Fragment::merge`] / concatenation.
#[derive(Debug, Clone, Default)]
pub struct Fragment(Vec<Node>);

impl Fragment {
    /// The empty fragment: no instructions, no net effect.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A fragment containing a single node.
    #[must_use]
    pub(super) fn single(node: Node) -> Self {
        Self(vec![node])
    }

    /// Concatenates fragments, in order, into one.
    #[must_use]
    pub fn merge<I: IntoIterator<Item = Self>>(fragments: I) -> Self {
        let mut combined = Vec::new();
        for fragment in fragments {
            combined.extend(fragment.0);
        }
        Self(combined)
    }

    /// Appends `other` after `self`, in place.
    pub fn append(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// The number of nodes (instructions, labels, and line markers) in this
    /// fragment.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this fragment has no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the nodes, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter()
    }

    /// Every label this fragment defines (via [`Node::LabelDef`]) or
    /// references (as a jump/switch target).
    #[must_use]
    pub fn labels(&self) -> Vec<Label> {
        let mut found = Vec::new();
        for node in &self.0 {
            match node {
                Node::LabelDef(l) => found.push(*l),
                Node::Instruction(Op::Jump(l) | Op::IfICmpEq(l)) => found.push(*l),
                Node::Instruction(Op::TableSwitch { targets, default, .. }) => {
                    found.extend(targets.iter().copied());
                    found.push(*default);
                }
                Node::Instruction(_) | Node::Line(_) => {}
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Clones this fragment, minting a fresh label for every label it
    /// defines or references, via `factory`, and returns the
    /// caller-visible correspondence from old to new labels alongside the
    /// relabeled fragment.
    ///
    /// Used when an invoke instruction must be emitted twice (once inline
    /// in a save block, once again in the matching restore block) and
    /// happens to carry internal control flow of its own.
    #[must_use]
    pub fn relabel(&self, factory: &mut LabelFactory) -> (Self, HashMap<Label, Label>) {
        let correspondence: HashMap<Label, Label> = self
            .labels()
            .into_iter()
            .map(|old| (old, factory.fresh()))
            .collect();
        let remap = |l: &Label| *correspondence.get(l).unwrap_or(l);
        let nodes = self
            .0
            .iter()
            .map(|node| match node {
                Node::LabelDef(l) => Node::LabelDef(remap(l)),
                Node::Instruction(Op::Jump(l)) => Node::Instruction(Op::Jump(remap(l))),
                Node::Instruction(Op::IfICmpEq(l)) => Node::Instruction(Op::IfICmpEq(remap(l))),
                Node::Instruction(Op::TableSwitch {
                    low,
                    targets,
                    default,
                }) => Node::Instruction(Op::TableSwitch {
                    low: *low,
                    targets: targets.iter().map(remap).collect(),
                    default: remap(default),
                }),
                other => other.clone(),
            })
            .collect();
        (Self(nodes), correspondence)
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match node {
                Node::Instruction(op) => write!(f, "  {op:?}")?,
                Node::LabelDef(l) => write!(f, "{l}:")?,
                Node::Line(n) => write!(f, "  ; line {n}")?,
            }
        }
        Ok(())
    }
}

impl IntoIterator for Fragment {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
