//! Pairwise summation tree combining branch outputs.

use barrido_core::{Error, Result, Signal, merge_lengths};

/// Node of the summation tree over branch outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SumNode {
    /// Output of the branch at this index.
    Branch(usize),
    /// Sum of two nodes; the shorter operand is zero-padded.
    Adder {
        /// Left operand.
        value1: Box<SumNode>,
        /// Right operand.
        value2: Box<SumNode>,
    },
}

impl SumNode {
    /// Right-folded chain over `branches` outputs.
    ///
    /// The last two branches are summed first, then every preceding branch is
    /// added to the running total:
    ///
    /// ```text
    /// b0 + (b1 + (… + (b[n-2] + b[n-1])))
    /// ```
    ///
    /// A single branch is its own root without an adder; zero branches have no tree.
    pub fn right_fold(branches: usize) -> Option<Self> {
        match branches {
            0 => None,
            1 => Some(SumNode::Branch(0)),
            n => {
                let last = SumNode::adder(SumNode::Branch(n - 2), SumNode::Branch(n - 1));
                Some(
                    (0..n - 2)
                        .rev()
                        .fold(last, |running, i| SumNode::adder(SumNode::Branch(i), running)),
                )
            }
        }
    }

    fn adder(value1: SumNode, value2: SumNode) -> Self {
        SumNode::Adder {
            value1: Box::new(value1),
            value2: Box::new(value2),
        }
    }

    /// Number of adders in the tree.
    pub fn adder_count(&self) -> usize {
        match self {
            SumNode::Branch(_) => 0,
            SumNode::Adder { value1, value2 } => 1 + value1.adder_count() + value2.adder_count(),
        }
    }

    /// Evaluate the tree over the branch outputs.
    pub fn evaluate(&self, outputs: &[&Signal]) -> Result<Signal> {
        match self {
            SumNode::Branch(i) => outputs.get(*i).map(|s| (*s).clone()).ok_or_else(|| {
                Error::state(format!("summation refers to branch {i} of {}", outputs.len()))
            }),
            SumNode::Adder { value1, value2 } => {
                let (a, b) = merge_lengths(&value1.evaluate(outputs)?, &value2.evaluate(outputs)?);
                a.add(&b)
            }
        }
    }
}
