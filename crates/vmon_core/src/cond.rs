use crate::host::Host;

use vmon_cmd::{CmpOp, LogicOp};
use vmon_util::{MemSpace, Reg};

use std::fmt;

/// Condition attached to a checkpoint. Registers are read each time the condition is
/// evaluated, everything else is folded into constants when the condition is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondNode {
    Const(i64),
    Reg(MemSpace, Reg),
    Compare(CmpOp, Box<CondNode>, Box<CondNode>),
    Logical(LogicOp, Box<CondNode>, Box<CondNode>),
}

impl CondNode {
    /// Evaluate the node. Comparisons and logical operations yield 0 or 1. Returns 'None' if a
    /// register can't be read.
    pub fn evaluate(&self, host: &dyn Host) -> Option<i64> {
        match self {
            CondNode::Const(val) => Some(*val),
            CondNode::Reg(space, reg) => host.register(*space, *reg).map(i64::from),
            CondNode::Compare(op, lhs, rhs) => {
                let (lhs, rhs) = (lhs.evaluate(host)?, rhs.evaluate(host)?);
                Some(op.apply(lhs, rhs) as i64)
            }
            CondNode::Logical(op, lhs, rhs) => {
                let (lhs, rhs) = (lhs.evaluate(host)?, rhs.evaluate(host)?);
                Some(op.apply(lhs != 0, rhs != 0) as i64)
            }
        }
    }

    /// If the condition holds. A condition which can't be evaluated doesn't hold.
    pub fn holds(&self, host: &dyn Host) -> bool {
        matches!(self.evaluate(host), Some(val) if val != 0)
    }

    fn is_leaf(&self) -> bool {
        matches!(self, CondNode::Const(..) | CondNode::Reg(..))
    }
}

/// Write an operand, with parenthesis if it isn't a leaf.
struct Operand<'a>(&'a CondNode);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_leaf() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

/// The output can be parsed again as a condition.
impl fmt::Display for CondNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            // The magnitude of the smallest value doesn't fit in a literal.
            CondNode::Const(i64::MIN) => write!(f, "(-${:x} - 1)", i64::MAX),
            CondNode::Const(val) if *val < 0 => write!(f, "-${:x}", val.unsigned_abs()),
            CondNode::Const(val) => write!(f, "${val:x}"),
            CondNode::Reg(space, reg) => write!(f, "{space}:{reg}"),
            CondNode::Compare(op, lhs, rhs) => {
                write!(f, "{} {op} {}", Operand(lhs), Operand(rhs))
            }
            CondNode::Logical(op, lhs, rhs) => {
                write!(f, "{} {op} {}", Operand(lhs), Operand(rhs))
            }
        }
    }
}
