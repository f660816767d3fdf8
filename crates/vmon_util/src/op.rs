use serde::Serialize;

use std::fmt;

/// The kind of access which may trigger a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Exec,
    Load,
    Store,
}

impl Op {
    pub const ALL: [Op; 3] = [Op::Exec, Op::Load, Op::Store];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Op::Exec => "exec",
            Op::Load => "load",
            Op::Store => "store",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|op| op.name().eq_ignore_ascii_case(name)).copied()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of 'Op'. The bits match the operation byte of the binary remote protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Ops(pub u8);

impl Ops {
    pub const NONE: Ops = Ops(0);
    pub const LOAD: Ops = Ops(1 << 0);
    pub const STORE: Ops = Ops(1 << 1);
    pub const EXEC: Ops = Ops(1 << 2);

    pub fn contains(self, op: Op) -> bool {
        self.0 & Ops::from(op).0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn with(self, op: Op) -> Self {
        Ops(self.0 | Ops::from(op).0)
    }

    pub fn iter(self) -> impl Iterator<Item = Op> {
        Op::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl From<Op> for Ops {
    fn from(op: Op) -> Self {
        match op {
            Op::Load => Ops::LOAD,
            Op::Store => Ops::STORE,
            Op::Exec => Ops::EXEC,
        }
    }
}

impl std::ops::BitOr for Ops {
    type Output = Ops;

    fn bitor(self, rhs: Ops) -> Ops {
        Ops(self.0 | rhs.0)
    }
}

#[test]
fn op_bits() {
    let ops = Ops::LOAD | Ops::STORE;
    assert!(ops.contains(Op::Load));
    assert!(!ops.contains(Op::Exec));
    assert_eq!(ops.iter().collect::<Vec<_>>(), vec![Op::Load, Op::Store]);
    assert_eq!(Ops::NONE.with(Op::Exec), Ops::EXEC);
    assert_eq!((Ops::LOAD | Ops::EXEC).0, 0x05);
}
