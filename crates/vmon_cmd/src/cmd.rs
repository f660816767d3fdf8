use vmon_util::{MemSpace, Ops, Radix, Reg};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub(crate) fn prec(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }

    /// Apply the operator. Division by zero yields 1 to keep evaluation total.
    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Sub => lhs.wrapping_sub(rhs),
            BinOp::Mul => lhs.wrapping_mul(rhs),
            BinOp::Div => lhs.checked_div(rhs).unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    pub fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Le => lhs <= rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            LogicOp::And => lhs && rhs,
            LogicOp::Or => lhs || rhs,
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        })
    }
}

/// An arithmetic expression. Registers and labels are resolved by the caller, since the
/// parser has no access to the machine or the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<'a> {
    Num(i64),
    Reg {
        space: Option<MemSpace>,
        reg: Reg,
        /// Used to report registers which can't be read.
        col: usize,
    },
    Label {
        space: Option<MemSpace>,
        name: &'a str,
        /// Used to report undefined labels.
        col: usize,
    },
    Neg(Box<Expr<'a>>),
    Bin(BinOp, Box<Expr<'a>>, Box<Expr<'a>>),
}

/// A boolean condition as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondExpr<'a> {
    Value(Expr<'a>),
    Compare(CmpOp, Box<CondExpr<'a>>, Box<CondExpr<'a>>),
    Logical(LogicOp, Box<CondExpr<'a>>, Box<CondExpr<'a>>),
}

/// An address argument with an optional memspace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrArg<'a> {
    pub space: Option<MemSpace>,
    pub expr: Expr<'a>,
    pub col: usize,
}

/// An address range. 'end' is 'None' when only a single address is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range<'a> {
    pub start: AddrArg<'a>,
    pub end: Option<AddrArg<'a>>,
}

/// An item in a list of data bytes, fx. for 'fill' or 'hunt'.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data<'a> {
    Byte { expr: Expr<'a>, col: usize },
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind {
    Break,
    Watch,
    Trace,
}

impl CheckpointKind {
    /// The trigger operations used when none are given.
    pub fn default_ops(self) -> Ops {
        match self {
            CheckpointKind::Break => Ops::EXEC,
            CheckpointKind::Watch | CheckpointKind::Trace => Ops::LOAD | Ops::STORE,
        }
    }

    pub fn stops(self) -> bool {
        !matches!(self, CheckpointKind::Trace)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Flip,
}

/// A single parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Step {
        count: Option<Expr<'a>>,
        /// Step over subroutine calls.
        over: bool,
    },
    Return,
    Goto(Option<AddrArg<'a>>),
    Exit,
    Quit,
    Backtrace,
    Registers {
        space: Option<MemSpace>,
        assign: Vec<(Reg, Expr<'a>)>,
    },
    Cpu(Option<&'a str>),
    Bank(Option<&'a str>),

    AddLabel {
        addr: AddrArg<'a>,
        name: &'a str,
    },
    DeleteLabel {
        space: Option<MemSpace>,
        name: &'a str,
    },
    ShowLabels(Option<MemSpace>),
    ClearLabels(Option<MemSpace>),
    SaveLabels {
        space: Option<MemSpace>,
        file: String,
    },
    LoadLabels {
        space: Option<MemSpace>,
        file: String,
    },

    Assemble {
        addr: AddrArg<'a>,
        ins: Option<&'a str>,
    },
    Disassemble(Option<Range<'a>>),

    Memory {
        range: Option<Range<'a>>,
        text_only: bool,
    },
    Fill {
        range: Range<'a>,
        data: Vec<Data<'a>>,
    },
    Move {
        range: Range<'a>,
        dest: AddrArg<'a>,
    },
    Compare {
        range: Range<'a>,
        dest: AddrArg<'a>,
    },
    Hunt {
        range: Range<'a>,
        data: Vec<Data<'a>>,
    },
    Write {
        addr: AddrArg<'a>,
        data: Vec<Data<'a>>,
    },
    Load {
        file: String,
        addr: Option<AddrArg<'a>>,
        /// Load without a two byte address header.
        raw: bool,
    },
    Save {
        file: String,
        range: Range<'a>,
        raw: bool,
    },
    Verify {
        file: String,
        addr: AddrArg<'a>,
    },

    /// Add a checkpoint. Lists all checkpoints if 'range' is 'None'.
    Checkpoint {
        kind: CheckpointKind,
        ops: Ops,
        range: Option<Range<'a>>,
        cond: Option<CondExpr<'a>>,
    },
    Until(Option<AddrArg<'a>>),
    Condition {
        id: u32,
        cond: CondExpr<'a>,
    },
    CheckpointCommand {
        id: u32,
        text: String,
    },
    /// 'None' means all checkpoints.
    Enable(Option<u32>),
    Disable(Option<u32>),
    Ignore {
        id: u32,
        count: Option<Expr<'a>>,
    },
    Delete(Option<u32>),

    Radix(Option<Radix>),
    Device(Option<MemSpace>),
    SideFx(Option<Toggle>),

    Print(Expr<'a>),
    Convert(Expr<'a>),
    Help(Option<&'a str>),
    DiskCommand(&'a str),
    ChDir(String),
    Pwd,
    Dir(Option<String>),
    Record(String),
    Stop,
    Playback(String),
}
