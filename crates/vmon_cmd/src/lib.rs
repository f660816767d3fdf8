//! The command language of the monitor. A line of input is turned into a sequence of
//! ['Command'], which is executed by the monitor itself. Nothing in here has access to the
//! machine, so registers and labels are left unresolved.

mod cmd;
mod lex;
mod parse;
mod table;

pub use cmd::{
    AddrArg, BinOp, CheckpointKind, CmpOp, Command, CondExpr, Data, Expr, LogicOp, Range, Toggle,
};
pub use parse::{parse_line, Parser};
pub use table::{find_command, CommandInfo, COMMANDS};

use std::fmt;

/// The kinds of error a command line can have. The message is printed after "ERROR -- ".
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    #[error("Wrong syntax")]
    IllegalInput,
    #[error("Bad command")]
    BadCommand,
    #[error("Bad first address in range")]
    RangeBadStart,
    #[error("Bad second address in range")]
    RangeBadEnd,
    #[error("Checkpoint number expected")]
    ExpectCheckNum,
    #[error("Unexpected token")]
    ExpectEndCmd,
    #[error("')' expected")]
    MissingCloseParen,
    #[error("Compare operation missing an operand")]
    IncompleteCompareOp,
    #[error("Expecting a filename")]
    ExpectFilename,
    #[error("Address too large")]
    AddressTooLarge,
    #[error("Immediate argument too large")]
    ImmediateTooLarge,
    #[error("Expecting a string")]
    ExpectString,
    #[error("Found an undefined label")]
    UndefinedLabel,
    #[error("Expecting a device number")]
    ExpectDeviceNum,
    #[error("Expecting an address")]
    ExpectAddress,
    #[error("Invalid register")]
    InvalidRegister,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    /// The column in the line where the error was found.
    pub col: usize,
}

impl Error {
    pub fn new(code: ErrorCode, col: usize) -> Self {
        Self { code, col }
    }

    /// Write the error the way the monitor reports it, with the offending line and a caret
    /// pointing at the column.
    pub fn report(&self, line: &str) -> String {
        format!("ERROR -- {}:\n  {}\n  {:>width$}", self.code, line, "^", width = self.col + 1)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.col, self.code)
    }
}

#[test]
fn report_caret() {
    let err = Error::new(ErrorCode::BadCommand, 3);
    assert_eq!(err.report("m; frob"), "ERROR -- Bad command:\n  m; frob\n     ^");
}
