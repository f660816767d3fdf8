use super::Monitor;
use crate::cond::CondNode;
use crate::host::Host;

use vmon_cmd::{AddrArg, CondExpr, Data, Error, ErrorCode, Expr, Range};
use vmon_util::{Addr, MemSpace};

impl Monitor {
    /// Evaluate an expression. Registers and labels without a memspace prefix are looked up in
    /// 'space'.
    pub(crate) fn eval(&self, host: &dyn Host, expr: &Expr, space: MemSpace) -> Result<i64, Error> {
        match expr {
            Expr::Num(val) => Ok(*val),
            Expr::Reg { space: reg_space, reg, col } => host
                .register(reg_space.unwrap_or(space), *reg)
                .map(i64::from)
                .ok_or(Error::new(ErrorCode::InvalidRegister, *col)),
            Expr::Label { space: label_space, name, col } => self.symbols
                .get(label_space.unwrap_or(space), name)
                .map(i64::from)
                .ok_or(Error::new(ErrorCode::UndefinedLabel, *col)),
            Expr::Neg(expr) => Ok(self.eval(host, expr, space)?.wrapping_neg()),
            Expr::Bin(op, lhs, rhs) => {
                let lhs = self.eval(host, lhs, space)?;
                let rhs = self.eval(host, rhs, space)?;
                Ok(op.apply(lhs, rhs))
            }
        }
    }

    /// Evaluate an address argument, in 'space' unless it has a memspace prefix.
    pub(crate) fn addr_in(
        &self,
        host: &dyn Host,
        arg: &AddrArg,
        space: MemSpace,
    ) -> Result<Addr, Error> {
        let space = arg.space.unwrap_or(space);
        let val = self.eval(host, &arg.expr, space)?;
        u16::try_from(val)
            .map(|loc| Addr::new(space, loc))
            .map_err(|_| Error::new(ErrorCode::AddressTooLarge, arg.col))
    }

    pub(crate) fn addr(&self, host: &dyn Host, arg: &AddrArg) -> Result<Addr, Error> {
        self.addr_in(host, arg, self.device)
    }

    /// Evaluate a range. The end defaults to the memspace of the start, and must not be below
    /// the start.
    pub(crate) fn range(
        &self,
        host: &dyn Host,
        range: &Range,
    ) -> Result<(Addr, Option<Addr>), Error> {
        let start = self.addr(host, &range.start)?;
        let Some(end_arg) = &range.end else {
            return Ok((start, None));
        };
        let end = self.addr_in(host, end_arg, start.space)?;
        if end.space != start.space || end.loc < start.loc {
            return Err(Error::new(ErrorCode::RangeBadEnd, end_arg.col));
        }
        Ok((start, Some(end)))
    }

    /// Turn a parsed condition into a condition tree. Plain register operands stay registers
    /// and are read when the condition is evaluated, any other operand is evaluated now.
    /// Registers can't be used in arithmetic, since the tree has no node to read them later.
    pub(crate) fn cond_node(
        &self,
        host: &dyn Host,
        cond: &CondExpr,
        space: MemSpace,
    ) -> Result<CondNode, Error> {
        Ok(match cond {
            CondExpr::Value(Expr::Reg { space: reg_space, reg, .. }) => {
                CondNode::Reg(reg_space.unwrap_or(space), *reg)
            }
            CondExpr::Value(expr) => {
                if let Some(col) = register_col(expr) {
                    return Err(Error::new(ErrorCode::InvalidRegister, col));
                }
                CondNode::Const(self.eval(host, expr, space)?)
            }
            CondExpr::Compare(op, lhs, rhs) => CondNode::Compare(
                *op,
                Box::new(self.cond_node(host, lhs, space)?),
                Box::new(self.cond_node(host, rhs, space)?),
            ),
            CondExpr::Logical(op, lhs, rhs) => CondNode::Logical(
                *op,
                Box::new(self.cond_node(host, lhs, space)?),
                Box::new(self.cond_node(host, rhs, space)?),
            ),
        })
    }

    /// Evaluate a data list to bytes. Every expression must fit in a byte.
    pub(crate) fn bytes(
        &self,
        host: &dyn Host,
        data: &[Data],
        space: MemSpace,
    ) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::new();
        for item in data {
            match item {
                Data::Byte { expr, col } => {
                    let val = self.eval(host, expr, space)?;
                    let byte = u8::try_from(val)
                        .map_err(|_| Error::new(ErrorCode::ImmediateTooLarge, *col))?;
                    bytes.push(byte);
                }
                Data::Str(string) => bytes.extend_from_slice(string.as_bytes()),
            }
        }
        Ok(bytes)
    }
}

/// The column of the first register in an expression.
fn register_col(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Reg { col, .. } => Some(*col),
        Expr::Num(..) | Expr::Label { .. } => None,
        Expr::Neg(expr) => register_col(expr),
        Expr::Bin(_, lhs, rhs) => register_col(lhs).or_else(|| register_col(rhs)),
    }
}
