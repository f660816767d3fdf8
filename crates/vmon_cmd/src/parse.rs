use crate::{Error, ErrorCode};
use crate::cmd::{
    AddrArg, BinOp, CheckpointKind, CmpOp, Command, CondExpr, Data, Expr, LogicOp, Range, Toggle,
};
use crate::lex::{Lexer, Tok, TokTy};
use crate::table::find_command;

use vmon_util::{MemSpace, Op, Ops, Radix, Reg};

/// Parser for a single line of monitor input. A line may hold several commands separated by
/// ';', which are returned one at a time by 'next_command'. This allows the caller to execute
/// each command before the next is parsed, so that fx. a 'radix' command affects the rest of
/// the line.
pub struct Parser<'a> {
    line: &'a str,
    lexer: Lexer<'a>,
    peeked: Option<Tok<'a>>,
    /// Radix used for digits without prefix.
    pub radix: Radix,
}

fn err(code: ErrorCode, col: usize) -> Error {
    Error::new(code, col)
}

impl<'a> Parser<'a> {
    pub fn new(line: &'a str, radix: Radix) -> Self {
        Self {
            line,
            lexer: Lexer::new(line),
            peeked: None,
            radix,
        }
    }

    fn peek(&mut self) -> Result<&Tok<'a>, Error> {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.lexer.next_tok()?,
        };
        Ok(self.peeked.insert(tok))
    }

    fn next(&mut self) -> Result<Tok<'a>, Error> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.lexer.next_tok(),
        }
    }

    /// Consume the next token if 'pred' returns true for it.
    fn eat_if(&mut self, pred: impl FnOnce(&TokTy<'a>) -> bool) -> Result<bool, Error> {
        if pred(&self.peek()?.ty) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn eat_comma(&mut self) -> Result<bool, Error> {
        self.eat_if(|ty| matches!(ty, TokTy::Comma))
    }

    fn at_end(&mut self) -> Result<bool, Error> {
        Ok(matches!(self.peek()?.ty, TokTy::Eof | TokTy::Semicolon))
    }

    fn peek_word(&mut self, word: &str) -> Result<bool, Error> {
        Ok(matches!(self.peek()?.ty, TokTy::Word(w) if w.eq_ignore_ascii_case(word)))
    }

    /// If the next token may start an expression.
    fn at_expr(&mut self) -> Result<bool, Error> {
        Ok(match self.peek()?.ty {
            TokTy::Word(w) => !w.eq_ignore_ascii_case("if"),
            TokTy::Num(..)
            | TokTy::Digits(..)
            | TokTy::Label(..)
            | TokTy::Space(..)
            | TokTy::LParan
            | TokTy::Minus => true,
            _ => false,
        })
    }

    /// Convert digits using the current radix.
    fn digits(&self, digits: &str, col: usize) -> Result<i64, Error> {
        self.radix
            .parse(digits)
            .ok_or_else(|| err(ErrorCode::IllegalInput, col))
    }

    /// Resolve a bare word. Register names take precedence over hex numbers.
    fn word(&self, space: Option<MemSpace>, word: &str, col: usize) -> Result<Expr<'a>, Error> {
        if let Some(reg) = Reg::from_name(word) {
            return Ok(Expr::Reg { space, reg, col });
        }
        if self.radix == Radix::Hex && word.chars().all(|c| c.is_ascii_hexdigit()) {
            if let Some(num) = Radix::Hex.parse(word) {
                return Ok(Expr::Num(num));
            }
        }
        Err(err(ErrorCode::InvalidRegister, col))
    }

    /// Parse the operand following a memspace prefix.
    fn space_operand(&mut self, space: MemSpace) -> Result<Expr<'a>, Error> {
        let tok = self.next()?;
        match tok.ty {
            TokTy::Word(word) => self.word(Some(space), word, tok.col),
            TokTy::Label(name) => Ok(Expr::Label { space: Some(space), name, col: tok.col }),
            TokTy::Num(num) => Ok(Expr::Num(num)),
            TokTy::Digits(digits) => self.digits(digits, tok.col).map(Expr::Num),
            TokTy::LParan => {
                let expr = self.expr()?;
                self.close_paran()?;
                Ok(expr)
            }
            _ => Err(err(ErrorCode::IllegalInput, tok.col)),
        }
    }

    fn primary(&mut self) -> Result<Expr<'a>, Error> {
        let tok = self.next()?;
        match tok.ty {
            TokTy::Num(num) => Ok(Expr::Num(num)),
            TokTy::Digits(digits) => self.digits(digits, tok.col).map(Expr::Num),
            TokTy::Word(word) => self.word(None, word, tok.col),
            TokTy::Label(name) => Ok(Expr::Label { space: None, name, col: tok.col }),
            TokTy::Space(space) => self.space_operand(space),
            TokTy::LParan => {
                let expr = self.expr()?;
                self.close_paran()?;
                Ok(expr)
            }
            TokTy::Minus => Ok(Expr::Neg(Box::new(self.primary()?))),
            _ => Err(err(ErrorCode::IllegalInput, tok.col)),
        }
    }

    fn close_paran(&mut self) -> Result<(), Error> {
        let tok = self.next()?;
        match tok.ty {
            TokTy::RParan => Ok(()),
            _ => Err(err(ErrorCode::MissingCloseParen, tok.col)),
        }
    }

    fn bin_op(&mut self) -> Result<Option<BinOp>, Error> {
        Ok(match self.peek()?.ty {
            TokTy::Plus => Some(BinOp::Add),
            TokTy::Minus => Some(BinOp::Sub),
            TokTy::Star => Some(BinOp::Mul),
            TokTy::Slash => Some(BinOp::Div),
            _ => None,
        })
    }

    /// Continue parsing binary operators with 'lhs' as the left operand.
    fn expr_rest(&mut self, mut lhs: Expr<'a>, min_prec: u8) -> Result<Expr<'a>, Error> {
        while let Some(op) = self.bin_op()? {
            if op.prec() < min_prec {
                break;
            }
            self.next()?;
            let mut rhs = self.primary()?;
            while let Some(next) = self.bin_op()? {
                if next.prec() <= op.prec() {
                    break;
                }
                rhs = self.expr_rest(rhs, next.prec())?;
            }
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr(&mut self) -> Result<Expr<'a>, Error> {
        let lhs = self.primary()?;
        self.expr_rest(lhs, 0)
    }

    fn opt_expr(&mut self) -> Result<Option<Expr<'a>>, Error> {
        if self.at_expr()? {
            self.expr().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Parse an operand of a comparison. A parenthesized group may be a whole condition, or
    /// the start of an arithmetic expression.
    fn cond_operand(&mut self) -> Result<CondExpr<'a>, Error> {
        if self.eat_if(|ty| matches!(ty, TokTy::LParan))? {
            let cond = self.cond()?;
            self.close_paran()?;
            return match cond {
                CondExpr::Value(expr) => Ok(CondExpr::Value(self.expr_rest(expr, 0)?)),
                cond => Ok(cond),
            };
        }
        Ok(CondExpr::Value(self.expr()?))
    }

    fn cond_compare(&mut self) -> Result<CondExpr<'a>, Error> {
        let lhs = self.cond_operand()?;
        let op = match self.peek()?.ty {
            TokTy::Cmp(op) => op,
            _ => return Ok(lhs),
        };
        self.next()?;
        if !self.at_expr()? {
            let col = self.peek()?.col;
            return Err(err(ErrorCode::IncompleteCompareOp, col));
        }
        let rhs = self.cond_operand()?;
        Ok(CondExpr::Compare(op, Box::new(lhs), Box::new(rhs)))
    }

    fn cond_and(&mut self) -> Result<CondExpr<'a>, Error> {
        let mut lhs = self.cond_compare()?;
        while self.eat_if(|ty| matches!(ty, TokTy::And))? {
            let rhs = self.cond_compare()?;
            lhs = CondExpr::Logical(LogicOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// Parse a condition. '||' binds weaker than '&&', which binds weaker than comparisons.
    fn cond(&mut self) -> Result<CondExpr<'a>, Error> {
        let mut lhs = self.cond_and()?;
        while self.eat_if(|ty| matches!(ty, TokTy::Or))? {
            let rhs = self.cond_and()?;
            lhs = CondExpr::Logical(LogicOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// Parse an address with an optional memspace prefix. 'code' is reported if the next token
    /// can't start an address.
    fn addr_with(&mut self, code: ErrorCode) -> Result<AddrArg<'a>, Error> {
        let col = self.peek()?.col;
        if !self.at_expr()? {
            return Err(err(code, col));
        }
        let (space, expr) = match self.peek()?.ty {
            TokTy::Space(space) => {
                self.next()?;
                let first = self.space_operand(space)?;
                (Some(space), self.expr_rest(first, 0)?)
            }
            _ => (None, self.expr()?),
        };
        Ok(AddrArg { space, expr, col })
    }

    fn addr(&mut self) -> Result<AddrArg<'a>, Error> {
        self.addr_with(ErrorCode::ExpectAddress)
    }

    fn opt_addr(&mut self) -> Result<Option<AddrArg<'a>>, Error> {
        if self.at_expr()? {
            self.addr().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Parse an address range. The end address may be left out unless 'full' is set.
    fn range(&mut self, full: bool) -> Result<Range<'a>, Error> {
        let start = self.addr_with(ErrorCode::RangeBadStart)?;
        self.eat_comma()?;
        let end = if full || self.at_expr()? {
            Some(self.addr_with(ErrorCode::RangeBadEnd)?)
        } else {
            None
        };
        Ok(Range { start, end })
    }

    fn opt_range(&mut self) -> Result<Option<Range<'a>>, Error> {
        if self.at_expr()? {
            self.range(false).map(Some)
        } else {
            Ok(None)
        }
    }

    fn string(&mut self, code: ErrorCode) -> Result<String, Error> {
        let tok = self.next()?;
        match tok.ty {
            TokTy::Str(string) => Ok(string),
            _ => Err(err(code, tok.col)),
        }
    }

    fn filename(&mut self) -> Result<String, Error> {
        self.string(ErrorCode::ExpectFilename)
    }

    fn opt_string(&mut self) -> Result<Option<String>, Error> {
        if matches!(self.peek()?.ty, TokTy::Str(..)) {
            self.filename().map(Some)
        } else {
            Ok(None)
        }
    }

    fn opt_word(&mut self) -> Result<Option<&'a str>, Error> {
        match self.peek()?.ty {
            TokTy::Word(word) => {
                self.next()?;
                Ok(Some(word))
            }
            _ => Ok(None),
        }
    }

    fn opt_space(&mut self) -> Result<Option<MemSpace>, Error> {
        match self.peek()?.ty {
            TokTy::Space(space) => {
                self.next()?;
                Ok(Some(space))
            }
            _ => Ok(None),
        }
    }

    fn label(&mut self) -> Result<&'a str, Error> {
        let tok = self.next()?;
        match tok.ty {
            TokTy::Label(name) => Ok(name),
            _ => Err(err(ErrorCode::IllegalInput, tok.col)),
        }
    }

    /// Parse a list of bytes and strings, optionally separated by commas.
    fn data_list(&mut self) -> Result<Vec<Data<'a>>, Error> {
        let col = self.peek()?.col;
        let mut data = Vec::new();
        loop {
            let item_col = self.peek()?.col;
            if matches!(self.peek()?.ty, TokTy::Str(..)) {
                data.push(Data::Str(self.string(ErrorCode::ExpectString)?));
            } else if self.at_expr()? {
                data.push(Data::Byte { expr: self.expr()?, col: item_col });
            } else {
                break;
            }
            self.eat_comma()?;
        }
        if data.is_empty() {
            Err(err(ErrorCode::IllegalInput, col))
        } else {
            Ok(data)
        }
    }

    /// Checkpoint numbers are always decimal.
    fn checknum(&mut self) -> Result<u32, Error> {
        let tok = self.next()?;
        let num = match tok.ty {
            TokTy::Digits(digits) => Radix::Dec.parse(digits),
            TokTy::Num(num) => Some(num),
            _ => None,
        };
        num.and_then(|num| u32::try_from(num).ok())
            .ok_or_else(|| err(ErrorCode::ExpectCheckNum, tok.col))
    }

    /// Parse an optional checkpoint number. 'None' means all checkpoints.
    fn opt_checknum(&mut self) -> Result<Option<u32>, Error> {
        if self.peek_word("all")? {
            self.next()?;
            return Ok(None);
        }
        match self.peek()?.ty {
            TokTy::Digits(..) | TokTy::Num(..) => self.checknum().map(Some),
            _ => Ok(None),
        }
    }

    fn ops(&mut self) -> Result<Ops, Error> {
        let mut ops = Ops::NONE;
        loop {
            let op = match self.peek()?.ty {
                TokTy::Word(word) => Op::from_name(word),
                _ => None,
            };
            match op {
                Some(op) => {
                    self.next()?;
                    ops = ops.with(op);
                }
                None => break Ok(ops),
            }
        }
    }

    /// Take the rest of the line as raw text.
    fn rest_of_line(&mut self) -> Option<&'a str> {
        let col = match self.peeked.take() {
            Some(tok) => tok.col,
            None => self.lexer.col(),
        };
        let rest = self.lexer.rest_from(self.line, col).trim();
        (!rest.is_empty()).then(|| rest)
    }

    fn registers(&mut self) -> Result<Command<'a>, Error> {
        let space = self.opt_space()?;
        let mut assign = Vec::new();
        while !self.at_end()? {
            let tok = self.next()?;
            let reg = match tok.ty {
                TokTy::Word(word) => Reg::from_name(word),
                _ => None,
            };
            let reg = reg.ok_or_else(|| err(ErrorCode::InvalidRegister, tok.col))?;
            let tok = self.next()?;
            if !matches!(tok.ty, TokTy::Assign) {
                return Err(err(ErrorCode::IllegalInput, tok.col));
            }
            assign.push((reg, self.expr()?));
            self.eat_comma()?;
        }
        Ok(Command::Registers { space, assign })
    }

    fn checkpoint(&mut self, kind: CheckpointKind) -> Result<Command<'a>, Error> {
        let ops = match self.ops()? {
            ops if ops.is_empty() => kind.default_ops(),
            ops => ops,
        };
        let range = self.opt_range()?;
        let cond = if range.is_some() && self.peek_word("if")? {
            self.next()?;
            Some(self.cond()?)
        } else {
            None
        };
        Ok(Command::Checkpoint { kind, ops, range, cond })
    }

    fn device(&mut self) -> Result<Option<MemSpace>, Error> {
        if self.at_end()? {
            return Ok(None);
        }
        let tok = self.next()?;
        let space = match tok.ty {
            TokTy::Space(space) => Some(space),
            TokTy::Word(name) | TokTy::Digits(name) => MemSpace::from_name(name),
            _ => None,
        };
        space
            .map(Some)
            .ok_or_else(|| err(ErrorCode::ExpectDeviceNum, tok.col))
    }

    fn radix(&mut self) -> Result<Option<Radix>, Error> {
        if self.at_end()? {
            return Ok(None);
        }
        let tok = self.next()?;
        let radix = match tok.ty {
            TokTy::Word(name) => Radix::from_name(name),
            _ => None,
        };
        radix
            .map(Some)
            .ok_or_else(|| err(ErrorCode::IllegalInput, tok.col))
    }

    fn sidefx(&mut self) -> Result<Option<Toggle>, Error> {
        if self.at_end()? {
            return Ok(None);
        }
        let tok = self.next()?;
        let toggle = match tok.ty {
            TokTy::Word(word) => match word.to_ascii_lowercase().as_str() {
                "on" => Some(Toggle::On),
                "off" => Some(Toggle::Off),
                "toggle" => Some(Toggle::Flip),
                _ => None,
            },
            _ => None,
        };
        toggle
            .map(Some)
            .ok_or_else(|| err(ErrorCode::IllegalInput, tok.col))
    }

    /// Parse the arguments of the command 'name', which has just been consumed.
    fn command(&mut self, name: &str, col: usize) -> Result<Command<'a>, Error> {
        Ok(match name {
            "step" | "next" => Command::Step {
                count: self.opt_expr()?,
                over: name == "next",
            },
            "return" => Command::Return,
            "goto" => Command::Goto(self.opt_addr()?),
            "exit" => Command::Exit,
            "quit" => Command::Quit,
            "backtrace" => Command::Backtrace,
            "registers" => self.registers()?,
            "cpu" => Command::Cpu(self.opt_word()?),
            "bank" => Command::Bank(self.opt_word()?),

            "add_label" => {
                let addr = self.addr()?;
                Command::AddLabel { addr, name: self.label()? }
            }
            "delete_label" => {
                let space = self.opt_space()?;
                Command::DeleteLabel { space, name: self.label()? }
            }
            "show_labels" => Command::ShowLabels(self.opt_space()?),
            "clear_labels" => Command::ClearLabels(self.opt_space()?),
            "save_labels" => {
                let space = self.opt_space()?;
                Command::SaveLabels { space, file: self.filename()? }
            }
            "load_labels" => {
                let space = self.opt_space()?;
                Command::LoadLabels { space, file: self.filename()? }
            }

            "a" => {
                let addr = self.addr()?;
                Command::Assemble { addr, ins: self.rest_of_line() }
            }
            "disass" => Command::Disassemble(self.opt_range()?),

            "mem" | "i" => Command::Memory {
                range: self.opt_range()?,
                text_only: name == "i",
            },
            "fill" | "hunt" => {
                let range = self.range(true)?;
                let data = self.data_list()?;
                if name == "fill" {
                    Command::Fill { range, data }
                } else {
                    Command::Hunt { range, data }
                }
            }
            "move" | "compare" => {
                let range = self.range(true)?;
                let dest = self.addr()?;
                if name == "move" {
                    Command::Move { range, dest }
                } else {
                    Command::Compare { range, dest }
                }
            }
            ">" => {
                let addr = self.addr()?;
                Command::Write { addr, data: self.data_list()? }
            }
            "load" | "bload" => {
                let file = self.filename()?;
                let raw = name == "bload";
                let addr = if raw { Some(self.addr()?) } else { self.opt_addr()? };
                Command::Load { file, addr, raw }
            }
            "save" | "bsave" => {
                let file = self.filename()?;
                Command::Save { file, range: self.range(true)?, raw: name == "bsave" }
            }
            "verify" => {
                let file = self.filename()?;
                Command::Verify { file, addr: self.addr()? }
            }

            "break" => self.checkpoint(CheckpointKind::Break)?,
            "watch" => self.checkpoint(CheckpointKind::Watch)?,
            "trace" => self.checkpoint(CheckpointKind::Trace)?,
            "until" => Command::Until(self.opt_addr()?),
            "condition" => {
                let id = self.checknum()?;
                let tok = self.next()?;
                if !matches!(tok.ty, TokTy::Word(w) if w.eq_ignore_ascii_case("if")) {
                    return Err(err(ErrorCode::IllegalInput, tok.col));
                }
                Command::Condition { id, cond: self.cond()? }
            }
            "command" => {
                let id = self.checknum()?;
                Command::CheckpointCommand { id, text: self.string(ErrorCode::ExpectString)? }
            }
            "enable" => Command::Enable(self.opt_checknum()?),
            "disable" => Command::Disable(self.opt_checknum()?),
            "ignore" => {
                let id = self.checknum()?;
                Command::Ignore { id, count: self.opt_expr()? }
            }
            "delete" => Command::Delete(self.opt_checknum()?),

            "radix" => Command::Radix(self.radix()?),
            "device" => Command::Device(self.device()?),
            "sidefx" => Command::SideFx(self.sidefx()?),

            "print" => Command::Print(self.expr()?),
            "~" => Command::Convert(self.expr()?),
            "help" => Command::Help(self.opt_word()?),
            "@" => Command::DiskCommand(self.rest_of_line().unwrap_or("")),
            "cd" => Command::ChDir(self.filename()?),
            "pwd" => Command::Pwd,
            "dir" => Command::Dir(self.opt_string()?),
            "record" => Command::Record(self.filename()?),
            "stop" => Command::Stop,
            "playback" => Command::Playback(self.filename()?),
            _ => return Err(err(ErrorCode::BadCommand, col)),
        })
    }

    /// Parse the next command of the line. Returns 'None' once the whole line is consumed.
    pub fn next_command(&mut self) -> Result<Option<Command<'a>>, Error> {
        while self.eat_if(|ty| matches!(ty, TokTy::Semicolon))? {}
        let tok = self.next()?;
        let cmd = match tok.ty {
            TokTy::Eof => return Ok(None),
            TokTy::Word(word) => {
                let info = find_command(word)
                    .ok_or_else(|| err(ErrorCode::BadCommand, tok.col))?;
                self.command(info.name, tok.col)?
            }
            TokTy::Label(name) => {
                let assign = self.next()?;
                if !matches!(assign.ty, TokTy::Assign) {
                    return Err(err(ErrorCode::IllegalInput, assign.col));
                }
                Command::AddLabel { addr: self.addr()?, name }
            }
            TokTy::Cmp(CmpOp::Gt) => self.command(">", tok.col)?,
            TokTy::Tilde => self.command("~", tok.col)?,
            TokTy::Question => self.command("help", tok.col)?,
            TokTy::At => self.command("@", tok.col)?,
            _ => return Err(err(ErrorCode::BadCommand, tok.col)),
        };
        let end = self.next()?;
        match end.ty {
            TokTy::Eof | TokTy::Semicolon => Ok(Some(cmd)),
            _ => Err(err(ErrorCode::ExpectEndCmd, end.col)),
        }
    }
}

/// Parse a whole line. Only used where the commands are needed up front, since it uses the
/// same radix for every command.
pub fn parse_line(line: &str, radix: Radix) -> Result<Vec<Command>, Error> {
    let mut parser = Parser::new(line, radix);
    let mut cmds = Vec::new();
    while let Some(cmd) = parser.next_command()? {
        cmds.push(cmd);
    }
    Ok(cmds)
}

#[cfg(test)]
fn parse(line: &str) -> Vec<Command> {
    match parse_line(line, Radix::Hex) {
        Ok(cmds) => cmds,
        Err(error) => panic!("{error}"),
    }
}

#[cfg(test)]
fn parse_err(line: &str) -> Error {
    parse_line(line, Radix::Hex).unwrap_err()
}

#[cfg(test)]
fn num(num: i64) -> Expr<'static> {
    Expr::Num(num)
}

#[cfg(test)]
fn reg(reg: Reg, col: usize) -> Expr<'static> {
    Expr::Reg { space: None, reg, col }
}

#[cfg(test)]
fn bin(op: BinOp, lhs: Expr<'static>, rhs: Expr<'static>) -> Expr<'static> {
    Expr::Bin(op, Box::new(lhs), Box::new(rhs))
}

#[cfg(test)]
fn compare(op: CmpOp, lhs: Expr<'static>, rhs: Expr<'static>) -> CondExpr<'static> {
    CondExpr::Compare(op, Box::new(CondExpr::Value(lhs)), Box::new(CondExpr::Value(rhs)))
}

#[test]
fn break_single() {
    let cmds = parse("break c000");
    assert_eq!(cmds, vec![Command::Checkpoint {
        kind: CheckpointKind::Break,
        ops: Ops::EXEC,
        range: Some(Range {
            start: AddrArg { space: None, expr: num(0xc000), col: 6 },
            end: None,
        }),
        cond: None,
    }]);
}

#[test]
fn watch_range_with_condition() {
    let cmds = parse("watch store 8:d020 d02e if a == $10");
    let Command::Checkpoint { kind, ops, range, cond } = &cmds[0] else {
        panic!("expected checkpoint");
    };
    assert_eq!(*kind, CheckpointKind::Watch);
    assert_eq!(*ops, Ops::STORE);
    let range = range.as_ref().unwrap();
    assert_eq!(range.start.space, Some(MemSpace::Disk8));
    assert_eq!(range.start.expr, num(0xd020));
    assert_eq!(range.end.as_ref().unwrap().expr, num(0xd02e));
    assert_eq!(cond.as_ref().unwrap(), &compare(CmpOp::Eq, reg(Reg::A, 27), num(0x10)));
}

#[test]
fn bare_checkpoint_lists() {
    let cmds = parse("trace");
    assert_eq!(cmds, vec![Command::Checkpoint {
        kind: CheckpointKind::Trace,
        ops: Ops::LOAD | Ops::STORE,
        range: None,
        cond: None,
    }]);
}

#[test]
fn cond_precedence() {
    let cmds = parse("cond 3 if a == 1 || x == 2 && y == 3");
    let expected = CondExpr::Logical(
        LogicOp::Or,
        Box::new(compare(CmpOp::Eq, reg(Reg::A, 10), num(1))),
        Box::new(CondExpr::Logical(
            LogicOp::And,
            Box::new(compare(CmpOp::Eq, reg(Reg::X, 20), num(2))),
            Box::new(compare(CmpOp::Eq, reg(Reg::Y, 30), num(3))),
        )),
    );
    assert_eq!(cmds, vec![Command::Condition { id: 3, cond: expected }]);
}

#[test]
fn cond_paran_arithmetic() {
    let cmds = parse("cond 1 if (a + 1) * 2 == 4");
    let lhs = bin(BinOp::Mul, bin(BinOp::Add, reg(Reg::A, 11), num(1)), num(2));
    assert_eq!(cmds, vec![Command::Condition { id: 1, cond: compare(CmpOp::Eq, lhs, num(4)) }]);
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(
        parse("p 1+2*3-4"),
        vec![Command::Print(bin(
            BinOp::Sub,
            bin(BinOp::Add, num(1), bin(BinOp::Mul, num(2), num(3))),
            num(4),
        ))],
    );
}

#[test]
fn several_commands() {
    let cmds = parse("r; m 1000 ; d;");
    assert_eq!(cmds.len(), 3);
    assert!(matches!(cmds[0], Command::Registers { .. }));
    assert!(matches!(cmds[1], Command::Memory { text_only: false, .. }));
    assert!(matches!(cmds[2], Command::Disassemble(None)));
}

#[test]
fn decimal_radix() {
    let cmds = parse_line("m 1000", Radix::Dec).unwrap();
    let Command::Memory { range: Some(range), .. } = &cmds[0] else {
        panic!("expected memory command");
    };
    assert_eq!(range.start.expr, num(1000));
    let err = parse_line("m ff", Radix::Dec).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRegister);
}

#[test]
fn labels_and_registers() {
    let cmds = parse(".loop = c000; r a = $10, x = 2; dl .loop");
    assert_eq!(cmds[0], Command::AddLabel {
        addr: AddrArg { space: None, expr: num(0xc000), col: 8 },
        name: "loop",
    });
    assert_eq!(cmds[1], Command::Registers {
        space: None,
        assign: vec![(Reg::A, num(0x10)), (Reg::X, num(2))],
    });
    assert_eq!(cmds[2], Command::DeleteLabel { space: None, name: "loop" });
}

#[test]
fn raw_rest_of_line() {
    let cmds = parse("a 1000 lda #$00");
    assert!(matches!(cmds[0], Command::Assemble { ins: Some("lda #$00"), .. }));
    let cmds = parse("@ i0:");
    assert_eq!(cmds, vec![Command::DiskCommand("i0:")]);
}

#[test]
fn checkpoint_control() {
    assert_eq!(
        parse("enable all; disable 2; delete; ignore 4 3; command 1 \"m 1000\""),
        vec![
            Command::Enable(None),
            Command::Disable(Some(2)),
            Command::Delete(None),
            Command::Ignore { id: 4, count: Some(num(3)) },
            Command::CheckpointCommand { id: 1, text: "m 1000".to_string() },
        ],
    );
}

#[test]
fn errors() {
    let cases = [
        ("frob", ErrorCode::BadCommand, 0),
        ("delete x", ErrorCode::ExpectEndCmd, 7),
        ("cond 1 if a ==", ErrorCode::IncompleteCompareOp, 14),
        ("cond if", ErrorCode::ExpectCheckNum, 5),
        ("p (1 + 2", ErrorCode::MissingCloseParen, 8),
        ("m zz", ErrorCode::InvalidRegister, 2),
        ("f 1000", ErrorCode::RangeBadEnd, 6),
        ("t ; m", ErrorCode::RangeBadStart, 2),
        ("ll 1000", ErrorCode::ExpectFilename, 3),
        ("command 1 m", ErrorCode::ExpectString, 10),
        ("dev 12", ErrorCode::ExpectDeviceNum, 4),
        ("goto 10; a", ErrorCode::ExpectAddress, 10),
    ];
    for (line, code, col) in cases {
        let err = parse_err(line);
        assert_eq!((err.code, err.col), (code, col), "{line}");
    }
}
