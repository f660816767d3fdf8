use crate::{Error, ErrorCode};
use crate::cmd::CmpOp;

use vmon_util::MemSpace;

use std::str::Chars;

/// The type of token and the data accosiated with it.
#[derive(Debug, PartialEq, Eq)]
pub enum TokTy<'a> {
    /// Identifier. Either a command, a keyword, a register or a number in hex radix.
    Word(&'a str),
    /// Digits without a radix prefix. The value depends on the default radix, so they are
    /// converted by the parser.
    Digits(&'a str),
    /// Number with a radix prefix fx. '$ff' or '%0101'.
    Num(i64),
    /// '.' followed by an identifier.
    Label(&'a str),
    /// Memspace prefix fx. 'c:' or '8:'.
    Space(MemSpace),
    /// String literal.
    Str(String),
    Cmp(CmpOp),
    And,
    Or,
    Assign,
    Comma,
    LParan,
    RParan,
    Plus,
    Minus,
    Star,
    Slash,
    Semicolon,
    Tilde,
    At,
    Question,
    Eof,
}

#[derive(Debug)]
pub struct Tok<'a> {
    pub ty: TokTy<'a>,
    /// The column of the first character of the token.
    pub col: usize,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Chars<'a>,
    len: usize,
    /// The start of the token currently being scanned.
    start: usize,
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_id_con(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            len: input.len(),
            start: 0,
        }
    }

    /// The column of the next character.
    pub fn col(&self) -> usize {
        self.len - self.chars.as_str().len()
    }

    fn err(&self, code: ErrorCode) -> Error {
        Error::new(code, self.start)
    }

    /// Peak one character ahead.
    fn first(&self) -> char {
        self.chars.clone().next().unwrap_or('\0')
    }

    /// Peak two characters ahead.
    fn second(&self) -> char {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next().unwrap_or('\0')
    }

    fn is_done(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    fn eat(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn eat_char(&mut self, c: char) -> bool {
        if self.first() == c {
            self.eat();
            true
        } else {
            false
        }
    }

    /// Consume characters until pred doesn't return true. Returns the consumed slice.
    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let as_str = self.chars.as_str();
        let mut eaten = 0;
        while !self.is_done() && pred(self.first()) {
            eaten += self.eat().map_or(0, char::len_utf8);
        }
        &as_str[..eaten]
    }

    /// Consume whitespace and a trailing comment.
    fn eat_whitespace(&mut self) {
        self.eat_while(is_whitespace);
        if self.first() == '#' {
            self.eat_while(|_| true);
        }
    }

    /// Consume an identifier. A trailing "'" is part of it to allow the shadow registers of
    /// the z80.
    fn eat_id(&mut self) -> &'a str {
        let as_str = self.chars.as_str();
        let mut eaten = self.eat_while(is_id_con).len();
        if self.eat_char('\'') {
            eaten += 1;
        }
        &as_str[..eaten]
    }

    /// Consume and convert digits with a fixed radix. The prefix must already be consumed.
    fn eat_prefixed(&mut self, base: u32) -> Result<TokTy<'a>, Error> {
        let digits = self.eat_while(|c| c.is_digit(base));
        if digits.is_empty() || is_id_con(self.first()) {
            return Err(self.err(ErrorCode::IllegalInput));
        }
        i64::from_str_radix(digits, base)
            .map(TokTy::Num)
            .map_err(|_| self.err(ErrorCode::ImmediateTooLarge))
    }

    fn eat_string(&mut self) -> Result<TokTy<'a>, Error> {
        let mut string = String::new();
        loop {
            let c = match self.eat() {
                Some('"') => break,
                Some('\\') => match self.eat() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('"') => '"',
                    Some('\\') => '\\',
                    _ => return Err(self.err(ErrorCode::ExpectString)),
                },
                Some(c) => c,
                None => return Err(self.err(ErrorCode::ExpectString)),
            };
            string.push(c);
        }
        Ok(TokTy::Str(string))
    }

    fn single(&mut self, ty: TokTy<'a>) -> Result<TokTy<'a>, Error> {
        self.eat();
        Ok(ty)
    }

    fn scan(&mut self) -> Result<TokTy<'a>, Error> {
        match self.first() {
            '0' if matches!(self.second(), 'x' | 'X') => {
                self.eat();
                self.eat();
                self.eat_prefixed(16)
            }
            c if c.is_ascii_digit() => {
                let digits = self.eat_while(|c| c.is_ascii_alphanumeric());
                if self.first() == ':' {
                    if let Some(space) = MemSpace::from_name(digits) {
                        self.eat();
                        return Ok(TokTy::Space(space));
                    }
                }
                Ok(TokTy::Digits(digits))
            }
            c if is_id_start(c) => {
                let id = self.eat_id();
                if self.first() == ':' && id.eq_ignore_ascii_case("c") {
                    self.eat();
                    return Ok(TokTy::Space(MemSpace::Computer));
                }
                Ok(TokTy::Word(id))
            }
            '.' => {
                self.eat();
                if !is_id_start(self.first()) {
                    return Err(self.err(ErrorCode::IllegalInput));
                }
                Ok(TokTy::Label(self.eat_id()))
            }
            '"' => {
                self.eat();
                self.eat_string()
            }
            '$' => {
                self.eat();
                self.eat_prefixed(16)
            }
            '%' => {
                self.eat();
                self.eat_prefixed(2)
            }
            '&' => {
                self.eat();
                if self.eat_char('&') {
                    Ok(TokTy::And)
                } else {
                    self.eat_prefixed(8)
                }
            }
            '|' => {
                self.eat();
                if self.eat_char('|') {
                    Ok(TokTy::Or)
                } else {
                    Err(self.err(ErrorCode::IllegalInput))
                }
            }
            '=' => {
                self.eat();
                if self.eat_char('=') {
                    Ok(TokTy::Cmp(CmpOp::Eq))
                } else {
                    Ok(TokTy::Assign)
                }
            }
            '!' => {
                self.eat();
                if self.eat_char('=') {
                    Ok(TokTy::Cmp(CmpOp::Ne))
                } else {
                    Err(self.err(ErrorCode::IllegalInput))
                }
            }
            '<' => {
                self.eat();
                if self.eat_char('=') {
                    Ok(TokTy::Cmp(CmpOp::Le))
                } else if self.eat_char('>') {
                    Ok(TokTy::Cmp(CmpOp::Ne))
                } else {
                    Ok(TokTy::Cmp(CmpOp::Lt))
                }
            }
            '>' => {
                self.eat();
                if self.eat_char('=') {
                    Ok(TokTy::Cmp(CmpOp::Ge))
                } else {
                    Ok(TokTy::Cmp(CmpOp::Gt))
                }
            }
            ',' => self.single(TokTy::Comma),
            '(' => self.single(TokTy::LParan),
            ')' => self.single(TokTy::RParan),
            '+' => self.single(TokTy::Plus),
            '-' => self.single(TokTy::Minus),
            '*' => self.single(TokTy::Star),
            '/' => self.single(TokTy::Slash),
            ';' => self.single(TokTy::Semicolon),
            '~' => self.single(TokTy::Tilde),
            '@' => self.single(TokTy::At),
            '?' => self.single(TokTy::Question),
            _ if self.is_done() => Ok(TokTy::Eof),
            _ => Err(self.err(ErrorCode::IllegalInput)),
        }
    }

    /// Scan the next token. Returns 'TokTy::Eof' if the whole line has been consumed.
    pub fn next_tok(&mut self) -> Result<Tok<'a>, Error> {
        self.eat_whitespace();
        self.start = self.col();
        let ty = self.scan()?;
        Ok(Tok { ty, col: self.start })
    }

    /// Consume the rest of the line as raw text, starting at column 'col'.
    pub fn rest_from(&mut self, line: &'a str, col: usize) -> &'a str {
        self.eat_while(|_| true);
        line.get(col..).unwrap_or("")
    }
}

#[cfg(test)]
fn tokens(input: &str) -> Vec<TokTy> {
    let mut lexer = Lexer::new(input);
    let mut toks = Vec::new();
    loop {
        let tok = lexer.next_tok().unwrap();
        if tok.ty == TokTy::Eof {
            break toks;
        }
        toks.push(tok.ty);
    }
}

#[test]
fn comment() {
    assert_eq!(tokens("   # break 1000"), vec![]);
    assert_eq!(
        tokens("m 1000 # dump"),
        vec![TokTy::Word("m"), TokTy::Digits("1000")],
    );
}

#[test]
fn number() {
    assert_eq!(
        tokens("$ff %101 &17 0x10 c000 42"),
        vec![
            TokTy::Num(0xff),
            TokTy::Num(0b101),
            TokTy::Num(0o17),
            TokTy::Num(0x10),
            TokTy::Word("c000"),
            TokTy::Digits("42"),
        ],
    );
    assert!(Lexer::new("$").next_tok().is_err());
    assert!(Lexer::new("%102").next_tok().is_err());
}

#[test]
fn space_and_label() {
    assert_eq!(
        tokens("c:a 8:$1c00 .loop"),
        vec![
            TokTy::Space(MemSpace::Computer),
            TokTy::Word("a"),
            TokTy::Space(MemSpace::Disk8),
            TokTy::Num(0x1c00),
            TokTy::Label("loop"),
        ],
    );
    assert_eq!(tokens("af'"), vec![TokTy::Word("af'")]);
}

#[test]
fn operators() {
    assert_eq!(
        tokens("(a==1)&&x<>2||y>=3;"),
        vec![
            TokTy::LParan,
            TokTy::Word("a"),
            TokTy::Cmp(CmpOp::Eq),
            TokTy::Digits("1"),
            TokTy::RParan,
            TokTy::And,
            TokTy::Word("x"),
            TokTy::Cmp(CmpOp::Ne),
            TokTy::Digits("2"),
            TokTy::Or,
            TokTy::Word("y"),
            TokTy::Cmp(CmpOp::Ge),
            TokTy::Digits("3"),
            TokTy::Semicolon,
        ],
    );
}

#[test]
fn string() {
    assert_eq!(
        tokens(r#"cmd 1 "m 1000\n""#),
        vec![TokTy::Word("cmd"), TokTy::Digits("1"), TokTy::Str("m 1000\n".to_string())],
    );
    let err = Lexer::new("  \"open").next_tok().unwrap_err();
    assert_eq!(err.code, ErrorCode::ExpectString);
    assert_eq!(err.col, 2);
}

#[test]
fn columns() {
    let mut lexer = Lexer::new("break  c000");
    assert_eq!(lexer.next_tok().unwrap().col, 0);
    assert_eq!(lexer.next_tok().unwrap().col, 7);
}
