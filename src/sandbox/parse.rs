//! 沙箱小语言的词法与语法分析
//!
//! 语法仅含赋值语句与表达式：无 import、无属性访问、无函数定义、无控制流。
//! 能力限制在此层实现：被禁标识符与 `.` 在词法阶段即拒绝，整个程序先解析后求值，
//! 任何一条语句被拒即零执行。

use super::ExecutionError;

/// 词法阶段直接拒绝的标识符（对应 Python 侧的 import / 文件 / 进程 / 自省能力）
const DENIED_IDENTS: &[&str] = &[
    "import",
    "open",
    "exec",
    "eval",
    "compile",
    "input",
    "getattr",
    "setattr",
    "delattr",
    "globals",
    "locals",
    "vars",
    "dir",
    "type",
    "breakpoint",
    "__import__",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { name: String, expr: Expr },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    NoneLit,
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Compare {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: String,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Assign,
    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// 语句分隔（`;` 或换行）
    Sep,
}

fn lex(src: &str) -> Result<Vec<Tok>, ExecutionError> {
    let mut toks = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '\n' | ';' => {
                chars.next();
                toks.push(Tok::Sep);
            }
            '#' => {
                // 注释：跳到行尾
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '.' => {
                // 裸 `.` 只可能是属性访问（数字里的小数点在数字分支消费）
                return Err(ExecutionError::CapabilityDenied(
                    "attribute access is not allowed in the sandbox".to_string(),
                ));
            }
            '+' => {
                chars.next();
                toks.push(Tok::Plus);
            }
            '-' => {
                chars.next();
                toks.push(Tok::Minus);
            }
            '%' => {
                chars.next();
                toks.push(Tok::Percent);
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    toks.push(Tok::StarStar);
                } else {
                    toks.push(Tok::Star);
                }
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    toks.push(Tok::SlashSlash);
                } else {
                    toks.push(Tok::Slash);
                }
            }
            '(' => {
                chars.next();
                toks.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                toks.push(Tok::RParen);
            }
            '[' => {
                chars.next();
                toks.push(Tok::LBracket);
            }
            ']' => {
                chars.next();
                toks.push(Tok::RBracket);
            }
            ',' => {
                chars.next();
                toks.push(Tok::Comma);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    toks.push(Tok::EqEq);
                } else {
                    toks.push(Tok::Assign);
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    toks.push(Tok::Ne);
                } else {
                    return Err(ExecutionError::Syntax("unexpected '!'".to_string()));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    toks.push(Tok::Le);
                } else {
                    toks.push(Tok::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    toks.push(Tok::Ge);
                } else {
                    toks.push(Tok::Gt);
                }
            }
            '\'' | '"' => {
                toks.push(lex_string(&mut chars)?);
            }
            c if c.is_ascii_digit() => {
                toks.push(lex_number(&mut chars)?);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                check_ident(&ident)?;
                toks.push(Tok::Ident(ident));
            }
            other => {
                return Err(ExecutionError::Syntax(format!(
                    "unexpected character '{}'",
                    other
                )));
            }
        }
    }
    Ok(toks)
}

/// 被禁标识符与双下划线名（自省入口）在词法阶段拒绝
fn check_ident(ident: &str) -> Result<(), ExecutionError> {
    if DENIED_IDENTS.contains(&ident) || ident.contains("__") {
        return Err(ExecutionError::CapabilityDenied(format!(
            "'{}' is not available in the sandbox",
            ident
        )));
    }
    Ok(())
}

fn lex_string(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<Tok, ExecutionError> {
    let quote = chars.next().unwrap();
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some(other) => {
                    return Err(ExecutionError::Syntax(format!(
                        "unknown escape '\\{}'",
                        other
                    )));
                }
                None => return Err(ExecutionError::Syntax("unterminated string".to_string())),
            },
            Some(c) if c == quote => return Ok(Tok::Str(out)),
            Some('\n') | None => {
                return Err(ExecutionError::Syntax("unterminated string".to_string()));
            }
            Some(c) => out.push(c),
        }
    }
}

fn lex_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<Tok, ExecutionError> {
    let mut text = String::new();
    let mut is_float = false;
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else if c == '.' && !is_float {
            is_float = true;
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if is_float {
        text.parse::<f64>()
            .map(Tok::Float)
            .map_err(|_| ExecutionError::Syntax(format!("bad float literal '{}'", text)))
    } else {
        text.parse::<i64>()
            .map(Tok::Int)
            .map_err(|_| ExecutionError::Syntax(format!("integer literal too large: '{}'", text)))
    }
}

/// 解析整个程序；任一语句非法则整体失败（不会部分执行）
pub fn parse_program(src: &str) -> Result<Vec<Stmt>, ExecutionError> {
    let toks = lex(src)?;
    let mut parser = Parser { toks, pos: 0 };
    let mut stmts = Vec::new();

    parser.skip_seps();
    while !parser.at_end() {
        stmts.push(parser.parse_stmt()?);
        if !parser.at_end() {
            parser.expect_sep()?;
            parser.skip_seps();
        }
    }
    Ok(stmts)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn peek2(&self) -> Option<&Tok> {
        self.toks.get(self.pos + 1)
    }

    fn next(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), ExecutionError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(ExecutionError::Syntax(format!(
                "expected {:?}, found {:?}",
                tok,
                self.peek()
            )))
        }
    }

    fn skip_seps(&mut self) {
        while self.eat(&Tok::Sep) {}
    }

    fn expect_sep(&mut self) -> Result<(), ExecutionError> {
        if self.eat(&Tok::Sep) {
            Ok(())
        } else {
            Err(ExecutionError::Syntax(format!(
                "expected end of statement, found {:?}",
                self.peek()
            )))
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ExecutionError> {
        if let (Some(Tok::Ident(name)), Some(Tok::Assign)) = (self.peek(), self.peek2()) {
            let name = name.clone();
            self.pos += 2;
            let expr = self.parse_expr()?;
            return Ok(Stmt::Assign { name, expr });
        }
        Ok(Stmt::Expr(self.parse_expr()?))
    }

    fn parse_expr(&mut self) -> Result<Expr, ExecutionError> {
        self.parse_comparison()
    }

    /// 单层比较（不支持 Python 的链式比较）
    fn parse_comparison(&mut self) -> Result<Expr, ExecutionError> {
        let lhs = self.parse_arith()?;
        let op = match self.peek() {
            Some(Tok::EqEq) => Some(CmpOp::Eq),
            Some(Tok::Ne) => Some(CmpOp::Ne),
            Some(Tok::Lt) => Some(CmpOp::Lt),
            Some(Tok::Le) => Some(CmpOp::Le),
            Some(Tok::Gt) => Some(CmpOp::Gt),
            Some(Tok::Ge) => Some(CmpOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let rhs = self.parse_arith()?;
            return Ok(Expr::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn parse_arith(&mut self) -> Result<Expr, ExecutionError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ExecutionError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::Div,
                Some(Tok::SlashSlash) => BinOp::FloorDiv,
                Some(Tok::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExecutionError> {
        match self.peek() {
            Some(Tok::Minus) => {
                self.pos += 1;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            Some(Tok::Plus) => {
                self.pos += 1;
                Ok(Expr::Unary {
                    op: UnaryOp::Pos,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            _ => self.parse_power(),
        }
    }

    /// `**` 右结合，右操作数允许一元符号（与 Python 一致：2**-1 合法）
    fn parse_power(&mut self) -> Result<Expr, ExecutionError> {
        let base = self.parse_postfix()?;
        if self.eat(&Tok::StarStar) {
            let exp = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExecutionError> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Tok::LBracket) {
            let index = self.parse_expr()?;
            self.expect(Tok::RBracket)?;
            expr = Expr::Index {
                base: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExecutionError> {
        match self.next() {
            Some(Tok::Int(n)) => Ok(Expr::Int(n)),
            Some(Tok::Float(f)) => Ok(Expr::Float(f)),
            Some(Tok::Str(s)) => Ok(Expr::Str(s)),
            Some(Tok::Ident(name)) => match name.as_str() {
                "True" => Ok(Expr::Bool(true)),
                "False" => Ok(Expr::Bool(false)),
                "None" => Ok(Expr::NoneLit),
                _ => {
                    if self.eat(&Tok::LParen) {
                        let args = self.parse_elems(&Tok::RParen)?;
                        Ok(Expr::Call { func: name, args })
                    } else {
                        Ok(Expr::Name(name))
                    }
                }
            },
            Some(Tok::LParen) => {
                if self.eat(&Tok::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.parse_expr()?;
                if self.peek() == Some(&Tok::Comma) {
                    self.pos += 1;
                    let mut elems = vec![first];
                    elems.extend(self.parse_elems(&Tok::RParen)?);
                    Ok(Expr::Tuple(elems))
                } else {
                    self.expect(Tok::RParen)?;
                    Ok(first)
                }
            }
            Some(Tok::LBracket) => Ok(Expr::List(self.parse_elems(&Tok::RBracket)?)),
            other => Err(ExecutionError::Syntax(format!(
                "unexpected token {:?}",
                other
            ))),
        }
    }

    /// 逗号分隔的元素列表，允许尾逗号，消费终结符
    fn parse_elems(&mut self, close: &Tok) -> Result<Vec<Expr>, ExecutionError> {
        let mut elems = Vec::new();
        if self.eat(close) {
            return Ok(elems);
        }
        loop {
            elems.push(self.parse_expr()?);
            if self.eat(&Tok::Comma) {
                if self.eat(close) {
                    return Ok(elems);
                }
                continue;
            }
            self.expect(close.clone())?;
            return Ok(elems);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let stmts = parse_program("x = 2 + 2").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(&stmts[0], Stmt::Assign { name, .. } if name == "x"));
    }

    #[test]
    fn test_parse_multiple_statements() {
        let stmts = parse_program("x = 1; y = 2\nz = x + y").unwrap();
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn test_import_rejected_at_lex_time() {
        let err = parse_program("import os").unwrap_err();
        assert!(matches!(err, ExecutionError::CapabilityDenied(_)));
    }

    #[test]
    fn test_attribute_access_rejected() {
        let err = parse_program("x = (1)\ny = x.bit_length()").unwrap_err();
        assert!(matches!(err, ExecutionError::CapabilityDenied(_)));
    }

    #[test]
    fn test_dunder_rejected() {
        let err = parse_program("__builtins__").unwrap_err();
        assert!(matches!(err, ExecutionError::CapabilityDenied(_)));
    }

    #[test]
    fn test_bad_syntax_is_syntax_error() {
        let err = parse_program("x = = 2").unwrap_err();
        assert!(matches!(err, ExecutionError::Syntax(_)));
    }

    #[test]
    fn test_tuple_and_list_literals() {
        let stmts = parse_program("t = (1, 2)\nl = [1, 2, 3]\ne = ()").unwrap();
        assert_eq!(stmts.len(), 3);
    }
}
