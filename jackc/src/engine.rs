use crate::error::Error;
use crate::symbols::{Kind, SymbolTable};
use crate::token::{Keyword, TokenKind};
use crate::tokenizer::Tokens;
use crate::writer::VmWriter;
use arch::{ArithOp, Segment};
use std::io::Write;

const BINARY_OPS: &str = "+-*/&|<>=";

// ----------------------------------------------------------------------------
// Engine

/// Single-pass recursive descent over one class: each grammar production is
/// one procedure, and code generation happens as the productions are
/// recognized. Any token that does not fit the grammar aborts the unit.
pub struct CompilationEngine<W: Write> {
    toks: Tokens,
    table: SymbolTable,
    writer: VmWriter<W>,
    class_name: String,
    labels: usize,
}

impl<W: Write> CompilationEngine<W> {
    pub fn new(toks: Tokens, out: W) -> Self {
        CompilationEngine {
            toks,
            table: SymbolTable::new(),
            writer: VmWriter::new(out),
            class_name: String::new(),
            labels: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// class: 'class' className '{' classVarDec* subroutineDec* '}'
    pub fn compile_class(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.take_identifier()?;
        self.expect_symbol('{')?;
        while matches!(
            self.current_keyword(),
            Some(Keyword::Static | Keyword::Field)
        ) {
            self.compile_class_var_dec()?;
        }
        while matches!(
            self.current_keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            self.compile_subroutine()?;
        }
        self.expect_symbol('}')?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Declarations

impl<W: Write> CompilationEngine<W> {
    /// classVarDec: ('static' | 'field') type varName (',' varName)* ';'
    fn compile_class_var_dec(&mut self) -> Result<(), Error> {
        let kind = match self.toks.keyword()? {
            Keyword::Static => Kind::Static,
            _ => Kind::Field,
        };
        self.toks.advance()?;
        let ty = self.take_type()?;
        loop {
            let name = self.take_identifier()?;
            self.table.define(&name, &ty, kind)?;
            if self.current_symbol() != Some(',') {
                break;
            }
            self.toks.advance()?;
        }
        self.expect_symbol(';')
    }

    /// subroutineDec: ('constructor' | 'function' | 'method')
    ///                ('void' | type) name '(' parameterList ')' body
    fn compile_subroutine(&mut self) -> Result<(), Error> {
        self.table.start_subroutine();
        let kind = self.toks.keyword()?;
        self.toks.advance()?;
        self.take_return_type()?;
        let name = self.take_identifier()?;

        // A method receives its object as a hidden first argument.
        if kind == Keyword::Method {
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, Kind::Arg)?;
        }
        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        while self.current_keyword() == Some(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let locals = self.table.var_count(Kind::Var);
        let full_name = format!("{}.{}", self.class_name, name);
        self.writer.function(&full_name, locals)?;

        // Receiver binding precedes all user statements.
        match kind {
            Keyword::Constructor => {
                let fields = self.table.var_count(Kind::Field);
                self.writer.push(Segment::Constant, fields)?;
                self.writer.call("Memory.alloc", 1)?;
                self.writer.pop(Segment::Pointer, 0)?;
            }
            Keyword::Method => {
                self.writer.push(Segment::Argument, 0)?;
                self.writer.pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    /// parameterList: ((type varName) (',' type varName)*)?
    fn compile_parameter_list(&mut self) -> Result<(), Error> {
        if self.current_symbol() == Some(')') {
            return Ok(());
        }
        loop {
            let ty = self.take_type()?;
            let name = self.take_identifier()?;
            self.table.define(&name, &ty, Kind::Arg)?;
            if self.current_symbol() != Some(',') {
                return Ok(());
            }
            self.toks.advance()?;
        }
    }

    /// varDec: 'var' type varName (',' varName)* ';'
    fn compile_var_dec(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.take_type()?;
        loop {
            let name = self.take_identifier()?;
            self.table.define(&name, &ty, Kind::Var)?;
            if self.current_symbol() != Some(',') {
                break;
            }
            self.toks.advance()?;
        }
        self.expect_symbol(';')
    }
}

// ----------------------------------------------------------------------------
// Statements

impl<W: Write> CompilationEngine<W> {
    fn compile_statements(&mut self) -> Result<(), Error> {
        loop {
            match self.current_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    /// letStatement: 'let' varName ('[' expression ']')? '=' expression ';'
    ///
    /// For an indexed target, base+index is computed before the right-hand
    /// side so the index expression is evaluated exactly once, even when the
    /// right-hand side mutates the same array.
    fn compile_let(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.take_identifier()?;

        if self.current_symbol() == Some('[') {
            self.toks.advance()?;
            self.push_variable(&name)?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.arithmetic(ArithOp::Add)?;

            self.expect_symbol('=')?;
            self.compile_expression()?;

            self.writer.pop(Segment::Temp, 0)?;
            self.writer.pop(Segment::Pointer, 1)?;
            self.writer.push(Segment::Temp, 0)?;
            self.writer.pop(Segment::That, 0)?;
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.pop_variable(&name)?;
        }
        self.expect_symbol(';')
    }

    /// ifStatement: 'if' '(' expression ')' '{' statements '}'
    ///              ('else' '{' statements '}')?
    fn compile_if(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::If)?;
        let false_label = self.fresh_label("IF_FALSE");

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.arithmetic(ArithOp::Not)?;
        self.writer.if_goto(&false_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        if self.current_keyword() == Some(Keyword::Else) {
            let end_label = self.fresh_label("IF_END");
            self.writer.goto(&end_label)?;
            self.writer.label(&false_label)?;
            self.toks.advance()?;
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
            self.writer.label(&end_label)?;
        } else {
            self.writer.label(&false_label)?;
        }
        Ok(())
    }

    /// whileStatement: 'while' '(' expression ')' '{' statements '}'
    fn compile_while(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::While)?;
        let start_label = self.fresh_label("WHILE_EXP");
        let end_label = self.fresh_label("WHILE_END");

        self.writer.label(&start_label)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.arithmetic(ArithOp::Not)?;
        self.writer.if_goto(&end_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.goto(&start_label)?;
        self.writer.label(&end_label)?;
        Ok(())
    }

    /// doStatement: 'do' subroutineCall ';' — the call's value is discarded.
    fn compile_do(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::Do)?;
        let name = self.take_identifier()?;
        self.compile_call(name)?;
        self.writer.pop(Segment::Temp, 0)?;
        self.expect_symbol(';')
    }

    /// returnStatement: 'return' expression? ';' — a value-less return still
    /// pushes a dummy so every call site can pop one.
    fn compile_return(&mut self) -> Result<(), Error> {
        self.expect_keyword(Keyword::Return)?;
        if self.current_symbol() == Some(';') {
            self.writer.push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.writer.ret()?;
        self.expect_symbol(';')
    }
}

// ----------------------------------------------------------------------------
// Expressions

impl<W: Write> CompilationEngine<W> {
    /// expression: term (op term)* — flat left-to-right chaining, operands
    /// emitted before their operator. `*` and `/` are not VM primitives and
    /// lower to OS calls.
    fn compile_expression(&mut self) -> Result<(), Error> {
        self.compile_term()?;
        while let Some(op) = self.current_symbol().filter(|ch| BINARY_OPS.contains(*ch)) {
            self.toks.advance()?;
            self.compile_term()?;
            match op {
                '+' => self.writer.arithmetic(ArithOp::Add)?,
                '-' => self.writer.arithmetic(ArithOp::Sub)?,
                '*' => self.writer.call("Math.multiply", 2)?,
                '/' => self.writer.call("Math.divide", 2)?,
                '&' => self.writer.arithmetic(ArithOp::And)?,
                '|' => self.writer.arithmetic(ArithOp::Or)?,
                '<' => self.writer.arithmetic(ArithOp::Lt)?,
                '>' => self.writer.arithmetic(ArithOp::Gt)?,
                _ => self.writer.arithmetic(ArithOp::Eq)?,
            }
        }
        Ok(())
    }

    /// term: constant | varName | varName '[' expression ']' |
    ///       subroutineCall | '(' expression ')' | unaryOp term
    ///
    /// An identifier needs one token of lookahead: `[`, `(` and `.` decide
    /// between array access, call and plain variable. Backing out of the
    /// lookahead has no observable effect.
    fn compile_term(&mut self) -> Result<(), Error> {
        let kind = self.toks.current()?.kind.clone();
        match kind {
            TokenKind::IntConst(value) => {
                self.toks.advance()?;
                self.writer.push(Segment::Constant, value)
            }
            TokenKind::StringConst(text) => {
                self.toks.advance()?;
                self.compile_string(&text)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.toks.advance()?;
                self.writer.push(Segment::Constant, 1)?;
                self.writer.arithmetic(ArithOp::Neg)
            }
            TokenKind::Keyword(Keyword::False) | TokenKind::Keyword(Keyword::Null) => {
                self.toks.advance()?;
                self.writer.push(Segment::Constant, 0)
            }
            TokenKind::Keyword(Keyword::This) => {
                self.toks.advance()?;
                self.writer.push(Segment::Pointer, 0)
            }
            TokenKind::Symbol('(') => {
                self.toks.advance()?;
                self.compile_expression()?;
                self.expect_symbol(')')
            }
            TokenKind::Symbol(ch) if "-~^#".contains(ch) => {
                self.toks.advance()?;
                self.compile_term()?;
                self.writer.arithmetic(match ch {
                    '-' => ArithOp::Neg,
                    '~' => ArithOp::Not,
                    '^' => ArithOp::ShiftLeft,
                    _ => ArithOp::ShiftRight,
                })
            }
            TokenKind::Ident(name) => {
                self.toks.advance()?;
                match self.current_symbol() {
                    Some('[') => {
                        self.toks.advance()?;
                        self.push_variable(&name)?;
                        self.compile_expression()?;
                        self.expect_symbol(']')?;
                        self.writer.arithmetic(ArithOp::Add)?;
                        self.writer.pop(Segment::Pointer, 1)?;
                        self.writer.push(Segment::That, 0)
                    }
                    Some('(') | Some('.') => self.compile_call(name),
                    _ => self.push_variable(&name),
                }
            }
            _ => Err(self.expected("a term")),
        }
    }

    /// subroutineCall, past its leading identifier. Three forms:
    /// `var.method(...)` pushes the object and dispatches on its declared
    /// type; `Class.function(...)` passes no receiver; a bare `method(...)`
    /// runs on the current object.
    fn compile_call(&mut self, first: String) -> Result<(), Error> {
        let (target, receiver_args) = if self.current_symbol() == Some('.') {
            self.toks.advance()?;
            let sub = self.take_identifier()?;
            match self.table.get(&first) {
                Some(entry) => {
                    let ty = entry.ty.clone();
                    let (segment, index) = (entry.kind.segment(), entry.index);
                    self.writer.push(segment, index)?;
                    (format!("{ty}.{sub}"), 1)
                }
                None => (format!("{first}.{sub}"), 0),
            }
        } else {
            self.writer.push(Segment::Pointer, 0)?;
            (format!("{}.{first}", self.class_name), 1)
        };

        self.expect_symbol('(')?;
        let args = self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.writer.call(&target, receiver_args + args)
    }

    /// expressionList: (expression (',' expression)*)? — returns the count.
    fn compile_expression_list(&mut self) -> Result<u16, Error> {
        if self.current_symbol() == Some(')') {
            return Ok(0);
        }
        let mut count = 0;
        loop {
            self.compile_expression()?;
            count += 1;
            if self.current_symbol() != Some(',') {
                return Ok(count);
            }
            self.toks.advance()?;
        }
    }

    /// A string literal builds its object at runtime, one character at a
    /// time.
    fn compile_string(&mut self, text: &str) -> Result<(), Error> {
        self.writer
            .push(Segment::Constant, text.chars().count() as u16)?;
        self.writer.call("String.new", 1)?;
        for ch in text.chars() {
            self.writer.push(Segment::Constant, ch as u16)?;
            self.writer.call("String.appendChar", 2)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Helpers

impl<W: Write> CompilationEngine<W> {
    fn current_symbol(&self) -> Option<char> {
        match self.toks.current() {
            Ok(tok) => match tok.kind {
                TokenKind::Symbol(ch) => Some(ch),
                _ => None,
            },
            Err(_) => None,
        }
    }

    fn current_keyword(&self) -> Option<Keyword> {
        match self.toks.current() {
            Ok(tok) => match tok.kind {
                TokenKind::Keyword(keyword) => Some(keyword),
                _ => None,
            },
            Err(_) => None,
        }
    }

    fn expect_symbol(&mut self, ch: char) -> Result<(), Error> {
        if self.current_symbol() == Some(ch) {
            self.toks.advance()
        } else {
            Err(self.expected(&format!("`{ch}`")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), Error> {
        if self.current_keyword() == Some(keyword) {
            self.toks.advance()
        } else {
            Err(self.expected(&format!("`{keyword}`")))
        }
    }

    fn take_identifier(&mut self) -> Result<String, Error> {
        let name = match self.toks.identifier() {
            Ok(name) => name.to_string(),
            Err(_) => return Err(self.expected("an identifier")),
        };
        self.toks.advance()?;
        Ok(name)
    }

    /// type: 'int' | 'char' | 'boolean' | className
    fn take_type(&mut self) -> Result<String, Error> {
        let ty = match &self.toks.current()?.kind {
            TokenKind::Keyword(kw @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                kw.to_string()
            }
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.expected("a type")),
        };
        self.toks.advance()?;
        Ok(ty)
    }

    fn take_return_type(&mut self) -> Result<String, Error> {
        if self.current_keyword() == Some(Keyword::Void) {
            self.toks.advance()?;
            Ok(Keyword::Void.to_string())
        } else {
            self.take_type()
        }
    }

    /// Labels are unique across the whole unit: one monotonic counter feeds
    /// every prefix.
    fn fresh_label(&mut self, prefix: &str) -> String {
        self.labels += 1;
        format!("{prefix}{}", self.labels)
    }

    fn push_variable(&mut self, name: &str) -> Result<(), Error> {
        let (segment, index) = self.resolve(name)?;
        self.writer.push(segment, index)
    }

    fn pop_variable(&mut self, name: &str) -> Result<(), Error> {
        let (segment, index) = self.resolve(name)?;
        self.writer.pop(segment, index)
    }

    fn resolve(&self, name: &str) -> Result<(Segment, u16), Error> {
        match self.table.get(name) {
            Some(entry) => Ok((entry.kind.segment(), entry.index)),
            None => Err(Error::UndefinedVariable {
                line: self.toks.line(),
                name: name.to_string(),
            }),
        }
    }

    fn expected(&self, what: &str) -> Error {
        match self.toks.current() {
            Ok(tok) => Error::Expected {
                line: tok.line,
                expected: what.to_string(),
                found: tok.kind.to_string(),
            },
            Err(_) => Error::UnexpectedEof,
        }
    }
}
