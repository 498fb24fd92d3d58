//! Go tokenizer with automatic semicolon insertion.

use std::ops::Range;

use logos::{Lexer as LogosLexer, Logos};

fn line_comment(lex: &mut LogosLexer<'_, RawTok>) {
    let rest = lex.remainder();
    let end = rest.find('\n').unwrap_or(rest.len());
    lex.bump(end);
}

fn block_comment(lex: &mut LogosLexer<'_, RawTok>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawTok {
    #[token("\u{FEFF}")]
    Bom,

    #[token("\n")]
    Newline,
    #[token("//", line_comment)]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    #[token("package")]
    KwPackage,
    #[token("import")]
    KwImport,
    #[token("type")]
    KwType,
    #[token("func")]
    KwFunc,
    #[token("var")]
    KwVar,
    #[token("const")]
    KwConst,
    #[token("interface")]
    KwInterface,
    #[token("struct")]
    KwStruct,
    #[token("map")]
    KwMap,
    #[token("chan")]
    KwChan,
    #[token("break")]
    #[token("continue")]
    #[token("fallthrough")]
    #[token("return")]
    KwTerminal,
    #[token("case")]
    #[token("default")]
    #[token("defer")]
    #[token("else")]
    #[token("for")]
    #[token("go")]
    #[token("goto")]
    #[token("if")]
    #[token("range")]
    #[token("select")]
    #[token("switch")]
    KwOther,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")]
    Ident,
    #[regex(r"[0-9][0-9a-zA-Z_.]*")]
    #[regex(r"\.[0-9][0-9a-zA-Z_]*")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r"`[^`]*`")]
    RawString,
    #[regex(r"'([^'\\\n]|\\.)+'")]
    Rune,

    #[token("...")]
    Ellipsis,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("*")]
    Star,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("=")]
    Assign,
    #[token("<-")]
    Arrow,
    #[token("++")]
    #[token("--")]
    IncDec,
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("&&")]
    #[token("||")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token(":=")]
    #[token("+")]
    #[token("-")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("^")]
    #[token("!")]
    #[token("<")]
    #[token(">")]
    Operator,
}

/// A Go token borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'src> {
    Ident(&'src str),
    /// Interpreted or raw string literal, quotes included.
    String(&'src str),
    /// Number or rune literal.
    Literal(&'src str),

    Package,
    Import,
    Type,
    Func,
    Var,
    Const,
    Interface,
    Struct,
    Map,
    Chan,
    /// Any other keyword.
    Keyword(&'src str),

    Ellipsis,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Dot,
    Colon,
    Star,
    Tilde,
    Pipe,
    Assign,
    Arrow,
    /// Any other operator.
    Op(&'src str),

    Illegal(&'src str),
}

impl Tok<'_> {
    pub fn describe(&self) -> String {
        match self {
            Tok::Ident(s) | Tok::String(s) | Tok::Literal(s) | Tok::Keyword(s) | Tok::Op(s) => {
                format!("'{}'", s)
            }
            Tok::Illegal(s) => format!("illegal character '{}'", s),
            Tok::Semi => "';' or newline".to_string(),
            other => format!("{:?}", other),
        }
    }
}

/// A token and its byte range in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub tok: Tok<'src>,
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl RawTok {
    /// Whether a newline after this token terminates the statement.
    fn ends_statement(self) -> bool {
        matches!(
            self,
            RawTok::Ident
                | RawTok::Number
                | RawTok::String
                | RawTok::RawString
                | RawTok::Rune
                | RawTok::KwTerminal
                | RawTok::IncDec
                | RawTok::RParen
                | RawTok::RBrack
                | RawTok::RBrace
        )
    }

    fn to_tok(self, slice: &str) -> Tok<'_> {
        match self {
            RawTok::Ident => Tok::Ident(slice),
            RawTok::String | RawTok::RawString => Tok::String(slice),
            RawTok::Number | RawTok::Rune => Tok::Literal(slice),
            RawTok::KwPackage => Tok::Package,
            RawTok::KwImport => Tok::Import,
            RawTok::KwType => Tok::Type,
            RawTok::KwFunc => Tok::Func,
            RawTok::KwVar => Tok::Var,
            RawTok::KwConst => Tok::Const,
            RawTok::KwInterface => Tok::Interface,
            RawTok::KwStruct => Tok::Struct,
            RawTok::KwMap => Tok::Map,
            RawTok::KwChan => Tok::Chan,
            RawTok::KwTerminal | RawTok::KwOther => Tok::Keyword(slice),
            RawTok::Ellipsis => Tok::Ellipsis,
            RawTok::LParen => Tok::LParen,
            RawTok::RParen => Tok::RParen,
            RawTok::LBrack => Tok::LBrack,
            RawTok::RBrack => Tok::RBrack,
            RawTok::LBrace => Tok::LBrace,
            RawTok::RBrace => Tok::RBrace,
            RawTok::Comma => Tok::Comma,
            RawTok::Semi => Tok::Semi,
            RawTok::Dot => Tok::Dot,
            RawTok::Colon => Tok::Colon,
            RawTok::Star => Tok::Star,
            RawTok::Tilde => Tok::Tilde,
            RawTok::Pipe => Tok::Pipe,
            RawTok::Assign => Tok::Assign,
            RawTok::Arrow => Tok::Arrow,
            RawTok::IncDec | RawTok::Operator => Tok::Op(slice),
            RawTok::Bom | RawTok::Newline | RawTok::LineComment | RawTok::BlockComment => {
                Tok::Illegal(slice)
            }
        }
    }
}

/// Tokenize Go source, inserting `;` where a newline ends a statement.
///
/// Comments are dropped. Unknown characters become [`Tok::Illegal`] so the
/// parser can decide whether they matter.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut lexer = RawTok::lexer(src);
    let mut tokens = Vec::new();
    let mut can_end = false;

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let raw = match raw {
            Ok(raw) => raw,
            Err(()) => {
                tokens.push(Token {
                    tok: Tok::Illegal(slice),
                    start: span.start,
                    end: span.end,
                });
                can_end = false;
                continue;
            }
        };

        match raw {
            RawTok::Bom | RawTok::LineComment => continue,
            RawTok::Newline => {
                if can_end {
                    tokens.push(semi(span.start));
                    can_end = false;
                }
                continue;
            }
            RawTok::BlockComment => {
                if can_end && slice.contains('\n') {
                    tokens.push(semi(span.start));
                    can_end = false;
                }
                continue;
            }
            _ => {}
        }

        can_end = raw.ends_statement();
        tokens.push(Token {
            tok: raw.to_tok(slice),
            start: span.start,
            end: span.end,
        });
    }

    if can_end {
        tokens.push(semi(src.len()));
    }
    tokens
}

fn semi(at: usize) -> Token<'static> {
    Token {
        tok: Tok::Semi,
        start: at,
        end: at,
    }
}
