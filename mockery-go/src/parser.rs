//! Recursive-descent parser for Go package clauses, imports and type
//! declarations.
//!
//! Function, variable and constant declarations are not needed for mock
//! generation; their tokens are skipped up to the next top-level `;`.

use crate::{
    ast::{ChanDir, Expr, Field, File, FuncType, ImportSpec, InterfaceElem, Param, Term, TypeSpec},
    lexer::{Tok, Token, tokenize},
};

/// A syntax error at a byte offset of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    /// 1-based line and column of the error in `src`.
    pub fn line_col(&self, src: &str) -> (usize, usize) {
        let before = &src[..self.offset.min(src.len())];
        let line = before.matches('\n').count() + 1;
        let col = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
        (line, col)
    }
}

type PResult<T> = std::result::Result<T, ParseError>;

/// Parse a complete source file.
pub fn parse_file(src: &str) -> PResult<File> {
    Parser::new(src).file()
}

/// Read only the package clause of a file.
pub fn parse_package_name(src: &str) -> Option<String> {
    let mut parser = Parser::new(src);
    parser.package_clause().ok()
}

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            tokens: tokenize(src),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<Tok<'src>> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<Tok<'src>> {
        self.tokens.get(self.pos + n).map(|t| t.tok)
    }

    fn eat(&mut self, tok: Tok<'_>) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.src.len(), |t| t.start)
    }

    fn error<T>(&self, expected: &str) -> PResult<T> {
        let found = match self.peek() {
            Some(tok) => tok.describe(),
            None => "end of file".to_string(),
        };
        Err(ParseError {
            message: format!("expected {expected}, found {found}"),
            offset: self.offset(),
        })
    }

    fn expect(&mut self, tok: Tok<'_>, expected: &str) -> PResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            self.error(expected)
        }
    }

    fn ident(&mut self) -> PResult<String> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                Ok(name.to_string())
            }
            _ => self.error("identifier"),
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(Tok::Semi) {}
    }

    /// A declaration ends with `;`, or directly before a closing `)`/`}`.
    fn end_of_spec(&mut self) -> PResult<()> {
        match self.peek() {
            Some(Tok::Semi) => {
                self.pos += 1;
                Ok(())
            }
            None | Some(Tok::RParen) | Some(Tok::RBrace) => Ok(()),
            _ => self.error("';' or newline"),
        }
    }

    fn package_clause(&mut self) -> PResult<String> {
        self.skip_semis();
        self.expect(Tok::Package, "'package'")?;
        let name = self.ident()?;
        self.end_of_spec()?;
        Ok(name)
    }

    fn file(&mut self) -> PResult<File> {
        let mut file = File {
            package: self.package_clause()?,
            ..Default::default()
        };

        while let Some(tok) = self.peek() {
            match tok {
                Tok::Semi => {
                    self.pos += 1;
                }
                Tok::Import => self.import_decl(&mut file.imports)?,
                Tok::Type => self.type_decl(&mut file.types)?,
                _ => self.skip_decl(),
            }
        }
        Ok(file)
    }

    fn import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> PResult<()> {
        self.expect(Tok::Import, "'import'")?;
        if self.eat(Tok::LParen) {
            loop {
                self.skip_semis();
                if self.eat(Tok::RParen) {
                    break;
                }
                imports.push(self.import_spec()?);
                self.end_of_spec()?;
            }
        } else {
            imports.push(self.import_spec()?);
        }
        self.end_of_spec()
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.peek() {
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                Some(name.to_string())
            }
            Some(Tok::Dot) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };
        match self.peek() {
            Some(Tok::String(lit)) => {
                self.pos += 1;
                Ok(ImportSpec {
                    name,
                    path: unquote(lit),
                })
            }
            _ => self.error("import path"),
        }
    }

    fn type_decl(&mut self, types: &mut Vec<TypeSpec>) -> PResult<()> {
        self.expect(Tok::Type, "'type'")?;
        if self.eat(Tok::LParen) {
            loop {
                self.skip_semis();
                if self.eat(Tok::RParen) {
                    break;
                }
                types.push(self.type_spec()?);
                self.end_of_spec()?;
            }
        } else {
            types.push(self.type_spec()?);
        }
        self.end_of_spec()
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.ident()?;
        let type_params = if self.peek() == Some(Tok::LBrack) && self.at_type_params() {
            self.type_params()?
        } else {
            Vec::new()
        };
        let alias = self.eat(Tok::Assign);
        let ty = self.ty()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
        })
    }

    /// At `[` after a type name: a type parameter list rather than an
    /// array length. `[N]T`, `[pkg.N]T` and `[N+1]T` are arrays.
    fn at_type_params(&self) -> bool {
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(Tok::Ident(_)), Some(next)) => matches!(
                next,
                Tok::Ident(_)
                    | Tok::Interface
                    | Tok::Star
                    | Tok::LBrack
                    | Tok::Tilde
                    | Tok::Func
                    | Tok::Map
                    | Tok::Chan
                    | Tok::Struct
                    | Tok::LParen
                    | Tok::Comma
                    | Tok::Arrow
            ),
            _ => false,
        }
    }

    fn type_params(&mut self) -> PResult<Vec<Field>> {
        self.expect(Tok::LBrack, "'['")?;
        let mut groups = Vec::new();
        loop {
            if self.eat(Tok::RBrack) {
                break;
            }
            let mut names = vec![self.ident()?];
            while self.peek() == Some(Tok::Comma) && matches!(self.peek_at(1), Some(Tok::Ident(_)))
            {
                // `K, V any` lists names; `K comparable, V any` starts a new group
                if matches!(self.peek_at(2), Some(Tok::Comma) | Some(Tok::Ident(_))) {
                    self.pos += 1;
                    names.push(self.ident()?);
                } else {
                    break;
                }
            }
            let ty = self.constraint()?;
            groups.push(Field {
                names,
                ty,
                tag: None,
            });
            if !self.eat(Tok::Comma) {
                self.expect(Tok::RBrack, "']'")?;
                break;
            }
        }
        Ok(groups)
    }

    /// A type or a union of `~`-terms.
    fn constraint(&mut self) -> PResult<Expr> {
        let mut terms = Vec::new();
        loop {
            let tilde = self.eat(Tok::Tilde);
            let ty = self.ty()?;
            terms.push(Term { tilde, ty });
            if !self.eat(Tok::Pipe) {
                break;
            }
        }
        if terms.len() == 1 && !terms[0].tilde {
            return Ok(terms.remove(0).ty);
        }
        Ok(Expr::Union(terms))
    }

    fn starts_type(tok: Option<Tok<'_>>) -> bool {
        matches!(
            tok,
            Some(
                Tok::Ident(_)
                    | Tok::Star
                    | Tok::LBrack
                    | Tok::Map
                    | Tok::Chan
                    | Tok::Arrow
                    | Tok::Func
                    | Tok::Struct
                    | Tok::Interface
                    | Tok::LParen
            )
        )
    }

    fn ty(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                let base = if self.peek() == Some(Tok::Dot)
                    && matches!(self.peek_at(1), Some(Tok::Ident(_)))
                {
                    self.pos += 1;
                    Expr::Qualified {
                        package: name.to_string(),
                        name: self.ident()?,
                    }
                } else {
                    Expr::Ident(name.to_string())
                };
                if self.peek() == Some(Tok::LBrack) {
                    self.pos += 1;
                    let args = self.type_list(Tok::RBrack)?;
                    return Ok(Expr::Instance {
                        base: Box::new(base),
                        args,
                    });
                }
                Ok(base)
            }
            Some(Tok::Star) => {
                self.pos += 1;
                Ok(Expr::Pointer(Box::new(self.ty()?)))
            }
            Some(Tok::LBrack) => {
                self.pos += 1;
                if self.eat(Tok::RBrack) {
                    return Ok(Expr::Slice(Box::new(self.ty()?)));
                }
                let len = self.array_len()?;
                Ok(Expr::Array {
                    len,
                    elem: Box::new(self.ty()?),
                })
            }
            Some(Tok::Map) => {
                self.pos += 1;
                self.expect(Tok::LBrack, "'['")?;
                let key = self.ty()?;
                self.expect(Tok::RBrack, "']'")?;
                let value = self.ty()?;
                Ok(Expr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            Some(Tok::Chan) => {
                self.pos += 1;
                let dir = if self.eat(Tok::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(Expr::Chan {
                    dir,
                    elem: Box::new(self.ty()?),
                })
            }
            Some(Tok::Arrow) => {
                self.pos += 1;
                self.expect(Tok::Chan, "'chan'")?;
                Ok(Expr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.ty()?),
                })
            }
            Some(Tok::Func) => {
                self.pos += 1;
                Ok(Expr::Func(self.signature()?))
            }
            Some(Tok::Struct) => self.struct_type(),
            Some(Tok::Interface) => self.interface_type(),
            Some(Tok::LParen) => {
                self.pos += 1;
                let inner = self.ty()?;
                self.expect(Tok::RParen, "')'")?;
                Ok(inner)
            }
            _ => self.error("type"),
        }
    }

    fn type_list(&mut self, close: Tok<'_>) -> PResult<Vec<Expr>> {
        let mut list = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(close) {
                break;
            }
            list.push(self.ty()?);
            self.skip_semis();
            if !self.eat(Tok::Comma) {
                self.expect(close, "closing bracket")?;
                break;
            }
        }
        Ok(list)
    }

    /// Source text of an array length up to the matching `]`, consumed.
    fn array_len(&mut self) -> PResult<String> {
        let start = self.offset();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return self.error("']'"),
                Some(Tok::LBrack | Tok::LParen | Tok::LBrace) => depth += 1,
                Some(Tok::RParen | Tok::RBrace) => depth = depth.saturating_sub(1),
                Some(Tok::RBrack) if depth == 0 => {
                    let end = self.offset();
                    self.pos += 1;
                    return Ok(self.src[start..end].trim().to_string());
                }
                Some(Tok::RBrack) => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn signature(&mut self) -> PResult<FuncType> {
        let params = self.params()?;
        let results = if self.peek() == Some(Tok::LParen) {
            self.params()?
        } else if Self::starts_type(self.peek()) {
            vec![Param {
                name: None,
                ty: self.ty()?,
                variadic: false,
            }]
        } else {
            Vec::new()
        };
        Ok(FuncType { params, results })
    }

    /// Whether the identifier at the cursor names a parameter or field, as
    /// opposed to being (the start of) its type.
    fn at_name(&self) -> bool {
        if !matches!(self.peek(), Some(Tok::Ident(_))) {
            return false;
        }
        match self.peek_at(1) {
            Some(
                Tok::Ident(_)
                | Tok::Star
                | Tok::Map
                | Tok::Chan
                | Tok::Func
                | Tok::Struct
                | Tok::Interface
                | Tok::Arrow
                | Tok::Ellipsis
                | Tok::LParen,
            ) => true,
            Some(Tok::LBrack) => {
                if self.peek_at(2) == Some(Tok::RBrack) {
                    return true;
                }
                // `name [N]T` versus the instantiation `List[T]`
                let mut depth = 0usize;
                let mut i = self.pos + 1;
                while let Some(token) = self.tokens.get(i) {
                    match token.tok {
                        Tok::LBrack | Tok::LParen | Tok::LBrace => depth += 1,
                        Tok::RBrack | Tok::RParen | Tok::RBrace => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                Self::starts_type(self.tokens.get(i + 1).map(|t| t.tok))
            }
            _ => false,
        }
    }

    fn params(&mut self) -> PResult<Vec<Param>> {
        self.expect(Tok::LParen, "'('")?;
        let mut params = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(Tok::RParen) {
                break;
            }
            let name = if self.at_name() {
                Some(self.ident()?)
            } else {
                None
            };
            let variadic = self.eat(Tok::Ellipsis);
            let ty = self.ty()?;
            params.push(Param { name, ty, variadic });
            self.skip_semis();
            if !self.eat(Tok::Comma) {
                self.expect(Tok::RParen, "')'")?;
                break;
            }
        }
        self.group_params(params)
    }

    /// In `(a, b int)` the first entry parses as the type `a`; once any
    /// entry is named, bare identifiers are names sharing the next type.
    fn group_params(&self, params: Vec<Param>) -> PResult<Vec<Param>> {
        if params.iter().all(|p| p.name.is_none()) {
            return Ok(params);
        }

        let mut grouped: Vec<Param> = Vec::with_capacity(params.len());
        let mut shared: Option<(Expr, bool)> = None;
        for param in params.into_iter().rev() {
            match param.name {
                Some(_) => {
                    shared = Some((param.ty.clone(), param.variadic));
                    grouped.push(param);
                }
                None => match (param.ty, &shared) {
                    (Expr::Ident(name), Some((ty, variadic))) => grouped.push(Param {
                        name: Some(name),
                        ty: ty.clone(),
                        variadic: *variadic,
                    }),
                    _ => {
                        return Err(ParseError {
                            message: "mixed named and unnamed parameters".to_string(),
                            offset: self.offset(),
                        });
                    }
                },
            }
        }
        grouped.reverse();
        Ok(grouped)
    }

    fn struct_type(&mut self) -> PResult<Expr> {
        self.expect(Tok::Struct, "'struct'")?;
        self.expect(Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(Tok::RBrace) {
                break;
            }

            let embedded = match (self.peek(), self.peek_at(1)) {
                (Some(Tok::Star), _) => true,
                (Some(Tok::Ident(_)), Some(Tok::Dot | Tok::Semi | Tok::RBrace | Tok::String(_))) => {
                    true
                }
                (Some(Tok::Ident(_)), Some(Tok::LBrack)) => !self.at_name(),
                _ => false,
            };

            let mut names = Vec::new();
            if !embedded {
                names.push(self.ident()?);
                while self.eat(Tok::Comma) {
                    names.push(self.ident()?);
                }
            }
            let ty = self.ty()?;
            let tag = match self.peek() {
                Some(Tok::String(lit)) => {
                    self.pos += 1;
                    Some(lit.to_string())
                }
                _ => None,
            };
            fields.push(Field { names, ty, tag });
            self.end_of_spec()?;
        }
        Ok(Expr::Struct(fields))
    }

    fn interface_type(&mut self) -> PResult<Expr> {
        self.expect(Tok::Interface, "'interface'")?;
        self.expect(Tok::LBrace, "'{'")?;
        let mut elems = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(Tok::RBrace) {
                break;
            }
            if matches!(self.peek(), Some(Tok::Ident(_))) && self.peek_at(1) == Some(Tok::LParen) {
                let name = self.ident()?;
                let sig = self.signature()?;
                elems.push(InterfaceElem::Method { name, sig });
            } else {
                elems.push(InterfaceElem::Embed(self.constraint()?));
            }
            self.end_of_spec()?;
        }
        Ok(Expr::Interface(elems))
    }

    /// Skip a declaration this parser does not model.
    fn skip_decl(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth = depth.saturating_sub(1),
                Tok::Semi if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

fn unquote(lit: &str) -> String {
    lit.trim_matches(|c| c == '"' || c == '`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    fn param(name: Option<&str>, ty: Expr) -> Param {
        Param {
            name: name.map(str::to_string),
            ty,
            variadic: false,
        }
    }

    fn only_type(src: &str) -> TypeSpec {
        let file = parse_file(src).unwrap();
        assert_eq!(file.types.len(), 1);
        file.types.into_iter().next().unwrap()
    }

    fn methods(spec: &TypeSpec) -> Vec<(&str, &FuncType)> {
        match &spec.ty {
            Expr::Interface(elems) => elems
                .iter()
                .filter_map(|e| match e {
                    InterfaceElem::Method { name, sig } => Some((name.as_str(), sig)),
                    _ => None,
                })
                .collect(),
            other => panic!("not an interface: {other:?}"),
        }
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse_file(
            r#"package store

import "context"

import (
	"database/sql"
	sq "github.com/Masterminds/squirrel"
	. "strings"
	_ "embed"
)
"#,
        )
        .unwrap();

        assert_eq!(file.package, "store");
        let imports: Vec<(Option<&str>, &str)> = file
            .imports
            .iter()
            .map(|i| (i.name.as_deref(), i.path.as_str()))
            .collect();
        assert_eq!(
            imports,
            vec![
                (None, "context"),
                (None, "database/sql"),
                (Some("sq"), "github.com/Masterminds/squirrel"),
                (Some("."), "strings"),
                (Some("_"), "embed"),
            ]
        );
    }

    #[test]
    fn test_interface_methods() {
        let spec = only_type(
            "package io\n\ntype Writer interface {\n\tWrite(p []byte) (n int, err error)\n\tClose() error\n}\n",
        );
        assert_eq!(spec.name, "Writer");
        let methods = methods(&spec);
        assert_eq!(methods.len(), 2);

        let (name, sig) = methods[0];
        assert_eq!(name, "Write");
        assert_eq!(sig.params, vec![param(Some("p"), Expr::Slice(Box::new(ident("byte"))))]);
        assert_eq!(
            sig.results,
            vec![param(Some("n"), ident("int")), param(Some("err"), ident("error"))]
        );

        let (name, sig) = methods[1];
        assert_eq!(name, "Close");
        assert!(sig.params.is_empty());
        assert_eq!(sig.results, vec![param(None, ident("error"))]);
    }

    #[test]
    fn test_grouped_and_unnamed_params() {
        let spec = only_type(
            "package p\ntype T interface {\n\tA(a, b int, c string)\n\tB(int, int, error) (error, int)\n\tC(ctx context.Context, opts ...Option)\n}\n",
        );
        let methods = methods(&spec);

        assert_eq!(
            methods[0].1.params,
            vec![
                param(Some("a"), ident("int")),
                param(Some("b"), ident("int")),
                param(Some("c"), ident("string")),
            ]
        );
        assert_eq!(
            methods[1].1.params,
            vec![param(None, ident("int")), param(None, ident("int")), param(None, ident("error"))]
        );

        let c = &methods[2].1.params;
        assert_eq!(
            c[0].ty,
            Expr::Qualified {
                package: "context".into(),
                name: "Context".into()
            }
        );
        assert!(c[1].variadic);
        assert_eq!(c[1].ty, ident("Option"));
    }

    #[test]
    fn test_generic_interface() {
        let spec = only_type(
            "package p\ntype Repo[K comparable, V any] interface {\n\tGet(key K) (V, bool)\n\tAll() map[K]V\n}\n",
        );
        assert_eq!(spec.type_params.len(), 2);
        assert_eq!(spec.type_params[0].names, vec!["K"]);
        assert_eq!(spec.type_params[0].ty, ident("comparable"));
        assert_eq!(spec.type_params[1].names, vec!["V"]);

        let spec = only_type("package p\ntype Pair[K, V any] interface{ Key() K }\n");
        assert_eq!(spec.type_params.len(), 1);
        assert_eq!(spec.type_params[0].names, vec!["K", "V"]);
    }

    #[test]
    fn test_constraint_union() {
        let spec = only_type("package p\ntype Number interface {\n\t~int | ~float64 | MyInt\n}\n");
        match &spec.ty {
            Expr::Interface(elems) => match &elems[0] {
                InterfaceElem::Embed(Expr::Union(terms)) => {
                    assert_eq!(terms.len(), 3);
                    assert!(terms[0].tilde);
                    assert!(!terms[2].tilde);
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_array_vs_type_params() {
        let spec = only_type("package p\ntype Buf [N]byte\n");
        assert!(spec.type_params.is_empty());
        assert_eq!(
            spec.ty,
            Expr::Array {
                len: "N".into(),
                elem: Box::new(ident("byte"))
            }
        );

        let spec = only_type("package p\ntype Box[T any] struct{ v T }\n");
        assert_eq!(spec.type_params.len(), 1);
    }

    #[test]
    fn test_type_group_and_alias() {
        let file = parse_file(
            "package p\n\ntype (\n\tA = B\n\tC interface{ Do() }\n)\n",
        )
        .unwrap();
        assert_eq!(file.types.len(), 2);
        assert!(file.types[0].alias);
        assert!(!file.types[1].alias);
    }

    #[test]
    fn test_skips_functions_and_values() {
        let file = parse_file(
            r#"package p

var x = map[string]int{"a": 1}

const (
	A = iota
	B
)

func (s *S) Do(ctx context.Context) error {
	if x := f(); x != nil {
		return x
	}
	return nil
}

type Doer interface {
	Do(ctx context.Context) error
}
"#,
        )
        .unwrap();
        assert_eq!(file.types.len(), 1);
        assert_eq!(file.types[0].name, "Doer");
    }

    #[test]
    fn test_complex_types() {
        let spec = only_type(
            "package p\ntype T interface {\n\tM(f func(int) error, ch <-chan struct{}, s chan<- *pkg.List[string], a [4]int) interface{ Close() error }\n}\n",
        );
        let methods = methods(&spec);
        let params = &methods[0].1.params;
        assert_eq!(params.len(), 4);
        assert!(matches!(params[0].ty, Expr::Func(_)));
        assert!(matches!(params[1].ty, Expr::Chan { dir: ChanDir::Recv, .. }));
        match &params[2].ty {
            Expr::Chan { dir: ChanDir::Send, elem } => match elem.as_ref() {
                Expr::Pointer(inner) => assert!(matches!(inner.as_ref(), Expr::Instance { .. })),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(params[3].ty, Expr::Array { .. }));
        assert!(matches!(methods[0].1.results[0].ty, Expr::Interface(_)));
    }

    #[test]
    fn test_struct_fields() {
        let spec = only_type(
            "package p\ntype S struct {\n\tio.Reader\n\t*Base\n\ta, b int `json:\"a\"`\n\tList[int]\n}\n",
        );
        match spec.ty {
            Expr::Struct(fields) => {
                assert_eq!(fields.len(), 4);
                assert!(fields[0].names.is_empty());
                assert!(fields[1].names.is_empty());
                assert_eq!(fields[2].names, vec!["a", "b"]);
                assert_eq!(fields[2].tag.as_deref(), Some("`json:\"a\"`"));
                assert!(fields[3].names.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error_position() {
        let src = "package p\n\ntype T interface {\n\tM(\n";
        let err = parse_file(src).unwrap_err();
        let (line, _) = err.line_col(src);
        assert!(line >= 4, "line {line}");
    }

    #[test]
    fn test_package_name_only() {
        assert_eq!(
            parse_package_name("// Package x does things.\npackage x\n\nfunc broken( {"),
            Some("x".to_string())
        );
    }
}
