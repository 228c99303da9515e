//! Declarations: `def`, `defclass`, and `import`.

use std::collections::HashSet;

use super::{ParseError, ParseErrorKind, Parser, between, describe};
use crate::ast::{Expr, Field, ImportDeclaration};
use crate::span::surrounding;
use crate::token::{Token, TokenKind};

impl Parser {
    /// `def name(pattern) body end`, or a bare `def name`.
    pub(super) fn parse_def(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let doc = self.take_doc();
        let name = self.expect_method_name()?;

        if !self.at(TokenKind::LeftParen) {
            return Ok(Expr::method(
                between(&keyword, &name),
                doc,
                name.text,
                None,
                None,
            ));
        }

        let pattern = self.parse_parameter()?;
        let body = self.parse_block(&[TokenKind::End], "def")?;
        let end = self.expect(TokenKind::End)?;
        Ok(Expr::method(
            between(&keyword, &end),
            doc,
            name.text,
            pattern,
            Some(body),
        ))
    }

    /// Method names may be operators, as in `def +(a, b) ... end`.
    fn expect_method_name(&mut self) -> Result<Token, ParseError> {
        let kind = self.kind();
        if kind.is_operator() && kind != TokenKind::Eq {
            return Ok(self.advance());
        }
        if self.current().is_operator_name() {
            return Ok(self.advance());
        }
        self.expect_name()
    }

    pub(super) fn parse_class(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let doc = self.take_doc();
        let name = self.expect_name()?;

        let mut parents = Vec::new();
        if self.eat(TokenKind::Is).is_some() {
            loop {
                parents.push(self.expect_name()?.text);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let mut fields: Vec<Field> = Vec::new();
        let mut seen = HashSet::new();
        loop {
            self.skip_lines();
            self.collect_docs();
            match self.kind() {
                TokenKind::End => break,
                TokenKind::Var | TokenKind::Val => {
                    let start = self.current().span.clone();
                    let field = self.parse_field()?;
                    if !seen.insert(field.name.clone()) {
                        return Err(ParseError {
                            kind: ParseErrorKind::DuplicateField { name: field.name },
                            span: start,
                        });
                    }
                    fields.push(field);
                }
                TokenKind::Eof => {
                    return Err(self.error(ParseErrorKind::MissingEnd {
                        construct: "defclass",
                    }));
                }
                _ => {
                    return Err(self.error(ParseErrorKind::ExpectedToken {
                        expected: TokenKind::End,
                        found: describe(self.current()),
                    }));
                }
            }
        }
        self.pending_doc.clear();
        let end = self.expect(TokenKind::End)?;

        Ok(Expr::class(
            between(&keyword, &end),
            doc,
            name.text,
            parents,
            fields,
        ))
    }

    /// `var|val name [type] [= initializer]`, one per line.
    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let keyword = self.advance();
        let doc = self.take_doc();
        let name = self.expect_name()?;

        let mut field = Field::new(name.text, keyword.kind == TokenKind::Var).doc(doc);
        let token = self.current();
        if (token.kind == TokenKind::Name && !token.is_operator_name())
            || token.kind == TokenKind::LeftParen
        {
            field = field.type_expr(self.parse_primary()?);
        }
        if self.eat(TokenKind::Eq).is_some() {
            field = field.initializer(self.parse_expression()?);
        }

        if !matches!(self.kind(), TokenKind::Line | TokenKind::End) {
            return Err(self.error(ParseErrorKind::ExpectedToken {
                expected: TokenKind::Line,
                found: describe(self.current()),
            }));
        }
        Ok(field)
    }

    /// `import [scheme:] module [as prefix] [only] [with ... end]`
    pub(super) fn parse_import(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.advance();
        let scheme = self
            .eat(TokenKind::Field)
            .map(|t| super::expressions::label_text(&t))
            .unwrap_or_default();

        let module_token = self.current().clone();
        let module = match module_token.kind {
            TokenKind::Name if !module_token.is_operator_name() => module_token.text.clone(),
            TokenKind::String => module_token.string_value().unwrap_or_default().to_string(),
            _ => {
                return Err(self.error(ParseErrorKind::ExpectedName {
                    found: describe(&module_token),
                }));
            }
        };
        self.advance();
        let mut last = module_token;

        let mut prefix = String::new();
        if self.eat(TokenKind::As).is_some() {
            let token = self.expect_name()?;
            prefix.clone_from(&token.text);
            last = token;
        }

        let only = if let Some(token) = self.eat(TokenKind::Only) {
            last = token;
            true
        } else {
            false
        };

        let mut declarations = Vec::new();
        if self.eat(TokenKind::With).is_some() {
            loop {
                self.skip_lines();
                if self.at(TokenKind::End) {
                    break;
                }
                declarations.push(self.parse_import_declaration()?);
                if self.eat(TokenKind::Comma).is_none() && !self.at(TokenKind::Line) {
                    break;
                }
            }
            last = self.expect(TokenKind::End)?;
        }

        Ok(Expr::import(
            surrounding(Some(&keyword.span), Some(&last.span)),
            scheme,
            module,
            prefix,
            only,
            declarations,
        ))
    }

    fn parse_import_declaration(&mut self) -> Result<ImportDeclaration, ParseError> {
        let is_exported = self.eat(TokenKind::Export).is_some();
        let name = self.expect_name()?;
        let mut declaration = ImportDeclaration::new(name.text);
        if is_exported {
            declaration = declaration.exported();
        }
        if self.eat(TokenKind::As).is_some() {
            declaration = declaration.rename(self.expect_name()?.text);
        }
        Ok(declaration)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, ExprKind, Field, ImportDeclaration};
    use crate::lexer::tokenize;
    use crate::parser::{ParseErrorKind, parse};
    use crate::pattern::Pattern;

    fn parse_ok(input: &str) -> Expr {
        let tokens = tokenize("test", input).expect("should tokenize");
        parse(&tokens).expect("should parse")
    }

    fn parse_err(input: &str) -> ParseErrorKind {
        let tokens = tokenize("test", input).expect("should tokenize");
        parse(&tokens).expect_err("should fail").kind
    }

    #[test]
    fn method_with_body() {
        assert_eq!(
            parse_ok("def double(x) x * 2 end"),
            Expr::method(
                None,
                "",
                "double",
                Some(Pattern::Variable("x".to_string())),
                Some(Expr::binary_call(
                    Expr::name(None, "x"),
                    "*",
                    Expr::int(None, 2)
                )),
            )
        );
    }

    #[test]
    fn bare_method_declaration() {
        assert_eq!(
            parse_ok("def size"),
            Expr::method(None, "", "size", None, None)
        );
    }

    #[test]
    fn operator_method() {
        let expr = parse_ok("def +(a, b) add(a, b) end");
        assert!(matches!(expr.kind(), ExprKind::Method { name, .. } if name == "+"));
    }

    #[test]
    fn doc_comment_attaches_to_def() {
        let expr = parse_ok("/// Doubles it.\n/// Twice.\ndef double(x) x end");
        assert_eq!(expr.doc(), "Doubles it.\nTwice.");
    }

    #[test]
    fn inner_declaration_keeps_its_own_doc() {
        let expr = parse_ok("/// Outer.\ndef f()\n  /// Inner.\n  val x = 1\n  x\nend");
        assert_eq!(expr.doc(), "Outer.");
        let ExprKind::Method {
            body: Some(body), ..
        } = expr.kind()
        else {
            panic!("expected method with body, got {expr:?}");
        };
        let ExprKind::Sequence(items) = body.kind() else {
            panic!("expected sequence, got {body:?}");
        };
        assert_eq!(items[0].doc(), "Inner.");
    }

    #[test]
    fn doc_before_plain_expression_is_dropped() {
        let expr = parse_ok("/// Nobody owns this.\nprint(1)\ndef f");
        let ExprKind::Sequence(items) = expr.kind() else {
            panic!("expected sequence, got {expr:?}");
        };
        assert_eq!(items[1].doc(), "");
    }

    #[test]
    fn doc_is_not_handed_to_nested_declarations() {
        for input in [
            "/// Orphan.\nx = fn() 1 end",
            "/// Orphan.\nprint(fn() 1 end)",
            "/// Orphan.\nif c then val y = 1 end",
        ] {
            let expr = parse_ok(input);
            let mut documented = Vec::new();
            expr.walk(&mut |e| {
                if !e.doc().is_empty() {
                    documented.push(e.clone());
                }
            });
            assert!(documented.is_empty(), "{input:?} attached a doc: {documented:?}");
        }
    }

    #[test]
    fn doc_attaches_to_leading_fn() {
        let expr = parse_ok("/// Adds one.\nfn(n) n + 1 end");
        assert!(matches!(expr.kind(), ExprKind::Fn { .. }));
        assert_eq!(expr.doc(), "Adds one.");
    }

    #[test]
    fn class_with_fields() {
        let expr = parse_ok(
            "/// A point.\n\
             defclass Point is Shape, Printable\n\
             \t/// Horizontal.\n\
             \tvar x Int = 0\n\
             \tval y\n\
             end",
        );
        assert_eq!(
            expr,
            Expr::class(
                None,
                "A point.",
                "Point",
                vec!["Shape".to_string(), "Printable".to_string()],
                vec![
                    Field::new("x", true)
                        .doc("Horizontal.")
                        .type_expr(Expr::name(None, "Int"))
                        .initializer(Expr::int(None, 0)),
                    Field::new("y", false),
                ],
            )
        );
    }

    #[test]
    fn duplicate_class_field() {
        assert_eq!(
            parse_err("defclass P\nval x\nvar x\nend"),
            ParseErrorKind::DuplicateField {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn class_body_only_holds_fields() {
        assert!(matches!(
            parse_err("defclass P\nprint(1)\nend"),
            ParseErrorKind::ExpectedToken { .. }
        ));
    }

    #[test]
    fn unterminated_class() {
        assert_eq!(
            parse_err("defclass P\nval x\n"),
            ParseErrorKind::MissingEnd {
                construct: "defclass"
            }
        );
    }

    #[test]
    fn simple_import() {
        assert_eq!(
            parse_ok("import io.file"),
            Expr::import(None, "", "io.file", "", false, Vec::new())
        );
    }

    #[test]
    fn full_import() {
        assert_eq!(
            parse_ok(
                "import classfile: \"lib/core\" as core only with\n\
                 \texport print, read as load\n\
                 \twrite\n\
                 end"
            ),
            Expr::import(
                None,
                "classfile",
                "lib/core",
                "core",
                true,
                vec![
                    ImportDeclaration::new("print").exported(),
                    ImportDeclaration::new("read").rename("load"),
                    ImportDeclaration::new("write"),
                ],
            )
        );
    }

    #[test]
    fn import_needs_module() {
        assert!(matches!(
            parse_err("import 42"),
            ParseErrorKind::ExpectedName { .. }
        ));
    }
}
