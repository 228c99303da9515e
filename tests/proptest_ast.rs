//! Property-based tests with proptest.
//!
//! Generate random trees, format them, parse them back, and check that
//! the same tree comes out and the text is stable. Generated trees stay
//! within what the printer can express: plain identifiers, non-empty
//! records, and no docs.

use std::collections::BTreeMap;
use std::sync::Arc;

use magpie_syntax::formatter::quote_string;
use magpie_syntax::{Expr, Literal, Pattern, Span, TokenKind, format, parse_str, tokenize};
use proptest::prelude::*;

// -- Leaf strategies --

/// Identifier that is not a keyword or a boolean literal.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_filter("reserved word", |s| {
        TokenKind::reserved(s).is_none() && s != "true" && s != "false"
    })
}

/// Printable ASCII, including quotes and backslashes.
fn string_value() -> impl Strategy<Value = String> {
    "[ -~]{0,12}"
}

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (-1000i64..1000).prop_map(|n| Expr::int(None, n)),
        any::<bool>().prop_map(|b| Expr::bool(None, b)),
        string_value().prop_map(|s| Expr::string(None, s)),
        Just(Expr::nothing(None)),
        identifier().prop_map(|n| Expr::name(None, n)),
    ]
}

fn operator() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("<"),
        Just("=="),
        Just("++"),
    ]
}

/// Expression at a given depth (limits recursion).
fn expr(depth: u32) -> BoxedStrategy<Expr> {
    if depth == 0 {
        return leaf().boxed();
    }
    let inner = || expr(depth - 1);

    let binary = (inner(), operator(), inner())
        .prop_map(|(left, op, right)| Expr::binary_call(left, op, right));
    let call = (
        identifier(),
        prop_oneof![
            Just(Expr::nothing(None)),
            inner(),
            prop::collection::vec(inner(), 2..=3).prop_map(Expr::positional_record),
        ],
    )
        .prop_map(|(name, argument)| Expr::call(None, name, argument));
    let record = prop::collection::btree_map(identifier(), inner(), 1..=3)
        .prop_map(|fields: BTreeMap<String, Expr>| {
            Expr::record(None, fields.into_iter().collect())
        });
    let array = prop::collection::vec(inner(), 0..=3).prop_map(|items| Expr::array(None, items));
    let conditional = (inner(), inner(), prop::option::of(inner()))
        .prop_map(|(c, then, otherwise)| Expr::if_(None, c, then, otherwise));
    let repeat = (inner(), inner()).prop_map(|(c, body)| Expr::while_(None, c, body));
    let quote = inner().prop_map(|body| Expr::quote(None, body));

    prop_oneof![
        4 => leaf(),
        2 => binary,
        2 => call,
        1 => record,
        1 => array,
        1 => conditional,
        1 => repeat,
        1 => quote,
    ]
    .boxed()
}

/// Top-level statement: a binding, an assignment, a return, or an
/// expression.
fn statement() -> impl Strategy<Value = Expr> {
    prop_oneof![
        3 => expr(2),
        1 => (any::<bool>(), identifier(), expr(2)).prop_map(|(mutable, name, value)| {
            Expr::var(None, mutable, Pattern::Variable(name), value)
        }),
        1 => (identifier(), expr(2)).prop_map(|(name, value)| Expr::assign(None, name, value)),
        1 => expr(1).prop_map(|value| Expr::return_(None, value)),
    ]
}

fn program() -> impl Strategy<Value = Expr> {
    prop::collection::vec(statement(), 0..=4).prop_map(Expr::sequence)
}

fn span() -> impl Strategy<Value = Span> {
    (1usize..20, 1usize..40, 0usize..5, 1usize..40).prop_map(|(line, col, lines, end_col)| {
        let end_col = if lines == 0 { col + end_col } else { end_col };
        Span::new(Arc::from("gen"), line, col, line + lines, end_col)
    })
}

// -- Property tests --

proptest! {
    /// Printing then parsing gives back the tree, and printing that
    /// tree again gives the same text.
    #[test]
    fn format_roundtrips(tree in program()) {
        let r1 = format(&tree);
        let parsed = parse_str("gen.mag", &r1)
            .map_err(|e| {
                TestCaseError::fail(
                    std::format!("parse error: {e}\n--- output ---\n{r1}"))
            })?;
        prop_assert_eq!(&parsed, &tree, "tree mismatch\n--- output ---\n{}", r1);
        prop_assert_eq!(format(&parsed), r1);
    }

    /// Every integer in range lexes back to itself.
    #[test]
    fn integers_lex_exactly(n in any::<i64>()) {
        let tokens = tokenize("gen", &n.to_string())
            .map_err(|e| TestCaseError::fail(std::format!("lex error: {e}")))?;
        prop_assert_eq!(tokens[0].kind, TokenKind::Int);
        prop_assert_eq!(tokens[0].value.clone(), Some(Literal::Int(n)));
        prop_assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    /// A quoted string lexes back to the original text.
    #[test]
    fn quoted_strings_lex_exactly(s in string_value()) {
        let quoted = quote_string(&s);
        let tokens = tokenize("gen", &quoted)
            .map_err(|e| TestCaseError::fail(std::format!("lex error: {e}\n{quoted}")))?;
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].string_value(), Some(s.as_str()));
    }

    /// Span union does not depend on order or grouping.
    #[test]
    fn span_union_is_a_semilattice(a in span(), b in span(), c in span()) {
        prop_assert_eq!(a.union(&b), b.union(&a));
        prop_assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        prop_assert_eq!(a.union(&a), a.clone());
        let u = a.union(&b);
        prop_assert!(u.contains(&a) && u.contains(&b));
    }
}
