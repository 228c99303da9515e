//! Build a Magpie program in code and print it as source.

use magpie_syntax::{Expr, Field, MatchCase, Pattern};

fn main() {
    let counter = Expr::class(
        None,
        "Counts things.",
        "Counter",
        Vec::new(),
        vec![
            Field::new("count", true)
                .type_expr(Expr::name(None, "Int"))
                .initializer(Expr::int(None, 0)),
        ],
    );

    let bump = Expr::method(
        None,
        "",
        "bump",
        Some(Pattern::typed("c", Expr::name(None, "Counter"))),
        Some(Expr::assign(
            None,
            "count",
            Expr::binary_call(Expr::name(None, "count"), "+", Expr::int(None, 1)),
        )),
    );

    let classify = Expr::match_(
        None,
        Expr::name(None, "n"),
        vec![
            MatchCase::new(
                Some(Pattern::value(Expr::int(None, 0))),
                Expr::string(None, "none"),
            ),
            MatchCase::catch_all(Expr::string(None, "some")),
        ],
    );

    let program = Expr::sequence(vec![counter, bump, classify]);
    print!("{}", magpie_syntax::format(&program));
}
