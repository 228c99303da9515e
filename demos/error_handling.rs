//! Demonstrate error handling for invalid Magpie input.

fn main() {
    // Unterminated string literal
    match magpie_syntax::parse_str("bad.mag", "print(\"unclosed)\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(magpie_syntax::Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!(
                "  Location: line {}, column {}",
                e.span.start_line(),
                e.span.start_col()
            );
        }
        Err(magpie_syntax::Error::Parse(e)) => {
            println!("Parse error: {e}");
        }
    }

    println!();

    // Missing `end`
    match magpie_syntax::parse_str("bad.mag", "while ready do\n  step()\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(magpie_syntax::Error::Lex(e)) => {
            println!("Lex error: {e}");
        }
        Err(magpie_syntax::Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!(
                "  Location: line {}, column {}",
                e.span.start_line(),
                e.span.start_col()
            );
        }
    }
}
