//! Parse a Magpie program and re-format it.

use magpie_syntax::ExprKind;

fn main() {
    let input = "\
/// Greets everyone on the list.
def greet(names)
  for name in names do
    print(\"hello, \" ++ name)
  end
end

greet([\"ada\", \"grace\"])
";

    let program = magpie_syntax::parse_str("greet.mag", input).expect("parse failed");

    if let ExprKind::Sequence(items) = program.kind() {
        println!("Statements: {}", items.len());
        for item in items {
            let at = magpie_syntax::span::describe(item.span());
            match item.kind() {
                ExprKind::Method { name, .. } => println!("  def {name} at {at}"),
                ExprKind::Call { name, .. } => println!("  call {name} at {at}"),
                other => println!("  {other:?}"),
            }
        }
    }

    let output = magpie_syntax::format(&program);
    println!("\nFormatted output:\n{output}");
}
