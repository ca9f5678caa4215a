use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::Editor;
use tracing::debug;

use monkey_interpreter::{object::Object, Environment, Evaluator};
use monkey_parser::{ast::Statement, lexer::Lexer, parser::Parser};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn repl(prompt: &str) {
    println!("monkey language v{}", VERSION);

    let env = Rc::new(RefCell::new(Environment::new()));

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(prompt);
        match readline {
            Ok(line) => {
                if line.trim() == "exit" || line.trim() == "quit" {
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                match interpret(&env, &line) {
                    Ok(Some(output)) | Err(output) => println!("{}", output),
                    Ok(None) => {}
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}

/// Evaluate a whole script once in a fresh environment, printing its result.
///
/// Returns `false` if the script failed to parse or evaluate.
pub fn run_script(source: &str) -> bool {
    let env = Rc::new(RefCell::new(Environment::new()));

    match interpret(&env, source) {
        Ok(output) => {
            if let Some(output) = output {
                println!("{}", output);
            }
            true
        }
        Err(output) => {
            eprintln!("{}", output);
            false
        }
    }
}

/// Parse and evaluate `source` against `env`.
///
/// Both the value and the failure are rendered the way they are shown to the user.
/// Input ending in a `let` binding has no value to show.
fn interpret(env: &Rc<RefCell<Environment>>, source: &str) -> Result<Option<String>, String> {
    let prog = Parser::new(Lexer::new(source)).parse().map_err(|errors| {
        debug!(errors = errors.len(), "rejected input");

        let mut output = String::from("Parser errors:");
        for error in errors {
            output.push_str(&format!("\n\t{} {}", error, error.span().at_str()));
        }
        output
    })?;

    let mut e = Evaluator::new_with_env(Rc::clone(env));

    match e.eval(&prog) {
        Ok(result_obj) => {
            let binding = matches!(prog.statements.last(), Some(Statement::Let { .. }));

            if binding && matches!(*result_obj, Object::Null) {
                Ok(None)
            } else {
                Ok(Some(result_obj.to_string()))
            }
        }
        Err(result_err) => Err(format!("ERROR: {}", result_err)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::repl::interpret;
    use monkey_interpreter::Environment;

    #[test]
    fn bindings_survive_between_lines() {
        let env = Rc::new(RefCell::new(Environment::new()));

        let lines = vec![
            ("let add = fn(a, b) { a + b };", Ok(None)),
            ("let x = add(2, 3);", Ok(None)),
            ("x * 2", Ok(Some("10"))),
            ("[x, \"x\", x > 4]", Ok(Some("[5, x, true]"))),
            ("len", Ok(Some("builtin function len"))),
            ("fn(x) { x }", Ok(Some("fn(x) {\nx\n}"))),
            ("y", Err("ERROR: identifier not found: y")),
            ("x", Ok(Some("5"))),
            ("let z = 1; z", Ok(Some("1"))),
            ("return 7; let w = 1;", Ok(Some("7"))),
            ("if (false) { 1 }", Ok(Some("null"))),
        ];

        for (line, expected) in lines {
            let output = interpret(&env, line);
            let expected = expected
                .map(|value| value.map(String::from))
                .map_err(String::from);
            assert_eq!(output, expected, "line: {}", line);
        }
    }

    #[test]
    fn parse_errors_are_listed() {
        let env = Rc::new(RefCell::new(Environment::new()));

        assert_eq!(
            interpret(&env, "let = 5; let x 10;"),
            Err("Parser errors:\n\
                 \texpected next token to be IDENT, got = (at 4:5)\n\
                 \texpected next token to be =, got INT (at 15:17)"
                .to_string())
        );
        // Nothing was evaluated
        assert_eq!(
            interpret(&env, "x"),
            Err("ERROR: identifier not found: x".to_string())
        );
    }
}
