use std::{cell::RefCell, convert::TryFrom, rc::Rc};

use tracing::{debug, trace};

use crate::{
    builtin::Builtin,
    environment::Environment,
    error::RuntimeError,
    object::{Array, Function, Hash, HashPair, Object, ObjectType},
};

use monkey_parser::{
    ast::{BlockStatement, Expression, HashLiteral, Identifier, IfExpression, Program, Statement},
    token::Token,
};

/// Why evaluation of a statement stopped early
#[derive(Debug)]
enum Signal {
    /// A `return` unwinding to the enclosing function call (or the program)
    Return(Rc<Object>),
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Signal::Error(error)
    }
}

type EvalResult = Result<Rc<Object>, Signal>;

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,

    // Interned so every boolean and null result shares one allocation
    true_obj: Rc<Object>,
    false_obj: Rc<Object>,
    null_obj: Rc<Object>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    /// Evaluate against an existing global scope, e.g. to keep bindings between REPL lines
    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator {
            env,
            true_obj: Rc::new(Object::Boolean(true)),
            false_obj: Rc::new(Object::Boolean(false)),
            null_obj: Rc::new(Object::Null),
        }
    }

    /// Evaluate every statement in order, stopping at the first `return` or error.
    ///
    /// The result is the value of the last statement evaluated (or of the `return`).
    pub fn eval(&mut self, prog: &Program) -> Result<Rc<Object>, RuntimeError> {
        debug!(statements = prog.statements.len(), "evaluating program");

        match self.eval_statements(&prog.statements) {
            Ok(result) => Ok(result),
            // Unwrap the return value into a final value
            Err(Signal::Return(value)) => Ok(value),
            Err(Signal::Error(error)) => Err(error),
        }
    }

    // A `return` is propagated as-is, as the block may be nested inside another block
    fn eval_block_statement(&mut self, block: &BlockStatement) -> EvalResult {
        self.eval_statements(&block.statements)
    }

    fn eval_statements(&mut self, statements: &[Statement]) -> EvalResult {
        let mut result = Rc::clone(&self.null_obj);

        for stmt in statements {
            result = self.eval_statement(stmt)?;
        }

        Ok(result)
    }

    fn eval_statement(&mut self, stmt: &Statement) -> EvalResult {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value)?;
                Err(Signal::Return(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value)?;

                // Bind in the innermost scope
                self.env.borrow_mut().set(name.name.clone(), obj);

                Ok(Rc::clone(&self.null_obj))
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Integer(value) => Ok(Rc::new(Object::Integer(*value))),
            Expression::Boolean(value) => Ok(self.native_bool(*value)),
            Expression::String(value) => Ok(Rc::new(Object::String(value.clone()))),
            Expression::Identifier(identifier) => self.eval_identifier(identifier),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right)?;
                self.eval_prefix_expression(&prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left)?;
                let right = self.eval_expression(&infix.right)?;
                self.eval_infix_expression(&infix.operator, left, right)
            }

            Expression::If(if_expr) => self.eval_if_expression(if_expr),

            Expression::Array(arr) => {
                let elements = self.eval_expressions(&arr.elements)?;
                Ok(Rc::new(Object::Array(Array { elements })))
            }
            Expression::Hash(hash) => self.eval_hash_literal(hash),
            Expression::Index(expr) => {
                let left = self.eval_expression(&expr.left)?;
                let index = self.eval_expression(&expr.index)?;
                self.eval_index_expression(left, index)
            }

            // Capture the current scope; the body runs only when called
            Expression::Function(func) => Ok(Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            }))),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function)?;
                let args = self.eval_expressions(&call.arguments)?;

                self.apply_function(func, args)
            }
        }
    }

    /// Evaluate left to right, stopping at the first error
    fn eval_expressions(&mut self, exprs: &[Expression]) -> Result<Vec<Rc<Object>>, Signal> {
        exprs
            .iter()
            .map(|expr| self.eval_expression(expr))
            .collect()
    }

    fn eval_identifier(&self, identifier: &Identifier) -> EvalResult {
        let result = self.env.borrow().get(&identifier.name);

        match result {
            Some(obj) => Ok(obj),
            // NOTE: Builtins are not "in scope", so any binding shadows them
            None => match Builtin::lookup(&identifier.name) {
                Some(builtin) => Ok(Rc::new(Object::Builtin(builtin))),
                None => Err(RuntimeError::IdentifierNotFound(identifier.name.clone()).into()),
            },
        }
    }

    fn eval_prefix_expression(&self, operator: &Token, right: Rc<Object>) -> EvalResult {
        match operator {
            Token::Bang => Ok(self.native_bool(!right.is_truthy())),
            Token::Minus => match *right {
                Object::Integer(value) => Ok(Rc::new(Object::Integer(value.wrapping_neg()))),
                _ => Err(RuntimeError::UnknownPrefixOperator {
                    operator: operator.clone(),
                    right: right.object_type(),
                }
                .into()),
            },
            // The parser only produces `!` and `-` prefixes
            _ => Err(RuntimeError::UnknownPrefixOperator {
                operator: operator.clone(),
                right: right.object_type(),
            }
            .into()),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> EvalResult {
        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(left_value), Object::Integer(right_value)) => {
                self.eval_integer_infix_expression(operator, *left_value, *right_value)
            }
            (Object::String(left_value), Object::String(right_value)) => {
                self.eval_string_infix_expression(operator, left_value, right_value)
            }
            _ if *operator == Token::EqualEqual => Ok(self.native_bool(is_same(&left, &right))),
            _ if *operator == Token::BangEqual => Ok(self.native_bool(!is_same(&left, &right))),
            _ if left.object_type() != right.object_type() => Err(RuntimeError::TypeMismatch {
                left: left.object_type(),
                operator: operator.clone(),
                right: right.object_type(),
            }
            .into()),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.object_type(),
                operator: operator.clone(),
                right: right.object_type(),
            }
            .into()),
        }
    }

    fn eval_integer_infix_expression(
        &self,
        operator: &Token,
        left_value: i64,
        right_value: i64,
    ) -> EvalResult {
        match operator {
            Token::Plus => Ok(Rc::new(Object::Integer(left_value.wrapping_add(right_value)))),
            Token::Minus => Ok(Rc::new(Object::Integer(left_value.wrapping_sub(right_value)))),
            Token::Star => Ok(Rc::new(Object::Integer(left_value.wrapping_mul(right_value)))),
            // Dividing by zero gives null rather than an error
            Token::Slash => match left_value.checked_div(right_value) {
                Some(value) => Ok(Rc::new(Object::Integer(value))),
                None if right_value == 0 => Ok(Rc::clone(&self.null_obj)),
                // i64::MIN / -1
                None => Ok(Rc::new(Object::Integer(left_value.wrapping_div(right_value)))),
            },

            Token::LessThan => Ok(self.native_bool(left_value < right_value)),
            Token::GreaterThan => Ok(self.native_bool(left_value > right_value)),
            Token::EqualEqual => Ok(self.native_bool(left_value == right_value)),
            Token::BangEqual => Ok(self.native_bool(left_value != right_value)),

            operator => Err(RuntimeError::UnknownInfixOperator {
                left: ObjectType::Integer,
                operator: operator.clone(),
                right: ObjectType::Integer,
            }
            .into()),
        }
    }

    fn eval_string_infix_expression(
        &self,
        operator: &Token,
        left_value: &str,
        right_value: &str,
    ) -> EvalResult {
        match operator {
            Token::Plus => Ok(Rc::new(Object::String(left_value.to_owned() + right_value))),

            operator => Err(RuntimeError::UnknownInfixOperator {
                left: ObjectType::String,
                operator: operator.clone(),
                right: ObjectType::String,
            }
            .into()),
        }
    }

    fn eval_if_expression(&mut self, if_expr: &IfExpression) -> EvalResult {
        let condition = self.eval_expression(&if_expr.condition)?;

        if condition.is_truthy() {
            self.eval_block_statement(&if_expr.consequence)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block_statement(alternative)
        } else {
            Ok(Rc::clone(&self.null_obj))
        }
    }

    fn eval_hash_literal(&mut self, hash: &HashLiteral) -> EvalResult {
        let mut pairs = Hash::default();

        for (key_expr, value_expr) in &hash.pairs {
            let key = self.eval_expression(key_expr)?;
            let hash_key = key.hash_key()?;
            let value = self.eval_expression(value_expr)?;

            pairs.insert(hash_key, HashPair { key, value });
        }

        Ok(Rc::new(Object::Hash(pairs)))
    }

    fn eval_index_expression(&self, left: Rc<Object>, index: Rc<Object>) -> EvalResult {
        match (left.as_ref(), index.as_ref()) {
            (Object::Array(arr), Object::Integer(i)) => {
                // Out of bounds (including negative indices) is null, not an error
                let element = usize::try_from(*i)
                    .ok()
                    .and_then(|i| arr.elements.get(i));

                Ok(match element {
                    Some(el) => Rc::clone(el),
                    None => Rc::clone(&self.null_obj),
                })
            }
            (Object::Hash(hash), _) => {
                let key = index.hash_key()?;

                Ok(hash.get(&key).unwrap_or_else(|| Rc::clone(&self.null_obj)))
            }
            _ => Err(RuntimeError::IndexNotSupported(left.object_type()).into()),
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> EvalResult {
        match func.as_ref() {
            Object::Function(func) => {
                // Remember current environment (when exiting from call)
                let current_env = Rc::clone(&self.env);
                // The call's scope encloses the scope the function was defined in, not the caller's
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.env));

                // Extra arguments are ignored; missing ones are simply unbound
                for (ident, obj) in func.parameters.iter().zip(args.into_iter()) {
                    scoped_env.set(ident.name.clone(), obj);
                }

                trace!(
                    params = func.parameters.len(),
                    depth = scoped_env.depth(),
                    "applying function"
                );

                self.env = Rc::new(RefCell::new(scoped_env));
                let result = self.eval_block_statement(&func.body);
                self.env = current_env;

                match result {
                    Err(Signal::Return(value)) => Ok(value),
                    other => other,
                }
            }
            Object::Builtin(builtin) => {
                trace!(builtin = builtin.name(), args = args.len(), "applying builtin");
                Ok(builtin.apply(args)?)
            }
            _ => Err(RuntimeError::NotAFunction(func.object_type()).into()),
        }
    }

    fn native_bool(&self, value: bool) -> Rc<Object> {
        if value {
            Rc::clone(&self.true_obj)
        } else {
            Rc::clone(&self.false_obj)
        }
    }
}

/// Equality for operands that are not both integers or both strings:
/// booleans and null compare by value, everything else by identity
fn is_same(left: &Rc<Object>, right: &Rc<Object>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        (Object::Null, Object::Null) => true,
        _ => Rc::ptr_eq(left, right),
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;

    use crate::{
        environment::Environment,
        error::RuntimeError,
        evaluator::Evaluator,
        object::{HashKey, Object, ObjectType},
    };

    use monkey_parser::{lexer::Lexer, parser::Parser, token::Token};

    #[test]
    fn eval_integer_expression() {
        let tests = vec![
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("7 / 2", 3),
            ("-7 / 2", -3),
            ("7 / -2", -3),
            ("9223372036854775807 + 1", i64::MIN),
            ("-9223372036854775807 - 1 - 1", i64::MAX),
            ("4611686018427387904 * 2", i64::MIN),
            ("(-9223372036854775807 - 1) / -1", i64::MIN),
            ("-(-9223372036854775807 - 1)", i64::MIN),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_division_by_zero() {
        test_null_object(evaluate("1 / 0"));
        test_null_object(evaluate("let a = 10; a / (5 - 5)"));
    }

    #[test]
    fn eval_boolean_expression() {
        let tests = vec![
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("false != true", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
            ("(1 > 2) == true", false),
            ("(1 > 2) == false", true),
            ("1 == true", false),
            ("1 != true", true),
            ("let a = [1]; a == a", true),
            ("[1] == [1]", false),
            ("if (false) { 1 } == if (false) { 2 }", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_booleans_are_interned() {
        let mut evaluator = Evaluator::new();
        let a = evaluator.eval(&parse("1 < 2")).unwrap();
        let b = evaluator.eval(&parse("true")).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn eval_string_expression() {
        let tests = vec![
            ("\"hello world\"", "hello world"),
            ("\"hello\" + \" \" + \"world\"", "hello world"),
            ("fn() { 'hello world!' }()", "hello world!"),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_string_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_bang_operator() {
        let tests = vec![
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
            ("!\"\"", false),
            ("!if (false) { 1 }", true),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_boolean_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_if_else_expression() {
        let tests = vec![
            ("if (true) { 10 }", Some(10)),
            ("if (false) { 10 }", None),
            ("if (1) { 10 }", Some(10)),
            ("if (1 < 2) { 10 }", Some(10)),
            ("if (1 > 2) { 10 }", None),
            ("if (1 > 2) { 10 } else { 20 }", Some(20)),
            ("if (1 < 2) { 10 } else { 20 }", Some(10)),
            ("let x = if (1 < 2) { 10 } else { 20 }; x * 2", Some(20)),
            ("if (true) { }", None),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);

            match expected {
                Some(expected_value) => test_integer_object(evaluated, expected_value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_return_statements() {
        let tests = vec![
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            (
                "
                if (10 > 1) {
                  if (10 > 1) {
                    return 10;
                  }

                  return 1;
                }
                ",
                10,
            ),
            (
                "
                let f = fn(x) {
                  return x;
                  x + 10;
                };
                f(10);
                ",
                10,
            ),
            (
                "
                let f = fn(x) {
                  let result = x + 10;
                  return result;
                  return 10;
                };
                f(10);
                ",
                20,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value)
        }
    }

    #[test]
    fn eval_let_statements() {
        let tests = vec![
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; a + b;", 10),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
            ("let a = 5; let a = a + 1; a", 6),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value)
        }

        test_null_object(evaluate("let a = 5;"));
    }

    #[test]
    fn eval_array_literals() {
        let evaluated = evaluate("[1, 2 * 2, 3 + 3]");

        match evaluated.as_ref() {
            Object::Array(arr) => {
                assert_eq!(arr.elements.len(), 3, "elements of {}", arr);

                test_integer_object(Rc::clone(&arr.elements[0]), 1);
                test_integer_object(Rc::clone(&arr.elements[1]), 4);
                test_integer_object(Rc::clone(&arr.elements[2]), 6);
            }
            obj => panic!("expected array object but got {}", obj),
        }
    }

    #[test]
    fn eval_array_index_expression() {
        let tests = vec![
            ("[1, 2, 3][0]", Some(1)),
            ("[1, 2, 3][1]", Some(2)),
            ("[1, 2, 3][2]", Some(3)),
            ("let i = 0; [1][i];", Some(1)),
            ("[1, 2, 3][1 + 1];", Some(3)),
            ("let myArray = [1, 2, 3]; myArray[2];", Some(3)),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                Some(6),
            ),
            (
                "let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]",
                Some(2),
            ),
            ("[1, 2, 3][3];", None),
            ("[1, 2, 3][-1];", None),
            ("[][0]", None),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);

            match expected {
                Some(expected_value) => test_integer_object(evaluated, expected_value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_hash_literals() {
        let input = "
            let two = \"two\";
            {
                \"one\": 10 - 9,
                two: 1 + 1,
                \"thr\" + \"ee\": 6 / 2,
                4: 4,
                true: 5,
                false: 6
            }";
        let evaluated = evaluate(input);

        let hash = match evaluated.as_ref() {
            Object::Hash(hash) => hash,
            obj => panic!("expected hash object but got {}", obj),
        };

        let expected = vec![
            (HashKey::String("one".to_string()), 1),
            (HashKey::String("two".to_string()), 2),
            (HashKey::String("three".to_string()), 3),
            (HashKey::Integer(4), 4),
            (HashKey::Boolean(true), 5),
            (HashKey::Boolean(false), 6),
        ];

        assert_eq!(hash.len(), expected.len());
        for (key, expected_value) in expected {
            match hash.get(&key) {
                Some(value) => test_integer_object(value, expected_value),
                None => panic!("no pair for key {:?}", key),
            }
        }
    }

    #[test]
    fn eval_hash_inspect_keeps_source_order() {
        let tests = vec![
            ("{1: 2, 3: 4, 5: 6, 7: 8}", "{1: 2, 3: 4, 5: 6, 7: 8}"),
            ("{\"b\": true, \"a\": [1], 2: \"c\"}", "{b: true, a: [1], 2: c}"),
            ("{\"a\": 1, \"b\": 2, \"a\": 3}", "{a: 3, b: 2}"),
            ("{}", "{}"),
        ];

        for (input, expected) in tests {
            assert_eq!(evaluate(input).to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn eval_hash_index_expression() {
        let tests = vec![
            ("{\"foo\": 5}[\"foo\"]", Some(5)),
            ("{\"foo\": 5}[\"bar\"]", None),
            ("let key = \"foo\"; {\"foo\": 5}[key]", Some(5)),
            ("{}[\"foo\"]", None),
            ("{5: 5}[5]", Some(5)),
            ("{true: 5}[true]", Some(5)),
            ("{false: 5}[false]", Some(5)),
            ("{1: 5}[true]", None),
            ("{\"a\": 1, \"a\": 2}[\"a\"]", Some(2)),
        ];

        for (input, expected) in tests {
            let evaluated = evaluate(input);

            match expected {
                Some(expected_value) => test_integer_object(evaluated, expected_value),
                None => test_null_object(evaluated),
            }
        }
    }

    #[test]
    fn eval_function_expression() {
        let evaluated = evaluate("fn (x) { x + 2; }");

        match evaluated.as_ref() {
            Object::Function(func) => {
                assert_eq!(func.parameters.len(), 1);
                assert_eq!(func.parameters[0].name, "x");
                assert_eq!(func.body.to_string(), "(x + 2)");
                assert_eq!(evaluated.to_string(), "fn(x) {\n(x + 2)\n}");
            }
            obj => panic!("expected function object but got {}", obj),
        }
    }

    #[test]
    fn eval_call_expression() {
        let tests = vec![
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
            ("let first = fn(x) { x }; first(1, 2, 3)", 1),
            (
                "let fact = fn(n) { if (n < 2) { 1 } else { n * fact(n - 1) } }; fact(5)",
                120,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }

        test_null_object(evaluate("fn() {}()"));
    }

    #[test]
    fn eval_closures() {
        let tests = vec![
            (
                "
                let newAdder = fn(x) { fn(y) { x + y } };
                let addTwo = newAdder(2);
                addTwo(3);
                ",
                5,
            ),
            (
                "
                let x = 10;
                let f = fn() { x };
                let g = fn() { let x = 20; f() };
                g();
                ",
                10,
            ),
            (
                "
                let x = 1;
                let shadow = fn(x) { x * 100 };
                shadow(2) + x;
                ",
                201,
            ),
            (
                "
                let outer = fn() { let y = 7; y };
                outer();
                let y = 3;
                y;
                ",
                3,
            ),
        ];

        for (input, expected_value) in tests {
            let evaluated = evaluate(input);
            test_integer_object(evaluated, expected_value);
        }
    }

    #[test]
    fn eval_missing_argument_is_unbound() {
        assert_eq!(
            eval_input("let add = fn(x, y) { x + y }; add(1)").unwrap_err(),
            RuntimeError::IdentifierNotFound("y".to_string())
        );
    }

    #[test]
    fn eval_builtin_functions() {
        let tests = vec![
            ("len('')", Ok(Some(0))),
            ("len('four')", Ok(Some(4))),
            ("len('hello world')", Ok(Some(11))),
            (
                "len(1)",
                Err(RuntimeError::UnsupportedArgument {
                    builtin: "len",
                    got: ObjectType::Integer,
                }),
            ),
            (
                "len('one', 'two')",
                Err(RuntimeError::BadArity { got: 2, want: 1 }),
            ),
            ("len([])", Ok(Some(0))),
            ("len([1])", Ok(Some(1))),
            ("len([1, 'hello world', []])", Ok(Some(3))),
            ("first([1, 2, 3])", Ok(Some(1))),
            ("first([])", Ok(None)),
            ("last([1, 2, 3])", Ok(Some(3))),
            ("last([])", Ok(None)),
            (
                "first(1)",
                Err(RuntimeError::InvalidArgumentType {
                    builtin: "first",
                    expected: ObjectType::Array,
                    got: ObjectType::Integer,
                }),
            ),
            ("puts('hello', 1)", Ok(None)),
            ("let len = fn(x) { 42 }; len('a')", Ok(Some(42))),
        ];

        for (input, expected) in tests {
            match (eval_input(input), expected) {
                (Ok(evaluated), Ok(Some(expected_value))) => {
                    test_integer_object(evaluated, expected_value)
                }
                (Ok(evaluated), Ok(None)) => test_null_object(evaluated),
                (Err(error), Err(expected_error)) => assert_eq!(error, expected_error),
                (result, expected) => panic!(
                    "for '{}' expected {:?} but got {:?}",
                    input, expected, result
                ),
            }
        }

        test_string_object(evaluate("type(1)"), "INTEGER");
        test_string_object(evaluate("type(len)"), "BUILTIN");
    }

    #[test]
    fn error_handling() {
        let tests = vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "
                if (10 > 1) {
                  if (10 > 1) {
                    return true + false;
                  }
                  return 1;
                }
                ",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
            ("\"a\" == \"a\"", "unknown operator: STRING == STRING"),
            ("\"a\" < 1", "type mismatch: STRING < INTEGER"),
            (
                "{\"name\": \"Monkey\"}[fn(x) { x }];",
                "unusable as hash key: FUNCTION",
            ),
            ("{fn(x) { x }: 1}", "unusable as hash key: FUNCTION"),
            ("1[0]", "index operator not supported: INTEGER"),
            ("[1, 2][true]", "index operator not supported: ARRAY"),
            ("5(1)", "not a function: INTEGER"),
            ("[1, foobar, 3]", "identifier not found: foobar"),
            ("len(foobar)", "identifier not found: foobar"),
            ("let f = fn(a, b) { a }; f(1, -true)", "unknown operator: -BOOLEAN"),
            ("{1: missing}", "identifier not found: missing"),
        ];

        for (input, expected_message) in tests {
            match eval_input(input) {
                Err(error) => assert_eq!(error.to_string(), expected_message, "input: {}", input),
                Ok(obj) => panic!("expected error for '{}' but got {:?}", input, obj),
            }
        }
    }

    #[test]
    fn error_stops_evaluation() {
        let env = Rc::new(RefCell::new(Environment::new()));
        let mut evaluator = Evaluator::new_with_env(Rc::clone(&env));

        let result = evaluator.eval(&parse("let a = 1; let b = a + true; let c = 3;"));
        assert_eq!(
            result.unwrap_err(),
            RuntimeError::TypeMismatch {
                left: ObjectType::Integer,
                operator: Token::Plus,
                right: ObjectType::Boolean,
            }
        );

        assert!(env.borrow().get("a").is_some());
        assert!(env.borrow().get("b").is_none());
        assert!(env.borrow().get("c").is_none());
    }

    #[test]
    fn bindings_persist_across_programs() {
        let env = Rc::new(RefCell::new(Environment::new()));

        Evaluator::new_with_env(Rc::clone(&env))
            .eval(&parse("let makeCounter = fn(start) { fn() { start + 1 } };"))
            .unwrap();
        Evaluator::new_with_env(Rc::clone(&env))
            .eval(&parse("let next = makeCounter(41);"))
            .unwrap();
        let result = Evaluator::new_with_env(Rc::clone(&env))
            .eval(&parse("next()"))
            .unwrap();

        test_integer_object(result, 42);
    }

    fn parse(input: &str) -> monkey_parser::ast::Program {
        match Parser::new(Lexer::new(input)).parse() {
            Ok(prog) => prog,
            Err(errors) => {
                println!("parser had {} errors", errors.len());
                for error in errors {
                    println!("parser error: {}", error);
                }
                panic!("parser errors")
            }
        }
    }

    fn eval_input(input: &str) -> Result<Rc<Object>, RuntimeError> {
        Evaluator::new().eval(&parse(input))
    }

    fn evaluate(input: &str) -> Rc<Object> {
        match eval_input(input) {
            Ok(obj) => obj,
            Err(error) => panic!("unexpected runtime error for '{}': {}", input, error),
        }
    }

    fn test_integer_object(obj: Rc<Object>, expected_value: i64) {
        match *obj {
            Object::Integer(value) => {
                if value != expected_value {
                    panic!(
                        "expected integer object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected integer object but got {:?}", obj),
        }
    }

    fn test_boolean_object(obj: Rc<Object>, expected_value: bool) {
        match *obj {
            Object::Boolean(value) => {
                if value != expected_value {
                    panic!(
                        "expected boolean object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected boolean object but got {:?}", obj),
        }
    }

    fn test_string_object(obj: Rc<Object>, expected_value: &str) {
        match obj.as_ref() {
            Object::String(value) => {
                if value != expected_value {
                    panic!(
                        "expected string object with value {} but got {:?}",
                        expected_value, obj
                    )
                }
            }
            _ => panic!("expected string object but got {:?}", obj),
        }
    }

    fn test_null_object(obj: Rc<Object>) {
        match *obj {
            Object::Null => {}
            _ => panic!("expected null object but got {:?}", obj),
        }
    }
}
