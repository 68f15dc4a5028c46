#[cfg(test)]
mod parser_tests {
    use crate::error::CompileError;
    use crate::lexer::tokenize;
    use crate::parser::ast::{
        Block, BlockItem, BinaryOp, Declaration, Expression, Statement, UnaryOp,
    };
    use crate::parser::parse_program;

    fn parse_ok(input: &str) -> crate::parser::ast::Program {
        let tokens = tokenize(input).expect("unexpected lex error");
        parse_program(&tokens).expect("unexpected parse error")
    }

    fn parse_err(input: &str) -> CompileError {
        let tokens = tokenize(input).expect("unexpected lex error");
        parse_program(&tokens).expect_err("expected a parse error")
    }

    /// Parse `expr` inside `int main(void) { return <expr>; }` and hand back
    /// the returned expression.
    fn parse_expr(expr: &str) -> Expression {
        let program = parse_ok(&format!("int main(void) {{ return {expr}; }}"));
        match program.function.body.items.into_iter().next() {
            Some(BlockItem::Statement(Statement::Return(e))) => e,
            other => panic!("expected a return statement, got {other:?}"),
        }
    }

    fn constant(digits: &str) -> Expression {
        Expression::Constant(digits.into())
    }

    fn var(name: &str) -> Expression {
        Expression::Var(name.into())
    }

    fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    // ========== Structure ==========

    #[test]
    fn minimal_program() {
        let program = parse_ok("int main(void) { return 2; }");
        assert_eq!(program.function.name, "main");
        assert_eq!(
            program.function.body,
            Block {
                items: vec![BlockItem::Statement(Statement::Return(constant("2")))],
            }
        );
    }

    #[test]
    fn constants_round_trip_through_return() {
        for digits in ["0", "1", "42", "2147483647"] {
            assert_eq!(parse_expr(digits), constant(digits));
        }
    }

    #[test]
    fn declaration_with_and_without_initializer() {
        let program = parse_ok("int main(void) { int a = 3; int b; return a; }");
        assert_eq!(
            program.function.body.items[0],
            BlockItem::Declaration(Declaration {
                name: "a".into(),
                init: Some(constant("3")),
            })
        );
        assert_eq!(
            program.function.body.items[1],
            BlockItem::Declaration(Declaration {
                name: "b".into(),
                init: None,
            })
        );
    }

    #[test]
    fn null_statement() {
        let program = parse_ok("int main(void) { ;; return 0; }");
        assert_eq!(
            program.function.body.items[0],
            BlockItem::Statement(Statement::Null)
        );
    }

    #[test]
    fn compound_statement() {
        let program = parse_ok("int main(void) { { int a = 1; } return 0; }");
        let BlockItem::Statement(Statement::Compound(inner)) = &program.function.body.items[0]
        else {
            panic!("expected a compound statement");
        };
        assert_eq!(inner.items.len(), 1);
    }

    // ========== Precedence (higher binds tighter) ==========

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_expr("1 + 2 * 3"),
            binary(
                BinaryOp::Add,
                constant("1"),
                binary(BinaryOp::Multiply, constant("2"), constant("3")),
            )
        );
        assert_eq!(
            parse_expr("1 * 2 + 3"),
            binary(
                BinaryOp::Add,
                binary(BinaryOp::Multiply, constant("1"), constant("2")),
                constant("3"),
            )
        );
    }

    #[test]
    fn addition_binds_tighter_than_shift() {
        assert_eq!(
            parse_expr("1 << 2 + 3"),
            binary(
                BinaryOp::LeftShift,
                constant("1"),
                binary(BinaryOp::Add, constant("2"), constant("3")),
            )
        );
    }

    #[test]
    fn shift_binds_tighter_than_relational() {
        assert_eq!(
            parse_expr("1 << 2 < 3"),
            binary(
                BinaryOp::LessThan,
                binary(BinaryOp::LeftShift, constant("1"), constant("2")),
                constant("3"),
            )
        );
    }

    #[test]
    fn relational_binds_tighter_than_equality() {
        assert_eq!(
            parse_expr("1 == 2 < 3"),
            binary(
                BinaryOp::Equal,
                constant("1"),
                binary(BinaryOp::LessThan, constant("2"), constant("3")),
            )
        );
    }

    #[test]
    fn bitwise_tower() {
        // & above ^ above |
        assert_eq!(
            parse_expr("1 | 2 ^ 3 & 4"),
            binary(
                BinaryOp::BitOr,
                constant("1"),
                binary(
                    BinaryOp::Xor,
                    constant("2"),
                    binary(BinaryOp::BitAnd, constant("3"), constant("4")),
                ),
            )
        );
    }

    #[test]
    fn logical_or_is_loosest_binary_operator() {
        assert_eq!(
            parse_expr("1 || 2 && 3"),
            binary(
                BinaryOp::LogicalOr,
                constant("1"),
                binary(BinaryOp::LogicalAnd, constant("2"), constant("3")),
            )
        );
    }

    // ========== Associativity ==========

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse_expr("1 - 2 - 3"),
            binary(
                BinaryOp::Subtract,
                binary(BinaryOp::Subtract, constant("1"), constant("2")),
                constant("3"),
            )
        );
    }

    #[test]
    fn division_is_left_associative() {
        assert_eq!(
            parse_expr("8 / 4 / 2"),
            binary(
                BinaryOp::Divide,
                binary(BinaryOp::Divide, constant("8"), constant("4")),
                constant("2"),
            )
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            parse_expr("a = b = c"),
            Expression::Assignment {
                target: Box::new(var("a")),
                value: Box::new(Expression::Assignment {
                    target: Box::new(var("b")),
                    value: Box::new(var("c")),
                }),
            }
        );
    }

    #[test]
    fn ternary_is_right_associative() {
        assert_eq!(
            parse_expr("a ? b : c ? d : e"),
            Expression::Conditional {
                condition: Box::new(var("a")),
                then_value: Box::new(var("b")),
                else_value: Box::new(Expression::Conditional {
                    condition: Box::new(var("c")),
                    then_value: Box::new(var("d")),
                    else_value: Box::new(var("e")),
                }),
            }
        );
    }

    #[test]
    fn ternary_middle_is_a_full_expression() {
        // The middle arm may contain an assignment; `?` and `:` bracket it.
        assert_eq!(
            parse_expr("a ? b = 1 : c"),
            Expression::Conditional {
                condition: Box::new(var("a")),
                then_value: Box::new(Expression::Assignment {
                    target: Box::new(var("b")),
                    value: Box::new(constant("1")),
                }),
                else_value: Box::new(var("c")),
            }
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            parse_expr("(1 + 2) * 3"),
            binary(
                BinaryOp::Multiply,
                binary(BinaryOp::Add, constant("1"), constant("2")),
                constant("3"),
            )
        );
    }

    // ========== Unary, prefix, postfix ==========

    #[test]
    fn nested_unary_operators() {
        assert_eq!(
            parse_expr("-(~5)"),
            Expression::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(Expression::Unary {
                    op: UnaryOp::Complement,
                    operand: Box::new(constant("5")),
                }),
            }
        );
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        assert_eq!(
            parse_expr("-1 + 2"),
            binary(
                BinaryOp::Add,
                Expression::Unary {
                    op: UnaryOp::Negate,
                    operand: Box::new(constant("1")),
                },
                constant("2"),
            )
        );
    }

    #[test]
    fn prefix_increment() {
        assert_eq!(
            parse_expr("++a"),
            Expression::Unary {
                op: UnaryOp::Increment,
                operand: Box::new(var("a")),
            }
        );
    }

    #[test]
    fn postfix_increment() {
        assert_eq!(
            parse_expr("a++"),
            Expression::Postfix {
                increment: true,
                operand: Box::new(var("a")),
            }
        );
    }

    #[test]
    fn postfix_binds_tighter_than_prefix() {
        // -a++ is -(a++)
        assert_eq!(
            parse_expr("-a++"),
            Expression::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(Expression::Postfix {
                    increment: true,
                    operand: Box::new(var("a")),
                }),
            }
        );
    }

    #[test]
    fn compound_assignment() {
        assert_eq!(
            parse_expr("a += 1"),
            Expression::CompoundAssign {
                op: BinaryOp::AddAssign,
                target: Box::new(var("a")),
                value: Box::new(constant("1")),
            }
        );
    }

    // ========== Statements ==========

    #[test]
    fn if_without_else() {
        let program = parse_ok("int main(void) { if (1) return 2; return 3; }");
        assert!(matches!(
            program.function.body.items[0],
            BlockItem::Statement(Statement::If { .. })
        ));
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let program = parse_ok("int main(void) { if (1) if (2) return 3; else return 4; return 5; }");
        let BlockItem::Statement(Statement::If { then_branch, .. }) =
            &program.function.body.items[0]
        else {
            panic!("expected the outer if to have no else branch");
        };
        assert!(matches!(**then_branch, Statement::IfElse { .. }));
    }

    #[test]
    fn labeled_statement() {
        let program = parse_ok("int main(void) { top: return 0; }");
        let BlockItem::Statement(Statement::Label { name, statement }) =
            &program.function.body.items[0]
        else {
            panic!("expected a labeled statement");
        };
        assert_eq!(name, "top");
        assert!(matches!(**statement, Statement::Return(_)));
    }

    #[test]
    fn identifier_without_colon_is_an_expression_statement() {
        let program = parse_ok("int main(void) { a; return 0; }");
        assert_eq!(
            program.function.body.items[0],
            BlockItem::Statement(Statement::Expression(var("a")))
        );
    }

    #[test]
    fn goto_statement() {
        let program = parse_ok("int main(void) { goto done; done: return 0; }");
        assert_eq!(
            program.function.body.items[0],
            BlockItem::Statement(Statement::Goto("done".into()))
        );
    }

    // ========== Errors ==========

    #[test]
    fn missing_semicolon() {
        assert_eq!(
            parse_err("int main(void) { return 2 }"),
            CompileError::UnexpectedToken {
                expected: "';'".into(),
                found: "}".into(),
            }
        );
    }

    #[test]
    fn unexpected_end_of_input() {
        assert_eq!(
            parse_err("int main(void) { return 2;"),
            CompileError::UnexpectedEndOfInput
        );
    }

    #[test]
    fn trailing_tokens_after_function() {
        assert_eq!(
            parse_err("int main(void) { return 2; } int"),
            CompileError::TrailingToken("int".into())
        );
    }

    #[test]
    fn malformed_expression() {
        assert!(matches!(
            parse_err("int main(void) { return ; }"),
            CompileError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn missing_void_in_parameter_list() {
        assert!(matches!(
            parse_err("int main() { return 0; }"),
            CompileError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn constant_out_of_range() {
        assert_eq!(
            parse_err("int main(void) { return 2147483648; }"),
            CompileError::ConstantOutOfRange("2147483648".into())
        );
    }
}
