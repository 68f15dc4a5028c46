//! # TACKY lowering
//!
//! Lowers the resolved C AST to the TACKY three-address IR.
//!
//! Expression lowering appends instructions to the current function body and
//! returns the [`Val`] holding the expression's value. Statement lowering
//! appends instructions and returns nothing. Short-circuit operators and the
//! conditional operator become explicit compare-and-jump sequences here, so
//! later passes never deal with lazy evaluation.
//!
//! Lowering cannot fail on user input: the resolver has already rejected
//! every invalid program shape. Pattern arms that resolution rules out are
//! `unreachable!` with the invariant they rely on.

pub mod ir;


use crate::names::NameGen;
use crate::parser::ast;
use ir::{BinaryOp, Function, Instruction, Program, UnaryOp, Val};

pub fn emit_program(program: ast::Program, names: &mut NameGen) -> Program {
    Program {
        function: emit_function(program.function, names),
    }
}

fn emit_function(function: ast::Function, names: &mut NameGen) -> Function {
    let mut lowerer = Lowerer {
        instructions: Vec::new(),
        names,
    };
    for item in function.body.items {
        lowerer.lower_block_item(item);
    }
    // Control must never fall off the end of the emitted function, so every
    // body ends with an implicit `return 0`.
    lowerer.instructions.push(Instruction::Return(Val::Constant(0)));

    Function {
        name: function.name,
        instructions: lowerer.instructions,
    }
}

struct Lowerer<'a> {
    instructions: Vec<Instruction>,
    names: &'a mut NameGen,
}

impl Lowerer<'_> {
    fn fresh_var(&mut self, prefix: &str) -> Val {
        Val::Var(self.names.fresh(prefix))
    }

    fn lower_block_item(&mut self, item: ast::BlockItem) {
        match item {
            ast::BlockItem::Statement(statement) => self.lower_statement(statement),
            ast::BlockItem::Declaration(declaration) => self.lower_declaration(declaration),
        }
    }

    /// An initialized declaration stores into its variable; an uninitialized
    /// one emits nothing, and the slot's prior bytes are observable until
    /// the first assignment.
    fn lower_declaration(&mut self, declaration: ast::Declaration) {
        if let Some(init) = declaration.init {
            let value = self.lower_expression(init);
            self.instructions.push(Instruction::Copy {
                src: value,
                dst: Val::Var(declaration.name),
            });
        }
    }

    fn lower_statement(&mut self, statement: ast::Statement) {
        match statement {
            ast::Statement::Return(value) => {
                let value = self.lower_expression(value);
                self.instructions.push(Instruction::Return(value));
            }
            ast::Statement::Expression(expression) => {
                self.lower_expression(expression);
            }
            ast::Statement::If {
                condition,
                then_branch,
            } => {
                let end_label = self.names.fresh("if_end");
                let condition = self.lower_expression(condition);
                self.instructions.push(Instruction::JumpIfZero {
                    condition,
                    target: end_label.clone(),
                });
                self.lower_statement(*then_branch);
                self.instructions.push(Instruction::Label(end_label));
            }
            ast::Statement::IfElse {
                condition,
                then_branch,
                else_branch,
            } => {
                let else_label = self.names.fresh("if_else");
                let end_label = self.names.fresh("if_end");
                let condition = self.lower_expression(condition);
                self.instructions.push(Instruction::JumpIfZero {
                    condition,
                    target: else_label.clone(),
                });
                self.lower_statement(*then_branch);
                self.instructions.push(Instruction::Jump(end_label.clone()));
                self.instructions.push(Instruction::Label(else_label));
                self.lower_statement(*else_branch);
                self.instructions.push(Instruction::Label(end_label));
            }
            ast::Statement::Null => {}
            ast::Statement::Label { name, statement } => {
                self.instructions.push(Instruction::Label(name));
                self.lower_statement(*statement);
            }
            ast::Statement::Goto(target) => {
                self.instructions.push(Instruction::Jump(target));
            }
            ast::Statement::Compound(block) => {
                for item in block.items {
                    self.lower_block_item(item);
                }
            }
        }
    }

    fn lower_expression(&mut self, expression: ast::Expression) -> Val {
        match expression {
            ast::Expression::Constant(digits) => {
                let value = digits
                    .parse()
                    .unwrap_or_else(|_| unreachable!("constants are range-checked by the parser"));
                Val::Constant(value)
            }
            ast::Expression::Var(name) => Val::Var(name),
            ast::Expression::Unary {
                op: ast::UnaryOp::Increment,
                operand,
            } => self.lower_prefix(BinaryOp::Add, *operand),
            ast::Expression::Unary {
                op: ast::UnaryOp::Decrement,
                operand,
            } => self.lower_prefix(BinaryOp::Subtract, *operand),
            ast::Expression::Unary { op, operand } => {
                let src = self.lower_expression(*operand);
                let dst = self.fresh_var("tmp");
                self.instructions.push(Instruction::Unary {
                    op: convert_unary_op(op),
                    src,
                    dst: dst.clone(),
                });
                dst
            }
            ast::Expression::Binary {
                op: ast::BinaryOp::LogicalAnd,
                left,
                right,
            } => self.lower_logical_and(*left, *right),
            ast::Expression::Binary {
                op: ast::BinaryOp::LogicalOr,
                left,
                right,
            } => self.lower_logical_or(*left, *right),
            ast::Expression::Binary { op, left, right } => {
                // Operands are evaluated in source order, left before right.
                let src1 = self.lower_expression(*left);
                let src2 = self.lower_expression(*right);
                let dst = self.fresh_var("tmp");
                self.instructions.push(Instruction::Binary {
                    op: convert_binary_op(op),
                    src1,
                    src2,
                    dst: dst.clone(),
                });
                dst
            }
            ast::Expression::Assignment { target, value } => {
                let ast::Expression::Var(name) = *target else {
                    unreachable!("assignment targets are variables after resolution");
                };
                let value = self.lower_expression(*value);
                self.instructions.push(Instruction::Copy {
                    src: value,
                    dst: Val::Var(name.clone()),
                });
                Val::Var(name)
            }
            // `lv op= r` lowers as `lv = lv op r`. Substituting the target
            // twice is only sound because the supported lvalue form (a plain
            // variable) has no side effects to duplicate.
            ast::Expression::CompoundAssign { op, target, value } => {
                let binary = ast::Expression::Binary {
                    op: base_op_of(op),
                    left: target.clone(),
                    right: value,
                };
                self.lower_expression(ast::Expression::Assignment {
                    target,
                    value: Box::new(binary),
                })
            }
            ast::Expression::Postfix { increment, operand } => {
                let (op, prefix) = if increment {
                    (BinaryOp::Add, "postfix_inc")
                } else {
                    (BinaryOp::Subtract, "postfix_dec")
                };
                let saved = self.fresh_var(prefix);
                let var = self.lower_expression(*operand);
                self.instructions.push(Instruction::Copy {
                    src: var.clone(),
                    dst: saved.clone(),
                });
                self.instructions.push(Instruction::Binary {
                    op,
                    src1: var.clone(),
                    src2: Val::Constant(1),
                    dst: var,
                });
                // The expression's value is the one saved before the update.
                saved
            }
            ast::Expression::Conditional {
                condition,
                then_value,
                else_value,
            } => {
                let result = self.fresh_var("tmp");
                let else_label = self.names.fresh("cond_else");
                let end_label = self.names.fresh("cond_end");

                let condition = self.lower_expression(*condition);
                self.instructions.push(Instruction::JumpIfZero {
                    condition,
                    target: else_label.clone(),
                });
                let then_value = self.lower_expression(*then_value);
                self.instructions.push(Instruction::Copy {
                    src: then_value,
                    dst: result.clone(),
                });
                self.instructions.push(Instruction::Jump(end_label.clone()));
                self.instructions.push(Instruction::Label(else_label));
                let else_value = self.lower_expression(*else_value);
                self.instructions.push(Instruction::Copy {
                    src: else_value,
                    dst: result.clone(),
                });
                self.instructions.push(Instruction::Label(end_label));
                result
            }
        }
    }

    /// Prefix `++`/`--`: update in place, return the updated variable.
    fn lower_prefix(&mut self, op: BinaryOp, operand: ast::Expression) -> Val {
        let var = self.lower_expression(operand);
        self.instructions.push(Instruction::Binary {
            op,
            src1: var.clone(),
            src2: Val::Constant(1),
            dst: var.clone(),
        });
        var
    }

    /// `a && b` with short-circuit: `b` is never evaluated when `a` is zero.
    /// The result is always exactly 0 or 1.
    fn lower_logical_and(&mut self, left: ast::Expression, right: ast::Expression) -> Val {
        let result = self.fresh_var("and_result");
        let false_label = self.names.fresh("and_false");
        let end_label = self.names.fresh("and_end");

        let left = self.lower_expression(left);
        self.instructions.push(Instruction::JumpIfZero {
            condition: left,
            target: false_label.clone(),
        });
        let right = self.lower_expression(right);
        self.instructions.push(Instruction::JumpIfZero {
            condition: right,
            target: false_label.clone(),
        });
        self.instructions.push(Instruction::Copy {
            src: Val::Constant(1),
            dst: result.clone(),
        });
        self.instructions.push(Instruction::Jump(end_label.clone()));
        self.instructions.push(Instruction::Label(false_label));
        self.instructions.push(Instruction::Copy {
            src: Val::Constant(0),
            dst: result.clone(),
        });
        self.instructions.push(Instruction::Label(end_label));
        result
    }

    /// `a || b`, symmetric with `lower_logical_and`.
    fn lower_logical_or(&mut self, left: ast::Expression, right: ast::Expression) -> Val {
        let result = self.fresh_var("or_result");
        let true_label = self.names.fresh("or_true");
        let end_label = self.names.fresh("or_end");

        let left = self.lower_expression(left);
        self.instructions.push(Instruction::JumpIfNotZero {
            condition: left,
            target: true_label.clone(),
        });
        let right = self.lower_expression(right);
        self.instructions.push(Instruction::JumpIfNotZero {
            condition: right,
            target: true_label.clone(),
        });
        self.instructions.push(Instruction::Copy {
            src: Val::Constant(0),
            dst: result.clone(),
        });
        self.instructions.push(Instruction::Jump(end_label.clone()));
        self.instructions.push(Instruction::Label(true_label));
        self.instructions.push(Instruction::Copy {
            src: Val::Constant(1),
            dst: result.clone(),
        });
        self.instructions.push(Instruction::Label(end_label));
        result
    }
}

fn convert_unary_op(op: ast::UnaryOp) -> UnaryOp {
    match op {
        ast::UnaryOp::Complement => UnaryOp::Complement,
        ast::UnaryOp::Negate => UnaryOp::Negate,
        ast::UnaryOp::Not => UnaryOp::Not,
        ast::UnaryOp::Increment | ast::UnaryOp::Decrement => {
            unreachable!("prefix increment and decrement lower to binary adds")
        }
    }
}

fn convert_binary_op(op: ast::BinaryOp) -> BinaryOp {
    match op {
        ast::BinaryOp::Add => BinaryOp::Add,
        ast::BinaryOp::Subtract => BinaryOp::Subtract,
        ast::BinaryOp::Multiply => BinaryOp::Multiply,
        ast::BinaryOp::Divide => BinaryOp::Divide,
        ast::BinaryOp::Remainder => BinaryOp::Remainder,
        ast::BinaryOp::LeftShift => BinaryOp::LeftShift,
        ast::BinaryOp::RightShift => BinaryOp::RightShift,
        ast::BinaryOp::BitAnd => BinaryOp::BitAnd,
        ast::BinaryOp::BitOr => BinaryOp::BitOr,
        ast::BinaryOp::Xor => BinaryOp::Xor,
        ast::BinaryOp::Equal => BinaryOp::Equal,
        ast::BinaryOp::NotEqual => BinaryOp::NotEqual,
        ast::BinaryOp::LessThan => BinaryOp::LessThan,
        ast::BinaryOp::LessEqual => BinaryOp::LessEqual,
        ast::BinaryOp::GreaterThan => BinaryOp::GreaterThan,
        ast::BinaryOp::GreaterEqual => BinaryOp::GreaterEqual,
        ast::BinaryOp::LogicalAnd | ast::BinaryOp::LogicalOr => {
            unreachable!("short-circuit operators lower to jumps")
        }
        other => unreachable!("compound-assign operator {other:?} outside CompoundAssign"),
    }
}

/// The base arithmetic operator of a compound assignment (`+=` → `+`, …).
fn base_op_of(op: ast::BinaryOp) -> ast::BinaryOp {
    match op {
        ast::BinaryOp::AddAssign => ast::BinaryOp::Add,
        ast::BinaryOp::SubAssign => ast::BinaryOp::Subtract,
        ast::BinaryOp::MulAssign => ast::BinaryOp::Multiply,
        ast::BinaryOp::DivAssign => ast::BinaryOp::Divide,
        ast::BinaryOp::ModAssign => ast::BinaryOp::Remainder,
        ast::BinaryOp::AndAssign => ast::BinaryOp::BitAnd,
        ast::BinaryOp::OrAssign => ast::BinaryOp::BitOr,
        ast::BinaryOp::XorAssign => ast::BinaryOp::Xor,
        ast::BinaryOp::LeftShiftAssign => ast::BinaryOp::LeftShift,
        ast::BinaryOp::RightShiftAssign => ast::BinaryOp::RightShift,
        other => unreachable!("{other:?} is not a compound-assign operator"),
    }
}
