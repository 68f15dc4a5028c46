//! # Semantic resolution
//!
//! Rewrites the C AST so every declared variable has a globally unique name,
//! and rejects the programs the grammar admits but the language does not:
//!
//! - duplicate declarations in the same scope and references to undeclared
//!   identifiers;
//! - assignment, compound assignment, and `++`/`--` applied to anything but
//!   a plain variable (the only lvalue form in this subset);
//! - duplicate labels and `goto` statements naming a label that is never
//!   declared.
//!
//! Variables are renamed to `name.N` with `N` drawn from the compilation's
//! [`NameGen`]; labels live in a separate namespace and are never renamed.

pub mod scope;


use std::collections::HashSet;

use crate::error::CompileError;
use crate::names::NameGen;
use crate::parser::ast::{
    Block, BlockItem, Declaration, Expression, Function, Program, Statement, UnaryOp,
};
use scope::ScopeStack;

pub fn resolve_program(program: Program, names: &mut NameGen) -> Result<Program, CompileError> {
    let mut resolver = Resolver {
        scopes: ScopeStack::new(),
        names,
    };
    let function = resolver.resolve_function(program.function)?;
    validate_labels(&function)?;
    Ok(Program { function })
}

struct Resolver<'a> {
    scopes: ScopeStack,
    names: &'a mut NameGen,
}

impl Resolver<'_> {
    fn resolve_function(&mut self, function: Function) -> Result<Function, CompileError> {
        let body = self.resolve_block(function.body)?;
        Ok(Function {
            name: function.name,
            body,
        })
    }

    fn resolve_block(&mut self, block: Block) -> Result<Block, CompileError> {
        let items = block
            .items
            .into_iter()
            .map(|item| self.resolve_block_item(item))
            .collect::<Result<_, _>>()?;
        Ok(Block { items })
    }

    fn resolve_block_item(&mut self, item: BlockItem) -> Result<BlockItem, CompileError> {
        match item {
            BlockItem::Statement(statement) => {
                Ok(BlockItem::Statement(self.resolve_statement(statement)?))
            }
            BlockItem::Declaration(declaration) => Ok(BlockItem::Declaration(
                self.resolve_declaration(declaration)?,
            )),
        }
    }

    /// Register the declared name before resolving the initializer, so
    /// `int a = a + 1;` refers to the variable being declared.
    fn resolve_declaration(
        &mut self,
        declaration: Declaration,
    ) -> Result<Declaration, CompileError> {
        if self.scopes.declared_in_innermost(&declaration.name) {
            return Err(CompileError::DuplicateDeclaration(declaration.name));
        }
        let unique = self.names.fresh(&declaration.name);
        self.scopes.insert(declaration.name, unique.clone());

        let init = declaration
            .init
            .map(|init| self.resolve_expression(init))
            .transpose()?;
        Ok(Declaration { name: unique, init })
    }

    fn resolve_statement(&mut self, statement: Statement) -> Result<Statement, CompileError> {
        match statement {
            Statement::Return(value) => Ok(Statement::Return(self.resolve_expression(value)?)),
            Statement::Expression(expression) => Ok(Statement::Expression(
                self.resolve_expression(expression)?,
            )),
            Statement::If {
                condition,
                then_branch,
            } => Ok(Statement::If {
                condition: self.resolve_expression(condition)?,
                then_branch: Box::new(self.resolve_statement(*then_branch)?),
            }),
            Statement::IfElse {
                condition,
                then_branch,
                else_branch,
            } => Ok(Statement::IfElse {
                condition: self.resolve_expression(condition)?,
                then_branch: Box::new(self.resolve_statement(*then_branch)?),
                else_branch: Box::new(self.resolve_statement(*else_branch)?),
            }),
            Statement::Null => Ok(Statement::Null),
            // Labels are not variables; the name passes through untouched.
            Statement::Label { name, statement } => Ok(Statement::Label {
                name,
                statement: Box::new(self.resolve_statement(*statement)?),
            }),
            Statement::Goto(target) => Ok(Statement::Goto(target)),
            Statement::Compound(block) => {
                self.scopes.push();
                let block = self.resolve_block(block);
                self.scopes.pop();
                Ok(Statement::Compound(block?))
            }
        }
    }

    fn resolve_expression(&mut self, expression: Expression) -> Result<Expression, CompileError> {
        match expression {
            Expression::Constant(digits) => Ok(Expression::Constant(digits)),
            Expression::Var(name) => match self.scopes.lookup(&name) {
                Some(unique) => Ok(Expression::Var(unique.to_string())),
                None => Err(CompileError::UndeclaredIdentifier(name)),
            },
            Expression::Unary { op, operand } => {
                let needs_lvalue = matches!(op, UnaryOp::Increment | UnaryOp::Decrement);
                if needs_lvalue && !matches!(*operand, Expression::Var(_)) {
                    return Err(CompileError::InvalidLvalue("prefix increment or decrement"));
                }
                Ok(Expression::Unary {
                    op,
                    operand: Box::new(self.resolve_expression(*operand)?),
                })
            }
            Expression::Binary { op, left, right } => Ok(Expression::Binary {
                op,
                left: Box::new(self.resolve_expression(*left)?),
                right: Box::new(self.resolve_expression(*right)?),
            }),
            Expression::Assignment { target, value } => {
                if !matches!(*target, Expression::Var(_)) {
                    return Err(CompileError::InvalidLvalue("the left side of assignment"));
                }
                Ok(Expression::Assignment {
                    target: Box::new(self.resolve_expression(*target)?),
                    value: Box::new(self.resolve_expression(*value)?),
                })
            }
            Expression::CompoundAssign { op, target, value } => {
                if !matches!(*target, Expression::Var(_)) {
                    return Err(CompileError::InvalidLvalue(
                        "the left side of compound assignment",
                    ));
                }
                Ok(Expression::CompoundAssign {
                    op,
                    target: Box::new(self.resolve_expression(*target)?),
                    value: Box::new(self.resolve_expression(*value)?),
                })
            }
            Expression::Postfix { increment, operand } => {
                if !matches!(*operand, Expression::Var(_)) {
                    return Err(CompileError::InvalidLvalue(
                        "postfix increment or decrement",
                    ));
                }
                Ok(Expression::Postfix {
                    increment,
                    operand: Box::new(self.resolve_expression(*operand)?),
                })
            }
            Expression::Conditional {
                condition,
                then_value,
                else_value,
            } => Ok(Expression::Conditional {
                condition: Box::new(self.resolve_expression(*condition)?),
                then_value: Box::new(self.resolve_expression(*then_value)?),
                else_value: Box::new(self.resolve_expression(*else_value)?),
            }),
        }
    }
}

/// Check that no label is declared twice and every `goto` targets a declared
/// label. Labels are function-scoped, so one set covers the whole body.
fn validate_labels(function: &Function) -> Result<(), CompileError> {
    let mut labels = HashSet::new();
    collect_labels(&function.body, &mut labels)?;
    check_gotos(&function.body, &labels)
}

fn collect_labels<'a>(
    block: &'a Block,
    labels: &mut HashSet<&'a str>,
) -> Result<(), CompileError> {
    for item in &block.items {
        if let BlockItem::Statement(statement) = item {
            collect_statement_labels(statement, labels)?;
        }
    }
    Ok(())
}

fn collect_statement_labels<'a>(
    statement: &'a Statement,
    labels: &mut HashSet<&'a str>,
) -> Result<(), CompileError> {
    match statement {
        Statement::Label { name, statement } => {
            if !labels.insert(name.as_str()) {
                return Err(CompileError::DuplicateLabel(name.clone()));
            }
            collect_statement_labels(statement, labels)
        }
        Statement::If { then_branch, .. } => collect_statement_labels(then_branch, labels),
        Statement::IfElse {
            then_branch,
            else_branch,
            ..
        } => {
            collect_statement_labels(then_branch, labels)?;
            collect_statement_labels(else_branch, labels)
        }
        Statement::Compound(block) => collect_labels(block, labels),
        Statement::Return(_) | Statement::Expression(_) | Statement::Null | Statement::Goto(_) => {
            Ok(())
        }
    }
}

fn check_gotos(block: &Block, labels: &HashSet<&str>) -> Result<(), CompileError> {
    for item in &block.items {
        if let BlockItem::Statement(statement) = item {
            check_statement_gotos(statement, labels)?;
        }
    }
    Ok(())
}

fn check_statement_gotos(statement: &Statement, labels: &HashSet<&str>) -> Result<(), CompileError> {
    match statement {
        Statement::Goto(target) => {
            if labels.contains(target.as_str()) {
                Ok(())
            } else {
                Err(CompileError::UndefinedLabel(target.clone()))
            }
        }
        Statement::Label { statement, .. } => check_statement_gotos(statement, labels),
        Statement::If { then_branch, .. } => check_statement_gotos(then_branch, labels),
        Statement::IfElse {
            then_branch,
            else_branch,
            ..
        } => {
            check_statement_gotos(then_branch, labels)?;
            check_statement_gotos(else_branch, labels)
        }
        Statement::Compound(block) => check_gotos(block, labels),
        Statement::Return(_) | Statement::Expression(_) | Statement::Null => Ok(()),
    }
}
