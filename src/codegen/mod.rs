//! # Code generation
//!
//! Lowers TACKY to the abstract assembly tree, then runs the two cleanup
//! passes over it:
//!
//! 1. **Lowering** - each TACKY instruction expands to one or more abstract
//!    instructions; TACKY variables become pseudo operands.
//! 2. **Stack allocation** - every pseudo gets a 4-byte slot in the frame.
//! 3. **Fixup** - operand combinations the ISA cannot encode are rewritten
//!    through scratch registers, and the frame allocation is prepended.

pub mod asm;
mod fixup;
mod stack;


use crate::tacky::ir;
use asm::{BinaryOp, Cond, Function, Instruction, Operand, Program, Register, UnaryOp};

pub fn generate(program: ir::Program) -> Program {
    let lowered = lower_function(program.function);
    let (replaced, frame_size) = stack::replace_pseudos(lowered);
    Program {
        function: fixup::fix_instructions(replaced, frame_size),
    }
}

fn lower_function(function: ir::Function) -> Function {
    let mut instructions = Vec::new();
    for instruction in function.instructions {
        lower_instruction(instruction, &mut instructions);
    }
    Function {
        name: function.name,
        instructions,
    }
}

fn lower_instruction(instruction: ir::Instruction, out: &mut Vec<Instruction>) {
    match instruction {
        ir::Instruction::Return(value) => {
            out.push(Instruction::Mov {
                src: operand(value),
                dst: Operand::Reg(Register::AX),
            });
            out.push(Instruction::Ret);
        }
        // Logical not is a comparison against zero.
        ir::Instruction::Unary {
            op: ir::UnaryOp::Not,
            src,
            dst,
        } => {
            let dst = operand(dst);
            out.push(Instruction::Cmp {
                left: Operand::Imm(0),
                right: operand(src),
            });
            out.push(Instruction::Mov {
                src: Operand::Imm(0),
                dst: dst.clone(),
            });
            out.push(Instruction::SetCC {
                cond: Cond::E,
                operand: dst,
            });
        }
        ir::Instruction::Unary { op, src, dst } => {
            let dst = operand(dst);
            out.push(Instruction::Mov {
                src: operand(src),
                dst: dst.clone(),
            });
            out.push(Instruction::Unary {
                op: unary_op(op),
                operand: dst,
            });
        }
        // idiv computes quotient and remainder at once: the dividend is
        // sign-extended into %edx:%eax, the quotient lands in %eax and the
        // remainder in %edx.
        ir::Instruction::Binary {
            op: op @ (ir::BinaryOp::Divide | ir::BinaryOp::Remainder),
            src1,
            src2,
            dst,
        } => {
            let result = if op == ir::BinaryOp::Divide {
                Register::AX
            } else {
                Register::DX
            };
            out.push(Instruction::Mov {
                src: operand(src1),
                dst: Operand::Reg(Register::AX),
            });
            out.push(Instruction::Cdq);
            out.push(Instruction::Idiv(operand(src2)));
            out.push(Instruction::Mov {
                src: Operand::Reg(result),
                dst: operand(dst),
            });
        }
        ir::Instruction::Binary { op, src1, src2, dst } if op.is_relational() => {
            let dst = operand(dst);
            // AT&T operand order: `cmpl s2, s1` sets flags from s1 - s2, so
            // the condition code reads as `s1 <op> s2`.
            out.push(Instruction::Cmp {
                left: operand(src2),
                right: operand(src1),
            });
            out.push(Instruction::Mov {
                src: Operand::Imm(0),
                dst: dst.clone(),
            });
            out.push(Instruction::SetCC {
                cond: cond_code(op),
                operand: dst,
            });
        }
        ir::Instruction::Binary { op, src1, src2, dst } => {
            let dst = operand(dst);
            out.push(Instruction::Mov {
                src: operand(src1),
                dst: dst.clone(),
            });
            out.push(Instruction::Binary {
                op: binary_op(op),
                src: operand(src2),
                dst,
            });
        }
        ir::Instruction::Copy { src, dst } => {
            out.push(Instruction::Mov {
                src: operand(src),
                dst: operand(dst),
            });
        }
        ir::Instruction::Jump(target) => out.push(Instruction::Jmp(target)),
        ir::Instruction::JumpIfZero { condition, target } => {
            out.push(Instruction::Cmp {
                left: Operand::Imm(0),
                right: operand(condition),
            });
            out.push(Instruction::JmpCC {
                cond: Cond::E,
                target,
            });
        }
        ir::Instruction::JumpIfNotZero { condition, target } => {
            out.push(Instruction::Cmp {
                left: Operand::Imm(0),
                right: operand(condition),
            });
            out.push(Instruction::JmpCC {
                cond: Cond::NE,
                target,
            });
        }
        ir::Instruction::Label(name) => out.push(Instruction::Label(name)),
    }
}

fn operand(value: ir::Val) -> Operand {
    match value {
        ir::Val::Constant(value) => Operand::Imm(value),
        ir::Val::Var(name) => Operand::Pseudo(name),
    }
}

fn unary_op(op: ir::UnaryOp) -> UnaryOp {
    match op {
        ir::UnaryOp::Complement => UnaryOp::Not,
        ir::UnaryOp::Negate => UnaryOp::Neg,
        ir::UnaryOp::Not => unreachable!("logical not lowers to cmp/setcc"),
    }
}

fn binary_op(op: ir::BinaryOp) -> BinaryOp {
    match op {
        ir::BinaryOp::Add => BinaryOp::Add,
        ir::BinaryOp::Subtract => BinaryOp::Sub,
        ir::BinaryOp::Multiply => BinaryOp::Mult,
        ir::BinaryOp::BitAnd => BinaryOp::And,
        ir::BinaryOp::BitOr => BinaryOp::Or,
        ir::BinaryOp::Xor => BinaryOp::Xor,
        ir::BinaryOp::LeftShift => BinaryOp::Sal,
        ir::BinaryOp::RightShift => BinaryOp::Sar,
        ir::BinaryOp::Divide | ir::BinaryOp::Remainder => {
            unreachable!("division lowers through idiv")
        }
        relational => unreachable!("{relational:?} lowers to cmp/setcc"),
    }
}

fn cond_code(op: ir::BinaryOp) -> Cond {
    match op {
        ir::BinaryOp::Equal => Cond::E,
        ir::BinaryOp::NotEqual => Cond::NE,
        ir::BinaryOp::LessThan => Cond::L,
        ir::BinaryOp::LessEqual => Cond::LE,
        ir::BinaryOp::GreaterThan => Cond::G,
        ir::BinaryOp::GreaterEqual => Cond::GE,
        other => unreachable!("{other:?} is not a relational operator"),
    }
}
