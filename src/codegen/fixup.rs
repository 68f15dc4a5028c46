//! Instruction fixup.
//!
//! Rewrites operand combinations the ISA cannot encode, using `R10` as the
//! generic scratch register and `R11` for `imul` destinations and immediate
//! comparisons, and prepends the frame's `AllocateStack`. After this pass:
//!
//! - no `mov`, non-`imul` binary, or `cmp` has two memory operands;
//! - `imul` never writes directly to memory;
//! - non-immediate shift counts live in `%cl`;
//! - `idiv` never takes an immediate;
//! - the right operand of `cmp` is never an immediate.

use super::asm::{BinaryOp, Function, Instruction, Operand, Register};

pub(crate) fn fix_instructions(function: Function, frame_size: i32) -> Function {
    let mut fixed = Vec::with_capacity(function.instructions.len() + 1);
    fixed.push(Instruction::AllocateStack(frame_size));

    for instruction in function.instructions {
        fix_instruction(instruction, &mut fixed);
    }

    Function {
        name: function.name,
        instructions: fixed,
    }
}

fn fix_instruction(instruction: Instruction, out: &mut Vec<Instruction>) {
    match instruction {
        // mov cannot move memory to memory; stage through R10.
        Instruction::Mov { src, dst } if src.is_memory() && dst.is_memory() => {
            out.push(Instruction::Mov {
                src,
                dst: Operand::Reg(Register::R10),
            });
            out.push(Instruction::Mov {
                src: Operand::Reg(Register::R10),
                dst,
            });
        }

        // imul cannot target memory: load the destination into R11, multiply
        // there, store back.
        Instruction::Binary {
            op: BinaryOp::Mult,
            src,
            dst,
        } if dst.is_memory() => {
            out.push(Instruction::Mov {
                src: dst.clone(),
                dst: Operand::Reg(Register::R11),
            });
            out.push(Instruction::Binary {
                op: BinaryOp::Mult,
                src,
                dst: Operand::Reg(Register::R11),
            });
            out.push(Instruction::Mov {
                src: Operand::Reg(Register::R11),
                dst,
            });
        }

        // A non-immediate shift count must be in %cl.
        Instruction::Binary {
            op: op @ (BinaryOp::Sal | BinaryOp::Sar),
            src,
            dst,
        } if !matches!(src, Operand::Imm(_) | Operand::Reg(Register::CX)) => {
            out.push(Instruction::Mov {
                src,
                dst: Operand::Reg(Register::CX),
            });
            out.push(Instruction::Binary {
                op,
                src: Operand::Reg(Register::CX),
                dst,
            });
        }

        // The remaining two-address ops allow at most one memory operand.
        Instruction::Binary { op, src, dst } if src.is_memory() && dst.is_memory() => {
            out.push(Instruction::Mov {
                src,
                dst: Operand::Reg(Register::R10),
            });
            out.push(Instruction::Binary {
                op,
                src: Operand::Reg(Register::R10),
                dst,
            });
        }

        // cmp's right operand cannot be an immediate.
        Instruction::Cmp {
            left,
            right: Operand::Imm(value),
        } => {
            out.push(Instruction::Mov {
                src: Operand::Imm(value),
                dst: Operand::Reg(Register::R11),
            });
            out.push(Instruction::Cmp {
                left,
                right: Operand::Reg(Register::R11),
            });
        }

        Instruction::Cmp { left, right } if left.is_memory() && right.is_memory() => {
            out.push(Instruction::Mov {
                src: left,
                dst: Operand::Reg(Register::R10),
            });
            out.push(Instruction::Cmp {
                left: Operand::Reg(Register::R10),
                right,
            });
        }

        // idiv cannot take an immediate; stage through R10.
        Instruction::Idiv(Operand::Imm(value)) => {
            out.push(Instruction::Mov {
                src: Operand::Imm(value),
                dst: Operand::Reg(Register::R10),
            });
            out.push(Instruction::Idiv(Operand::Reg(Register::R10)));
        }

        legal => out.push(legal),
    }
}
