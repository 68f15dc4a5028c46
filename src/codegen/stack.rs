//! Pseudo-operand replacement.
//!
//! Walks the instruction list in order and assigns each distinct pseudo
//! operand a fresh 4-byte stack slot, replacing `Pseudo(id)` with
//! `Stack(offset)`. Returns the rewritten function together with the total
//! bytes reserved, which fixup turns into the leading `AllocateStack`.

use std::collections::HashMap;

use super::asm::{Function, Instruction, Operand};

pub(crate) fn replace_pseudos(function: Function) -> (Function, i32) {
    let mut allocator = StackAllocator::new();
    let instructions = function
        .instructions
        .into_iter()
        .map(|instruction| replace_in_instruction(instruction, &mut allocator))
        .collect();

    (
        Function {
            name: function.name,
            instructions,
        },
        allocator.frame_size,
    )
}

struct StackAllocator {
    slots: HashMap<String, i32>,
    frame_size: i32,
}

impl StackAllocator {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            frame_size: 0,
        }
    }

    /// The slot offset for `name`, allocating one on first sight.
    fn slot(&mut self, name: String) -> i32 {
        *self.slots.entry(name).or_insert_with(|| {
            self.frame_size += 4;
            self.frame_size
        })
    }

    fn replace(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Pseudo(name) => Operand::Stack(self.slot(name)),
            other => other,
        }
    }
}

fn replace_in_instruction(
    instruction: Instruction,
    allocator: &mut StackAllocator,
) -> Instruction {
    match instruction {
        Instruction::Mov { src, dst } => Instruction::Mov {
            src: allocator.replace(src),
            dst: allocator.replace(dst),
        },
        Instruction::Unary { op, operand } => Instruction::Unary {
            op,
            operand: allocator.replace(operand),
        },
        Instruction::Binary { op, src, dst } => Instruction::Binary {
            op,
            src: allocator.replace(src),
            dst: allocator.replace(dst),
        },
        Instruction::Cmp { left, right } => Instruction::Cmp {
            left: allocator.replace(left),
            right: allocator.replace(right),
        },
        Instruction::Idiv(operand) => Instruction::Idiv(allocator.replace(operand)),
        Instruction::SetCC { cond, operand } => Instruction::SetCC {
            cond,
            operand: allocator.replace(operand),
        },
        other => other,
    }
}
