//! # Emitter
//!
//! Renders the fixed-up assembly tree as GNU assembler text: AT&T syntax,
//! System V AMD64, 32-bit (`l`-suffixed) operations throughout.
//!
//! Labels are printed with a `.L` prefix, which keeps them local to the
//! object file and out of the way of the function's own symbol. `setcc`
//! destinations and register shift counts use the 8-bit register names.
//! The GNU-stack note trailer marks the stack non-executable.

use std::fmt;

use crate::codegen::asm::{
    BinaryOp, Cond, Function, Instruction, Operand, Program, Register, UnaryOp,
};

pub fn emit_program(program: &Program) -> String {
    let mut emitter = Emitter::new();
    emitter.function(&program.function);
    emitter.line(".section .note.GNU-stack,\"\",@progbits");
    emitter.text
}

struct Emitter {
    text: String,
}

impl Emitter {
    fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// An instruction line, tab-indented.
    fn inst(&mut self, inst: &str) {
        self.text.push('\t');
        self.line(inst);
    }

    fn function(&mut self, function: &Function) {
        self.line(&format!(".global {}", function.name));
        self.line(&format!("{}:", function.name));
        self.inst("pushq %rbp");
        self.inst("movq %rsp, %rbp");
        for instruction in &function.instructions {
            self.instruction(instruction);
        }
    }

    fn instruction(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::Mov { src, dst } => self.inst(&format!("movl {src}, {dst}")),
            Instruction::Unary { op, operand } => {
                let mnemonic = match op {
                    UnaryOp::Neg => "negl",
                    UnaryOp::Not => "notl",
                };
                self.inst(&format!("{mnemonic} {operand}"));
            }
            Instruction::Binary { op, src, dst } => self.binary(*op, src, dst),
            Instruction::Cmp { left, right } => self.inst(&format!("cmpl {left}, {right}")),
            Instruction::Idiv(operand) => self.inst(&format!("idivl {operand}")),
            Instruction::Cdq => self.inst("cdq"),
            Instruction::Jmp(target) => self.inst(&format!("jmp .L{target}")),
            Instruction::JmpCC { cond, target } => self.inst(&format!("j{cond} .L{target}")),
            Instruction::SetCC { cond, operand } => {
                self.inst(&format!("set{cond} {}", byte_operand(operand)));
            }
            Instruction::Label(name) => self.line(&format!(".L{name}:")),
            Instruction::AllocateStack(0) => self.inst("# no stack slots needed"),
            Instruction::AllocateStack(bytes) => self.inst(&format!("subq ${bytes}, %rsp")),
            Instruction::Ret => {
                self.inst("movq %rbp, %rsp");
                self.inst("popq %rbp");
                self.inst("ret");
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, src: &Operand, dst: &Operand) {
        let mnemonic = match op {
            BinaryOp::Add => "addl",
            BinaryOp::Sub => "subl",
            BinaryOp::Mult => "imull",
            BinaryOp::And => "andl",
            BinaryOp::Or => "orl",
            BinaryOp::Xor => "xorl",
            BinaryOp::Sal => "sall",
            BinaryOp::Sar => "sarl",
        };
        // A shift count held in a register is addressed as %cl.
        if matches!(op, BinaryOp::Sal | BinaryOp::Sar) && matches!(src, Operand::Reg(_)) {
            self.inst(&format!("{mnemonic} {}, {dst}", byte_operand(src)));
        } else {
            self.inst(&format!("{mnemonic} {src}, {dst}"));
        }
    }
}

impl fmt::Display for Operand {
    /// The operand in 32-bit AT&T syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(value) => write!(f, "${value}"),
            Operand::Reg(register) => f.write_str(register_name(*register)),
            Operand::Stack(offset) => write!(f, "-{offset}(%rbp)"),
            Operand::Pseudo(name) => {
                unreachable!("pseudo operand '{name}' survived stack allocation")
            }
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Cond::E => "e",
            Cond::NE => "ne",
            Cond::L => "l",
            Cond::LE => "le",
            Cond::G => "g",
            Cond::GE => "ge",
        };
        f.write_str(code)
    }
}

fn register_name(register: Register) -> &'static str {
    match register {
        Register::AX => "%eax",
        Register::CX => "%ecx",
        Register::DX => "%edx",
        Register::R10 => "%r10d",
        Register::R11 => "%r11d",
    }
}

/// The 8-bit rendering of an operand, for `setcc` destinations and shift
/// counts. Stack slots print the same either way; only registers change.
fn byte_operand(operand: &Operand) -> String {
    match operand {
        Operand::Reg(Register::AX) => "%al".into(),
        Operand::Reg(Register::CX) => "%cl".into(),
        Operand::Reg(Register::DX) => "%dl".into(),
        Operand::Reg(Register::R10) => "%r10b".into(),
        Operand::Reg(Register::R11) => "%r11b".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(instructions: Vec<Instruction>) -> Program {
        Program {
            function: Function {
                name: "main".into(),
                instructions,
            },
        }
    }

    #[test]
    fn emits_return_constant() {
        let text = emit_program(&program(vec![
            Instruction::AllocateStack(0),
            Instruction::Mov {
                src: Operand::Imm(2),
                dst: Operand::Reg(Register::AX),
            },
            Instruction::Ret,
        ]));

        let expected = "\
.global main
main:
\tpushq %rbp
\tmovq %rsp, %rbp
\t# no stack slots needed
\tmovl $2, %eax
\tmovq %rbp, %rsp
\tpopq %rbp
\tret
.section .note.GNU-stack,\"\",@progbits
";
        assert_eq!(text, expected);
    }

    #[test]
    fn emits_stack_frame_and_slots() {
        let text = emit_program(&program(vec![
            Instruction::AllocateStack(8),
            Instruction::Mov {
                src: Operand::Imm(3),
                dst: Operand::Stack(4),
            },
        ]));
        assert!(text.contains("subq $8, %rsp"));
        assert!(text.contains("movl $3, -4(%rbp)"));
    }

    #[test]
    fn emits_byte_registers_for_setcc() {
        let text = emit_program(&program(vec![Instruction::SetCC {
            cond: Cond::LE,
            operand: Operand::Reg(Register::R10),
        }]));
        assert!(text.contains("setle %r10b"));
    }

    #[test]
    fn emits_cl_for_register_shift_count() {
        let text = emit_program(&program(vec![Instruction::Binary {
            op: BinaryOp::Sal,
            src: Operand::Reg(Register::CX),
            dst: Operand::Stack(4),
        }]));
        assert!(text.contains("sall %cl, -4(%rbp)"));
    }

    #[test]
    fn emits_local_labels_and_jumps() {
        let text = emit_program(&program(vec![
            Instruction::JmpCC {
                cond: Cond::NE,
                target: "or_true.2".into(),
            },
            Instruction::Jmp("or_end.3".into()),
            Instruction::Label("or_true.2".into()),
        ]));
        assert!(text.contains("jne .Lor_true.2"));
        assert!(text.contains("jmp .Lor_end.3"));
        assert!(text.contains(".Lor_true.2:"));
    }
}
