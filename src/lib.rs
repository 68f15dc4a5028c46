//! # minicc
//!
//! A compiler for a small subset of C, targeting x86-64 GNU assembly on
//! System V AMD64 Linux.
//!
//! ## Pipeline
//!
//! One preprocessed translation unit flows forward through six stages:
//!
//! 1. **Lexer** - Source text to token stream
//! 2. **Parser** - Tokens to C AST (precedence climbing for expressions)
//! 3. **Resolver** - Unique variable renaming, lvalue and label checks
//! 4. **TACKY** - AST to three-address IR with explicit control flow
//! 5. **Codegen** - IR to abstract assembly, stack slots, instruction fixup
//! 6. **Emitter** - Abstract assembly to GNU assembler text
//!
//! No stage revisits an earlier one, and every stage consumes a complete
//! tree and produces a new one. Preprocessing and assembling/linking are
//! delegated to the system C toolchain by the driver binary.
//!
//! ## Example
//!
//! ```rust
//! let asm = minicc::compile("int main(void) { return 1 + 2 * 3; }").unwrap();
//! assert!(asm.contains("movl"));
//! ```

pub mod codegen;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod names;
pub mod parser;
pub mod resolver;
pub mod tacky;

use error::CompileError;
use names::NameGen;

/// Compile one preprocessed C translation unit to assembly text.
///
/// Runs the full pipeline. The first error at any stage aborts the whole
/// compilation.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let tokens = lexer::tokenize(source)?;
    let ast = parser::parse_program(&tokens)?;

    let mut names = NameGen::new();
    let resolved = resolver::resolve_program(ast, &mut names)?;
    let tacky = tacky::emit_program(resolved, &mut names);
    let asm = codegen::generate(tacky);

    Ok(emitter::emit_program(&asm))
}
