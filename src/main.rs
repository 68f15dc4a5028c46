//! The compiler driver.
//!
//! A thin orchestrator around the library pipeline: it preprocesses the
//! input with the system C compiler, runs the translation stages (stopping
//! early if a stage flag was given), writes the assembly file, and hands it
//! back to the system compiler to assemble and link.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::debug;

use minicc::names::NameGen;

/// Compile a C source file to an executable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the .c source file
    input: PathBuf,

    /// Stop after lexing
    #[arg(long, group = "stage")]
    lex: bool,

    /// Stop after parsing
    #[arg(long, group = "stage")]
    parse: bool,

    /// Stop after semantic validation
    #[arg(long, group = "stage")]
    validate: bool,

    /// Stop after TACKY generation
    #[arg(long, group = "stage")]
    tacky: bool,

    /// Stop after code generation, before emission
    #[arg(long, group = "stage")]
    codegen: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.input.is_file() {
        bail!("File not found {}", cli.input.display());
    }

    let preprocessed = cli.input.with_extension("i");
    preprocess(&cli.input, &preprocessed)?;
    let source = fs::read_to_string(&preprocessed)
        .with_context(|| format!("reading {}", preprocessed.display()))?;

    let tokens = minicc::lexer::tokenize(&source)?;
    debug!("lexed {} tokens", tokens.len());
    if cli.lex {
        return Ok(());
    }

    let ast = minicc::parser::parse_program(&tokens)?;
    debug!("parsed function '{}'", ast.function.name);
    if cli.parse {
        return Ok(());
    }

    let mut names = NameGen::new();
    let resolved = minicc::resolver::resolve_program(ast, &mut names)?;
    if cli.validate {
        return Ok(());
    }

    let tacky = minicc::tacky::emit_program(resolved, &mut names);
    debug!(
        "lowered to {} TACKY instructions",
        tacky.function.instructions.len()
    );
    if cli.tacky {
        return Ok(());
    }

    let asm = minicc::codegen::generate(tacky);
    if cli.codegen {
        return Ok(());
    }

    let asm_path = cli.input.with_extension("s");
    fs::write(&asm_path, minicc::emitter::emit_program(&asm))
        .with_context(|| format!("writing {}", asm_path.display()))?;
    debug!("wrote {}", asm_path.display());

    let output_path = cli.input.with_extension("");
    assemble_and_link(&asm_path, &output_path)
}

/// Run the external C preprocessor: `gcc -E -P <input> -o <output>`.
fn preprocess(input: &Path, output: &Path) -> Result<()> {
    run_gcc(&["-E", "-P"], input, output).context("preprocessing failed")
}

/// Assemble and link the emitted assembly: `gcc -o <output> <asm>`.
fn assemble_and_link(asm: &Path, output: &Path) -> Result<()> {
    run_gcc(&[], asm, output).context("assembling/linking failed")
}

fn run_gcc(flags: &[&str], input: &Path, output: &Path) -> Result<()> {
    let mut command = Command::new("gcc");
    command.args(flags).arg(input).arg("-o").arg(output);
    debug!("running {command:?}");

    let result = command
        .output()
        .context("failed to invoke gcc; is it installed?")?;
    if !result.status.success() {
        bail!("gcc exited with {}: {}", result.status, String::from_utf8_lossy(&result.stderr));
    }
    Ok(())
}
