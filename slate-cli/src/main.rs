use clap::Parser;
use slate_compiler::diag::{self, Diag};
use slate_compiler::pipeline::{CleanStage, CmdStage, CompileStage, Pipeline};
use slate_compiler::target::{self, Target};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "slatec")]
#[command(about = "Compiles a slate source file to a native executable")]
struct Args {
    /// Path to the source file to compile
    file: PathBuf,

    /// Path of the final executable (defaults to the source file stem)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the generated IR to stdout instead of producing an executable
    #[arg(long)]
    emit_ir: bool,

    /// Runtime object file linked into the executable
    #[arg(long, default_value = "rt/rt.o")]
    runtime: PathBuf,

    /// Keep the intermediate files (.ll, .o)
    #[arg(long)]
    keep: bool,

    /// Print pipeline stage names as they run
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let Some(target) = Target::native() else {
        let (os, _, arch) = target::uname();
        diag::print_diagnostic(&Diag::generic(format!(
            "No target descriptor for host {os}/{arch}."
        )));
        process::exit(1);
    };

    if args.emit_ir {
        let source = fs::read_to_string(&args.file).unwrap_or_else(|e| {
            eprintln!("Error reading file '{}': {}", args.file.display(), e);
            process::exit(1);
        });
        let name = args.file.display().to_string();
        match slate_compiler::compile_to_ir_text(&source, &name, target) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                diag::print_diagnostic(&e.into_diag(&name, &source));
                process::exit(1);
            }
        }
        return;
    }

    let stem: PathBuf = args
        .file
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));
    let ll = stem.with_extension("ll");
    let obj = stem.with_extension("o");
    let exe = args.output.clone().unwrap_or(stem);

    let mut pipe = Pipeline::new();
    pipe.add_stage(Box::new(CompileStage {
        input: args.file.clone(),
        output: ll.clone(),
        target,
    }));
    pipe.add_stage(Box::new(CmdStage::llc(&ll, &obj)));
    pipe.add_stage(Box::new(CmdStage::link(
        &[args.runtime.clone(), obj.clone()],
        &exe,
    )));
    if !args.keep {
        pipe.add_stage(Box::new(CleanStage {
            files: vec![ll, obj],
        }));
    }

    if let Err(d) = pipe.execute(args.verbose) {
        diag::print_diagnostic(&d);
        process::exit(1);
    }
}
