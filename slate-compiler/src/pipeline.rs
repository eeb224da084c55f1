//! Ordered compilation stages. Stages run in sequence; the first diagnostic
//! aborts the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::diag::Diag;
use crate::target::Target;

pub trait Stage {
    fn name(&self) -> &str;
    fn run(&mut self) -> Result<(), Diag>;
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn execute(&mut self, verbose: bool) -> Result<(), Diag> {
        for stage in &mut self.stages {
            if verbose {
                eprintln!("[{}]", stage.name());
            }
            stage.run()?;
        }
        Ok(())
    }
}

/// Runs an external command. Failure carries the combined stdout/stderr in a
/// command blame.
pub struct CmdStage {
    cmd: String,
    args: Vec<String>,
}

impl CmdStage {
    pub fn new(cmd: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args,
        }
    }

    /// `llc -filetype=obj -o=<output> <input>`
    pub fn llc(input: &Path, output: &Path) -> Self {
        Self::new(
            "llc",
            vec![
                "-filetype=obj".to_string(),
                format!("-o={}", output.display()),
                input.display().to_string(),
            ],
        )
    }

    /// `clang <inputs…> -o <output>`
    pub fn link(inputs: &[PathBuf], output: &Path) -> Self {
        let mut args: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        args.push("-o".to_string());
        args.push(output.display().to_string());
        Self::new("clang", args)
    }

    fn invocation(&self) -> String {
        let mut s = self.cmd.clone();
        for a in &self.args {
            s.push(' ');
            s.push_str(a);
        }
        s
    }
}

impl Stage for CmdStage {
    fn name(&self) -> &str {
        &self.cmd
    }

    fn run(&mut self) -> Result<(), Diag> {
        match Command::new(&self.cmd).args(&self.args).output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&out.stderr));
                Err(Diag::command(
                    &self.cmd,
                    self.invocation(),
                    combined,
                    "Command exited with non-zero status.",
                ))
            }
            Err(e) => Err(Diag::command(
                &self.cmd,
                self.invocation(),
                e.to_string(),
                "Command could not be run.",
            )),
        }
    }
}

/// Lowers a source file to textual IR.
pub struct CompileStage {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target: Target,
}

impl Stage for CompileStage {
    fn name(&self) -> &str {
        "compile"
    }

    fn run(&mut self) -> Result<(), Diag> {
        let source = fs::read_to_string(&self.input).map_err(|e| {
            Diag::generic(format!(
                "Error while reading file {}: {e}",
                self.input.display()
            ))
        })?;
        let file_name = self.input.display().to_string();
        let module = crate::compile_to_module(&source, &file_name, self.target.clone())
            .map_err(|e| e.into_diag(&file_name, &source))?;
        fs::write(&self.output, module.to_string()).map_err(|e| {
            Diag::generic(format!(
                "Error while writing file {}: {e}",
                self.output.display()
            ))
        })
    }
}

/// Removes intermediate files.
pub struct CleanStage {
    pub files: Vec<PathBuf>,
}

impl Stage for CleanStage {
    fn name(&self) -> &str {
        "clean"
    }

    fn run(&mut self) -> Result<(), Diag> {
        for f in &self.files {
            if let Err(e) = fs::remove_file(f) {
                return Err(Diag::generic(format!(
                    "Error while removing file {}: {e}",
                    f.display()
                )));
            }
        }
        Ok(())
    }
}
