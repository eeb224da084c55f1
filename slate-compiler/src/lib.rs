pub mod diag;
pub mod frontend;
pub mod ir;
pub mod pipeline;
pub mod sem;
pub mod source_map;
pub mod target;

use diag::Diag;
use source_map::SourceIndex;
use target::Target;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Parse error at position {location}: {message}")]
    Parse { location: usize, message: String },

    #[error("{0}")]
    Semantic(Diag),
}

impl CompileError {
    /// Attach a blame so the error renders like any other diagnostic.
    pub fn into_diag(self, file_name: &str, source: &str) -> Diag {
        match self {
            CompileError::Semantic(d) => d,
            CompileError::Lexical(e) => {
                let index = SourceIndex::new(source);
                Diag::bound(
                    file_name,
                    &index,
                    e.location,
                    e.location,
                    format!("Unexpected character '{}'.", e.unexpected_char),
                )
            }
            CompileError::Parse { location, message } => {
                let index = SourceIndex::new(source);
                Diag::bound(file_name, &index, location, location, format!("{message}."))
            }
        }
    }
}

/// Lower one source file to an IR module.
pub fn compile_to_module(
    source: &str,
    file_name: &str,
    target: Target,
) -> Result<ir::Module, CompileError> {
    let file = frontend::parse_file(source)?;
    sem::translate_file(&file, source, file_name, target).map_err(CompileError::Semantic)
}

/// Lower one source file to textual IR.
pub fn compile_to_ir_text(
    source: &str,
    file_name: &str,
    target: Target,
) -> Result<String, CompileError> {
    Ok(compile_to_module(source, file_name, target)?.to_string())
}
