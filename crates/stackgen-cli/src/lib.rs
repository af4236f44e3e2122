//! Stackgen CLI library
//!
//! Loads IR modules, runs the WebAssembly code generator over them and writes
//! the generated function bodies.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod emit;

// CLI-specific error handling
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Compilation error: {0}")]
        Compilation(#[from] stackgen_ir::Error),

        #[error("Invalid input: {0}")]
        InvalidInput(String),
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
