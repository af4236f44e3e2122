//! WebAssembly code generation for stackgen IR functions.
//!
//! Each function is lowered independently into a code-section body. Calls
//! are left without their function index: the generator records a
//! relocation for each one and the link stage fills the index in once final
//! function indices are known.

pub mod constant;
pub mod context;
pub mod driver;
mod lower;
pub mod opcodes;
pub mod reader;
pub mod signature;
pub mod types;

pub use context::{generate_function, Context, FunctionCode, WValue};
pub use driver::{generate_module, CodegenOptions, FailurePolicy, ModuleCodegen, ModuleOutput};
pub use reader::{BodyReader, DecodedBody, Op};
