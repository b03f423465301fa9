//! Execution core for an 8051-family teaching emulator.
//!
//! The crate takes a decoded program (instruction records already resolved
//! to numeric operands by an external assembler), a symbol table for
//! rendering, and an output sink, and reproduces the architecture's
//! observable behavior cycle by cycle.

/// Data and program memory models.
pub mod memory;
pub use memory::{
    DataMemory, ProgramMemory, BITS_PER_BYTE, DATA_MEMORY_BYTES, PROGRAM_MEMORY_BYTES,
};

/// Symbol table for architectural names and jump-target labels.
pub mod symbols;
pub use symbols::{
    SymbolTable, ACC_ADDR, B_ADDR, CARRY_BIT, DPTR_ADDR, OVERFLOW_BIT, PSW_ADDR,
};

/// Terminal fault taxonomy and caller-facing execution errors.
pub mod fault;
pub use fault::{ExecutionError, Fault};

/// Host output sink consumed by the output-family instructions.
pub mod sink;
pub use sink::{BufferSink, OutputSink};

/// The closed instruction set.
pub mod isa;
pub use isa::{Instruction, Op};

/// Fetch-execute engine and machine state.
pub mod engine;
pub use engine::{Engine, Machine, RunSummary, StepOutcome};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
