use thiserror::Error;

/// Terminal fault taxonomy for the execution core.
///
/// Every fault aborts the fetch-execute cycle; the architecture defines no
/// recovery path for any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// Byte access outside the configured data-memory size.
    #[error("byte address {addr} is outside data memory")]
    ByteAddressOutOfRange {
        /// The out-of-range byte address.
        addr: usize,
    },
    /// Bit access outside the bit-addressable view of data memory.
    #[error("bit address {addr} is outside the bit-addressable space")]
    BitAddressOutOfRange {
        /// The out-of-range bit address.
        addr: usize,
    },
    /// Read outside the configured program-memory size.
    #[error("program memory address {addr} is outside ROM")]
    RomAddressOutOfRange {
        /// The out-of-range ROM address.
        addr: usize,
    },
    /// POP, RET, or RETI executed with an empty stack.
    #[error("stack underflow")]
    StackUnderflow,
    /// DIV executed while register B holds zero.
    #[error("division by zero")]
    DivideByZero,
}

/// A fault annotated with the source line of the failing instruction.
///
/// This is the engine's caller-facing error: the line index comes from the
/// instruction record and points back at the assembly text the external
/// compiler consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("line {line}: {fault}")]
pub struct ExecutionError {
    /// Source line index of the instruction that faulted.
    pub line: usize,
    /// The underlying fault.
    pub fault: Fault,
}

impl ExecutionError {
    /// Pairs a fault with the source line it was observed on.
    #[must_use]
    pub const fn at(line: usize, fault: Fault) -> Self {
        Self { line, fault }
    }
}
