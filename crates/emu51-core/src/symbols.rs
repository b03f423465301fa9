//! Symbol table for architectural names and jump-target labels.
//!
//! Two independent name→address maps: one for register/flag constants used
//! when rendering byte and bit operands, one for labels used when rendering
//! program-counter targets. Both are populated before the first execution
//! cycle and stay read-only afterwards; the execution path never consults
//! them.

/// Byte address of the accumulator.
pub const ACC_ADDR: usize = 0xE0;
/// Byte address of register B.
pub const B_ADDR: usize = 0xF0;
/// Byte address of the data pointer cell.
pub const DPTR_ADDR: usize = 0x82;
/// Byte address of the program status word.
pub const PSW_ADDR: usize = 0xD0;
/// Bit address of the carry flag (PSW bit 7) in the flat bit space.
pub const CARRY_BIT: usize = PSW_ADDR * 8 + 7;
/// Bit address of the overflow flag (PSW bit 2) in the flat bit space.
pub const OVERFLOW_BIT: usize = PSW_ADDR * 8 + 2;

/// Bidirectional name↔address mapping used by disassembly and PRINT.
///
/// Reverse lookups scan in insertion order, so when two names share an
/// address the first inserted wins. Lookups that find no name fall back to
/// the literal numeric address at the call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SymbolTable {
    constants: Vec<(String, usize)>,
    labels: Vec<(String, usize)>,
}

impl SymbolTable {
    /// Creates an empty table with no names at all.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constants: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Creates a table pre-seeded with the architectural register and flag
    /// names (`A`, `B`, `DPTR`, `PSW`, `C`, `OV`).
    #[must_use]
    pub fn with_architecture() -> Self {
        let mut table = Self::new();
        table.define_constant("A", ACC_ADDR);
        table.define_constant("B", B_ADDR);
        table.define_constant("DPTR", DPTR_ADDR);
        table.define_constant("PSW", PSW_ADDR);
        table.define_constant("C", CARRY_BIT);
        table.define_constant("OV", OVERFLOW_BIT);
        table
    }

    /// Adds a register/flag constant.
    pub fn define_constant(&mut self, name: impl Into<String>, addr: usize) {
        self.constants.push((name.into(), addr));
    }

    /// Adds a jump-target label resolved to an instruction index.
    pub fn define_label(&mut self, name: impl Into<String>, target: usize) {
        self.labels.push((name.into(), target));
    }

    /// Looks up a constant's address by name.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<usize> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, addr)| addr)
    }

    /// Looks up a label's target by name.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, target)| target)
    }

    /// First constant name registered at `addr`, if any.
    #[must_use]
    pub fn constant_name(&self, addr: usize) -> Option<&str> {
        self.constants
            .iter()
            .find(|&&(_, a)| a == addr)
            .map(|(n, _)| n.as_str())
    }

    /// First label name registered at instruction index `target`, if any.
    #[must_use]
    pub fn label_name(&self, target: usize) -> Option<&str> {
        self.labels
            .iter()
            .find(|&&(_, t)| t == target)
            .map(|(n, _)| n.as_str())
    }

    /// Renders a byte/bit operand address: symbol name when one exists,
    /// decimal literal otherwise.
    #[must_use]
    pub fn render_addr(&self, addr: usize) -> String {
        self.constant_name(addr)
            .map_or_else(|| addr.to_string(), str::to_owned)
    }

    /// Renders a jump target: label name when one exists, decimal literal
    /// otherwise.
    #[must_use]
    pub fn render_target(&self, target: usize) -> String {
        self.label_name(target)
            .map_or_else(|| target.to_string(), str::to_owned)
    }
}
