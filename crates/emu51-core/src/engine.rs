//! Fetch-execute engine over a decoded instruction sequence.
//!
//! The engine owns the program counter and drives the cycle convention the
//! instruction set relies on: fetch at `pc`, execute, and advance to
//! `pc + 1` only when the instruction left `pc` untouched. Jump, call, and
//! return opcodes redirect control purely by writing `pc`. Execution halts
//! when `pc` runs past the end of the sequence; there is no explicit HALT
//! opcode.

use crate::fault::{ExecutionError, Fault};
use crate::isa::Instruction;
use crate::memory::{DataMemory, ProgramMemory};
use crate::sink::OutputSink;
use crate::symbols::{SymbolTable, ACC_ADDR, B_ADDR, CARRY_BIT, DPTR_ADDR, OVERFLOW_BIT};

/// Architectural machine state owned by one emulator instance.
///
/// Registers and flags are ordinary data-memory locations; the accessor
/// methods only name the architectural addresses, so every register update
/// is observable through the plain byte/bit views as well.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    /// Byte/bit addressable data memory.
    pub ram: DataMemory,
    /// Read-only code/lookup memory.
    pub rom: ProgramMemory,
    /// LIFO stack shared by PUSH/POP and CALL/RET.
    pub stack: Vec<usize>,
    /// Instruction index of the next fetch.
    pub pc: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Creates a machine with the default data and program memory sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rom(ProgramMemory::default())
    }

    /// Creates a machine around a pre-built program-memory image.
    #[must_use]
    pub fn with_rom(rom: ProgramMemory) -> Self {
        Self {
            ram: DataMemory::default(),
            rom,
            stack: Vec::new(),
            pc: 0,
        }
    }

    /// Reads the accumulator.
    ///
    /// # Errors
    ///
    /// Faults when the accumulator address is outside the configured RAM.
    pub fn acc(&self) -> Result<u8, Fault> {
        self.ram.byte(ACC_ADDR)
    }

    /// Writes the accumulator.
    ///
    /// # Errors
    ///
    /// Faults when the accumulator address is outside the configured RAM.
    pub fn set_acc(&mut self, value: u8) -> Result<(), Fault> {
        self.ram.write_byte(ACC_ADDR, value)
    }

    /// Reads register B.
    ///
    /// # Errors
    ///
    /// Faults when the register address is outside the configured RAM.
    pub fn b(&self) -> Result<u8, Fault> {
        self.ram.byte(B_ADDR)
    }

    /// Writes register B.
    ///
    /// # Errors
    ///
    /// Faults when the register address is outside the configured RAM.
    pub fn set_b(&mut self, value: u8) -> Result<(), Fault> {
        self.ram.write_byte(B_ADDR, value)
    }

    /// Reads the data-pointer byte.
    ///
    /// # Errors
    ///
    /// Faults when the data-pointer address is outside the configured RAM.
    pub fn dptr(&self) -> Result<u8, Fault> {
        self.ram.byte(DPTR_ADDR)
    }

    /// Reads the carry flag as 0 or 1.
    ///
    /// # Errors
    ///
    /// Faults when the flag's backing byte is outside the configured RAM.
    pub fn carry(&self) -> Result<u8, Fault> {
        self.ram.bit(CARRY_BIT)
    }

    /// Writes the carry flag; any nonzero value stores 1.
    ///
    /// # Errors
    ///
    /// Faults when the flag's backing byte is outside the configured RAM.
    pub fn set_carry(&mut self, value: u8) -> Result<(), Fault> {
        self.ram.write_bit(CARRY_BIT, value)
    }

    /// Sets or clears the overflow flag from an arithmetic condition.
    ///
    /// # Errors
    ///
    /// Faults when the flag's backing byte is outside the configured RAM.
    pub fn write_overflow(&mut self, set: bool) -> Result<(), Fault> {
        self.ram.write_bit(OVERFLOW_BIT, u8::from(set))
    }

    /// Resolves an indirect operand: the byte stored at `addr`, used as an
    /// address.
    ///
    /// # Errors
    ///
    /// Faults when `addr` is outside the configured RAM.
    pub fn indirect_addr(&self, addr: usize) -> Result<usize, Fault> {
        Ok(usize::from(self.ram.byte(addr)?))
    }

    /// Reads the byte an indirect operand points at.
    ///
    /// # Errors
    ///
    /// Faults when either hop of the indirection is outside the configured
    /// RAM.
    pub fn indirect(&self, addr: usize) -> Result<u8, Fault> {
        self.ram.byte(self.indirect_addr(addr)?)
    }

    /// Pops one stack entry.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::StackUnderflow`] when the stack is empty.
    pub fn pop(&mut self) -> Result<usize, Fault> {
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }
}

/// Outcome of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// An instruction executed; the engine can step again.
    Executed,
    /// `pc` is past the end of the sequence; nothing was executed.
    Halted,
}

/// Aggregate outcome of a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunSummary {
    /// Number of instructions executed before the program fell off the end.
    pub steps: u64,
}

/// The fetch-execute state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    program: Vec<Instruction>,
    symbols: SymbolTable,
    machine: Machine,
}

impl Engine {
    /// Creates an engine over `program` with architectural defaults.
    #[must_use]
    pub fn new(program: Vec<Instruction>, symbols: SymbolTable) -> Self {
        Self::with_machine(program, symbols, Machine::new())
    }

    /// Creates an engine with a caller-configured machine (RAM size, ROM
    /// image, entry point).
    #[must_use]
    pub fn with_machine(program: Vec<Instruction>, symbols: SymbolTable, machine: Machine) -> Self {
        Self {
            program,
            symbols,
            machine,
        }
    }

    /// Sets the entry point (instruction index of the first fetch).
    pub fn set_entry(&mut self, pc: usize) {
        self.machine.pc = pc;
    }

    /// Current program counter.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.machine.pc
    }

    /// The machine state, for host inspection.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Mutable machine state, for host seeding before a run.
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// The symbol table supplied at construction.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Executes one fetch-execute cycle.
    ///
    /// Fetches the instruction at `pc`, executes it, and advances `pc` to
    /// the fetch index plus one unless the instruction wrote `pc` itself.
    ///
    /// # Errors
    ///
    /// Returns the fault annotated with the failing instruction's source
    /// line; the engine makes no further progress after an error.
    pub fn step(&mut self, sink: &mut dyn OutputSink) -> Result<StepOutcome, ExecutionError> {
        let current = self.machine.pc;
        let Some(instruction) = self.program.get(current) else {
            return Ok(StepOutcome::Halted);
        };

        instruction
            .execute(&mut self.machine, &self.symbols, sink)
            .map_err(|fault| ExecutionError::at(instruction.line, fault))?;

        if self.machine.pc == current {
            self.machine.pc = current + 1;
        }
        Ok(StepOutcome::Executed)
    }

    /// Runs until the program counter falls off the end of the sequence.
    ///
    /// # Errors
    ///
    /// Stops at the first fault, annotated with the failing instruction's
    /// source line.
    pub fn run(&mut self, sink: &mut dyn OutputSink) -> Result<RunSummary, ExecutionError> {
        let mut steps = 0u64;
        while self.step(sink)? == StepOutcome::Executed {
            steps += 1;
        }
        Ok(RunSummary { steps })
    }

    /// Renders the whole program through the symbol table, one line per
    /// instruction.
    #[must_use]
    pub fn disassemble(&self) -> Vec<String> {
        self.program
            .iter()
            .map(|instruction| instruction.disassemble(&self.symbols))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, Machine, StepOutcome};
    use crate::fault::{ExecutionError, Fault};
    use crate::isa::{Instruction, Op};
    use crate::sink::BufferSink;
    use crate::symbols::SymbolTable;

    fn program(ops: Vec<Op>) -> Vec<Instruction> {
        ops.into_iter()
            .enumerate()
            .map(|(line, op)| Instruction::new(op, line))
            .collect()
    }

    #[test]
    fn machine_registers_alias_plain_data_memory() {
        let mut m = Machine::new();
        m.set_acc(0x3C).unwrap();
        assert_eq!(m.ram.byte(crate::symbols::ACC_ADDR), Ok(0x3C));
        m.set_carry(1).unwrap();
        assert_eq!(m.ram.byte(crate::symbols::PSW_ADDR), Ok(0b1000_0000));
    }

    #[test]
    fn non_jump_instructions_fall_through_in_order() {
        let mut engine = Engine::new(
            program(vec![
                Op::MovImm { to: 0x30, value: 1 },
                Op::MovImm { to: 0x31, value: 2 },
                Op::MovImm { to: 0x32, value: 3 },
            ]),
            SymbolTable::new(),
        );
        let mut sink = BufferSink::new();

        assert_eq!(engine.step(&mut sink), Ok(StepOutcome::Executed));
        assert_eq!(engine.pc(), 1);
        assert_eq!(engine.step(&mut sink), Ok(StepOutcome::Executed));
        assert_eq!(engine.pc(), 2);
        assert_eq!(engine.step(&mut sink), Ok(StepOutcome::Executed));
        assert_eq!(engine.pc(), 3);
        assert_eq!(engine.step(&mut sink), Ok(StepOutcome::Halted));
        assert_eq!(engine.pc(), 3);

        let m = engine.machine();
        assert_eq!(m.ram.byte(0x30), Ok(1));
        assert_eq!(m.ram.byte(0x31), Ok(2));
        assert_eq!(m.ram.byte(0x32), Ok(3));
    }

    #[test]
    fn jumps_suppress_the_fall_through_advance() {
        let mut engine = Engine::new(
            program(vec![
                Op::Jmp { target: 2 },
                Op::MovImm { to: 0x30, value: 0xFF },
                Op::MovImm { to: 0x31, value: 1 },
            ]),
            SymbolTable::new(),
        );
        let mut sink = BufferSink::new();
        let summary = engine.run(&mut sink).unwrap();

        assert_eq!(summary.steps, 2);
        assert_eq!(engine.machine().ram.byte(0x30), Ok(0));
        assert_eq!(engine.machine().ram.byte(0x31), Ok(1));
    }

    #[test]
    fn call_and_ret_resume_after_the_call_site() {
        // 0: CALL 3 / 1: MOV 0x31 <- 7 / 2: JMP 5 (skip sub) / 3: MOV 0x30 <- 9 / 4: RET
        let mut engine = Engine::new(
            program(vec![
                Op::Call { target: 3 },
                Op::MovImm { to: 0x31, value: 7 },
                Op::Jmp { target: 5 },
                Op::MovImm { to: 0x30, value: 9 },
                Op::Ret,
            ]),
            SymbolTable::new(),
        );
        let mut sink = BufferSink::new();
        engine.run(&mut sink).unwrap();

        let m = engine.machine();
        assert_eq!(m.ram.byte(0x30), Ok(9));
        assert_eq!(m.ram.byte(0x31), Ok(7));
        assert!(m.stack.is_empty());
    }

    #[test]
    fn nested_calls_unwind_in_reverse_order() {
        // 0: CALL 2 / 1: JMP 6 / 2: MOV / 3: CALL 5 / 4: RET / 5: RETI
        let mut engine = Engine::new(
            program(vec![
                Op::Call { target: 2 },
                Op::Jmp { target: 6 },
                Op::MovImm { to: 0x30, value: 1 },
                Op::Call { target: 5 },
                Op::Ret,
                Op::Reti,
            ]),
            SymbolTable::new(),
        );
        let mut sink = BufferSink::new();
        let summary = engine.run(&mut sink).unwrap();

        assert_eq!(summary.steps, 6);
        assert_eq!(engine.machine().ram.byte(0x30), Ok(1));
    }

    #[test]
    fn entry_point_offsets_the_first_fetch() {
        let mut engine = Engine::new(
            program(vec![
                Op::MovImm { to: 0x30, value: 1 },
                Op::MovImm { to: 0x31, value: 2 },
            ]),
            SymbolTable::new(),
        );
        engine.set_entry(1);
        let mut sink = BufferSink::new();
        engine.run(&mut sink).unwrap();

        assert_eq!(engine.machine().ram.byte(0x30), Ok(0));
        assert_eq!(engine.machine().ram.byte(0x31), Ok(2));
    }

    #[test]
    fn errors_carry_the_failing_source_line() {
        let mut engine = Engine::new(
            vec![Instruction::new(Op::Ret, 41)],
            SymbolTable::new(),
        );
        let mut sink = BufferSink::new();
        assert_eq!(
            engine.run(&mut sink),
            Err(ExecutionError::at(41, Fault::StackUnderflow))
        );
    }

    #[test]
    fn print_output_appears_in_program_order() {
        let mut engine = Engine::new(
            program(vec![
                Op::MovImm { to: 0x30, value: 1 },
                Op::Print { addr: 0x30 },
                Op::MovImm { to: 0x30, value: 2 },
                Op::Print { addr: 0x30 },
            ]),
            SymbolTable::new(),
        );
        let mut sink = BufferSink::new();
        engine.run(&mut sink).unwrap();
        assert_eq!(sink.lines(), ["48 : 00000001", "48 : 00000010"]);
    }

    #[test]
    fn disassembly_never_touches_machine_state() {
        let mut symbols = SymbolTable::with_architecture();
        symbols.define_label("start", 0);
        let engine = Engine::new(
            program(vec![
                Op::MovImm { to: 0x30, value: 1 },
                Op::Jmp { target: 0 },
            ]),
            symbols,
        );
        let before = engine.machine().clone();
        let listing = engine.disassemble();
        assert_eq!(listing, ["MOV 48, 1", "JMP start"]);
        assert_eq!(engine.machine(), &before);
    }
}
