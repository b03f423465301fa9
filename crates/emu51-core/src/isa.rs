//! The closed instruction set: one variant per opcode, an exhaustive match
//! for execution and another for disassembly.
//!
//! Operands arrive fully resolved from the external assembler: `to`/`from`
//! are data-memory byte addresses, `bit` operands address the bit view,
//! `value` is an immediate literal, and `target` is an instruction index.
//! Indirect operands (`@x`) use the byte stored at `x` as the address.
//!
//! Execution mutates the [`Machine`] (and, for the output family, the
//! [`OutputSink`]); disassembly reads only the instruction and the
//! [`SymbolTable`]. Jump-style opcodes redirect control purely by writing
//! `Machine::pc`; the engine's fall-through convention does the rest.

#![allow(clippy::cast_possible_truncation, clippy::too_many_lines)]

use crate::engine::Machine;
use crate::fault::Fault;
use crate::sink::OutputSink;
use crate::symbols::SymbolTable;

/// One opcode with its resolved numeric operands.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Op {
    /// Copy a byte between direct addresses.
    Mov {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Store an immediate byte at a direct address.
    MovImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },
    /// Copy a byte from an indirect source.
    MovFromIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Copy a byte to an indirect destination.
    MovToIndirect {
        /// Address of the cell holding the destination address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// `MOV A, @A+DPTR`: accumulator becomes the ROM byte at `A + DPTR`.
    MovCodeDptr,
    /// `MOV A, @A+PC`: accumulator becomes the ROM byte at `A + pc`.
    MovCodePc,
    /// Copy a bit between bit addresses.
    MovBit {
        /// Destination bit address.
        to: usize,
        /// Source bit address.
        from: usize,
    },

    /// Byte AND of a direct source into a direct destination.
    Anl {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Byte AND of an indirect source.
    AnlIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Byte AND of an immediate.
    AnlImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },
    /// Byte OR of a direct source.
    Orl {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Byte OR of an indirect source.
    OrlIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Byte OR of an immediate.
    OrlImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },
    /// Byte XOR of a direct source.
    Xrl {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Byte XOR of an indirect source.
    XrlIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Byte XOR of an immediate.
    XrlImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },

    /// Complement every accumulator bit.
    CplAcc,
    /// Zero the accumulator.
    ClrAcc,
    /// Complement one bit.
    CplBit {
        /// Bit address.
        bit: usize,
    },
    /// Clear one bit.
    ClrBit {
        /// Bit address.
        bit: usize,
    },
    /// Set one bit.
    SetBit {
        /// Bit address.
        bit: usize,
    },
    /// OR a bit into the carry flag.
    OrlCarry {
        /// Bit address.
        bit: usize,
    },
    /// AND a bit into the carry flag.
    AnlCarry {
        /// Bit address.
        bit: usize,
    },
    /// Exchange the accumulator's nibbles.
    SwapAcc,

    /// Push the addressed byte onto the stack.
    Push {
        /// Source byte address.
        from: usize,
    },
    /// Pop one stack entry into the addressed byte.
    Pop {
        /// Destination byte address.
        to: usize,
    },

    /// Unconditional jump to an instruction index.
    Jmp {
        /// Target instruction index.
        target: usize,
    },
    /// Computed jump: `pc = ram[rom[A + DPTR]]`.
    JmpAccDptr,
    /// Push the return index, then jump.
    Call {
        /// Target instruction index.
        target: usize,
    },
    /// Pop the program counter from the stack.
    Ret,
    /// Return-from-interrupt spelling of [`Op::Ret`].
    Reti,

    /// Wrapped byte addition of a direct source; overflow flag per the
    /// unwrapped sum.
    Add {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Wrapped addition of an indirect source.
    AddIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Wrapped addition of an immediate.
    AddImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },
    /// Addition including the carry flag as input.
    Addc {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Carry addition of an indirect source.
    AddcIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Carry addition of an immediate.
    AddcImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },
    /// Increment a direct byte.
    Inc {
        /// Byte address.
        to: usize,
    },
    /// Increment the indirectly addressed byte in place.
    IncIndirect {
        /// Address of the cell holding the target address.
        to: usize,
    },
    /// Wrapped subtraction `to - (from + carry)`; overflow flag per the
    /// unwrapped difference.
    Subb {
        /// Destination byte address.
        to: usize,
        /// Source byte address.
        from: usize,
    },
    /// Borrow subtraction of an indirect source.
    SubbIndirect {
        /// Destination byte address.
        to: usize,
        /// Address of the cell holding the source address.
        from: usize,
    },
    /// Borrow subtraction of an immediate.
    SubbImm {
        /// Destination byte address.
        to: usize,
        /// Immediate literal.
        value: u8,
    },
    /// Decrement a direct byte.
    Dec {
        /// Byte address.
        to: usize,
    },
    /// Decrement the indirectly addressed byte in place.
    DecIndirect {
        /// Address of the cell holding the target address.
        to: usize,
    },
    /// `MUL AB`: 16-bit product split across A (low) and B (high), carry
    /// cleared.
    Mul,
    /// `DIV AB`: quotient in A, remainder in B, carry cleared.
    Div,

    /// Jump when the bit is set.
    Jb {
        /// Bit address.
        bit: usize,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when the bit is clear.
    Jnb {
        /// Bit address.
        bit: usize,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when the bit is set, clearing it on the taken path.
    Jbc {
        /// Bit address.
        bit: usize,
        /// Target instruction index.
        target: usize,
    },

    /// Jump when two direct bytes are equal.
    Cje {
        /// First compared byte address.
        a: usize,
        /// Second compared byte address.
        b: usize,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when a direct byte equals an immediate.
    CjeImm {
        /// Compared byte address.
        a: usize,
        /// Immediate literal.
        value: u8,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when an indirectly addressed byte equals an immediate.
    CjeIndirect {
        /// Address of the cell holding the compared address.
        a: usize,
        /// Immediate literal.
        value: u8,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when two direct bytes differ.
    Cjne {
        /// First compared byte address.
        a: usize,
        /// Second compared byte address.
        b: usize,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when a direct byte differs from an immediate.
    CjneImm {
        /// Compared byte address.
        a: usize,
        /// Immediate literal.
        value: u8,
        /// Target instruction index.
        target: usize,
    },
    /// Jump when an indirectly addressed byte differs from an immediate.
    CjneIndirect {
        /// Address of the cell holding the compared address.
        a: usize,
        /// Immediate literal.
        value: u8,
        /// Target instruction index.
        target: usize,
    },
    /// Jump while the counter byte is nonzero, then decrement it.
    Djnz {
        /// Counter byte address.
        counter: usize,
        /// Target instruction index.
        target: usize,
    },

    /// Swap the accumulator with a direct byte.
    Xch {
        /// Byte address exchanged with the accumulator.
        with: usize,
    },
    /// Swap the accumulator with an indirectly addressed byte.
    XchIndirect {
        /// Address of the cell holding the exchanged address.
        with: usize,
    },
    /// Swap only the low nibbles of the accumulator and an indirectly
    /// addressed byte.
    XchdIndirect {
        /// Address of the cell holding the exchanged address.
        with: usize,
    },

    /// Rotate the accumulator left, bit 7 wrapping into bit 0.
    Rl,
    /// Rotate left through the carry flag.
    Rlc,
    /// Rotate the accumulator right, bit 0 wrapping into bit 7.
    Rr,
    /// Rotate right through the carry flag.
    Rrc,

    /// Clear the output sink.
    Cls,
    /// Append the operand's name (or address) and its byte value in
    /// 8-digit binary.
    Print {
        /// Byte address to render.
        addr: usize,
    },
    /// Append a fixed text line.
    PrintText {
        /// The literal line.
        text: String,
    },
}

/// An immutable instruction record: opcode plus originating source line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction {
    /// The opcode and its resolved operands.
    pub op: Op,
    /// Source-line index used for error reporting and label mapping.
    pub line: usize,
}

impl Instruction {
    /// Pairs an opcode with its source line.
    #[must_use]
    pub const fn new(op: Op, line: usize) -> Self {
        Self { op, line }
    }

    /// Executes the instruction against `machine`, writing any output to
    /// `sink`.
    ///
    /// # Errors
    ///
    /// Propagates the [`Fault`] raised by memory, stack, or arithmetic.
    pub fn execute(
        &self,
        machine: &mut Machine,
        symbols: &SymbolTable,
        sink: &mut dyn OutputSink,
    ) -> Result<(), Fault> {
        self.op.execute(machine, symbols, sink)
    }

    /// Renders the instruction as a human-readable line.
    #[must_use]
    pub fn disassemble(&self, symbols: &SymbolTable) -> String {
        self.op.disassemble(symbols)
    }

    /// The opcode mnemonic without operands.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        self.op.mnemonic()
    }
}

impl Op {
    /// Applies this opcode's side effect to `machine` (and `sink` for the
    /// output family).
    ///
    /// # Errors
    ///
    /// Propagates the [`Fault`] raised by memory, stack, or arithmetic.
    pub fn execute(
        &self,
        m: &mut Machine,
        symbols: &SymbolTable,
        sink: &mut dyn OutputSink,
    ) -> Result<(), Fault> {
        match self {
            Self::Mov { to, from } => {
                let v = m.ram.byte(*from)?;
                m.ram.write_byte(*to, v)
            }
            Self::MovImm { to, value } => m.ram.write_byte(*to, *value),
            Self::MovFromIndirect { to, from } => {
                let v = m.indirect(*from)?;
                m.ram.write_byte(*to, v)
            }
            Self::MovToIndirect { to, from } => {
                let dest = m.indirect_addr(*to)?;
                let v = m.ram.byte(*from)?;
                m.ram.write_byte(dest, v)
            }
            Self::MovCodeDptr => {
                let addr = usize::from(m.acc()?) + usize::from(m.dptr()?);
                let v = m.rom.read(addr)?;
                m.set_acc(v)
            }
            Self::MovCodePc => {
                let addr = usize::from(m.acc()?) + m.pc;
                let v = m.rom.read(addr)?;
                m.set_acc(v)
            }
            Self::MovBit { to, from } => {
                let v = m.ram.bit(*from)?;
                m.ram.write_bit(*to, v)
            }

            Self::Anl { to, from } => {
                let rhs = m.ram.byte(*from)?;
                logical(m, *to, rhs, |a, b| a & b)
            }
            Self::AnlIndirect { to, from } => {
                let rhs = m.indirect(*from)?;
                logical(m, *to, rhs, |a, b| a & b)
            }
            Self::AnlImm { to, value } => logical(m, *to, *value, |a, b| a & b),
            Self::Orl { to, from } => {
                let rhs = m.ram.byte(*from)?;
                logical(m, *to, rhs, |a, b| a | b)
            }
            Self::OrlIndirect { to, from } => {
                let rhs = m.indirect(*from)?;
                logical(m, *to, rhs, |a, b| a | b)
            }
            Self::OrlImm { to, value } => logical(m, *to, *value, |a, b| a | b),
            Self::Xrl { to, from } => {
                let rhs = m.ram.byte(*from)?;
                logical(m, *to, rhs, |a, b| a ^ b)
            }
            Self::XrlIndirect { to, from } => {
                let rhs = m.indirect(*from)?;
                logical(m, *to, rhs, |a, b| a ^ b)
            }
            Self::XrlImm { to, value } => logical(m, *to, *value, |a, b| a ^ b),

            Self::CplAcc => {
                let a = m.acc()?;
                m.set_acc(!a)
            }
            Self::ClrAcc => m.set_acc(0),
            Self::CplBit { bit } => {
                let v = m.ram.bit(*bit)?;
                m.ram.write_bit(*bit, 1 - v)
            }
            Self::ClrBit { bit } => m.ram.clear(*bit),
            Self::SetBit { bit } => m.ram.set(*bit),
            Self::OrlCarry { bit } => {
                let v = m.carry()? | m.ram.bit(*bit)?;
                m.set_carry(v)
            }
            Self::AnlCarry { bit } => {
                let v = m.carry()? & m.ram.bit(*bit)?;
                m.set_carry(v)
            }
            Self::SwapAcc => {
                let a = m.acc()?;
                m.set_acc(a.rotate_left(4))
            }

            Self::Push { from } => {
                let v = m.ram.byte(*from)?;
                m.stack.push(usize::from(v));
                Ok(())
            }
            Self::Pop { to } => {
                let v = m.pop()?;
                m.ram.write_byte(*to, (v & 0xFF) as u8)
            }

            Self::Jmp { target } => {
                m.pc = *target;
                Ok(())
            }
            Self::JmpAccDptr => {
                let addr = usize::from(m.acc()?) + usize::from(m.dptr()?);
                let hop = m.rom.read(addr)?;
                m.pc = usize::from(m.ram.byte(usize::from(hop))?);
                Ok(())
            }
            Self::Call { target } => {
                m.stack.push(m.pc + 1);
                m.pc = *target;
                Ok(())
            }
            Self::Ret | Self::Reti => {
                m.pc = m.pop()?;
                Ok(())
            }

            Self::Add { to, from } => {
                let rhs = m.ram.byte(*from)?;
                add(m, *to, rhs, false)
            }
            Self::AddIndirect { to, from } => {
                let rhs = m.indirect(*from)?;
                add(m, *to, rhs, false)
            }
            Self::AddImm { to, value } => add(m, *to, *value, false),
            Self::Addc { to, from } => {
                let rhs = m.ram.byte(*from)?;
                add(m, *to, rhs, true)
            }
            Self::AddcIndirect { to, from } => {
                let rhs = m.indirect(*from)?;
                add(m, *to, rhs, true)
            }
            Self::AddcImm { to, value } => add(m, *to, *value, true),
            Self::Inc { to } => add(m, *to, 1, false),
            Self::IncIndirect { to } => {
                let dest = m.indirect_addr(*to)?;
                add(m, dest, 1, false)
            }
            Self::Subb { to, from } => {
                let rhs = m.ram.byte(*from)?;
                subtract(m, *to, rhs, true)
            }
            Self::SubbIndirect { to, from } => {
                let rhs = m.indirect(*from)?;
                subtract(m, *to, rhs, true)
            }
            Self::SubbImm { to, value } => subtract(m, *to, *value, true),
            Self::Dec { to } => subtract(m, *to, 1, false),
            Self::DecIndirect { to } => {
                let dest = m.indirect_addr(*to)?;
                subtract(m, dest, 1, false)
            }
            Self::Mul => {
                let product = u16::from(m.acc()?) * u16::from(m.b()?);
                m.set_acc((product & 0xFF) as u8)?;
                m.set_b((product >> 8) as u8)?;
                m.set_carry(0)
            }
            Self::Div => {
                let (a, b) = (m.acc()?, m.b()?);
                if b == 0 {
                    return Err(Fault::DivideByZero);
                }
                m.set_acc(a / b)?;
                m.set_b(a % b)?;
                m.set_carry(0)
            }

            Self::Jb { bit, target } => {
                if m.ram.bit(*bit)? != 0 {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::Jnb { bit, target } => {
                if m.ram.bit(*bit)? == 0 {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::Jbc { bit, target } => {
                if m.ram.bit(*bit)? != 0 {
                    m.pc = *target;
                    m.ram.clear(*bit)?;
                }
                Ok(())
            }

            Self::Cje { a, b, target } => {
                if m.ram.byte(*a)? == m.ram.byte(*b)? {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::CjeImm { a, value, target } => {
                if m.ram.byte(*a)? == *value {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::CjeIndirect { a, value, target } => {
                if m.indirect(*a)? == *value {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::Cjne { a, b, target } => {
                if m.ram.byte(*a)? != m.ram.byte(*b)? {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::CjneImm { a, value, target } => {
                if m.ram.byte(*a)? != *value {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::CjneIndirect { a, value, target } => {
                if m.indirect(*a)? != *value {
                    m.pc = *target;
                }
                Ok(())
            }
            Self::Djnz { counter, target } => {
                let v = m.ram.byte(*counter)?;
                if v != 0 {
                    m.pc = *target;
                }
                m.ram.write_byte(*counter, v.wrapping_sub(1))
            }

            Self::Xch { with } => exchange(m, *with),
            Self::XchIndirect { with } => {
                let addr = m.indirect_addr(*with)?;
                exchange(m, addr)
            }
            Self::XchdIndirect { with } => {
                let addr = m.indirect_addr(*with)?;
                let other = m.ram.byte(addr)?;
                let a = m.acc()?;
                m.ram.write_byte(addr, (a & 0x0F) | (other & 0xF0))?;
                m.set_acc((other & 0x0F) | (a & 0xF0))
            }

            Self::Rl => {
                let a = m.acc()?;
                m.set_acc(a.rotate_left(1))
            }
            Self::Rlc => {
                let a = m.acc()?;
                let carry_in = m.carry()?;
                m.set_carry(a >> 7)?;
                m.set_acc((a << 1) | carry_in)
            }
            Self::Rr => {
                let a = m.acc()?;
                m.set_acc(a.rotate_right(1))
            }
            Self::Rrc => {
                let a = m.acc()?;
                let carry_in = m.carry()?;
                m.set_carry(a & 1)?;
                m.set_acc((a >> 1) | (carry_in << 7))
            }

            Self::Cls => {
                sink.clear();
                Ok(())
            }
            Self::Print { addr } => {
                let value = m.ram.byte(*addr)?;
                sink.append_line(&format!("{} : {value:08b}", symbols.render_addr(*addr)));
                Ok(())
            }
            Self::PrintText { text } => {
                sink.append_line(text);
                Ok(())
            }
        }
    }

    /// Renders this opcode as a human-readable line, resolving operand
    /// names through `symbols`.
    #[must_use]
    pub fn disassemble(&self, symbols: &SymbolTable) -> String {
        let addr = |a: &usize| symbols.render_addr(*a);
        let pos = |t: &usize| symbols.render_target(*t);

        match self {
            Self::Mov { to, from } | Self::MovBit { to, from } => {
                format!("MOV {}, {}", addr(to), addr(from))
            }
            Self::MovImm { to, value } => format!("MOV {}, {value}", addr(to)),
            Self::MovFromIndirect { to, from } => format!("MOV {}, @{}", addr(to), addr(from)),
            Self::MovToIndirect { to, from } => format!("MOV @{}, {}", addr(to), addr(from)),
            Self::MovCodeDptr => "MOV A, @A+DPTR".to_owned(),
            Self::MovCodePc => "MOV A, @A+PC".to_owned(),

            Self::Anl { to, from } => format!("ANL {}, {}", addr(to), addr(from)),
            Self::AnlIndirect { to, from } => format!("ANL {}, @{}", addr(to), addr(from)),
            Self::AnlImm { to, value } => format!("ANL {}, {value}", addr(to)),
            Self::Orl { to, from } => format!("ORL {}, {}", addr(to), addr(from)),
            Self::OrlIndirect { to, from } => format!("ORL {}, @{}", addr(to), addr(from)),
            Self::OrlImm { to, value } => format!("ORL {}, {value}", addr(to)),
            Self::Xrl { to, from } => format!("XRL {}, {}", addr(to), addr(from)),
            Self::XrlIndirect { to, from } => format!("XRL {}, @{}", addr(to), addr(from)),
            Self::XrlImm { to, value } => format!("XRL {}, {value}", addr(to)),

            Self::CplAcc => "CPL A".to_owned(),
            Self::ClrAcc => "CLR A".to_owned(),
            Self::CplBit { bit } => format!("CPL {}", addr(bit)),
            Self::ClrBit { bit } => format!("CLR {}", addr(bit)),
            Self::SetBit { bit } => format!("SETB {}", addr(bit)),
            Self::OrlCarry { bit } => format!("ORL C, {}", addr(bit)),
            Self::AnlCarry { bit } => format!("ANL C, {}", addr(bit)),
            Self::SwapAcc => "SWAP".to_owned(),

            Self::Push { from } => format!("PUSH {}", addr(from)),
            Self::Pop { to } => format!("POP {}", addr(to)),

            Self::Jmp { target } => format!("JMP {}", pos(target)),
            Self::JmpAccDptr => "JMP @A+DPTR".to_owned(),
            Self::Call { target } => format!("CALL {}", pos(target)),
            Self::Ret => "RET".to_owned(),
            Self::Reti => "RETI".to_owned(),

            Self::Add { to, from } => format!("ADD {}, {}", addr(to), addr(from)),
            Self::AddIndirect { to, from } => format!("ADD {}, @{}", addr(to), addr(from)),
            Self::AddImm { to, value } => format!("ADD {}, {value}", addr(to)),
            Self::Addc { to, from } => format!("ADDC {}, {}", addr(to), addr(from)),
            Self::AddcIndirect { to, from } => format!("ADDC {}, @{}", addr(to), addr(from)),
            Self::AddcImm { to, value } => format!("ADDC {}, {value}", addr(to)),
            Self::Inc { to } => format!("INC {}", addr(to)),
            Self::IncIndirect { to } => format!("INC @{}", addr(to)),
            Self::Subb { to, from } => format!("SUBB {}, {}", addr(to), addr(from)),
            Self::SubbIndirect { to, from } => format!("SUBB {}, @{}", addr(to), addr(from)),
            Self::SubbImm { to, value } => format!("SUBB {}, {value}", addr(to)),
            Self::Dec { to } => format!("DEC {}", addr(to)),
            Self::DecIndirect { to } => format!("DEC @{}", addr(to)),
            Self::Mul => "MUL AB".to_owned(),
            Self::Div => "DIV AB".to_owned(),

            Self::Jb { bit, target } => format!("JB {}, {}", addr(bit), pos(target)),
            Self::Jnb { bit, target } => format!("JNB {}, {}", addr(bit), pos(target)),
            Self::Jbc { bit, target } => format!("JBC {}, {}", addr(bit), pos(target)),

            Self::Cje { a, b, target } => {
                format!("CJE {}, {}, {}", addr(a), addr(b), pos(target))
            }
            Self::CjeImm { a, value, target } => {
                format!("CJE {}, {value}, {}", addr(a), pos(target))
            }
            Self::CjeIndirect { a, value, target } => {
                format!("CJE @{}, {value}, {}", addr(a), pos(target))
            }
            Self::Cjne { a, b, target } => {
                format!("CJNE {}, {}, {}", addr(a), addr(b), pos(target))
            }
            Self::CjneImm { a, value, target } => {
                format!("CJNE {}, {value}, {}", addr(a), pos(target))
            }
            Self::CjneIndirect { a, value, target } => {
                format!("CJNE @{}, {value}, {}", addr(a), pos(target))
            }
            Self::Djnz { counter, target } => {
                format!("DJNZ {}, {}", addr(counter), pos(target))
            }

            Self::Xch { with } => format!("XCH {}", addr(with)),
            Self::XchIndirect { with } => format!("XCH @{}", addr(with)),
            Self::XchdIndirect { with } => format!("XCHD @{}", addr(with)),

            Self::Rl => "RL".to_owned(),
            Self::Rlc => "RLC".to_owned(),
            Self::Rr => "RR".to_owned(),
            Self::Rrc => "RRC".to_owned(),

            Self::Cls => "CLS".to_owned(),
            Self::Print { addr: a } => format!("PRINT {}", addr(a)),
            Self::PrintText { text } => format!("PRINT {text}"),
        }
    }

    /// The opcode mnemonic without operands.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Mov { .. }
            | Self::MovImm { .. }
            | Self::MovFromIndirect { .. }
            | Self::MovToIndirect { .. }
            | Self::MovCodeDptr
            | Self::MovCodePc
            | Self::MovBit { .. } => "MOV",
            Self::Anl { .. } | Self::AnlIndirect { .. } | Self::AnlImm { .. } => "ANL",
            Self::Orl { .. } | Self::OrlIndirect { .. } | Self::OrlImm { .. } => "ORL",
            Self::Xrl { .. } | Self::XrlIndirect { .. } | Self::XrlImm { .. } => "XRL",
            Self::CplAcc | Self::CplBit { .. } => "CPL",
            Self::ClrAcc | Self::ClrBit { .. } => "CLR",
            Self::SetBit { .. } => "SETB",
            Self::OrlCarry { .. } => "ORL",
            Self::AnlCarry { .. } => "ANL",
            Self::SwapAcc => "SWAP",
            Self::Push { .. } => "PUSH",
            Self::Pop { .. } => "POP",
            Self::Jmp { .. } | Self::JmpAccDptr => "JMP",
            Self::Call { .. } => "CALL",
            Self::Ret => "RET",
            Self::Reti => "RETI",
            Self::Add { .. } | Self::AddIndirect { .. } | Self::AddImm { .. } => "ADD",
            Self::Addc { .. } | Self::AddcIndirect { .. } | Self::AddcImm { .. } => "ADDC",
            Self::Inc { .. } | Self::IncIndirect { .. } => "INC",
            Self::Subb { .. } | Self::SubbIndirect { .. } | Self::SubbImm { .. } => "SUBB",
            Self::Dec { .. } | Self::DecIndirect { .. } => "DEC",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Jb { .. } => "JB",
            Self::Jnb { .. } => "JNB",
            Self::Jbc { .. } => "JBC",
            Self::Cje { .. } | Self::CjeImm { .. } | Self::CjeIndirect { .. } => "CJE",
            Self::Cjne { .. } | Self::CjneImm { .. } | Self::CjneIndirect { .. } => "CJNE",
            Self::Djnz { .. } => "DJNZ",
            Self::Xch { .. } | Self::XchIndirect { .. } => "XCH",
            Self::XchdIndirect { .. } => "XCHD",
            Self::Rl => "RL",
            Self::Rlc => "RLC",
            Self::Rr => "RR",
            Self::Rrc => "RRC",
            Self::Cls => "CLS",
            Self::Print { .. } | Self::PrintText { .. } => "PRINT",
        }
    }
}

fn logical(m: &mut Machine, to: usize, rhs: u8, f: impl Fn(u8, u8) -> u8) -> Result<(), Fault> {
    let lhs = m.ram.byte(to)?;
    m.ram.write_byte(to, f(lhs, rhs))
}

// Overflow is judged on the unwrapped result before the byte is stored;
// carry is only an input (ADDC/SUBB), never a borrow output.
fn add(m: &mut Machine, to: usize, rhs: u8, with_carry: bool) -> Result<(), Fault> {
    let carry = if with_carry { u16::from(m.carry()?) } else { 0 };
    let sum = u16::from(m.ram.byte(to)?) + u16::from(rhs) + carry;
    m.write_overflow(sum >= 0x100)?;
    m.ram.write_byte(to, (sum & 0xFF) as u8)
}

fn subtract(m: &mut Machine, to: usize, rhs: u8, with_carry: bool) -> Result<(), Fault> {
    let carry = if with_carry { i32::from(m.carry()?) } else { 0 };
    let diff = i32::from(m.ram.byte(to)?) - (i32::from(rhs) + carry);
    m.write_overflow(diff < 0)?;
    m.ram.write_byte(to, diff.rem_euclid(256) as u8)
}

fn exchange(m: &mut Machine, with: usize) -> Result<(), Fault> {
    let other = m.ram.byte(with)?;
    let a = m.acc()?;
    m.ram.write_byte(with, a)?;
    m.set_acc(other)
}
