//! Instruction set tables for the 6502 processor family.
//!
//! Four variants are distinguished: the plain MOS [`6502`](enum.Cpu.html),
//! the NMOS die with its stable "illegal" opcodes, the CMOS 65C02 and the
//! WDC W65C02S with the Rockwell bit instructions. [`opcode`](fn.opcode.html)
//! resolves a (mnemonic, addressing mode) pair to its encoding on a given
//! variant; the assembler uses `None` results to diagnose unsupported
//! addressing modes.

mod enums;
mod opcodes;

#[cfg(test)]
mod test;

pub use enums::{AddrMode, Cpu, Mnemonic};
pub use opcodes::{opcode, supports};
