use crate::enums::ALL_MODES;
use crate::{AddrMode, Cpu, Mnemonic};

/// Resolves a (mnemonic, addressing mode) pair to its opcode byte on the
/// given variant. `None` means the combination does not encode there.
pub fn opcode(cpu: Cpu, mnemonic: Mnemonic, mode: AddrMode) -> Option<u8> {
    match cpu {
        Cpu::Mos6502 => base(mnemonic, mode),
        Cpu::Nmos6502 => base(mnemonic, mode).or_else(|| nmos(mnemonic, mode)),
        Cpu::Mos65c02 => base(mnemonic, mode).or_else(|| cmos(mnemonic, mode)),
        Cpu::W65c02 => base(mnemonic, mode)
            .or_else(|| cmos(mnemonic, mode))
            .or_else(|| rockwell(mnemonic, mode)),
    }
}

/// Whether the mnemonic exists at all on the given variant, in any mode.
pub fn supports(cpu: Cpu, mnemonic: Mnemonic) -> bool {
    ALL_MODES
        .iter()
        .any(|mode| opcode(cpu, mnemonic, *mode).is_some())
}

fn base(mnemonic: Mnemonic, mode: AddrMode) -> Option<u8> {
    use AddrMode::*;
    use Mnemonic::*;

    let byte = match (mnemonic, mode) {
        (Adc, Imm) => 0x69,
        (Adc, Zp) => 0x65,
        (Adc, ZpX) => 0x75,
        (Adc, Abs) => 0x6d,
        (Adc, AbsX) => 0x7d,
        (Adc, AbsY) => 0x79,
        (Adc, IndX) => 0x61,
        (Adc, IndY) => 0x71,

        (And, Imm) => 0x29,
        (And, Zp) => 0x25,
        (And, ZpX) => 0x35,
        (And, Abs) => 0x2d,
        (And, AbsX) => 0x3d,
        (And, AbsY) => 0x39,
        (And, IndX) => 0x21,
        (And, IndY) => 0x31,

        (Asl, Acc) => 0x0a,
        (Asl, Zp) => 0x06,
        (Asl, ZpX) => 0x16,
        (Asl, Abs) => 0x0e,
        (Asl, AbsX) => 0x1e,

        (Bcc, Rel) => 0x90,
        (Bcs, Rel) => 0xb0,
        (Beq, Rel) => 0xf0,
        (Bmi, Rel) => 0x30,
        (Bne, Rel) => 0xd0,
        (Bpl, Rel) => 0x10,
        (Bvc, Rel) => 0x50,
        (Bvs, Rel) => 0x70,

        (Bit, Zp) => 0x24,
        (Bit, Abs) => 0x2c,

        (Brk, Imp) => 0x00,

        (Clc, Imp) => 0x18,
        (Cld, Imp) => 0xd8,
        (Cli, Imp) => 0x58,
        (Clv, Imp) => 0xb8,

        (Cmp, Imm) => 0xc9,
        (Cmp, Zp) => 0xc5,
        (Cmp, ZpX) => 0xd5,
        (Cmp, Abs) => 0xcd,
        (Cmp, AbsX) => 0xdd,
        (Cmp, AbsY) => 0xd9,
        (Cmp, IndX) => 0xc1,
        (Cmp, IndY) => 0xd1,

        (Cpx, Imm) => 0xe0,
        (Cpx, Zp) => 0xe4,
        (Cpx, Abs) => 0xec,

        (Cpy, Imm) => 0xc0,
        (Cpy, Zp) => 0xc4,
        (Cpy, Abs) => 0xcc,

        (Dec, Zp) => 0xc6,
        (Dec, ZpX) => 0xd6,
        (Dec, Abs) => 0xce,
        (Dec, AbsX) => 0xde,

        (Dex, Imp) => 0xca,
        (Dey, Imp) => 0x88,

        (Eor, Imm) => 0x49,
        (Eor, Zp) => 0x45,
        (Eor, ZpX) => 0x55,
        (Eor, Abs) => 0x4d,
        (Eor, AbsX) => 0x5d,
        (Eor, AbsY) => 0x59,
        (Eor, IndX) => 0x41,
        (Eor, IndY) => 0x51,

        (Inc, Zp) => 0xe6,
        (Inc, ZpX) => 0xf6,
        (Inc, Abs) => 0xee,
        (Inc, AbsX) => 0xfe,

        (Inx, Imp) => 0xe8,
        (Iny, Imp) => 0xc8,

        (Jmp, Abs) => 0x4c,
        (Jmp, Ind) => 0x6c,
        (Jsr, Abs) => 0x20,

        (Lda, Imm) => 0xa9,
        (Lda, Zp) => 0xa5,
        (Lda, ZpX) => 0xb5,
        (Lda, Abs) => 0xad,
        (Lda, AbsX) => 0xbd,
        (Lda, AbsY) => 0xb9,
        (Lda, IndX) => 0xa1,
        (Lda, IndY) => 0xb1,

        (Ldx, Imm) => 0xa2,
        (Ldx, Zp) => 0xa6,
        (Ldx, ZpY) => 0xb6,
        (Ldx, Abs) => 0xae,
        (Ldx, AbsY) => 0xbe,

        (Ldy, Imm) => 0xa0,
        (Ldy, Zp) => 0xa4,
        (Ldy, ZpX) => 0xb4,
        (Ldy, Abs) => 0xac,
        (Ldy, AbsX) => 0xbc,

        (Lsr, Acc) => 0x4a,
        (Lsr, Zp) => 0x46,
        (Lsr, ZpX) => 0x56,
        (Lsr, Abs) => 0x4e,
        (Lsr, AbsX) => 0x5e,

        (Nop, Imp) => 0xea,

        (Ora, Imm) => 0x09,
        (Ora, Zp) => 0x05,
        (Ora, ZpX) => 0x15,
        (Ora, Abs) => 0x0d,
        (Ora, AbsX) => 0x1d,
        (Ora, AbsY) => 0x19,
        (Ora, IndX) => 0x01,
        (Ora, IndY) => 0x11,

        (Pha, Imp) => 0x48,
        (Php, Imp) => 0x08,
        (Pla, Imp) => 0x68,
        (Plp, Imp) => 0x28,

        (Rol, Acc) => 0x2a,
        (Rol, Zp) => 0x26,
        (Rol, ZpX) => 0x36,
        (Rol, Abs) => 0x2e,
        (Rol, AbsX) => 0x3e,

        (Ror, Acc) => 0x6a,
        (Ror, Zp) => 0x66,
        (Ror, ZpX) => 0x76,
        (Ror, Abs) => 0x6e,
        (Ror, AbsX) => 0x7e,

        (Rti, Imp) => 0x40,
        (Rts, Imp) => 0x60,

        (Sbc, Imm) => 0xe9,
        (Sbc, Zp) => 0xe5,
        (Sbc, ZpX) => 0xf5,
        (Sbc, Abs) => 0xed,
        (Sbc, AbsX) => 0xfd,
        (Sbc, AbsY) => 0xf9,
        (Sbc, IndX) => 0xe1,
        (Sbc, IndY) => 0xf1,

        (Sec, Imp) => 0x38,
        (Sed, Imp) => 0xf8,
        (Sei, Imp) => 0x78,

        (Sta, Zp) => 0x85,
        (Sta, ZpX) => 0x95,
        (Sta, Abs) => 0x8d,
        (Sta, AbsX) => 0x9d,
        (Sta, AbsY) => 0x99,
        (Sta, IndX) => 0x81,
        (Sta, IndY) => 0x91,

        (Stx, Zp) => 0x86,
        (Stx, ZpY) => 0x96,
        (Stx, Abs) => 0x8e,

        (Sty, Zp) => 0x84,
        (Sty, ZpX) => 0x94,
        (Sty, Abs) => 0x8c,

        (Tax, Imp) => 0xaa,
        (Tay, Imp) => 0xa8,
        (Tsx, Imp) => 0xba,
        (Txa, Imp) => 0x8a,
        (Txs, Imp) => 0x9a,
        (Tya, Imp) => 0x98,

        _ => return None,
    };
    Some(byte)
}

fn cmos(mnemonic: Mnemonic, mode: AddrMode) -> Option<u8> {
    use AddrMode::*;
    use Mnemonic::*;

    let byte = match (mnemonic, mode) {
        (Adc, IndZp) => 0x72,
        (And, IndZp) => 0x32,
        (Cmp, IndZp) => 0xd2,
        (Eor, IndZp) => 0x52,
        (Lda, IndZp) => 0xb2,
        (Ora, IndZp) => 0x12,
        (Sbc, IndZp) => 0xf2,
        (Sta, IndZp) => 0x92,

        (Bit, Imm) => 0x89,
        (Bit, ZpX) => 0x34,
        (Bit, AbsX) => 0x3c,

        (Bra, Rel) => 0x80,

        (Dec, Acc) => 0x3a,
        (Inc, Acc) => 0x1a,

        (Jmp, AbsIndX) => 0x7c,

        (Phx, Imp) => 0xda,
        (Phy, Imp) => 0x5a,
        (Plx, Imp) => 0xfa,
        (Ply, Imp) => 0x7a,

        (Stz, Zp) => 0x64,
        (Stz, ZpX) => 0x74,
        (Stz, Abs) => 0x9c,
        (Stz, AbsX) => 0x9e,

        (Trb, Zp) => 0x14,
        (Trb, Abs) => 0x1c,
        (Tsb, Zp) => 0x04,
        (Tsb, Abs) => 0x0c,

        _ => return None,
    };
    Some(byte)
}

fn rockwell(mnemonic: Mnemonic, mode: AddrMode) -> Option<u8> {
    use AddrMode::*;
    use Mnemonic::*;

    let byte = match (mnemonic, mode) {
        (Wai, Imp) => 0xcb,
        (Stp, Imp) => 0xdb,
        (Bbr(bit), ZpRel) => 0x0f + bit * 0x10,
        (Bbs(bit), ZpRel) => 0x8f + bit * 0x10,
        (Rmb(bit), Zp) => 0x07 + bit * 0x10,
        (Smb(bit), Zp) => 0x87 + bit * 0x10,
        _ => return None,
    };
    Some(byte)
}

fn nmos(mnemonic: Mnemonic, mode: AddrMode) -> Option<u8> {
    use AddrMode::*;
    use Mnemonic::*;

    let byte = match (mnemonic, mode) {
        (Slo, Zp) => 0x07,
        (Slo, ZpX) => 0x17,
        (Slo, IndX) => 0x03,
        (Slo, IndY) => 0x13,
        (Slo, Abs) => 0x0f,
        (Slo, AbsX) => 0x1f,
        (Slo, AbsY) => 0x1b,

        (Rla, Zp) => 0x27,
        (Rla, ZpX) => 0x37,
        (Rla, IndX) => 0x23,
        (Rla, IndY) => 0x33,
        (Rla, Abs) => 0x2f,
        (Rla, AbsX) => 0x3f,
        (Rla, AbsY) => 0x3b,

        (Sre, Zp) => 0x47,
        (Sre, ZpX) => 0x57,
        (Sre, IndX) => 0x43,
        (Sre, IndY) => 0x53,
        (Sre, Abs) => 0x4f,
        (Sre, AbsX) => 0x5f,
        (Sre, AbsY) => 0x5b,

        (Rra, Zp) => 0x67,
        (Rra, ZpX) => 0x77,
        (Rra, IndX) => 0x63,
        (Rra, IndY) => 0x73,
        (Rra, Abs) => 0x6f,
        (Rra, AbsX) => 0x7f,
        (Rra, AbsY) => 0x7b,

        (Sax, Zp) => 0x87,
        (Sax, ZpY) => 0x97,
        (Sax, IndX) => 0x83,
        (Sax, Abs) => 0x8f,

        (Lax, Zp) => 0xa7,
        (Lax, ZpY) => 0xb7,
        (Lax, IndX) => 0xa3,
        (Lax, IndY) => 0xb3,
        (Lax, Abs) => 0xaf,
        (Lax, AbsY) => 0xbf,

        (Dcp, Zp) => 0xc7,
        (Dcp, ZpX) => 0xd7,
        (Dcp, IndX) => 0xc3,
        (Dcp, IndY) => 0xd3,
        (Dcp, Abs) => 0xcf,
        (Dcp, AbsX) => 0xdf,
        (Dcp, AbsY) => 0xdb,

        (Isc, Zp) => 0xe7,
        (Isc, ZpX) => 0xf7,
        (Isc, IndX) => 0xe3,
        (Isc, IndY) => 0xf3,
        (Isc, Abs) => 0xef,
        (Isc, AbsX) => 0xff,
        (Isc, AbsY) => 0xfb,

        (Anc, Imm) => 0x0b,
        (Alr, Imm) => 0x4b,
        (Arr, Imm) => 0x6b,
        (Sbx, Imm) => 0xcb,
        (Las, AbsY) => 0xbb,

        (Sha, IndY) => 0x93,
        (Sha, AbsY) => 0x9f,
        (Shx, AbsY) => 0x9e,
        (Shy, AbsX) => 0x9c,
        (Tas, AbsY) => 0x9b,
        (Jam, Imp) => 0x02,

        _ => return None,
    };
    Some(byte)
}
