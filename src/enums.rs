use std::fmt;
use std::str::FromStr;
use util::ParseEnumError;

/// Processor variant selected with the `!cpu` directive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cpu {
    /// Plain MOS 6502, documented opcodes only.
    Mos6502,
    /// NMOS 6502/6510 including the stable undocumented opcodes.
    Nmos6502,
    /// CMOS 65C02.
    Mos65c02,
    /// WDC W65C02S: 65C02 plus WAI/STP and the Rockwell bit instructions.
    W65c02,
}

impl FromStr for Cpu {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Cpu, ParseEnumError> {
        match s.to_lowercase().as_str() {
            "6502" => Ok(Cpu::Mos6502),
            "nmos6502" | "6510" => Ok(Cpu::Nmos6502),
            "65c02" => Ok(Cpu::Mos65c02),
            "w65c02" | "w65c02s" | "65c02s" => Ok(Cpu::W65c02),
            _ => Err(ParseEnumError::new(s, "Cpu")),
        }
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Cpu::Mos6502 => "6502",
            Cpu::Nmos6502 => "nmos6502",
            Cpu::Mos65c02 => "65c02",
            Cpu::W65c02 => "w65c02",
        };
        write!(f, "{}", name)
    }
}

/// Addressing modes of the 6502 family.
///
/// `ZpRel` is the two-operand form of the Rockwell bit branches: a zero-page
/// address followed by a relative displacement.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddrMode {
    Imp,
    Acc,
    Imm,
    Zp,
    ZpX,
    ZpY,
    Abs,
    AbsX,
    AbsY,
    Ind,
    AbsIndX,
    IndX,
    IndY,
    IndZp,
    Rel,
    ZpRel,
}

pub const ALL_MODES: [AddrMode; 16] = [
    AddrMode::Imp,
    AddrMode::Acc,
    AddrMode::Imm,
    AddrMode::Zp,
    AddrMode::ZpX,
    AddrMode::ZpY,
    AddrMode::Abs,
    AddrMode::AbsX,
    AddrMode::AbsY,
    AddrMode::Ind,
    AddrMode::AbsIndX,
    AddrMode::IndX,
    AddrMode::IndY,
    AddrMode::IndZp,
    AddrMode::Rel,
    AddrMode::ZpRel,
];

impl AddrMode {
    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            AddrMode::Imp | AddrMode::Acc => 0,
            AddrMode::Imm
            | AddrMode::Zp
            | AddrMode::ZpX
            | AddrMode::ZpY
            | AddrMode::IndX
            | AddrMode::IndY
            | AddrMode::IndZp
            | AddrMode::Rel => 1,
            AddrMode::Abs
            | AddrMode::AbsX
            | AddrMode::AbsY
            | AddrMode::Ind
            | AddrMode::AbsIndX
            | AddrMode::ZpRel => 2,
        }
    }
}

/// Every mnemonic of the supported variants. The Rockwell bit instructions
/// carry their bit number (0..=7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // 65C02
    Bra,
    Phx,
    Phy,
    Plx,
    Ply,
    Stz,
    Trb,
    Tsb,
    // W65C02S
    Wai,
    Stp,
    Bbr(u8),
    Bbs(u8),
    Rmb(u8),
    Smb(u8),
    // NMOS undocumented
    Slo,
    Rla,
    Sre,
    Rra,
    Sax,
    Lax,
    Dcp,
    Isc,
    Anc,
    Alr,
    Arr,
    Sbx,
    Las,
    Sha,
    Shx,
    Shy,
    Tas,
    Jam,
}

impl Mnemonic {
    /// Relative-branch mnemonics (one signed displacement byte).
    pub fn is_branch(self) -> bool {
        match self {
            Mnemonic::Bcc
            | Mnemonic::Bcs
            | Mnemonic::Beq
            | Mnemonic::Bmi
            | Mnemonic::Bne
            | Mnemonic::Bpl
            | Mnemonic::Bvc
            | Mnemonic::Bvs
            | Mnemonic::Bra => true,
            _ => false,
        }
    }

    /// Rockwell bit branches (zero-page operand plus displacement).
    pub fn is_bit_branch(self) -> bool {
        match self {
            Mnemonic::Bbr(_) | Mnemonic::Bbs(_) => true,
            _ => false,
        }
    }
}

impl FromStr for Mnemonic {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Mnemonic, ParseEnumError> {
        let upper = s.to_uppercase();
        if upper.len() == 4 {
            let (head, tail) = upper.split_at(3);
            if let Some(bit) = tail.chars().next().and_then(|c| c.to_digit(8)) {
                let bit = bit as u8;
                match head {
                    "BBR" => return Ok(Mnemonic::Bbr(bit)),
                    "BBS" => return Ok(Mnemonic::Bbs(bit)),
                    "RMB" => return Ok(Mnemonic::Rmb(bit)),
                    "SMB" => return Ok(Mnemonic::Smb(bit)),
                    _ => {}
                }
            }
        }
        let mnemonic = match upper.as_str() {
            "ADC" => Mnemonic::Adc,
            "AND" => Mnemonic::And,
            "ASL" => Mnemonic::Asl,
            "BCC" => Mnemonic::Bcc,
            "BCS" => Mnemonic::Bcs,
            "BEQ" => Mnemonic::Beq,
            "BIT" => Mnemonic::Bit,
            "BMI" => Mnemonic::Bmi,
            "BNE" => Mnemonic::Bne,
            "BPL" => Mnemonic::Bpl,
            "BRK" => Mnemonic::Brk,
            "BVC" => Mnemonic::Bvc,
            "BVS" => Mnemonic::Bvs,
            "CLC" => Mnemonic::Clc,
            "CLD" => Mnemonic::Cld,
            "CLI" => Mnemonic::Cli,
            "CLV" => Mnemonic::Clv,
            "CMP" => Mnemonic::Cmp,
            "CPX" => Mnemonic::Cpx,
            "CPY" => Mnemonic::Cpy,
            "DEC" => Mnemonic::Dec,
            "DEX" => Mnemonic::Dex,
            "DEY" => Mnemonic::Dey,
            "EOR" => Mnemonic::Eor,
            "INC" => Mnemonic::Inc,
            "INX" => Mnemonic::Inx,
            "INY" => Mnemonic::Iny,
            "JMP" => Mnemonic::Jmp,
            "JSR" => Mnemonic::Jsr,
            "LDA" => Mnemonic::Lda,
            "LDX" => Mnemonic::Ldx,
            "LDY" => Mnemonic::Ldy,
            "LSR" => Mnemonic::Lsr,
            "NOP" => Mnemonic::Nop,
            "ORA" => Mnemonic::Ora,
            "PHA" => Mnemonic::Pha,
            "PHP" => Mnemonic::Php,
            "PLA" => Mnemonic::Pla,
            "PLP" => Mnemonic::Plp,
            "ROL" => Mnemonic::Rol,
            "ROR" => Mnemonic::Ror,
            "RTI" => Mnemonic::Rti,
            "RTS" => Mnemonic::Rts,
            "SBC" => Mnemonic::Sbc,
            "SEC" => Mnemonic::Sec,
            "SED" => Mnemonic::Sed,
            "SEI" => Mnemonic::Sei,
            "STA" => Mnemonic::Sta,
            "STX" => Mnemonic::Stx,
            "STY" => Mnemonic::Sty,
            "TAX" => Mnemonic::Tax,
            "TAY" => Mnemonic::Tay,
            "TSX" => Mnemonic::Tsx,
            "TXA" => Mnemonic::Txa,
            "TXS" => Mnemonic::Txs,
            "TYA" => Mnemonic::Tya,
            "BRA" => Mnemonic::Bra,
            "PHX" => Mnemonic::Phx,
            "PHY" => Mnemonic::Phy,
            "PLX" => Mnemonic::Plx,
            "PLY" => Mnemonic::Ply,
            "STZ" => Mnemonic::Stz,
            "TRB" => Mnemonic::Trb,
            "TSB" => Mnemonic::Tsb,
            "WAI" => Mnemonic::Wai,
            "STP" => Mnemonic::Stp,
            "SLO" => Mnemonic::Slo,
            "RLA" => Mnemonic::Rla,
            "SRE" => Mnemonic::Sre,
            "RRA" => Mnemonic::Rra,
            "SAX" => Mnemonic::Sax,
            "LAX" => Mnemonic::Lax,
            "DCP" => Mnemonic::Dcp,
            "ISC" => Mnemonic::Isc,
            "ANC" => Mnemonic::Anc,
            "ALR" => Mnemonic::Alr,
            "ARR" => Mnemonic::Arr,
            "SBX" => Mnemonic::Sbx,
            "LAS" => Mnemonic::Las,
            "SHA" => Mnemonic::Sha,
            "SHX" => Mnemonic::Shx,
            "SHY" => Mnemonic::Shy,
            "TAS" => Mnemonic::Tas,
            "JAM" => Mnemonic::Jam,
            _ => return Err(ParseEnumError::new(s, "Mnemonic")),
        };
        Ok(mnemonic)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mnemonic::Bbr(bit) => write!(f, "BBR{}", bit),
            Mnemonic::Bbs(bit) => write!(f, "BBS{}", bit),
            Mnemonic::Rmb(bit) => write!(f, "RMB{}", bit),
            Mnemonic::Smb(bit) => write!(f, "SMB{}", bit),
            other => write!(f, "{}", format!("{:?}", other).to_uppercase()),
        }
    }
}
