use super::*;

#[test]
fn base_table_spot_checks() {
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Lda, AddrMode::Imm), Some(0xa9));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Lda, AddrMode::Zp), Some(0xa5));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Sta, AddrMode::Abs), Some(0x8d));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Jmp, AddrMode::Abs), Some(0x4c));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Jmp, AddrMode::Ind), Some(0x6c));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Bne, AddrMode::Rel), Some(0xd0));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Rts, AddrMode::Imp), Some(0x60));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Asl, AddrMode::Acc), Some(0x0a));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Ldx, AddrMode::ZpY), Some(0xb6));
}

#[test]
fn store_has_no_immediate() {
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Sta, AddrMode::Imm), None);
    assert_eq!(opcode(Cpu::W65c02, Mnemonic::Sta, AddrMode::Imm), None);
}

#[test]
fn cmos_additions_gated_by_variant() {
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Bra, AddrMode::Rel), None);
    assert_eq!(opcode(Cpu::Nmos6502, Mnemonic::Bra, AddrMode::Rel), None);
    assert_eq!(opcode(Cpu::Mos65c02, Mnemonic::Bra, AddrMode::Rel), Some(0x80));
    assert_eq!(opcode(Cpu::Mos65c02, Mnemonic::Stz, AddrMode::Abs), Some(0x9c));
    assert_eq!(opcode(Cpu::Mos65c02, Mnemonic::Lda, AddrMode::IndZp), Some(0xb2));
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Lda, AddrMode::IndZp), None);
    assert_eq!(
        opcode(Cpu::Mos65c02, Mnemonic::Jmp, AddrMode::AbsIndX),
        Some(0x7c)
    );
}

#[test]
fn rockwell_gated_by_variant() {
    assert_eq!(opcode(Cpu::Mos65c02, Mnemonic::Wai, AddrMode::Imp), None);
    assert_eq!(opcode(Cpu::W65c02, Mnemonic::Wai, AddrMode::Imp), Some(0xcb));
    assert_eq!(opcode(Cpu::W65c02, Mnemonic::Stp, AddrMode::Imp), Some(0xdb));
    assert_eq!(
        opcode(Cpu::W65c02, Mnemonic::Bbr(3), AddrMode::ZpRel),
        Some(0x3f)
    );
    assert_eq!(
        opcode(Cpu::W65c02, Mnemonic::Bbs(7), AddrMode::ZpRel),
        Some(0xff)
    );
    assert_eq!(opcode(Cpu::W65c02, Mnemonic::Rmb(0), AddrMode::Zp), Some(0x07));
    assert_eq!(opcode(Cpu::W65c02, Mnemonic::Smb(5), AddrMode::Zp), Some(0xd7));
}

#[test]
fn undocumented_gated_by_variant() {
    assert_eq!(opcode(Cpu::Mos6502, Mnemonic::Lax, AddrMode::Zp), None);
    assert_eq!(opcode(Cpu::Nmos6502, Mnemonic::Lax, AddrMode::Zp), Some(0xa7));
    assert_eq!(opcode(Cpu::Nmos6502, Mnemonic::Slo, AddrMode::IndX), Some(0x03));
    assert_eq!(opcode(Cpu::Nmos6502, Mnemonic::Sbx, AddrMode::Imm), Some(0xcb));
    assert_eq!(opcode(Cpu::Mos65c02, Mnemonic::Lax, AddrMode::Zp), None);
}

#[test]
fn supports_reports_variant_membership() {
    assert!(supports(Cpu::Mos6502, Mnemonic::Lda));
    assert!(!supports(Cpu::Mos6502, Mnemonic::Phx));
    assert!(supports(Cpu::Mos65c02, Mnemonic::Phx));
    assert!(!supports(Cpu::Mos65c02, Mnemonic::Bbr(0)));
    assert!(supports(Cpu::W65c02, Mnemonic::Bbr(0)));
    assert!(supports(Cpu::Nmos6502, Mnemonic::Dcp));
}

#[test]
fn mnemonic_from_str() {
    assert_eq!("lda".parse::<Mnemonic>().unwrap(), Mnemonic::Lda);
    assert_eq!("LDA".parse::<Mnemonic>().unwrap(), Mnemonic::Lda);
    assert_eq!("bbr5".parse::<Mnemonic>().unwrap(), Mnemonic::Bbr(5));
    assert_eq!("smb0".parse::<Mnemonic>().unwrap(), Mnemonic::Smb(0));
    assert!("bbr8".parse::<Mnemonic>().is_err());
    assert!("ldax".parse::<Mnemonic>().is_err());
}

#[test]
fn cpu_from_str() {
    assert_eq!("6502".parse::<Cpu>().unwrap(), Cpu::Mos6502);
    assert_eq!("6510".parse::<Cpu>().unwrap(), Cpu::Nmos6502);
    assert_eq!("65c02".parse::<Cpu>().unwrap(), Cpu::Mos65c02);
    assert_eq!("w65c02".parse::<Cpu>().unwrap(), Cpu::W65c02);
    assert!("65816".parse::<Cpu>().is_err());
}

#[test]
fn operand_lengths() {
    assert_eq!(AddrMode::Imp.operand_len(), 0);
    assert_eq!(AddrMode::Imm.operand_len(), 1);
    assert_eq!(AddrMode::Rel.operand_len(), 1);
    assert_eq!(AddrMode::Abs.operand_len(), 2);
    assert_eq!(AddrMode::ZpRel.operand_len(), 2);
}

#[test]
fn branch_classification() {
    assert!(Mnemonic::Bne.is_branch());
    assert!(Mnemonic::Bra.is_branch());
    assert!(!Mnemonic::Jmp.is_branch());
    assert!(Mnemonic::Bbr(0).is_bit_branch());
    assert!(!Mnemonic::Bne.is_bit_branch());
}
