//! Instruction statement encoding: syntactic addressing mode + operand value
//! -> opcode and operand bytes, honoring the selected CPU variant and the
//! addressing-width stability rule.

use crate::state::Assembler;
use crate::value::Value;
use crate::{Result, Rule};
use cpu65::{opcode, supports, AddrMode, Mnemonic};
use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Span;

impl Assembler {
    pub(crate) fn exec_instruction(&mut self, pair: Pair<Rule>) -> Result<()> {
        debug_assert_matches!(pair.as_rule(), Rule::instruction);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let insn = inner.next().unwrap();

        let (name, force) = match insn.as_str().find('+') {
            Some(index) => {
                let (name, suffix) = insn.as_str().split_at(index);
                (name, Some(if suffix == "+1" { 1u8 } else { 2u8 }))
            }
            None => (insn.as_str(), None),
        };
        let mnemonic: Mnemonic = match name.parse() {
            Ok(mnemonic) => mnemonic,
            Err(err) => {
                self.error_at(&span, format!("{}", err));
                return Ok(());
            }
        };
        if !supports(self.cpu, mnemonic) {
            self.error_at(
                &span,
                format!("{} is not available on the {}", mnemonic, self.cpu),
            );
            return Ok(());
        }

        match inner.next() {
            None => self.encode_bare(&span, mnemonic),
            Some(operand) => match operand.as_rule() {
                Rule::op_acc => self.encode_fixed(&span, mnemonic, AddrMode::Acc, &[]),
                Rule::op_imm => {
                    let expr = operand.into_inner().next().unwrap();
                    self.encode_immediate(&span, mnemonic, expr)
                }
                Rule::op_plain => {
                    let expr = operand.into_inner().next().unwrap();
                    if mnemonic.is_branch() {
                        self.encode_branch(&span, mnemonic, expr)
                    } else if mnemonic.is_bit_branch() {
                        self.error_at(
                            &span,
                            format!("{} needs a zero-page address and a target", mnemonic),
                        );
                        Ok(())
                    } else {
                        self.encode_mem(&span, mnemonic, AddrMode::Zp, AddrMode::Abs, expr, force)
                    }
                }
                Rule::op_idx => {
                    let mut parts = operand.into_inner();
                    let expr = parts.next().unwrap();
                    let register = parts.next().unwrap();
                    let (zp, abs) = match register.as_rule() {
                        Rule::reg_x => (AddrMode::ZpX, AddrMode::AbsX),
                        Rule::reg_y => (AddrMode::ZpY, AddrMode::AbsY),
                        _ => unreachable!(),
                    };
                    self.encode_mem(&span, mnemonic, zp, abs, expr, force)
                }
                Rule::op_ind_x => {
                    let expr = operand.into_inner().next().unwrap();
                    if mnemonic == Mnemonic::Jmp {
                        self.encode_wide(&span, mnemonic, AddrMode::AbsIndX, expr)
                    } else {
                        self.encode_zp_operand(&span, mnemonic, AddrMode::IndX, expr)
                    }
                }
                Rule::op_ind_y => {
                    let expr = operand.into_inner().next().unwrap();
                    self.encode_zp_operand(&span, mnemonic, AddrMode::IndY, expr)
                }
                Rule::op_ind => {
                    let expr = operand.into_inner().next().unwrap();
                    if opcode(self.cpu, mnemonic, AddrMode::Ind).is_some() {
                        self.encode_wide(&span, mnemonic, AddrMode::Ind, expr)
                    } else {
                        self.encode_zp_operand(&span, mnemonic, AddrMode::IndZp, expr)
                    }
                }
                Rule::op_two => {
                    let mut parts = operand.into_inner();
                    let zp = parts.next().unwrap();
                    let target = parts.next().unwrap();
                    self.encode_bit_branch(&span, mnemonic, zp, target)
                }
                other => unreachable!("unexpected operand {:?}", other),
            },
        }
    }

    /// No written operand: implied, or accumulator for the shift group.
    fn encode_bare(&mut self, span: &Span, mnemonic: Mnemonic) -> Result<()> {
        if let Some(op) = opcode(self.cpu, mnemonic, AddrMode::Imp) {
            self.emit(span, op)
        } else if let Some(op) = opcode(self.cpu, mnemonic, AddrMode::Acc) {
            self.emit(span, op)
        } else {
            self.mode_error(span, mnemonic);
            Ok(())
        }
    }

    fn encode_fixed(
        &mut self,
        span: &Span,
        mnemonic: Mnemonic,
        mode: AddrMode,
        operand: &[u8],
    ) -> Result<()> {
        match opcode(self.cpu, mnemonic, mode) {
            Some(op) => {
                self.emit(span, op)?;
                for byte in operand {
                    self.emit(span, *byte)?;
                }
                Ok(())
            }
            None => {
                self.mode_error(span, mnemonic);
                Ok(())
            }
        }
    }

    fn encode_immediate(
        &mut self,
        span: &Span,
        mnemonic: Mnemonic,
        expr: Pair<Rule>,
    ) -> Result<()> {
        let (value, _) = self.eval(expr);
        let byte = match self.operand_int(span, &value) {
            Some(v) => {
                if self.pass == 2 && (v < -128 || v > 255) {
                    self.error_at(span, format!("immediate value {} out of range", v));
                }
                v as u8
            }
            None => 0,
        };
        self.encode_fixed(span, mnemonic, AddrMode::Imm, &[byte])
    }

    fn encode_branch(&mut self, span: &Span, mnemonic: Mnemonic, expr: Pair<Rule>) -> Result<()> {
        let (value, _) = self.eval(expr);
        let target = self.operand_int(span, &value);
        let op = match opcode(self.cpu, mnemonic, AddrMode::Rel) {
            Some(op) => op,
            None => {
                self.mode_error(span, mnemonic);
                return Ok(());
            }
        };
        let displacement = self.displacement(span, target, 2);
        self.emit(span, op)?;
        self.emit(span, displacement)
    }

    fn encode_bit_branch(
        &mut self,
        span: &Span,
        mnemonic: Mnemonic,
        zp: Pair<Rule>,
        target: Pair<Rule>,
    ) -> Result<()> {
        let op = match opcode(self.cpu, mnemonic, AddrMode::ZpRel) {
            Some(op) => op,
            None => {
                self.mode_error(span, mnemonic);
                return Ok(());
            }
        };
        let (zp_value, _) = self.eval(zp);
        let zp_byte = self.zp_byte(span, &zp_value);
        let (target_value, _) = self.eval(target);
        let target = self.operand_int(span, &target_value);
        let displacement = self.displacement(span, target, 3);
        self.emit(span, op)?;
        self.emit(span, zp_byte)?;
        self.emit(span, displacement)
    }

    /// Zero-page vs absolute selection. A forward-tainted or unknown operand
    /// reserves the absolute form so that both passes agree on the width; an
    /// explicit `+1`/`+2` suffix overrides the choice.
    fn encode_mem(
        &mut self,
        span: &Span,
        mnemonic: Mnemonic,
        zp_mode: AddrMode,
        abs_mode: AddrMode,
        expr: Pair<Rule>,
        force: Option<u8>,
    ) -> Result<()> {
        let (value, forward) = self.eval(expr);
        let v = self.operand_int(span, &value);
        let zp_op = opcode(self.cpu, mnemonic, zp_mode);
        let abs_op = opcode(self.cpu, mnemonic, abs_mode);
        if zp_op.is_none() && abs_op.is_none() {
            self.mode_error(span, mnemonic);
            return Ok(());
        }

        let use_zp = match force {
            Some(1) => true,
            Some(2) => false,
            _ => {
                let fits = !forward && matches!(v, Some(x) if x >= 0 && x <= 0xff);
                zp_op.is_some() && (abs_op.is_none() || fits)
            }
        };

        if use_zp {
            let op = match zp_op {
                Some(op) => op,
                None => {
                    self.mode_error(span, mnemonic);
                    return Ok(());
                }
            };
            let byte = self.zp_byte(span, &value);
            self.emit(span, op)?;
            self.emit(span, byte)
        } else {
            let op = match abs_op {
                Some(op) => op,
                None => {
                    self.mode_error(span, mnemonic);
                    return Ok(());
                }
            };
            let word = self.abs_word(span, v);
            self.emit(span, op)?;
            self.emit(span, word as u8)?;
            self.emit(span, (word >> 8) as u8)
        }
    }

    /// Two-byte operand with no zero-page alternative (the JMP variants).
    fn encode_wide(
        &mut self,
        span: &Span,
        mnemonic: Mnemonic,
        mode: AddrMode,
        expr: Pair<Rule>,
    ) -> Result<()> {
        let (value, _) = self.eval(expr);
        let v = self.operand_int(span, &value);
        let word = self.abs_word(span, v);
        self.encode_fixed(span, mnemonic, mode, &[word as u8, (word >> 8) as u8])
    }

    /// One-byte zero-page operand (indirect modes, RMB/SMB).
    fn encode_zp_operand(
        &mut self,
        span: &Span,
        mnemonic: Mnemonic,
        mode: AddrMode,
        expr: Pair<Rule>,
    ) -> Result<()> {
        let (value, _) = self.eval(expr);
        let byte = self.zp_byte(span, &value);
        self.encode_fixed(span, mnemonic, mode, &[byte])
    }

    fn mode_error(&mut self, span: &Span, mnemonic: Mnemonic) {
        self.error_at(
            span,
            format!(
                "addressing mode not supported by {} on the {}",
                mnemonic, self.cpu
            ),
        );
    }

    /// Numeric operand extraction; type errors are reported in pass 2,
    /// undefined values (already reported by the evaluator) become `None`.
    fn operand_int(&mut self, span: &Span, value: &Value) -> Option<i64> {
        match value.to_int() {
            Ok(v) => v,
            Err(message) => {
                if self.pass == 2 {
                    self.error_at(span, message);
                }
                None
            }
        }
    }

    fn zp_byte(&mut self, span: &Span, value: &Value) -> u8 {
        match self.operand_int(span, value) {
            Some(v) => {
                if self.pass == 2 && (v < 0 || v > 0xff) {
                    self.error_at(span, format!("value {} does not fit in zero page", v));
                }
                v as u8
            }
            None => 0,
        }
    }

    fn abs_word(&mut self, span: &Span, value: Option<i64>) -> u16 {
        match value {
            Some(v) => {
                if self.pass == 2 && (v < -0x8000 || v > 0xffff) {
                    self.error_at(span, format!("value {} out of 16-bit range", v));
                }
                v as u16
            }
            None => 0,
        }
    }

    fn displacement(&mut self, span: &Span, target: Option<i64>, width: i64) -> u8 {
        if self.pass != 2 {
            return 0;
        }
        match target {
            Some(target) => {
                let after = self.label_pc().unwrap_or(0) + width;
                let relative = target - after;
                match num_traits::cast::<i64, i8>(relative) {
                    Some(displacement) => displacement as u8,
                    None => {
                        self.error_at(span, format!("branch target out of range ({})", relative));
                        0
                    }
                }
            }
            None => 0,
        }
    }
}
