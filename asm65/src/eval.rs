//! Operator-precedence expression evaluation on top of the grammar's flat
//! `primary (op primary)*` shape. Infix precedence lives in the
//! `PrattParser` below; unary operators are folded inside `primary`, so
//! they bind tighter than every infix operator including `**`.

use crate::state::Assembler;
use crate::value::{self, Value};
use crate::{Error, Result, Rule};
use lazy_static::lazy_static;
use matches::debug_assert_matches;
use pest::error::ErrorVariant;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};

lazy_static! {
    // Levels are added loosest first; `**` binds tightest and associates
    // right, everything else left.
    static ref PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::op_or, Assoc::Left))
        .op(Op::infix(Rule::op_and, Assoc::Left))
        .op(Op::infix(Rule::op_bor, Assoc::Left))
        .op(Op::infix(Rule::op_bxor, Assoc::Left))
        .op(Op::infix(Rule::op_band, Assoc::Left))
        .op(Op::infix(Rule::op_eq, Assoc::Left)
            | Op::infix(Rule::op_ne, Assoc::Left)
            | Op::infix(Rule::op_ne2, Assoc::Left))
        .op(Op::infix(Rule::op_lt, Assoc::Left)
            | Op::infix(Rule::op_gt, Assoc::Left)
            | Op::infix(Rule::op_le, Assoc::Left)
            | Op::infix(Rule::op_ge, Assoc::Left))
        .op(Op::infix(Rule::op_shl, Assoc::Left) | Op::infix(Rule::op_shr, Assoc::Left))
        .op(Op::infix(Rule::op_add, Assoc::Left) | Op::infix(Rule::op_sub, Assoc::Left))
        .op(Op::infix(Rule::op_mul, Assoc::Left)
            | Op::infix(Rule::op_div, Assoc::Left)
            | Op::infix(Rule::op_rem, Assoc::Left))
        .op(Op::infix(Rule::op_pow, Assoc::Right));
}

fn infix_error(op: &Pair<Rule>, message: String) -> Error {
    Error::new_from_span(ErrorVariant::CustomError { message }, op.as_span())
}

fn apply_infix(lhs: Value, op: Pair<Rule>, rhs: Value) -> Result<Value> {
    let result = match op.as_rule() {
        Rule::op_or => value::log_or(&lhs, &rhs),
        Rule::op_and => value::log_and(&lhs, &rhs),
        Rule::op_bor => value::bit_or(&lhs, &rhs),
        Rule::op_bxor => value::bit_xor(&lhs, &rhs),
        Rule::op_band => value::bit_and(&lhs, &rhs),
        Rule::op_eq => value::cmp_eq(&lhs, &rhs),
        Rule::op_ne | Rule::op_ne2 => value::cmp_ne(&lhs, &rhs),
        Rule::op_lt => value::cmp_lt(&lhs, &rhs),
        Rule::op_gt => value::cmp_gt(&lhs, &rhs),
        Rule::op_le => value::cmp_le(&lhs, &rhs),
        Rule::op_ge => value::cmp_ge(&lhs, &rhs),
        Rule::op_shl => value::shl(&lhs, &rhs),
        Rule::op_shr => value::shr(&lhs, &rhs),
        Rule::op_add => value::add(&lhs, &rhs),
        Rule::op_sub => value::sub(&lhs, &rhs),
        Rule::op_mul => value::mul(&lhs, &rhs),
        Rule::op_div => value::div(&lhs, &rhs),
        Rule::op_rem => value::rem(&lhs, &rhs),
        _ => unreachable!(),
    };
    result.map_err(|message| infix_error(&op, message))
}

/// Strips the quotes and resolves the two supported escapes.
pub(crate) fn unescape_string(raw: &str) -> Vec<u8> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = Vec::with_capacity(inner.len());
    let mut bytes = inner.bytes();
    while let Some(byte) = bytes.next() {
        if byte == b'\\' {
            match bytes.next() {
                Some(b'"') => out.push(b'"'),
                Some(b'\\') => out.push(b'\\'),
                Some(other) => {
                    out.push(b'\\');
                    out.push(other);
                }
                None => out.push(b'\\'),
            }
        } else {
            out.push(byte);
        }
    }
    out
}

impl Assembler {
    /// Evaluates an expression, reporting evaluation problems as non-fatal
    /// diagnostics (the result is then `Undefined`). The second component
    /// says whether a forward-referenced symbol was involved; the width
    /// logic uses it to keep pass-1 and pass-2 encodings identical.
    pub(crate) fn eval(&mut self, pair: Pair<Rule>) -> (Value, bool) {
        self.eval_forward = false;
        match self.eval_expr(pair) {
            Ok(value) => (value, self.eval_forward),
            Err(error) => {
                let error = error.with_path(self.current_path());
                self.diag(crate::Severity::Error, error);
                (Value::Undefined, self.eval_forward)
            }
        }
    }

    pub(crate) fn eval_expr(&mut self, pair: Pair<Rule>) -> Result<Value> {
        debug_assert_matches!(pair.as_rule(), Rule::expr);
        PRATT
            .map_primary(|primary| self.eval_primary(primary))
            .map_infix(|lhs, op, rhs| apply_infix(lhs?, op, rhs?))
            .parse(pair.into_inner())
    }

    fn eval_primary(&mut self, pair: Pair<Rule>) -> Result<Value> {
        let span = pair.as_span();
        match pair.as_rule() {
            Rule::dec_lit => pair
                .as_str()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.err_at(span, "integer literal out of range".to_owned())),
            Rule::float_lit => pair
                .as_str()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.err_at(span, "bad float literal".to_owned())),
            Rule::hex_lit => i64::from_str_radix(&pair.as_str()[1..], 16)
                .map(Value::Int)
                .map_err(|_| self.err_at(span, "integer literal out of range".to_owned())),
            Rule::bin_lit => i64::from_str_radix(&pair.as_str()[1..], 2)
                .map(Value::Int)
                .map_err(|_| self.err_at(span, "integer literal out of range".to_owned())),
            Rule::char_lit => {
                let c = pair.as_str().chars().nth(1).unwrap();
                if (c as u32) > 0xff {
                    Err(self.err_at(span, "character does not fit in one byte".to_owned()))
                } else {
                    Ok(Value::Int(c as i64))
                }
            }
            Rule::string => Ok(Value::Str(unescape_string(pair.as_str()))),
            Rule::list_lit => {
                let mut items = Vec::new();
                for item in pair.into_inner() {
                    items.push(self.eval_expr(item)?);
                }
                Ok(Value::List(items))
            }
            Rule::paren => self.eval_expr(pair.into_inner().next().unwrap()),
            Rule::pc_ref => match self.label_pc() {
                Some(pc) => Ok(Value::Int(pc)),
                None => Err(self.err_at(span, "program counter not set".to_owned())),
            },
            Rule::sym_ref => {
                let name = pair.as_str();
                let (value, forward) = self.symbols.lookup(name, self.scope());
                if forward || !value.is_defined() {
                    self.eval_forward = true;
                }
                if self.pass == 2 && !value.is_defined() {
                    self.error_at(&span, format!("symbol {} is not defined", name));
                }
                Ok(value)
            }
            Rule::anon_ref => {
                let text = pair.as_str();
                let sign = text.chars().next().unwrap();
                let depth = text.len();
                if sign == '+' {
                    self.eval_forward = true;
                }
                match self.anon.resolve(self.zone, sign, depth, self.seq) {
                    Some(pc) => Ok(Value::Int(pc)),
                    None => {
                        if self.pass == 2 || sign == '-' {
                            self.error_at(
                                &span,
                                format!("anonymous label {} not found", text),
                            );
                        }
                        Ok(Value::Undefined)
                    }
                }
            }
            Rule::func_call => {
                let mut inner = pair.into_inner();
                let name = inner.next().unwrap().as_str().to_lowercase();
                let arg = self.eval_expr(inner.next().unwrap())?;
                value::call_function(&name, &arg).map_err(|m| self.err_at(span, m))
            }
            Rule::prefixed => {
                let mut inner = pair.into_inner();
                let op = inner.next().unwrap();
                let operand = self.eval_primary(inner.next().unwrap())?;
                let result = match op.as_rule() {
                    Rule::op_neg => value::neg(&operand),
                    Rule::op_pos => value::pos(&operand),
                    Rule::op_lnot => value::log_not(&operand),
                    Rule::op_bnot => value::bit_not(&operand),
                    Rule::op_lo => value::lo_byte(&operand),
                    Rule::op_hi => value::hi_byte(&operand),
                    _ => unreachable!(),
                };
                result.map_err(|m| self.err_at(span, m))
            }
            _ => unreachable!("unexpected primary {:?}", pair.as_rule()),
        }
    }
}
