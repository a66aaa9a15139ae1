//! The two-pass driver: statement dispatch, label definition and the pass
//! loop. Pass 1 lays out (symbol collection, PC tracking); pass 2 re-walks
//! the same statements and emits bytes. The symbol table persists between
//! the passes, so any disagreement about an address is a phase error.

use crate::parser::AsmParser;
use crate::state::{Assembler, Severity};
use crate::symbols::{scope_key, DefineError};
use crate::value::Value;
use crate::{Result, Rule};
use log::debug;
use pest::iterators::{Pair, Pairs};
use pest::Parser;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
}

impl Assembler {
    /// Runs both passes over one source text. `path` is used for
    /// diagnostics and as the base for include resolution.
    pub fn assemble_str(&mut self, input: &str, path: &str) -> Result<()> {
        for pass in 1..=2u8 {
            debug!("pass {} over {}", pass, path);
            self.begin_pass(pass);
            self.path_stack.push(path.to_owned());
            // Anchor include resolution at the main file when it is a real
            // path (the library can also be fed a bare string).
            if let Ok(canonical) = std::path::Path::new(path).canonicalize() {
                self.include_stack.push(canonical);
            }
            let program = AsmParser::parse(Rule::program, input)
                .map_err(|e| e.with_path(path))?
                .next()
                .unwrap();
            self.exec_block_pairs(program.into_inner())?;
            self.include_stack.clear();
            self.path_stack.pop();
        }
        debug!(
            "assembly finished, {} diagnostic(s)",
            self.diagnostics.len()
        );
        Ok(())
    }

    pub(crate) fn exec_block(&mut self, block: Pair<Rule>) -> Result<Flow> {
        self.exec_block_pairs(block.into_inner())
    }

    pub(crate) fn exec_block_pairs(&mut self, pairs: Pairs<Rule>) -> Result<Flow> {
        for pair in pairs {
            if pair.as_rule() == Rule::EOI {
                continue;
            }
            match self.exec_statement(pair)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec_statement(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        self.seq += 1;
        self.current_line = pair.as_span().start_pos().line_col().0 as u32;
        match pair.as_rule() {
            Rule::pc_assign => self.exec_pc_assign(pair).map(|_| Flow::Normal),
            Rule::assignment => self.exec_assignment(pair).map(|_| Flow::Normal),
            Rule::label_stmt => self.exec_label_stmt(pair),
            Rule::anon_stmt => self.exec_anon_stmt(pair),
            Rule::instruction => self.exec_instruction(pair).map(|_| Flow::Normal),
            Rule::macro_call => self.exec_macro_call(pair),

            Rule::dir_data => self.exec_dir_data(pair).map(|_| Flow::Normal),
            Rule::dir_hex => self.exec_dir_hex(pair).map(|_| Flow::Normal),
            Rule::dir_fill => self.exec_dir_fill(pair).map(|_| Flow::Normal),
            Rule::dir_skip => self.exec_dir_skip(pair).map(|_| Flow::Normal),
            Rule::dir_align => self.exec_dir_align(pair).map(|_| Flow::Normal),
            Rule::dir_text => self.exec_dir_text(pair).map(|_| Flow::Normal),
            Rule::dir_scrxor => self.exec_dir_scrxor(pair).map(|_| Flow::Normal),
            Rule::dir_convtab => self.exec_dir_convtab(pair),
            Rule::dir_set => self.exec_dir_set(pair).map(|_| Flow::Normal),
            Rule::dir_if => self.exec_dir_if(pair),
            Rule::dir_ifdef => self.exec_dir_ifdef(pair, false),
            Rule::dir_ifndef => self.exec_dir_ifdef(pair, true),
            Rule::dir_for => self.exec_dir_for(pair),
            Rule::dir_while => self.exec_dir_while(pair),
            Rule::dir_do => self.exec_dir_do(pair),
            Rule::dir_break => self.exec_loop_exit(pair, Flow::Break),
            Rule::dir_continue => self.exec_loop_exit(pair, Flow::Continue),
            Rule::dir_macro => self.exec_dir_macro(pair).map(|_| Flow::Normal),
            Rule::dir_zone => self.exec_dir_zone(pair),
            Rule::dir_pseudopc => self.exec_dir_pseudopc(pair),
            Rule::dir_realpc => {
                self.exec_dir_realpc();
                Ok(Flow::Normal)
            }
            Rule::dir_cpu => self.exec_dir_cpu(pair),
            Rule::dir_initmem => self.exec_dir_initmem(pair).map(|_| Flow::Normal),
            Rule::dir_xor => self.exec_dir_xor(pair),
            Rule::dir_source => self.exec_dir_source(pair),
            Rule::dir_binary => self.exec_dir_binary(pair).map(|_| Flow::Normal),
            Rule::dir_warn => self
                .exec_dir_diag(pair, Severity::Warning)
                .map(|_| Flow::Normal),
            Rule::dir_error => self
                .exec_dir_diag(pair, Severity::Error)
                .map(|_| Flow::Normal),
            Rule::dir_serious => self
                .exec_dir_diag(pair, Severity::Serious)
                .map(|_| Flow::Normal),

            other => unreachable!("unexpected statement {:?}", other),
        }
    }

    /// `* = <expr>`: moves the real PC and starts a new segment. The pseudo
    /// offset is cancelled.
    fn exec_pc_assign(&mut self, pair: Pair<Rule>) -> Result<()> {
        let expr = pair.into_inner().next().unwrap();
        let span = expr.as_span();
        let addr = self.required_int(expr, "* = needs a known address")?;
        if addr < 0 || addr > 0xffff {
            return Err(self.err_at(span, format!("address {} out of range", addr)));
        }
        self.pc = Some(addr as u32);
        self.pseudo_offset = 0;
        self.overlap_warned = false;
        Ok(())
    }

    fn exec_assignment(&mut self, pair: Pair<Rule>) -> Result<()> {
        let mut inner = pair.into_inner();
        let symbol = inner.next().unwrap();
        let (value, _) = self.eval(inner.next().unwrap());
        self.define_symbol(&symbol, value, false)
    }

    fn exec_label_stmt(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        let symbol = inner.next().unwrap();
        let span = symbol.as_span();
        let pc = match self.label_pc() {
            Some(pc) => pc,
            None => {
                return Err(self.err_at(
                    span,
                    "label before the program counter is set".to_owned(),
                ))
            }
        };
        self.define_symbol(&symbol, Value::Int(pc), true)?;
        match inner.next() {
            Some(statement) => self.exec_statement(statement),
            None => Ok(Flow::Normal),
        }
    }

    /// Labels and assignments share the definition rules; only labels open a
    /// fresh cheap-local scope.
    fn define_symbol(&mut self, symbol: &Pair<Rule>, value: Value, is_label: bool) -> Result<()> {
        let name = symbol.as_str();
        let span = symbol.as_span();
        let key = scope_key(name, self.scope());
        match self.symbols.define(key, value.clone(), false, self.pass) {
            Ok(()) => {}
            Err(DefineError::Redefined) => {
                self.error_at(&span, format!("symbol {} already defined", name));
            }
            Err(DefineError::PhaseMismatch { old }) => {
                return Err(self.err_at(
                    span,
                    format!(
                        "phase error: {} changed between passes (pass 1: {}, pass 2: {})",
                        name, old, value
                    ),
                ));
            }
        }
        if is_label && !name.starts_with('.') && !name.starts_with('@') {
            self.cheap = self.cheap_next;
            self.cheap_next += 1;
        }
        Ok(())
    }

    fn exec_anon_stmt(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        let name = inner.next().unwrap();
        let span = name.as_span();
        let text = name.as_str();
        let sign = text.chars().next().unwrap();
        let depth = text.len();
        let pc = match self.label_pc() {
            Some(pc) => pc,
            None => {
                return Err(self.err_at(
                    span,
                    "label before the program counter is set".to_owned(),
                ))
            }
        };
        if let Err(old) = self
            .anon
            .record(self.zone, sign, depth, self.seq, pc, self.pass)
        {
            let detail = match old {
                Some(old) => format!("pass 1: ${:04x}, pass 2: ${:04x}", old, pc),
                None => format!("not seen in pass 1, now at ${:04x}", pc),
            };
            return Err(self.err_at(
                span,
                format!("phase error: anonymous label {} moved ({})", text, detail),
            ));
        }
        match inner.next() {
            Some(statement) => self.exec_statement(statement),
            None => Ok(Flow::Normal),
        }
    }
}
