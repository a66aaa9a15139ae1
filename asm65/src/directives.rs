//! The `!xxx` pseudo-ops: data emission, text conversion, conditionals,
//! loops, macros, file inclusion, segment control and diagnostics.

use crate::convtab::Convtab;
use crate::driver::Flow;
use crate::eval::unescape_string;
use crate::parser::AsmParser;
use crate::state::{Assembler, MacroDef, Severity};
use crate::symbols::{scope_key, ScopeId};
use crate::value::Value;
use crate::{Result, Rule};
use byteorder::{BigEndian, ByteOrder};
use util::Endian;
use cpu65::Cpu;
use log::{debug, info};
use pest::iterators::Pair;
use pest::Parser;
use pest::Span;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

impl Assembler {
    // ----- data emission ---------------------------------------------------

    pub(crate) fn exec_dir_data(&mut self, pair: Pair<Rule>) -> Result<()> {
        let mut inner = pair.into_inner();
        let kw = inner.next().unwrap().as_str().to_lowercase();
        let (size, big_endian) = match kw.as_str() {
            "!byte" | "!8" => (1, false),
            "!word" | "!16" => (2, false),
            "!16be" => (2, true),
            "!24" => (3, false),
            "!24be" => (3, true),
            "!32" => (4, false),
            "!32be" => (4, true),
            _ => unreachable!(),
        };
        let list = inner.next().unwrap();
        for expr in list.into_inner() {
            let span = expr.as_span();
            let (value, _) = self.eval(expr);
            self.emit_data_value(&span, &value, size, big_endian)?;
        }
        Ok(())
    }

    /// Emits the low `size` bytes of a value. Out-of-range values are only
    /// warned about; ACME truncates and continues.
    fn emit_data_value(
        &mut self,
        span: &Span,
        value: &Value,
        size: usize,
        big_endian: bool,
    ) -> Result<()> {
        let v = match value.to_int() {
            Ok(Some(v)) => v,
            Ok(None) => 0,
            Err(message) => {
                if self.pass == 2 {
                    self.error_at(span, message);
                }
                0
            }
        };
        if self.pass == 2 && value.is_defined() {
            let bits = size as u32 * 8;
            let low = -(1i64 << (bits - 1));
            let high = ((1u64 << bits) - 1) as i64;
            if v < low || v > high {
                self.warn_at(span, format!("value {} does not fit in {} bits", v, bits));
            }
        }
        let mut buf = [0u8; 8];
        let masked = (v as u64) & (!0u64 >> (64 - size * 8));
        if big_endian {
            BigEndian::write_uint(&mut buf[..size], masked, size);
        } else {
            Endian::write_uint(&mut buf[..size], masked, size);
        }
        for byte in &buf[..size] {
            self.emit(span, *byte)?;
        }
        Ok(())
    }

    pub(crate) fn exec_dir_hex(&mut self, pair: Pair<Rule>) -> Result<()> {
        let span = pair.as_span();
        let string = pair.into_inner().nth(1).unwrap();
        let text = unescape_string(string.as_str());
        let mut high: Option<u8> = None;
        for byte in text {
            if byte.is_ascii_whitespace() {
                continue;
            }
            let nibble = match (byte as char).to_digit(16) {
                Some(nibble) => nibble as u8,
                None => {
                    self.error_at(&span, format!("bad hex digit '{}'", byte as char));
                    return Ok(());
                }
            };
            match high.take() {
                None => high = Some(nibble),
                Some(h) => self.emit(&span, (h << 4) | nibble)?,
            }
        }
        if high.is_some() {
            self.error_at(&span, "odd number of hex digits".to_owned());
        }
        Ok(())
    }

    pub(crate) fn exec_dir_fill(&mut self, pair: Pair<Rule>) -> Result<()> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        inner.next();
        let count = self.required_int(inner.next().unwrap(), "!fill needs a known count")?;
        let fill = match inner.next() {
            Some(expr) => {
                let span = expr.as_span();
                let (value, _) = self.eval(expr);
                self.data_byte(&span, &value)
            }
            None => 0,
        };
        if count < 0 {
            self.error_at(&span, "negative fill count".to_owned());
            return Ok(());
        }
        for _ in 0..count {
            self.emit(&span, fill)?;
        }
        Ok(())
    }

    pub(crate) fn exec_dir_skip(&mut self, pair: Pair<Rule>) -> Result<()> {
        let span = pair.as_span();
        let count = self.required_int(
            pair.into_inner().nth(1).unwrap(),
            "!skip needs a known count",
        )?;
        if count < 0 || count > 0x10000 {
            self.error_at(&span, format!("bad skip count {}", count));
            return Ok(());
        }
        self.advance(&span, count as u32)
    }

    pub(crate) fn exec_dir_align(&mut self, pair: Pair<Rule>) -> Result<()> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        inner.next();
        let mask = self.required_int(inner.next().unwrap(), "!align needs a known mask")?;
        let target = self.required_int(inner.next().unwrap(), "!align needs a known value")?;
        let fill = match inner.next() {
            Some(expr) => {
                let span = expr.as_span();
                let (value, _) = self.eval(expr);
                self.data_byte(&span, &value)
            }
            None => self.image.fill_byte(),
        };
        if mask == 0 && target != 0 {
            self.error_at(&span, "!align can never reach its target".to_owned());
            return Ok(());
        }
        let mut guard = 0;
        while self.label_pc().map(|pc| pc & mask != target).unwrap_or(false) {
            self.emit(&span, fill)?;
            guard += 1;
            if guard > 0x10000 {
                self.error_at(&span, "!align can never reach its target".to_owned());
                break;
            }
        }
        if self.pc.is_none() {
            // No PC yet: force the usual diagnostic through the emit path.
            self.emit(&span, fill)?;
        }
        Ok(())
    }

    // ----- text ------------------------------------------------------------

    pub(crate) fn exec_dir_text(&mut self, pair: Pair<Rule>) -> Result<()> {
        let mut inner = pair.into_inner();
        let kw = inner.next().unwrap().as_str().to_lowercase();
        let table = match kw.as_str() {
            "!pet" => Convtab::pet(),
            "!scr" => Convtab::scr(),
            "!raw" => Convtab::raw(),
            "!text" => self.active_tab.clone(),
            _ => unreachable!(),
        };
        let list = inner.next().unwrap();
        self.emit_text_items(list, &table, 0)
    }

    pub(crate) fn exec_dir_scrxor(&mut self, pair: Pair<Rule>) -> Result<()> {
        let mut inner = pair.into_inner();
        inner.next();
        let xor_expr = inner.next().unwrap();
        let xor_span = xor_expr.as_span();
        let (xor_value, _) = self.eval(xor_expr);
        let xor = self.data_byte(&xor_span, &xor_value);
        let list = inner.next().unwrap();
        // XOR applies after the screen-code conversion.
        self.emit_text_items(list, &Convtab::scr(), xor)
    }

    fn emit_text_items(&mut self, list: Pair<Rule>, table: &Convtab, xor: u8) -> Result<()> {
        for expr in list.into_inner() {
            let span = expr.as_span();
            let (value, _) = self.eval(expr);
            match value {
                Value::Str(bytes) => {
                    for byte in bytes {
                        self.emit(&span, table.convert(byte) ^ xor)?;
                    }
                }
                // Numeric items bypass the conversion table.
                other => {
                    let byte = self.data_byte(&span, &other);
                    self.emit(&span, byte ^ xor)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn exec_dir_convtab(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        inner.next();
        let source = inner.next().unwrap();
        let span = source.as_span();
        let table = match source.as_rule() {
            Rule::ident => match Convtab::builtin(source.as_str()) {
                Some(table) => Some(table),
                None => {
                    self.error_at(&span, format!("unknown conversion table {}", source.as_str()));
                    None
                }
            },
            Rule::string => {
                let name = String::from_utf8_lossy(&unescape_string(source.as_str())).into_owned();
                match self.resolve_include(&name) {
                    Some(path) => match fs::read(&path) {
                        Ok(bytes) => match Convtab::from_bytes(&bytes) {
                            Some(table) => Some(table),
                            None => {
                                self.error_at(
                                    &span,
                                    format!("{} is not a 256-byte table", path.display()),
                                );
                                None
                            }
                        },
                        Err(err) => {
                            self.error_at(&span, format!("cannot read {}: {}", path.display(), err));
                            None
                        }
                    },
                    None => {
                        self.error_at(&span, format!("conversion table {} not found", name));
                        None
                    }
                }
            }
            _ => unreachable!(),
        };
        match inner.next() {
            Some(block) => {
                let saved = self.active_tab.clone();
                if let Some(table) = table {
                    self.active_tab = table;
                }
                let flow = self.exec_block(block);
                self.active_tab = saved;
                flow
            }
            None => {
                if let Some(table) = table {
                    self.active_tab = table;
                }
                Ok(Flow::Normal)
            }
        }
    }

    // ----- symbols ---------------------------------------------------------

    pub(crate) fn exec_dir_set(&mut self, pair: Pair<Rule>) -> Result<()> {
        let mut inner = pair.into_inner();
        inner.next();
        let symbol = inner.next().unwrap();
        let span = symbol.as_span();
        let name = symbol.as_str().to_owned();
        let (value, _) = self.eval(inner.next().unwrap());
        let key = scope_key(&name, self.scope());
        match self.symbols.define(key, value, true, self.pass) {
            Ok(()) => {}
            Err(_) => self.error_at(&span, format!("symbol {} already defined as a label", name)),
        }
        Ok(())
    }

    // ----- conditionals ----------------------------------------------------

    pub(crate) fn exec_dir_if(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        inner.next();
        let condition = inner.next().unwrap();
        let taken = self.required_condition(condition)?;
        let block = inner.next().unwrap();
        if taken {
            return self.exec_block(block);
        }
        match inner.next() {
            // else_kw, then either a block or a chained !if
            Some(_) => {
                let alternative = inner.next().unwrap();
                match alternative.as_rule() {
                    Rule::dir_if => self.exec_dir_if(alternative),
                    Rule::block => self.exec_block(alternative),
                    _ => unreachable!(),
                }
            }
            None => Ok(Flow::Normal),
        }
    }

    pub(crate) fn exec_dir_ifdef(&mut self, pair: Pair<Rule>, negate: bool) -> Result<Flow> {
        let mut inner = pair.into_inner();
        inner.next();
        let symbol = inner.next().unwrap();
        let defined = self.symbols.is_defined(symbol.as_str(), self.scope());
        let taken = defined != negate;
        let block = inner.next().unwrap();
        if taken {
            return self.exec_block(block);
        }
        match inner.next() {
            Some(_) => {
                let alternative = inner.next().unwrap();
                self.exec_block(alternative)
            }
            None => Ok(Flow::Normal),
        }
    }

    // ----- loops -----------------------------------------------------------

    pub(crate) fn exec_dir_for(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let span = pair.as_span();
        let mut symbol = None;
        let mut exprs = Vec::new();
        let mut block = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::for_kw | Rule::to_kw | Rule::step_kw => {}
                Rule::symbol => symbol = Some(part),
                Rule::expr => exprs.push(part),
                Rule::block => block = Some(part),
                _ => unreachable!(),
            }
        }
        let symbol = symbol.unwrap();
        let block = block.unwrap();
        let mut exprs = exprs.into_iter();
        let from = self.required_int(exprs.next().unwrap(), "!for needs known bounds")?;
        let to = self.required_int(exprs.next().unwrap(), "!for needs known bounds")?;
        let step = match exprs.next() {
            Some(expr) => self.required_int(expr, "!for needs a known step")?,
            None => 1,
        };
        if step == 0 {
            return Err(self.err_at(span, "!for step must not be zero".to_owned()));
        }

        let key = scope_key(symbol.as_str(), self.scope());
        let mut current = from;
        let mut iterations = 0u64;
        loop {
            if (step > 0 && current > to) || (step < 0 && current < to) {
                break;
            }
            iterations += 1;
            if iterations > self.opts.max_iterations {
                return Err(self.err_at(span, "loop iteration limit exceeded".to_owned()));
            }
            if self
                .symbols
                .define(key.clone(), Value::Int(current), true, self.pass)
                .is_err()
            {
                let symbol_span = symbol.as_span();
                self.error_at(
                    &symbol_span,
                    format!("symbol {} already defined as a label", symbol.as_str()),
                );
                break;
            }
            self.loop_depth += 1;
            let flow = self.exec_block(block.clone());
            self.loop_depth -= 1;
            match flow? {
                Flow::Break => break,
                Flow::Continue | Flow::Normal => {}
            }
            current = match current.checked_add(step) {
                Some(next) => next,
                None => return Err(self.err_at(span, "!for counter overflow".to_owned())),
            };
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec_dir_while(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        inner.next();
        let condition = inner.next().unwrap();
        let block = inner.next().unwrap();
        let mut iterations = 0u64;
        loop {
            if !self.required_condition(condition.clone())? {
                break;
            }
            iterations += 1;
            if iterations > self.opts.max_iterations {
                return Err(self.err_at(span, "loop iteration limit exceeded".to_owned()));
            }
            self.loop_depth += 1;
            let flow = self.exec_block(block.clone());
            self.loop_depth -= 1;
            match flow? {
                Flow::Break => break,
                Flow::Continue | Flow::Normal => {}
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec_dir_do(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        inner.next();
        let block = inner.next().unwrap();
        inner.next();
        let condition = inner.next().unwrap();
        let mut iterations = 0u64;
        loop {
            iterations += 1;
            if iterations > self.opts.max_iterations {
                return Err(self.err_at(span, "loop iteration limit exceeded".to_owned()));
            }
            self.loop_depth += 1;
            let flow = self.exec_block(block.clone());
            self.loop_depth -= 1;
            match flow? {
                Flow::Break => break,
                Flow::Continue | Flow::Normal => {}
            }
            if self.required_condition(condition.clone())? {
                break;
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec_loop_exit(&mut self, pair: Pair<Rule>, flow: Flow) -> Result<Flow> {
        if self.loop_depth == 0 {
            let span = pair.as_span();
            self.error_at(&span, "not inside a loop".to_owned());
            return Ok(Flow::Normal);
        }
        Ok(flow)
    }

    // ----- macros ----------------------------------------------------------

    pub(crate) fn exec_dir_macro(&mut self, pair: Pair<Rule>) -> Result<()> {
        let mut inner = pair.into_inner();
        inner.next();
        let name_pair = inner.next().unwrap();
        let name = name_pair.as_str().to_owned();
        let name_span = name_pair.as_span();

        let mut params = Vec::new();
        let mut body = String::new();
        for part in inner {
            match part.as_rule() {
                Rule::macro_params => {
                    for param in part.into_inner() {
                        let mut param_inner = param.into_inner();
                        let param_name = param_inner.next().unwrap();
                        if param_name.as_str().starts_with('.') || param_name.as_str().starts_with('@')
                        {
                            let span = param_name.as_span();
                            self.error_at(
                                &span,
                                "macro parameters must be plain names".to_owned(),
                            );
                        }
                        let default = param_inner.next().map(|expr| self.eval(expr).0);
                        let param_name =
                            param_name.as_str().trim_start_matches(|c| c == '.' || c == '@');
                        params.push((param_name.to_owned(), default));
                    }
                }
                Rule::block => {
                    let text = part.as_str();
                    body = text[1..text.len() - 1].to_owned();
                }
                _ => unreachable!(),
            }
        }

        if self.macros.contains_key(&name) && self.pass == 1 {
            self.error_at(&name_span, format!("macro {} already defined", name));
        }
        self.macros.insert(name, Rc::new(MacroDef { params, body }));
        Ok(())
    }

    pub(crate) fn exec_macro_call(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let name = inner.next().unwrap().as_str()[1..].to_owned();

        let def = match self.macros.get(&name) {
            Some(def) => Rc::clone(def),
            None => {
                self.error_at(&span, format!("macro {} is not defined", name));
                return Ok(Flow::Normal);
            }
        };

        let mut args = Vec::new();
        if let Some(list) = inner.next() {
            for expr in list.into_inner() {
                args.push(self.eval(expr));
            }
        }
        if args.len() > def.params.len() {
            self.error_at(
                &span,
                format!(
                    "macro {} takes {} argument(s), got {}",
                    name,
                    def.params.len(),
                    args.len()
                ),
            );
            return Ok(Flow::Normal);
        }

        if self.macro_depth + 1 > self.opts.max_macro_depth {
            return Err(self.err_at(span, "macro nesting limit exceeded".to_owned()));
        }

        let saved_zone = self.zone;
        let saved_cheap = self.cheap;
        let zone = self.zones.anonymous();
        self.zone = zone;

        for (index, (param, default)) in def.params.iter().enumerate() {
            let (value, forward) = match args.get(index) {
                Some((value, forward)) => (value.clone(), *forward),
                None => match default {
                    Some(value) => (value.clone(), false),
                    None => {
                        self.error_at(
                            &span,
                            format!("missing argument {} for macro {}", param, name),
                        );
                        (Value::Undefined, false)
                    }
                },
            };
            let key = (ScopeId::Zone(zone), param.clone());
            let _ = self.symbols.define(key.clone(), value, true, self.pass);
            self.symbols.set_forward(&key, forward);
        }

        debug!("expanding macro +{} (pass {})", name, self.pass);
        let program = AsmParser::parse(Rule::program, &def.body)
            .map_err(|e| e.with_path(&format!("+{}", name)))?
            .next()
            .unwrap();
        self.macro_depth += 1;
        self.path_stack.push(format!("+{}", name));
        let flow = self.exec_block_pairs(program.into_inner());
        self.path_stack.pop();
        self.macro_depth -= 1;
        self.zone = saved_zone;
        self.cheap = saved_cheap;
        flow
    }

    // ----- zones, PC and segment state --------------------------------------

    pub(crate) fn exec_dir_zone(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut ident = None;
        let mut block = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::zone_kw => {}
                Rule::ident => ident = Some(part),
                Rule::block => block = Some(part),
                _ => unreachable!(),
            }
        }
        let id = match ident {
            Some(name) => self.zones.named(name.as_str()),
            None => self.zones.anonymous(),
        };
        match block {
            Some(block) => {
                let saved_zone = self.zone;
                let saved_cheap = self.cheap;
                self.zone = id;
                let flow = self.exec_block(block);
                self.zone = saved_zone;
                self.cheap = saved_cheap;
                flow
            }
            None => {
                self.zone = id;
                Ok(Flow::Normal)
            }
        }
    }

    pub(crate) fn exec_dir_pseudopc(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        inner.next();
        let addr_expr = inner.next().unwrap();
        let addr_span = addr_expr.as_span();
        let addr = self.required_int(addr_expr, "!pseudopc needs a known address")?;
        if addr < 0 || addr > 0xffff {
            return Err(self.err_at(addr_span, format!("address {} out of range", addr)));
        }
        if self.pc.is_none() {
            self.pc = Some(addr as u32);
        }
        let saved = self.pseudo_offset;
        self.pseudo_offset = addr - self.pc.unwrap() as i64;
        let flow = self.exec_block(inner.next().unwrap());
        self.pseudo_offset = saved;
        flow
    }

    pub(crate) fn exec_dir_realpc(&mut self) {
        self.pseudo_offset = 0;
    }

    pub(crate) fn exec_dir_cpu(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        inner.next();
        let name = inner.next().unwrap();
        let cpu = match name.as_str().parse::<Cpu>() {
            Ok(cpu) => Some(cpu),
            Err(err) => {
                let span = name.as_span();
                self.error_at(&span, format!("{}", err));
                None
            }
        };
        match inner.next() {
            Some(block) => {
                let saved = self.cpu;
                if let Some(cpu) = cpu {
                    self.cpu = cpu;
                }
                let flow = self.exec_block(block);
                self.cpu = saved;
                flow
            }
            None => {
                if let Some(cpu) = cpu {
                    self.cpu = cpu;
                }
                Ok(Flow::Normal)
            }
        }
    }

    pub(crate) fn exec_dir_initmem(&mut self, pair: Pair<Rule>) -> Result<()> {
        let span = pair.as_span();
        let value = self.required_int(
            pair.into_inner().nth(1).unwrap(),
            "!initmem needs a known value",
        )?;
        if value < 0 || value > 0xff {
            self.error_at(&span, format!("fill value {} out of range", value));
            return Ok(());
        }
        if self.emitted_any {
            self.error_at(&span, "!initmem must come before any output".to_owned());
            return Ok(());
        }
        self.image.set_fill(value as u8);
        Ok(())
    }

    pub(crate) fn exec_dir_xor(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let mut inner = pair.into_inner();
        inner.next();
        let expr = inner.next().unwrap();
        let expr_span = expr.as_span();
        let value = self.required_int(expr, "!xor needs a known value")?;
        if value < 0 || value > 0xff {
            self.error_at(&expr_span, format!("XOR value {} out of range", value));
            return Ok(Flow::Normal);
        }
        match inner.next() {
            Some(block) => {
                let saved = self.xor_mask;
                self.xor_mask ^= value as u8;
                let flow = self.exec_block(block);
                self.xor_mask = saved;
                flow
            }
            None => {
                self.xor_mask ^= value as u8;
                Ok(Flow::Normal)
            }
        }
    }

    // ----- file inclusion --------------------------------------------------

    pub(crate) fn exec_dir_source(&mut self, pair: Pair<Rule>) -> Result<Flow> {
        let span = pair.as_span();
        let string = pair.into_inner().nth(1).unwrap();
        let name = String::from_utf8_lossy(&unescape_string(string.as_str())).into_owned();

        if self.include_stack.len() + 1 > self.opts.max_include_depth {
            return Err(self.err_at(span, "include nesting limit exceeded".to_owned()));
        }
        let path = match self.resolve_include(&name) {
            Some(path) => path,
            None => return Err(self.err_at(span, format!("cannot find {}", name))),
        };
        let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
        if self.include_stack.contains(&canonical) {
            return Err(self.err_at(span, format!("recursive include of {}", name)));
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                return Err(self.err_at(span, format!("cannot read {}: {}", path.display(), err)))
            }
        };

        info!("including {} (pass {})", path.display(), self.pass);
        let display = path.display().to_string();
        let program = AsmParser::parse(Rule::program, &text)
            .map_err(|e| e.with_path(&display))?
            .next()
            .unwrap();
        self.include_stack.push(canonical);
        self.path_stack.push(display);
        let flow = self.exec_block_pairs(program.into_inner());
        self.path_stack.pop();
        self.include_stack.pop();
        flow
    }

    pub(crate) fn exec_dir_binary(&mut self, pair: Pair<Rule>) -> Result<()> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        inner.next();
        let string = inner.next().unwrap();
        let name = String::from_utf8_lossy(&unescape_string(string.as_str())).into_owned();
        let size = match inner.next() {
            Some(expr) => {
                let size = self.required_int(expr, "!binary needs a known size")?;
                Some(size)
            }
            None => None,
        };
        let skip = match inner.next() {
            Some(expr) => self.required_int(expr, "!binary needs a known offset")?,
            None => 0,
        };

        let path = match self.resolve_include(&name) {
            Some(path) => path,
            None => return Err(self.err_at(span, format!("cannot find {}", name))),
        };
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) => {
                return Err(self.err_at(span, format!("cannot read {}: {}", path.display(), err)))
            }
        };

        let skip = skip.max(0) as usize;
        let tail = data.get(skip..).unwrap_or(&[]);
        let count = match size {
            Some(size) if size >= 0 => size as usize,
            Some(_) => {
                self.error_at(&span, "negative size".to_owned());
                return Ok(());
            }
            None => tail.len(),
        };
        for index in 0..count {
            self.emit(&span, tail.get(index).copied().unwrap_or(0))?;
        }
        Ok(())
    }

    /// Include search: absolute paths as-is, then relative to the including
    /// file, then the `-I` directories left to right, then the bare name.
    fn resolve_include(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return if path.exists() {
                Some(path.to_owned())
            } else {
                None
            };
        }
        if let Some(current) = self.include_stack.last() {
            if let Some(parent) = current.parent() {
                let candidate = parent.join(path);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
        for dir in &self.opts.include_dirs {
            let candidate = dir.join(path);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        if path.exists() {
            Some(path.to_owned())
        } else {
            None
        }
    }

    // ----- diagnostics -----------------------------------------------------

    pub(crate) fn exec_dir_diag(&mut self, pair: Pair<Rule>, severity: Severity) -> Result<()> {
        let span = pair.as_span();
        let list = pair.into_inner().nth(1).unwrap();
        let mut message = String::new();
        for expr in list.into_inner() {
            let (value, _) = self.eval(expr);
            message.push_str(&format!("{}", value));
        }
        match severity {
            Severity::Warning => {
                if self.pass == 2 {
                    self.warn_at(&span, message);
                }
            }
            Severity::Error => {
                if self.pass == 2 {
                    self.error_at(&span, message);
                }
            }
            Severity::Serious => return Err(self.err_at(span, message)),
        }
        Ok(())
    }

    // ----- shared helpers ---------------------------------------------------

    /// Evaluates an expression whose value the layout depends on: an
    /// unresolved or non-numeric result here is fatal, because the two
    /// passes could otherwise disagree about the statement stream.
    pub(crate) fn required_int(&mut self, expr: Pair<Rule>, what: &str) -> Result<i64> {
        let span = expr.as_span();
        let (value, _) = self.eval(expr);
        match value.to_int() {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(self.err_at(span, format!("{} (symbol not yet defined?)", what))),
            Err(message) => Err(self.err_at(span, message)),
        }
    }

    fn required_condition(&mut self, expr: Pair<Rule>) -> Result<bool> {
        let span = expr.as_span();
        let (value, _) = self.eval(expr);
        match value.truthy() {
            Ok(Some(taken)) => Ok(taken),
            Ok(None) => Err(self.err_at(
                span,
                "condition must be resolvable in the first pass".to_owned(),
            )),
            Err(message) => Err(self.err_at(span, message)),
        }
    }

    fn data_byte(&mut self, span: &Span, value: &Value) -> u8 {
        match value.to_int() {
            Ok(Some(v)) => {
                if self.pass == 2 && (v < -128 || v > 255) {
                    self.warn_at(span, format!("value {} does not fit in 8 bits", v));
                }
                v as u8
            }
            Ok(None) => 0,
            Err(message) => {
                if self.pass == 2 {
                    self.error_at(span, message);
                }
                0
            }
        }
    }
}
