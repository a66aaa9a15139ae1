//! The assembler instance: all state shared between the two passes, the
//! diagnostic sink and the byte-emission path.

use crate::convtab::Convtab;
use crate::symbols::{AnonLabels, ScopeCtx, SymbolTable, Zones};
use crate::value::Value;
use crate::{Error, Result};
use cpu65::Cpu;
use imgfile::Image;
use pest::error::ErrorVariant;
use pest::Span;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Warning,
    Error,
    Serious,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
            Severity::Serious => write!(f, "Serious error"),
        }
    }
}

/// A recorded problem. Non-fatal diagnostics accumulate so one run can
/// report several errors; fatal ones surface as `Err` from the driver.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: Error,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -\n{}", self.severity, self.error)
    }
}

pub struct Options {
    pub include_dirs: Vec<PathBuf>,
    pub initial_pc: Option<u16>,
    pub listing: bool,
    pub max_iterations: u64,
    pub max_macro_depth: usize,
    pub max_include_depth: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            include_dirs: Vec::new(),
            initial_pc: None,
            listing: false,
            max_iterations: 1u64 << 32,
            max_macro_depth: 64,
            max_include_depth: 64,
        }
    }
}

pub(crate) struct MacroDef {
    pub params: Vec<(String, Option<Value>)>,
    pub body: String,
}

/// One listing line: the bytes a source statement emitted and where.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingLine {
    pub path: String,
    pub line: u32,
    pub pc: u16,
    pub bytes: Vec<u8>,
}

/// The result of a run: the byte image, exported globals, the listing (when
/// requested) and every recorded diagnostic.
pub struct Assembly {
    pub image: Image,
    pub symbols: Vec<(String, u16)>,
    pub listing: Vec<ListingLine>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity != Severity::Warning)
    }
}

pub struct Assembler {
    pub(crate) opts: Options,
    // survives both passes
    pub(crate) symbols: SymbolTable,
    pub(crate) zones: Zones,
    pub(crate) anon: AnonLabels,
    pub(crate) macros: HashMap<String, Rc<MacroDef>>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    // rebuilt per pass
    pub(crate) image: Image,
    pub(crate) listing: Vec<ListingLine>,
    pub(crate) pass: u8,
    pub(crate) seq: u64,
    pub(crate) pc: Option<u32>,
    pub(crate) pseudo_offset: i64,
    pub(crate) xor_mask: u8,
    pub(crate) cpu: Cpu,
    pub(crate) active_tab: Convtab,
    pub(crate) zone: u32,
    pub(crate) cheap: u32,
    pub(crate) cheap_next: u32,
    pub(crate) emitted_any: bool,
    pub(crate) overlap_warned: bool,
    pub(crate) loop_depth: u32,
    pub(crate) macro_depth: usize,
    pub(crate) include_stack: Vec<PathBuf>,
    pub(crate) path_stack: Vec<String>,
    pub(crate) current_line: u32,
    pub(crate) eval_forward: bool,
}

impl Assembler {
    pub fn new(opts: Options) -> Assembler {
        Assembler {
            opts,
            symbols: SymbolTable::new(),
            zones: Zones::new(),
            anon: AnonLabels::new(),
            macros: HashMap::new(),
            diagnostics: Vec::new(),
            image: Image::new(0),
            listing: Vec::new(),
            pass: 0,
            seq: 0,
            pc: None,
            pseudo_offset: 0,
            xor_mask: 0,
            cpu: Cpu::Mos6502,
            active_tab: Convtab::raw(),
            zone: 0,
            cheap: 0,
            cheap_next: 1,
            emitted_any: false,
            overlap_warned: false,
            loop_depth: 0,
            macro_depth: 0,
            include_stack: Vec::new(),
            path_stack: Vec::new(),
            current_line: 0,
            eval_forward: false,
        }
    }

    pub(crate) fn begin_pass(&mut self, pass: u8) {
        self.pass = pass;
        self.seq = 0;
        self.pc = self.opts.initial_pc.map(u32::from);
        self.pseudo_offset = 0;
        self.xor_mask = 0;
        self.cpu = Cpu::Mos6502;
        self.active_tab = Convtab::raw();
        self.zone = 0;
        self.cheap = 0;
        self.cheap_next = 1;
        self.zones.reset();
        if pass == 1 {
            self.anon.clear();
        }
        // Diagnostics are re-discovered by the pass-2 traversal; dropping the
        // pass-1 set avoids reporting everything twice.
        self.diagnostics.clear();
        self.image = Image::new(0);
        self.listing.clear();
        self.emitted_any = false;
        self.overlap_warned = false;
        self.loop_depth = 0;
        self.macro_depth = 0;
        self.include_stack.clear();
        self.path_stack.clear();
        self.current_line = 0;
    }

    pub(crate) fn scope(&self) -> ScopeCtx {
        ScopeCtx {
            zone: self.zone,
            cheap: self.cheap,
        }
    }

    /// The address labels capture: real PC plus the `!pseudopc` offset.
    pub(crate) fn label_pc(&self) -> Option<i64> {
        self.pc.map(|pc| pc as i64 + self.pseudo_offset)
    }

    pub(crate) fn current_path(&self) -> &str {
        self.path_stack.last().map(String::as_str).unwrap_or("<input>")
    }

    pub(crate) fn err_at(&self, span: Span, message: String) -> Error {
        Error::new_from_span(ErrorVariant::CustomError { message }, span)
            .with_path(self.current_path())
    }

    pub(crate) fn diag(&mut self, severity: Severity, error: Error) {
        self.diagnostics.push(Diagnostic { severity, error });
    }

    pub(crate) fn warn_at(&mut self, span: &Span, message: String) {
        // Warnings carry no state in pass 1; pass 2 re-reports them anyway.
        let error = self.err_at(span.clone(), message);
        self.diag(Severity::Warning, error);
    }

    pub(crate) fn error_at(&mut self, span: &Span, message: String) {
        let error = self.err_at(span.clone(), message);
        self.diag(Severity::Error, error);
    }

    /// Emits one byte at the current PC. Pass 1 only advances; pass 2 stores
    /// the byte (through the XOR mask) and feeds the listing.
    pub(crate) fn emit(&mut self, span: &Span, byte: u8) -> Result<()> {
        let pc = match self.pc {
            Some(pc) => pc,
            None => {
                return Err(self.err_at(
                    span.clone(),
                    "program counter not set (use * = <addr>)".to_owned(),
                ))
            }
        };
        if pc > 0xffff {
            return Err(self.err_at(span.clone(), "program counter beyond $ffff".to_owned()));
        }
        if self.pass == 2 {
            let stored = byte ^ self.xor_mask;
            let overlap = self.image.put(pc as u16, stored);
            if overlap && !self.overlap_warned {
                self.warn_at(span, "overwriting previously emitted bytes".to_owned());
                self.overlap_warned = true;
            }
            if self.opts.listing {
                self.record_listing(pc as u16, stored);
            }
        }
        self.pc = Some(pc + 1);
        self.emitted_any = true;
        Ok(())
    }

    /// Advances the PC without touching the image (`!skip`); the gap keeps
    /// the memory-init byte.
    pub(crate) fn advance(&mut self, span: &Span, amount: u32) -> Result<()> {
        let pc = match self.pc {
            Some(pc) => pc,
            None => {
                return Err(self.err_at(
                    span.clone(),
                    "program counter not set (use * = <addr>)".to_owned(),
                ))
            }
        };
        let new = pc + amount;
        if new > 0x10000 {
            return Err(self.err_at(span.clone(), "program counter beyond $ffff".to_owned()));
        }
        self.pc = Some(new);
        self.emitted_any = true;
        Ok(())
    }

    fn record_listing(&mut self, pc: u16, byte: u8) {
        let path = self.current_path().to_owned();
        let line = self.current_line;
        if let Some(last) = self.listing.last_mut() {
            if last.line == line
                && last.path == path
                && last.pc as u32 + last.bytes.len() as u32 == pc as u32
            {
                last.bytes.push(byte);
                return;
            }
        }
        self.listing.push(ListingLine {
            path,
            line,
            pc,
            bytes: vec![byte],
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity != Severity::Warning)
    }

    pub fn into_assembly(self) -> Assembly {
        Assembly {
            image: self.image,
            symbols: self.symbols.export_globals(),
            listing: self.listing,
            diagnostics: self.diagnostics,
        }
    }
}
