//! Two-pass cross-assembler for the 6502 family with ACME syntax.
//!
//! The main entry points are [`assemble`](fn.assemble.html) and
//! [`assemble_with`](fn.assemble_with.html), which accept source text and
//! produce an [`Assembly`](struct.Assembly.html): the byte image (a
//! [`imgfile::Image`](../imgfile/struct.Image.html)), the exported global
//! symbols, an optional listing and the collected diagnostics. The CLI
//! drives [`Assembler`](struct.Assembler.html) directly so that diagnostics
//! survive a fatal error.
//!
//! Parsing is implemented with [pest]; the crate's [`Error`](type.Error.html)
//! type is an alias of `pest::error::Error`, so all pest facilities such as
//! pretty error formatting with file, line and caret are available.
//!
//! # Source language
//!
//! Statements are separated by newlines or `:`; comments run from `;` to the
//! end of the line. A statement is a label, an assignment, an instruction, a
//! `!directive` or a `+macro` invocation. Number literals use `$` (hex),
//! `%` (binary), plain decimal (with `.` for floats) and `'c'` for a
//! character byte.
//!
//! ## Symbols
//!
//!  Form    | Scope
//! ---------|------------------------------------------------------------
//! `name`   | global; lookup falls back cheap -> zone -> global
//! `.name`  | local to the current `!zone`
//! `@name`  | local to the most recent global label
//! `+`/`-`  | anonymous, resolved by distance (`--`, `+++` reach further)
//!
//! Plain symbols are single-assignment; `!set` creates reassignable
//! variables. A symbol that resolves differently in the two passes is a
//! phase error and aborts the run.
//!
//! ## Instructions
//!
//! All addressing modes of the 6502, 65C02 and W65C02S are recognized, plus
//! the stable NMOS undocumented opcodes under `!cpu nmos6502`. When an
//! operand fits in zero page and the mnemonic has a zero-page form, the
//! short encoding is chosen; forward references conservatively reserve the
//! absolute form in both passes. A `+1`/`+2` suffix on the mnemonic forces
//! the width (`lda+2 $12`).
//!
//! ## Directives
//!
//!  Directive | Effect
//! -----------|--------------------------------------------------------
//! `!byte`/`!8`, `!word`/`!16`, `!24`, `!32`, `!16be`, `!24be`, `!32be` | emit integer data, little- or big-endian
//! `!hex "…"` | emit raw hex pairs
//! `!fill n [, v]`, `!skip n`, `!align mask, value [, fill]` | reserve or pad
//! `!pet`, `!scr`, `!raw`, `!text`, `!scrxor v, …` | emit converted text
//! `!convtab`/`!ct name-or-"file" [{…}]` | select the active conversion table
//! `!if e {…} [else {…}]`, `!ifdef`, `!ifndef` | conditional assembly
//! `!for v = a to b [step s] {…}`, `!while e {…}`, `!do {…} !until e` | loops, with `!break`/`!continue`
//! `!macro name p1 [, p2=default] {…}` / `+name args` | macros
//! `!source`/`!src "file"`, `!binary`/`!bin "file" [, size [, skip]]` | file inclusion
//! `!zone`/`!zn [name] [{…}]` | symbol scoping
//! `* = addr`, `!pseudopc addr {…}`, `!realpc` | program counter control
//! `!initmem v`, `!xor v [{…}]`, `!cpu name [{…}]` | image and variant state
//! `!warn`, `!error`, `!serious` | user diagnostics
//!
//! [pest]: https://docs.rs/pest/

mod convtab;
mod directives;
mod driver;
mod eval;
mod instructions;
mod listing;
mod parser;
mod state;
mod symbols;
mod value;

#[cfg(test)]
mod test;

pub use crate::listing::write_listing;
pub use crate::parser::{AsmParser, Rule};
pub use crate::state::{Assembler, Assembly, Diagnostic, ListingLine, Options, Severity};
pub use crate::value::Value;

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// Assembles one source text with default options. Fatal problems (syntax
/// errors, phase errors, exceeded limits, `!serious`) surface as `Err`;
/// everything else is collected in the returned assembly's diagnostics.
pub fn assemble(input: &str) -> Result<Assembly> {
    assemble_with(input, Options::default())
}

pub fn assemble_with(input: &str, options: Options) -> Result<Assembly> {
    let mut assembler = Assembler::new(options);
    assembler.assemble_str(input, "<input>")?;
    Ok(assembler.into_assembly())
}
