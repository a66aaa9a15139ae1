//! Symbol table, zones and anonymous labels.
//!
//! Names live in one of three scopes: global, zone-local (`.name`) or
//! cheap-local (`@name`). A bare reference cascades cheap -> zone -> global;
//! prefixed references stay in their scope. The table persists across both
//! passes; zone and cheap-scope ids are allocated deterministically so that
//! pass 2 re-walks into the same scopes.

use crate::value::Value;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ScopeId {
    Global,
    Zone(u32),
    Cheap(u32, u32),
}

/// The ambient scope a statement executes in.
#[derive(Clone, Copy, Debug)]
pub struct ScopeCtx {
    pub zone: u32,
    pub cheap: u32,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub value: Value,
    pub is_variable: bool,
    /// Referenced before its definition in pass 1. The flag persists, which
    /// keeps addressing-width decisions identical in both passes.
    pub forward: bool,
    pub referenced: bool,
    pub defined_in_pass: Option<u8>,
}

impl Symbol {
    fn placeholder() -> Symbol {
        Symbol {
            value: Value::Undefined,
            is_variable: false,
            forward: true,
            referenced: true,
            defined_in_pass: None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DefineError {
    Redefined,
    PhaseMismatch { old: Value },
}

/// Splits the scope prefix off a source-level name and produces the map key.
pub fn scope_key(name: &str, ctx: ScopeCtx) -> (ScopeId, String) {
    if let Some(rest) = name.strip_prefix('.') {
        (ScopeId::Zone(ctx.zone), rest.to_owned())
    } else if let Some(rest) = name.strip_prefix('@') {
        (ScopeId::Cheap(ctx.zone, ctx.cheap), rest.to_owned())
    } else {
        (ScopeId::Global, name.to_owned())
    }
}

#[derive(Default)]
pub struct SymbolTable {
    map: HashMap<(ScopeId, String), Symbol>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Resolves a reference. A bare name cascades cheap -> zone -> global;
    /// a miss creates an `Undefined` placeholder in the scope a definition
    /// would land in, marking it as forward-referenced.
    pub fn lookup(&mut self, name: &str, ctx: ScopeCtx) -> (Value, bool) {
        let key = if !name.starts_with('.') && !name.starts_with('@') {
            let cheap = (ScopeId::Cheap(ctx.zone, ctx.cheap), name.to_owned());
            let zone = (ScopeId::Zone(ctx.zone), name.to_owned());
            if self.map.contains_key(&cheap) {
                cheap
            } else if self.map.contains_key(&zone) {
                zone
            } else {
                (ScopeId::Global, name.to_owned())
            }
        } else {
            scope_key(name, ctx)
        };
        let symbol = self.map.entry(key).or_insert_with(Symbol::placeholder);
        symbol.referenced = true;
        (symbol.value.clone(), symbol.forward)
    }

    /// Point-in-time check used by `!ifdef`; does not create placeholders or
    /// mark anything referenced.
    pub fn is_defined(&self, name: &str, ctx: ScopeCtx) -> bool {
        let defined = |key: &(ScopeId, String)| {
            self.map
                .get(key)
                .map(|s| s.value.is_defined())
                .unwrap_or(false)
        };
        if !name.starts_with('.') && !name.starts_with('@') {
            defined(&(ScopeId::Cheap(ctx.zone, ctx.cheap), name.to_owned()))
                || defined(&(ScopeId::Zone(ctx.zone), name.to_owned()))
                || defined(&(ScopeId::Global, name.to_owned()))
        } else {
            defined(&scope_key(name, ctx))
        }
    }

    pub fn define(
        &mut self,
        key: (ScopeId, String),
        value: Value,
        is_variable: bool,
        pass: u8,
    ) -> Result<(), DefineError> {
        let symbol = self.map.entry(key).or_insert_with(|| Symbol {
            value: Value::Undefined,
            is_variable,
            forward: false,
            referenced: false,
            defined_in_pass: None,
        });
        match symbol.defined_in_pass {
            None => {
                symbol.value = value;
                symbol.is_variable = is_variable;
                symbol.defined_in_pass = Some(pass);
                Ok(())
            }
            Some(_) if symbol.is_variable && is_variable => {
                symbol.value = value;
                symbol.defined_in_pass = Some(pass);
                Ok(())
            }
            Some(1) if pass == 2 && !is_variable && !symbol.is_variable => {
                if symbol.value == value {
                    symbol.defined_in_pass = Some(2);
                    Ok(())
                } else {
                    Err(DefineError::PhaseMismatch {
                        old: symbol.value.clone(),
                    })
                }
            }
            Some(_) => Err(DefineError::Redefined),
        }
    }

    /// Marks a symbol as forward-tainted (used for macro parameters bound to
    /// forward-referencing argument expressions).
    pub fn set_forward(&mut self, key: &(ScopeId, String), forward: bool) {
        if let Some(symbol) = self.map.get_mut(key) {
            symbol.forward = forward;
        }
    }

    /// Global integer symbols for the `-s` dump and the VICE label file.
    pub fn export_globals(&self) -> Vec<(String, u16)> {
        let mut out: Vec<(String, u16)> = self
            .map
            .iter()
            .filter_map(|((scope, name), symbol)| match (scope, &symbol.value) {
                (ScopeId::Global, Value::Int(v)) if *v >= 0 && *v <= 0xffff => {
                    Some((name.clone(), *v as u16))
                }
                _ => None,
            })
            .collect();
        out.sort();
        out
    }
}

/// Zone id allocation. Named zones re-join their namespace on every mention;
/// unnamed zones (and macro invocations) get a fresh id. The counter bumps on
/// every allocation call, including cache hits, so both passes see identical
/// ids.
pub struct Zones {
    next: u32,
    by_name: HashMap<String, u32>,
}

impl Zones {
    pub fn new() -> Zones {
        Zones {
            next: 1,
            by_name: HashMap::new(),
        }
    }

    pub fn reset(&mut self) {
        self.next = 1;
    }

    pub fn named(&mut self, name: &str) -> u32 {
        let candidate = self.next;
        self.next += 1;
        *self.by_name.entry(name.to_owned()).or_insert(candidate)
    }

    pub fn anonymous(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Anonymous labels, keyed by zone, direction and depth (`--` is depth 2).
/// Pass 1 records `(sequence, pc)` in statement order; pass 2 verifies the
/// recorded addresses and resolves references by binary search.
#[derive(Default)]
pub struct AnonLabels {
    lists: HashMap<(u32, char, usize), Vec<(u64, i64)>>,
}

impl AnonLabels {
    pub fn new() -> AnonLabels {
        AnonLabels::default()
    }

    pub fn clear(&mut self) {
        self.lists.clear();
    }

    /// Records (pass 1) or verifies (pass 2) an anonymous label definition.
    /// `Err` carries the pass-1 address on a phase mismatch, `None` when the
    /// statement streams diverged and pass 1 never saw this definition.
    pub fn record(
        &mut self,
        zone: u32,
        sign: char,
        depth: usize,
        seq: u64,
        pc: i64,
        pass: u8,
    ) -> Result<(), Option<i64>> {
        let list = self.lists.entry((zone, sign, depth)).or_default();
        if pass == 1 {
            list.push((seq, pc));
            Ok(())
        } else {
            match list.binary_search_by_key(&seq, |entry| entry.0) {
                Ok(index) if list[index].1 == pc => Ok(()),
                Ok(index) => Err(Some(list[index].1)),
                Err(_) => Err(None),
            }
        }
    }

    /// `-` resolves to the nearest definition before `seq`, `+` to the
    /// nearest after it.
    pub fn resolve(&self, zone: u32, sign: char, depth: usize, seq: u64) -> Option<i64> {
        let list = self.lists.get(&(zone, sign, depth))?;
        let partition = list.partition_point(|entry| entry.0 < seq);
        if sign == '-' {
            partition.checked_sub(1).map(|i| list[i].1)
        } else {
            list.get(partition..)?
                .iter()
                .find(|entry| entry.0 > seq)
                .map(|entry| entry.1)
        }
    }
}
