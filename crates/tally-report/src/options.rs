//! The report option registry.
//!
//! Every option the reporting core recognizes is declared once in
//! [`OPTION_TABLE`]: canonical name, declared aliases, single-character
//! legacy flag and cell kind. One generic dispatcher consumes the table, so
//! lookup is a total function over exactly the declared names — no prefix or
//! partial matches — and every alias reads and writes the same backing cell
//! as its canonical name.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_core::Value;

use crate::error::ReportError;
use crate::expr::Expr;

/// The kind of value an option cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// An on/off switch.
    Bool,
    /// A free-form string (format templates, dates, file names).
    Str,
    /// An integer (widths, head/tail counts).
    Num,
    /// A compiled expression (predicates, sort keys, amount accessors).
    Expr,
}

/// One declared option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    /// Canonical name.
    pub canonical: &'static str,
    /// Alias names resolving to the same cell.
    pub aliases: &'static [&'static str],
    /// Single-character legacy flag, if any.
    pub flag: Option<char>,
    /// Cell kind.
    pub kind: OptionKind,
}

const fn opt(canonical: &'static str, kind: OptionKind) -> OptionDef {
    OptionDef {
        canonical,
        aliases: &[],
        flag: None,
        kind,
    }
}

const fn opt_ch(canonical: &'static str, flag: char, kind: OptionKind) -> OptionDef {
    OptionDef {
        canonical,
        aliases: &[],
        flag: Some(flag),
        kind,
    }
}

const fn opt_alt(
    canonical: &'static str,
    aliases: &'static [&'static str],
    flag: Option<char>,
    kind: OptionKind,
) -> OptionDef {
    OptionDef {
        canonical,
        aliases,
        flag,
        kind,
    }
}

use OptionKind::{Bool, Expr as ExprKind, Num, Str};

/// Every recognized option, in canonical-name order.
///
/// The name set, alias pairs and flag characters are a fixed compatibility
/// contract; changing any of them is a breaking change.
pub const OPTION_TABLE: &[OptionDef] = &[
    opt("abbrev_len", Num),
    opt("account", Str),
    opt_ch("actual", 'L', Bool),
    opt("add_budget", Bool),
    opt_ch("amount", 't', ExprKind),
    opt_ch("amount_data", 'j', Bool),
    opt("amount_width", Num),
    opt("anon", Bool),
    opt("ansi", Bool),
    opt("ansi_invert", Bool),
    opt("account_width", Num),
    opt_ch("average", 'A', Bool),
    opt("balance_format", Str),
    opt("base", Bool),
    opt_alt("basis", &["cost"], Some('B'), Bool),
    opt("begin", Str),
    opt("budget", Bool),
    opt_ch("by_payee", 'P', Bool),
    opt("cache", Str),
    opt_ch("cleared", 'C', Bool),
    opt("code_as_account", Bool),
    opt("code_as_payee", Bool),
    opt_ch("collapse", 'n', Bool),
    opt("collapse_if_zero", Bool),
    opt("columns", Num),
    opt_alt("comm_as_account", &["commodity_as_account"], None, Bool),
    opt_alt("comm_as_payee", &["commodity_as_payee"], Some('x'), Bool),
    opt("csv_format", Str),
    opt("current", Bool),
    opt("daily", Bool),
    opt_ch("date_format", 'y', Str),
    opt("date_width", Num),
    opt_ch("deviation", 'D', Bool),
    opt("display", ExprKind),
    opt("display_amount", ExprKind),
    opt("display_total", ExprKind),
    opt("dow", Bool),
    opt("effective", Bool),
    opt_ch("empty", 'E', Bool),
    opt("end", Str),
    opt("equity", Bool),
    opt("flat", Bool),
    opt("forecast", Str),
    opt_ch("format", 'F', Str),
    opt_ch("gain", 'G', Bool),
    opt_alt("head", &["first"], None, Num),
    opt("invert", Bool),
    opt("limit", ExprKind),
    opt("lot_dates", Bool),
    opt("lot_prices", Bool),
    opt("lot_tags", Bool),
    opt("lots", Bool),
    opt_ch("market", 'V', Bool),
    opt_ch("monthly", 'M', Bool),
    opt("no_total", Bool),
    opt("only", ExprKind),
    opt("output", Str),
    opt("pager", Str),
    opt("payee_as_account", Bool),
    opt("payee_width", Num),
    opt("pending", Bool),
    opt_ch("percentage", '%', Bool),
    opt_ch("performance", 'g', Bool),
    opt("period", Str),
    opt("period_sort", Str),
    opt("plot_amount_format", Str),
    opt("plot_total_format", Str),
    opt_ch("price", 'I', Bool),
    opt_ch("price_exp", 'Z', Str),
    opt("prices_format", Str),
    opt("pricesdb_format", Str),
    opt("print_format", Str),
    opt_ch("quantity", 'O', Bool),
    opt("quarterly", Bool),
    opt_ch("real", 'R', Bool),
    opt("register_format", Str),
    opt("related", Bool),
    opt("related_all", Bool),
    opt("revalued", Bool),
    opt("revalued_only", Bool),
    opt("set_account", Str),
    opt("set_payee", Str),
    opt("set_price", Str),
    opt_ch("sort", 'S', ExprKind),
    opt("sort_all", ExprKind),
    opt("sort_entries", ExprKind),
    opt("subtotal", Bool),
    opt_alt("tail", &["last"], None, Num),
    opt_ch("total", 'T', ExprKind),
    opt_ch("total_data", 'J', Bool),
    opt("total_width", Num),
    opt("totals", Bool),
    opt("truncate", Str),
    opt("unbudgeted", Bool),
    opt_ch("uncleared", 'U', Bool),
    opt_ch("weekly", 'W', Bool),
    opt("wide", Bool),
    opt_ch("yearly", 'Y', Bool),
];

/// An expression cell: the compiled form plus the source it displays as.
#[derive(Debug, Clone)]
struct ExprCell {
    source: String,
    expr: Expr,
}

#[derive(Debug, Clone)]
enum Cell {
    Bool(bool),
    Str(Option<String>),
    Num(Option<i64>),
    Expr(Option<ExprCell>),
}

impl Cell {
    const fn empty(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Bool => Self::Bool(false),
            OptionKind::Str => Self::Str(None),
            OptionKind::Num => Self::Num(None),
            OptionKind::Expr => Self::Expr(None),
        }
    }
}

/// Backing cells for every declared option.
#[derive(Debug, Clone)]
pub struct Options {
    cells: Vec<Cell>,
    by_name: HashMap<&'static str, usize>,
    by_flag: HashMap<char, usize>,
}

impl Options {
    /// Create a registry with every cell unset, except the amount/total
    /// accessor expressions which default to their like-named identifiers.
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let mut by_flag = HashMap::new();
        for (index, def) in OPTION_TABLE.iter().enumerate() {
            by_name.insert(def.canonical, index);
            for alias in def.aliases {
                by_name.insert(*alias, index);
            }
            if let Some(flag) = def.flag {
                by_flag.insert(flag, index);
            }
        }
        let cells = OPTION_TABLE.iter().map(|def| Cell::empty(def.kind)).collect();

        let mut options = Self {
            cells,
            by_name,
            by_flag,
        };
        // Default accessor expressions, overridable like any other cell.
        let defaults: &[(&str, Expr)] = &[
            ("amount", Expr::Ident("amount".into())),
            ("total", Expr::Ident("total".into())),
            ("display_amount", Expr::Call("amount_expr".into(), vec![])),
            ("display_total", Expr::Call("total_expr".into(), vec![])),
        ];
        for (name, expr) in defaults {
            let source = expr.to_string();
            options
                .set_expr(name, expr.clone(), &source)
                .unwrap_or_else(|_| unreachable!("default option {name} is declared"));
        }
        options
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// The canonical name behind a name or declared alias.
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        self.index(name).map(|i| OPTION_TABLE[i].canonical)
    }

    /// The canonical name behind a single-character legacy flag.
    pub fn canonical_by_flag(&self, flag: char) -> Option<&'static str> {
        self.by_flag.get(&flag).map(|&i| OPTION_TABLE[i].canonical)
    }

    /// The declared kind of an option.
    pub fn kind(&self, name: &str) -> Option<OptionKind> {
        self.index(name).map(|i| OPTION_TABLE[i].kind)
    }

    /// Whether an option has been set (for numeric cells, to a non-zero
    /// count).
    pub fn is_set(&self, name: &str) -> bool {
        match self.index(name).map(|i| &self.cells[i]) {
            Some(Cell::Bool(b)) => *b,
            Some(Cell::Str(s)) => s.is_some(),
            Some(Cell::Num(n)) => n.is_some_and(|n| n != 0),
            Some(Cell::Expr(e)) => e.is_some(),
            None => false,
        }
    }

    /// Read an option as a [`Value`]. `None` means the name is not declared;
    /// an unset cell reads as `Boolean(false)`.
    pub fn value(&self, name: &str) -> Option<Value> {
        let cell = &self.cells[self.index(name)?];
        Some(match cell {
            Cell::Bool(b) => Value::Boolean(*b),
            Cell::Str(Some(s)) => Value::String(s.clone()),
            Cell::Num(Some(n)) => Value::Amount(tally_core::Amount::new(Decimal::from(*n), "")),
            Cell::Expr(Some(e)) => Value::String(e.source.clone()),
            Cell::Str(None) | Cell::Num(None) | Cell::Expr(None) => Value::Boolean(false),
        })
    }

    /// The string value of a `Str` cell, if set.
    pub fn str_value(&self, name: &str) -> Option<&str> {
        match self.index(name).map(|i| &self.cells[i]) {
            Some(Cell::Str(Some(s))) => Some(s),
            _ => None,
        }
    }

    /// The numeric value of a `Num` cell, if set.
    pub fn num(&self, name: &str) -> Option<i64> {
        match self.index(name).map(|i| &self.cells[i]) {
            Some(Cell::Num(n)) => *n,
            _ => None,
        }
    }

    /// The compiled expression of an `Expr` cell, if set.
    pub fn expr(&self, name: &str) -> Option<&Expr> {
        match self.index(name).map(|i| &self.cells[i]) {
            Some(Cell::Expr(Some(e))) => Some(&e.expr),
            _ => None,
        }
    }

    /// Switch a boolean option on.
    pub fn set_on(&mut self, name: &str) -> Result<(), ReportError> {
        let index = self.index(name).ok_or_else(|| undefined(name))?;
        match &mut self.cells[index] {
            Cell::Bool(b) => {
                *b = true;
                Ok(())
            }
            _ => Err(ReportError::OptionValue {
                name: OPTION_TABLE[index].canonical.to_string(),
                value: "<switch>".to_string(),
            }),
        }
    }

    /// Set a boolean option explicitly.
    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), ReportError> {
        let index = self.index(name).ok_or_else(|| undefined(name))?;
        match &mut self.cells[index] {
            Cell::Bool(b) => {
                *b = value;
                Ok(())
            }
            _ => Err(ReportError::OptionValue {
                name: OPTION_TABLE[index].canonical.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Assign a string value, parsing it per the cell's kind.
    ///
    /// Expression cells cannot be set from text here; the expression
    /// compiler is an external collaborator, so compiled expressions arrive
    /// through [`Options::set_expr`].
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ReportError> {
        let index = self.index(name).ok_or_else(|| undefined(name))?;
        let canonical = OPTION_TABLE[index].canonical;
        match &mut self.cells[index] {
            Cell::Bool(b) => {
                *b = !matches!(value, "false" | "no" | "0");
                Ok(())
            }
            Cell::Str(s) => {
                *s = Some(value.to_string());
                Ok(())
            }
            Cell::Num(n) => {
                let parsed = value.parse::<i64>().map_err(|_| ReportError::OptionValue {
                    name: canonical.to_string(),
                    value: value.to_string(),
                })?;
                *n = Some(parsed);
                Ok(())
            }
            Cell::Expr(_) => Err(ReportError::OptionValue {
                name: canonical.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Set a numeric option directly.
    pub fn set_num(&mut self, name: &str, value: i64) -> Result<(), ReportError> {
        let index = self.index(name).ok_or_else(|| undefined(name))?;
        match &mut self.cells[index] {
            Cell::Num(n) => {
                *n = Some(value);
                Ok(())
            }
            _ => Err(ReportError::OptionValue {
                name: OPTION_TABLE[index].canonical.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Install a compiled expression, replacing any previous one.
    pub fn set_expr(&mut self, name: &str, expr: Expr, source: &str) -> Result<(), ReportError> {
        let index = self.index(name).ok_or_else(|| undefined(name))?;
        match &mut self.cells[index] {
            Cell::Expr(slot) => {
                *slot = Some(ExprCell {
                    source: source.to_string(),
                    expr,
                });
                Ok(())
            }
            _ => Err(ReportError::OptionValue {
                name: OPTION_TABLE[index].canonical.to_string(),
                value: source.to_string(),
            }),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(name: &str) -> ReportError {
    ReportError::UndefinedIdentifier(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_name_resolves() {
        let options = Options::new();
        for def in OPTION_TABLE {
            assert_eq!(options.canonical(def.canonical), Some(def.canonical));
            for alias in def.aliases {
                assert_eq!(options.canonical(alias), Some(def.canonical));
            }
            if let Some(flag) = def.flag {
                assert_eq!(options.canonical_by_flag(flag), Some(def.canonical));
            }
        }
    }

    #[test]
    fn test_no_prefix_matches() {
        let options = Options::new();
        assert_eq!(options.canonical("mark"), None);
        assert_eq!(options.canonical("marketx"), None);
        assert_eq!(options.canonical(""), None);
    }

    #[test]
    fn test_alias_writes_same_cell() {
        let mut options = Options::new();
        options.set_on("cost").unwrap();
        assert!(options.is_set("basis"));
        assert!(options.is_set("cost"));

        let mut options = Options::new();
        options.set("last", "5").unwrap();
        assert_eq!(options.num("tail"), Some(5));

        let mut options = Options::new();
        options.set("first", "3").unwrap();
        assert_eq!(options.num("head"), Some(3));

        let mut options = Options::new();
        options.set_on("commodity_as_payee").unwrap();
        assert!(options.is_set("comm_as_payee"));

        let mut options = Options::new();
        options.set_on("commodity_as_account").unwrap();
        assert!(options.is_set("comm_as_account"));
    }

    #[test]
    fn test_flag_chars() {
        let options = Options::new();
        assert_eq!(options.canonical_by_flag('V'), Some("market"));
        assert_eq!(options.canonical_by_flag('B'), Some("basis"));
        assert_eq!(options.canonical_by_flag('t'), Some("amount"));
        assert_eq!(options.canonical_by_flag('%'), Some("percentage"));
        assert_eq!(options.canonical_by_flag('?'), None);
    }

    #[test]
    fn test_num_parse_failure() {
        let mut options = Options::new();
        let err = options.set("head", "lots").unwrap_err();
        assert!(matches!(err, ReportError::OptionValue { name, .. } if name == "head"));
    }

    #[test]
    fn test_zero_count_reads_unset() {
        let mut options = Options::new();
        options.set_num("head", 0).unwrap();
        assert!(!options.is_set("head"));
    }

    #[test]
    fn test_default_accessor_expressions() {
        let options = Options::new();
        assert!(options.expr("amount").is_some());
        assert!(options.expr("total").is_some());
        assert_eq!(options.value("amount"), Some(Value::String("amount".into())));
        assert!(options.expr("limit").is_none());
    }
}
