//! Compiled report expressions and their evaluation.
//!
//! The expression language's tokenizer and parser live outside this crate;
//! what arrives here is the already-compiled [`Expr`] form. Evaluation
//! resolves identifiers through the scope chain: the current subject (a
//! posting or an account) first, then ambient names like `today`, then the
//! option registry. Calls dispatch into the built-in function library.

use std::fmt;

use chrono::NaiveDate;
use regex::Regex;
use tally_core::{AccountId, Journal, Value};

use crate::error::ReportError;
use crate::fns;
use crate::options::Options;
use crate::walk::PostingView;

/// Ordered, immutable positional arguments for a function or command call.
///
/// Index 0 is the subject when invoked method-style. Optional arguments are
/// detected by absence, never by a null value.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    values: Vec<Value>,
}

impl CallArgs {
    /// Wrap a list of argument values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// The argument at `index`, if supplied.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of arguments supplied.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// The argument at `index`, or a malformed-expression error naming the
    /// function that needed it.
    pub fn required(&self, index: usize, func: &str) -> Result<&Value, ReportError> {
        self.values
            .get(index)
            .ok_or_else(|| ReportError::BadExpression(format!("{func}: missing argument {index}")))
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// What an expression is currently being evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// No subject; only ambient and option names resolve.
    None,
    /// A posting flowing through the pipeline.
    Posting(&'a PostingView),
    /// An account, after aggregation.
    Account(AccountId),
}

/// Everything evaluation needs, passed explicitly per call.
///
/// Passing the context instead of mutating shared report state keeps
/// per-posting and per-account evaluation of the same expression from
/// seeing each other's bindings.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    /// The journal under report.
    pub journal: &'a Journal,
    /// The option registry.
    pub options: &'a Options,
    /// The current subject.
    pub subject: Subject<'a>,
    /// The report's idea of "now".
    pub now: NaiveDate,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CmpOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A compiled expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal value.
    Const(Value),
    /// An identifier, resolved at evaluation time.
    Ident(String),
    /// Logical negation.
    Not(Box<Expr>),
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// Short-circuit conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Comparison.
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    /// Addition.
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction.
    Sub(Box<Expr>, Box<Expr>),
    /// Regex match against the target's display text.
    Match(Box<Expr>, Regex),
    /// Call into the built-in function library.
    Call(String, Vec<Expr>),
}

impl Expr {
    /// Evaluate against the given context.
    pub fn eval(&self, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
        match self {
            Self::Const(v) => Ok(v.clone()),
            Self::Ident(name) => resolve_ident(name, ctx),
            Self::Not(e) => Ok(Value::Boolean(!e.eval(ctx)?.to_boolean())),
            Self::Neg(e) => Ok(e.eval(ctx)?.neg()?),
            Self::And(a, b) => {
                if a.eval(ctx)?.to_boolean() {
                    Ok(Value::Boolean(b.eval(ctx)?.to_boolean()))
                } else {
                    Ok(Value::Boolean(false))
                }
            }
            Self::Or(a, b) => {
                if a.eval(ctx)?.to_boolean() {
                    Ok(Value::Boolean(true))
                } else {
                    Ok(Value::Boolean(b.eval(ctx)?.to_boolean()))
                }
            }
            Self::Cmp(op, a, b) => {
                let ordering = a.eval(ctx)?.compare(&b.eval(ctx)?)?;
                let result = match op {
                    CmpOp::Eq => ordering.is_eq(),
                    CmpOp::Ne => ordering.is_ne(),
                    CmpOp::Lt => ordering.is_lt(),
                    CmpOp::Le => ordering.is_le(),
                    CmpOp::Gt => ordering.is_gt(),
                    CmpOp::Ge => ordering.is_ge(),
                };
                Ok(Value::Boolean(result))
            }
            Self::Add(a, b) => Ok(a.eval(ctx)?.add(&b.eval(ctx)?)?),
            Self::Sub(a, b) => Ok(a.eval(ctx)?.sub(&b.eval(ctx)?)?),
            Self::Match(target, pattern) => {
                let text = target.eval(ctx)?.as_display_string();
                Ok(Value::Boolean(pattern.is_match(&text)))
            }
            Self::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|a| a.eval(ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                fns::call(name, &CallArgs::new(values), ctx)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(Value::String(s)) => write!(f, "{s:?}"),
            Self::Const(v) => write!(f, "{v}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Not(e) => write!(f, "!({e})"),
            Self::Neg(e) => write!(f, "-({e})"),
            Self::And(a, b) => write!(f, "({a} & {b})"),
            Self::Or(a, b) => write!(f, "({a} | {b})"),
            Self::Cmp(op, a, b) => write!(f, "({a} {} {b})", op.symbol()),
            Self::Add(a, b) => write!(f, "({a} + {b})"),
            Self::Sub(a, b) => write!(f, "({a} - {b})"),
            Self::Match(target, pattern) => write!(f, "({target} =~ /{}/)", pattern.as_str()),
            Self::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Resolve a bare identifier through the scope chain.
fn resolve_ident(name: &str, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    match ctx.subject {
        Subject::Posting(view) => {
            if let Some(value) = posting_attribute(name, view, ctx.journal) {
                return Ok(value);
            }
        }
        Subject::Account(id) => {
            if let Some(value) = account_attribute(name, id, ctx.journal) {
                return Ok(value);
            }
        }
        Subject::None => {}
    }
    if name == "today" || name == "now" {
        return Ok(Value::Date(ctx.now));
    }
    ctx.options
        .value(name)
        .ok_or_else(|| ReportError::UndefinedIdentifier(name.to_string()))
}

fn posting_attribute(name: &str, view: &PostingView, journal: &Journal) -> Option<Value> {
    use tally_core::EntryState;
    match name {
        "amount" => Some(view.amount.clone()),
        "account" => Some(Value::String(view.account_name(journal))),
        "payee" => Some(Value::String(view.payee.clone())),
        "date" => Some(Value::Date(view.date)),
        "cleared" => Some(Value::Boolean(view.state == EntryState::Cleared)),
        "pending" => Some(Value::Boolean(view.state == EntryState::Pending)),
        "uncleared" => Some(Value::Boolean(view.state == EntryState::Uncleared)),
        "real" => Some(Value::Boolean(!view.virtual_)),
        "actual" => Some(Value::Boolean(!view.synthetic)),
        "virtual" => Some(Value::Boolean(view.virtual_)),
        _ => None,
    }
}

fn account_attribute(name: &str, id: AccountId, journal: &Journal) -> Option<Value> {
    let account = journal.accounts.get(id);
    match name {
        "account" => Some(Value::String(account.full_name.to_string())),
        "total" => Some(Value::Balance(account.total.clone())),
        "amount" => Some(Value::Balance(account.self_total.clone())),
        _ => None,
    }
}

/// Build the selection predicate a one-shot command line implies.
///
/// Each string argument becomes an account regex term; the literal argument
/// `payee` switches subsequent terms to payee regexes. Terms are OR-joined.
/// No arguments yields the always-true predicate.
pub fn predicate_from_args(args: &CallArgs) -> Result<Expr, ReportError> {
    let mut target = "account";
    let mut predicate: Option<Expr> = None;
    for value in args.iter() {
        let text = value.as_display_string();
        if text == "payee" {
            target = "payee";
            continue;
        }
        let pattern =
            Regex::new(&text).map_err(|e| ReportError::BadExpression(e.to_string()))?;
        let term = Expr::Match(Box::new(Expr::Ident(target.to_string())), pattern);
        predicate = Some(match predicate {
            Some(prev) => Expr::Or(Box::new(prev), Box::new(term)),
            None => term,
        });
    }
    Ok(predicate.unwrap_or(Expr::Const(Value::Boolean(true))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_core::Amount;

    fn ctx_less<'a>(journal: &'a Journal, options: &'a Options) -> EvalContext<'a> {
        EvalContext {
            journal,
            options,
            subject: Subject::None,
            now: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_const_and_arith() {
        let journal = Journal::new();
        let options = Options::new();
        let ctx = ctx_less(&journal, &options);

        let expr = Expr::Add(
            Box::new(Expr::Const(Value::Amount(Amount::new(dec!(10), "USD")))),
            Box::new(Expr::Const(Value::Amount(Amount::new(dec!(5), "USD")))),
        );
        assert_eq!(
            expr.eval(&ctx).unwrap(),
            Value::Amount(Amount::new(dec!(15), "USD"))
        );
    }

    #[test]
    fn test_short_circuit() {
        let journal = Journal::new();
        let options = Options::new();
        let ctx = ctx_less(&journal, &options);

        // The right side would fail with an undefined identifier if reached.
        let expr = Expr::And(
            Box::new(Expr::Const(Value::Boolean(false))),
            Box::new(Expr::Ident("no_such_name".into())),
        );
        assert_eq!(expr.eval(&ctx).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_undefined_identifier() {
        let journal = Journal::new();
        let options = Options::new();
        let ctx = ctx_less(&journal, &options);

        let err = Expr::Ident("no_such_name".into()).eval(&ctx).unwrap_err();
        assert!(matches!(err, ReportError::UndefinedIdentifier(name) if name == "no_such_name"));
    }

    #[test]
    fn test_today() {
        let journal = Journal::new();
        let options = Options::new();
        let ctx = ctx_less(&journal, &options);
        assert_eq!(
            Expr::Ident("today".into()).eval(&ctx).unwrap(),
            Value::Date(ctx.now)
        );
    }

    #[test]
    fn test_predicate_from_args_accounts_or_joined() {
        let args = CallArgs::new(vec![Value::from("Food"), Value::from("Rent")]);
        let pred = predicate_from_args(&args).unwrap();
        assert_eq!(
            pred.to_string(),
            "((account =~ /Food/) | (account =~ /Rent/))"
        );
    }

    #[test]
    fn test_predicate_from_args_payee_switch() {
        let args = CallArgs::new(vec![Value::from("payee"), Value::from("Grocer")]);
        let pred = predicate_from_args(&args).unwrap();
        assert_eq!(pred.to_string(), "(payee =~ /Grocer/)");
    }

    #[test]
    fn test_predicate_from_args_bad_regex() {
        let args = CallArgs::new(vec![Value::from("(")]);
        assert!(matches!(
            predicate_from_args(&args),
            Err(ReportError::BadExpression(_))
        ));
    }

    #[test]
    fn test_predicate_from_args_empty_is_true() {
        let pred = predicate_from_args(&CallArgs::default()).unwrap();
        assert_eq!(pred.to_string(), "true");
    }
}
