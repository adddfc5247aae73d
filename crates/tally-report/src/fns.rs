//! The built-in report function library.
//!
//! Expression calls and command-line function invocations both land in
//! [`call`]. Every function takes positional [`CallArgs`] plus the explicit
//! evaluation context; none of them mutate anything.

use tally_core::{AnnotationKeep, Value};

use crate::error::ReportError;
use crate::expr::{CallArgs, EvalContext};
use crate::options::{OptionKind, Options, OPTION_TABLE};

/// Names [`call`] dispatches on, in the order checked.
///
/// `today` is resolved earlier in the scope chain by the session, so it is
/// deliberately absent here even though [`call`] accepts it.
pub const BUILTIN_FNS: &[&str] = &[
    "amount_expr",
    "total_expr",
    "display_amount",
    "display_total",
    "market",
    "strip",
    "quantity",
    "truncate",
    "quoted",
    "join",
    "format_date",
    "print",
    "options",
];

/// Whether a name is claimed by the function library.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FNS.contains(&name)
}

/// Dispatch a function call by name.
pub fn call(name: &str, args: &CallArgs, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    match name {
        "amount_expr" => eval_option_expr("amount", ctx),
        "total_expr" => eval_option_expr("total", ctx),
        "display_amount" => eval_option_expr("display_amount", ctx),
        "display_total" => eval_option_expr("display_total", ctx),
        "market" => market(args, ctx),
        "strip" => strip(args, ctx),
        "quantity" => quantity(args),
        "truncate" => truncate(args, ctx),
        "quoted" => quoted(args),
        "join" => join(args),
        "format_date" => format_date(args, ctx),
        "print" => print(args, ctx),
        "options" => Ok(options_dump(ctx)),
        "today" | "now" => Ok(Value::Date(ctx.now)),
        _ => Err(ReportError::UndefinedIdentifier(name.to_string())),
    }
}

fn eval_option_expr(option: &str, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    let expr = ctx
        .options
        .expr(option)
        .ok_or_else(|| ReportError::UndefinedIdentifier(option.to_string()))?;
    expr.eval(ctx)
}

/// Market-value the argument, as of the second argument or the report date.
///
/// A third argument names a target commodity; then a missing rate is an
/// error. Without one, amounts with no quote pass through unchanged.
fn market(args: &CallArgs, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    let value = args.required(0, "market")?;
    let as_of = match args.get(1) {
        Some(v) => v.to_date()?,
        None => ctx.now,
    };
    let target = args.get(2).map(Value::as_display_string);
    let prices = &ctx.journal.prices;

    let value_one = |amount: &tally_core::Amount| -> Result<tally_core::Amount, ReportError> {
        match &target {
            Some(to) => prices
                .convert(amount, to, as_of)
                .ok_or_else(|| ReportError::UnknownCommodity(amount.commodity.to_string())),
            None => Ok(prices.value_of(amount, as_of).unwrap_or_else(|| amount.clone())),
        }
    };

    match value {
        Value::Amount(a) => Ok(Value::Amount(value_one(a)?)),
        Value::Balance(b) => {
            let mut out = tally_core::Balance::new();
            for a in b.iter() {
                out.add_amount(&value_one(a)?);
            }
            Ok(Value::Balance(out))
        }
        other => Ok(other.clone()),
    }
}

/// The annotation detail the lot options ask to keep.
pub fn keep_policy(options: &Options) -> AnnotationKeep {
    if options.is_set("lots") {
        AnnotationKeep::ALL
    } else {
        AnnotationKeep {
            price: options.is_set("lot_prices"),
            date: options.is_set("lot_dates"),
            tag: options.is_set("lot_tags"),
        }
    }
}

/// Strip lot annotations from the argument, honoring the lot options.
fn strip(args: &CallArgs, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    let keep = keep_policy(ctx.options);
    match args.required(0, "strip")? {
        Value::Amount(a) => Ok(Value::Amount(a.strip_annotations(keep))),
        Value::Balance(b) => {
            let mut out = tally_core::Balance::new();
            for a in b.iter() {
                out.add_amount(&a.strip_annotations(keep));
            }
            Ok(Value::Balance(out))
        }
        other => Ok(other.clone()),
    }
}

/// The bare numeric quantity of an amount, commodity dropped.
fn quantity(args: &CallArgs) -> Result<Value, ReportError> {
    let amount = args.required(0, "quantity")?.to_amount()?;
    Ok(Value::Amount(tally_core::Amount::new(amount.quantity(), "")))
}

/// Shorten an account path to fit a column width.
fn truncate(args: &CallArgs, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    let text = args.required(0, "truncate")?.as_display_string();
    let width = match args.get(1) {
        Some(v) => width_arg(v, "truncate")?,
        None => 0,
    };
    let abbrev = match args.get(2) {
        Some(v) => width_arg(v, "truncate")?,
        None => usize::try_from(ctx.options.num("abbrev_len").unwrap_or(2)).unwrap_or(2),
    };
    Ok(Value::String(truncate_path(&text, width, abbrev)))
}

fn width_arg(value: &Value, func: &str) -> Result<usize, ReportError> {
    use rust_decimal::prelude::ToPrimitive;
    let amount = value.to_amount()?;
    amount
        .number
        .to_usize()
        .ok_or_else(|| ReportError::BadExpression(format!("{func}: bad width")))
}

/// Shorten a colon-separated path to at most `width` characters.
///
/// Intermediate segments are abbreviated left to right before the tail is
/// elided with a leading `..`. Width zero means no limit.
pub fn truncate_path(text: &str, width: usize, abbrev: usize) -> String {
    if width == 0 || text.chars().count() <= width {
        return text.to_string();
    }

    let mut segments: Vec<String> = text.split(':').map(str::to_string).collect();
    let last = segments.len() - 1;
    for i in 0..last {
        if segments[i].chars().count() > abbrev {
            segments[i] = segments[i].chars().take(abbrev).collect();
        }
        let joined = segments.join(":");
        if joined.chars().count() <= width {
            return joined;
        }
    }

    let joined = segments.join(":");
    if joined.chars().count() <= width {
        return joined;
    }
    if width <= 2 {
        return "..".chars().take(width).collect();
    }
    let keep = width - 2;
    let tail: String = joined
        .chars()
        .skip(joined.chars().count() - keep)
        .collect();
    format!("..{tail}")
}

/// Quote a value for machine-readable output, escaping embedded quotes.
fn quoted(args: &CallArgs) -> Result<Value, ReportError> {
    let text = args.required(0, "quoted")?.as_display_string();
    Ok(Value::String(format!("\"{}\"", text.replace('"', "\\\""))))
}

/// Strip embedded newlines so the value fits on one output line.
fn join(args: &CallArgs) -> Result<Value, ReportError> {
    let text = args.required(0, "join")?.as_display_string();
    Ok(Value::String(text.replace('\n', "")))
}

/// Format a date value; an explicit format argument beats the date_format
/// option, which beats ISO.
fn format_date(args: &CallArgs, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    let date = args.required(0, "format_date")?.to_date()?;
    let format = match args.get(1) {
        Some(v) => v.as_display_string(),
        None => ctx
            .options
            .str_value("date_format")
            .unwrap_or("%Y-%m-%d")
            .to_string(),
    };
    Ok(Value::String(date.format(&format).to_string()))
}

/// Render the first argument for columnar output.
///
/// Arguments 1 and 2 give the first and latter line widths, argument 3
/// overrides the date format. Only argument 0 is printed; amounts are
/// annotation-stripped per the lot options first.
fn print(args: &CallArgs, ctx: &EvalContext<'_>) -> Result<Value, ReportError> {
    let value = args.required(0, "print")?;
    let first_width = match args.get(1) {
        Some(v) => width_arg(v, "print")?,
        None => 0,
    };
    let latter_width = match args.get(2) {
        Some(v) => width_arg(v, "print")?,
        None => first_width,
    };
    let keep = keep_policy(ctx.options);

    let pad = |text: String, width: usize| {
        if width > 0 {
            format!("{text:>width$}")
        } else {
            text
        }
    };

    let rendered = match value {
        Value::Date(d) => {
            let format = match args.get(3) {
                Some(v) => v.as_display_string(),
                None => ctx
                    .options
                    .str_value("date_format")
                    .unwrap_or("%Y-%m-%d")
                    .to_string(),
            };
            pad(d.format(&format).to_string(), first_width)
        }
        Value::Amount(a) => pad(a.strip_annotations(keep).to_string(), first_width),
        Value::Balance(b) => {
            let mut lines = Vec::with_capacity(b.len());
            for (i, a) in b.iter().enumerate() {
                let width = if i == 0 { first_width } else { latter_width };
                lines.push(pad(a.strip_annotations(keep).to_string(), width));
            }
            lines.join("\n")
        }
        other => pad(other.as_display_string(), first_width),
    };
    Ok(Value::String(rendered))
}

/// Render every set option as `name = value` lines, for diagnostics.
fn options_dump(ctx: &EvalContext<'_>) -> Value {
    let mut lines = Vec::new();
    for def in OPTION_TABLE {
        if !ctx.options.is_set(def.canonical) {
            continue;
        }
        let rendered = match def.kind {
            OptionKind::Bool => "true".to_string(),
            OptionKind::Num => ctx.options.num(def.canonical).unwrap_or(0).to_string(),
            OptionKind::Str | OptionKind::Expr => ctx
                .options
                .value(def.canonical)
                .map_or_else(String::new, |v| v.as_display_string()),
        };
        lines.push(format!("{} = {}", def.canonical, rendered));
    }
    Value::String(lines.join("\n"))
}
