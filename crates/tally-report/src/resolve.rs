//! Identifier resolution.
//!
//! Every name arriving from an expression or the command line is classified
//! into exactly one [`Binding`] through a fixed precedence: single-character
//! option flags, built-in function names, the `cmd_` command marker, the
//! `precmd_` pre-command marker, the `opt_` option marker, and finally a
//! bare-name option lookup. The session gets first refusal before any of
//! these (see `Session::lookup`). The recognized name set, alias pairs,
//! flag characters and marker prefixes are a fixed compatibility contract.

use crate::fns;
use crate::options::Options;

/// A report-producing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Aggregated account totals.
    Balance,
    /// One line per posting with a running total.
    Register,
    /// Entries re-printed in journal syntax.
    Print,
    /// Comma-separated posting records.
    Csv,
    /// Account totals as an opening-balances entry.
    Equity,
    /// Known price quotes per commodity.
    Prices,
    /// Price quotes as journal directives.
    PricesDb,
    /// Journal statistics.
    Stats,
    /// Discard the journal for re-population.
    Reload,
}

/// A diagnostic pre-command, run instead of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreCommand {
    /// Show the selection predicate the arguments imply.
    Args,
    /// Show each argument's evaluated form.
    Eval,
    /// Show the active format template.
    Format,
    /// Echo the arguments as parsed.
    Parse,
    /// Show the active period setting.
    Period,
    /// Show the register format template.
    Template,
}

/// What a looked-up identifier turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A report command.
    Command(Command),
    /// A diagnostic pre-command.
    PreCommand(PreCommand),
    /// An option, by canonical name.
    Option(&'static str),
    /// A built-in function, by name.
    Function(&'static str),
}

fn command(suffix: &str) -> Option<Command> {
    Some(match suffix {
        "b" | "bal" | "balance" => Command::Balance,
        "r" | "reg" | "register" => Command::Register,
        "p" | "print" => Command::Print,
        "csv" => Command::Csv,
        "equity" => Command::Equity,
        "prices" => Command::Prices,
        "pricesdb" => Command::PricesDb,
        "stat" | "stats" => Command::Stats,
        "reload" => Command::Reload,
        _ => return None,
    })
}

fn precommand(suffix: &str) -> Option<PreCommand> {
    Some(match suffix {
        "args" => PreCommand::Args,
        "eval" => PreCommand::Eval,
        "format" => PreCommand::Format,
        "parse" => PreCommand::Parse,
        "period" => PreCommand::Period,
        "template" => PreCommand::Template,
        _ => return None,
    })
}

fn builtin(name: &str) -> Option<&'static str> {
    fns::BUILTIN_FNS.iter().copied().find(|&f| f == name)
}

/// Classify `name`, or `None` when nothing recognizes it.
pub fn resolve(name: &str, options: &Options) -> Option<Binding> {
    let mut chars = name.chars();
    if let (Some(flag), None) = (chars.next(), chars.next()) {
        if let Some(canonical) = options.canonical_by_flag(flag) {
            return Some(Binding::Option(canonical));
        }
    }
    if let Some(func) = builtin(name) {
        return Some(Binding::Function(func));
    }
    if let Some(suffix) = name.strip_prefix("cmd_") {
        return command(suffix).map(Binding::Command);
    }
    if let Some(suffix) = name.strip_prefix("precmd_") {
        return precommand(suffix).map(Binding::PreCommand);
    }
    if let Some(suffix) = name.strip_prefix("opt_") {
        return options.canonical(suffix).map(Binding::Option);
    }
    options.canonical(name).map(Binding::Option)
}
