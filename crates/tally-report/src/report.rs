//! The report object: one invocation surface over a session.
//!
//! A [`Report`] pairs a [`Session`] with an option registry and an output
//! buffer. Identifier lookup runs through the session first, then the
//! report's own resolution; [`Report::call`] dispatches whatever the name
//! turned out to be. Report text accumulates in [`Report::output`].

use std::fmt::Write;

use tracing::debug;

use crate::aggregate::sum_all_accounts;
use crate::chain::compose_posting_chain;
use crate::error::ReportError;
use crate::expr::{predicate_from_args, CallArgs, EvalContext, Subject};
use crate::filters::{AccountDisplayFilter, AccountSink};
use crate::fns;
use crate::options::{OptionKind, Options};
use crate::output::{FormatAccounts, FormatPostings, GatherStatistics, OutputStyle};
use crate::resolve::{resolve, Binding, Command, PreCommand};
use crate::session::Session;
use crate::walk::{walk_accounts, walk_accounts_sorted, walk_commodities, walk_journal};

/// One report invocation surface.
pub struct Report {
    /// The session this report runs under.
    pub session: Session,
    /// The option registry for this invocation.
    pub options: Options,
    /// Accumulated report text.
    pub output: String,
}

impl Report {
    /// Create a report over a session with default options.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            options: Options::new(),
            output: String::new(),
        }
    }

    /// Classify a name: the session first, then the resolver's fixed
    /// precedence of flags, functions, markers and option names.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.session
            .lookup(name)
            .or_else(|| resolve(name, &self.options))
    }

    /// Dispatch a command-line verb with `args`.
    ///
    /// Command verbs carry no marker on the command line; this tries the
    /// pre-command namespace first, then the command namespace, the same
    /// order a one-shot invocation resolves its verb in.
    pub fn run(&mut self, verb: &str, args: &CallArgs) -> Result<(), ReportError> {
        if let Some(Binding::PreCommand(pre)) = self.lookup(&format!("precmd_{verb}")) {
            return self.run_precommand(pre, args);
        }
        if let Some(Binding::Command(command)) = self.lookup(&format!("cmd_{verb}")) {
            return self.run_command(command, args);
        }
        Err(ReportError::UndefinedIdentifier(verb.to_string()))
    }

    /// Look up `name` and dispatch it with `args`.
    pub fn call(&mut self, name: &str, args: &CallArgs) -> Result<(), ReportError> {
        match self.lookup(name) {
            Some(Binding::Command(command)) => self.run_command(command, args),
            Some(Binding::PreCommand(pre)) => self.run_precommand(pre, args),
            Some(Binding::Option(option)) => self.apply_option(option, args),
            Some(Binding::Function(func)) => {
                let value = {
                    let ctx = EvalContext {
                        journal: &self.session.journal,
                        options: &self.options,
                        subject: Subject::None,
                        now: self.session.today,
                    };
                    fns::call(func, args, &ctx)?
                };
                writeln!(self.output, "{}", value.as_display_string())?;
                Ok(())
            }
            None => Err(ReportError::UndefinedIdentifier(name.to_string())),
        }
    }

    fn apply_option(&mut self, option: &'static str, args: &CallArgs) -> Result<(), ReportError> {
        match self.options.kind(option) {
            Some(OptionKind::Bool) => self.options.set_on(option),
            Some(_) => {
                let value = args.required(0, option)?.as_display_string();
                self.options.set(option, &value)
            }
            None => Err(ReportError::UndefinedIdentifier(option.to_string())),
        }
    }

    /// Turn command arguments into the selection predicate, replacing any
    /// previously installed one.
    fn apply_query(&mut self, args: &CallArgs) -> Result<(), ReportError> {
        if args.is_empty() {
            return Ok(());
        }
        let predicate = predicate_from_args(args)?;
        let source = predicate.to_string();
        debug!(predicate = %source, "selection predicate from arguments");
        self.options.set_expr("limit", predicate, &source)
    }

    /// Run a report command.
    pub fn run_command(&mut self, command: Command, args: &CallArgs) -> Result<(), ReportError> {
        if command != Command::Reload {
            self.apply_query(args)?;
        }
        match command {
            Command::Balance => self.accounts_report(),
            Command::Register => self.postings_report(OutputStyle::Register),
            Command::Print => self.postings_report(OutputStyle::Print),
            Command::Csv => self.postings_report(OutputStyle::Csv),
            Command::Prices => self.postings_report(OutputStyle::Prices),
            Command::PricesDb => self.postings_report(OutputStyle::PricesDb),
            Command::Equity => self.equity_report(),
            Command::Stats => self.stats_report(),
            Command::Reload => {
                self.session.reload();
                Ok(())
            }
        }
    }

    fn postings_report(&mut self, style: OutputStyle) -> Result<(), ReportError> {
        let Self {
            session,
            options,
            output,
        } = self;
        let journal = &session.journal;
        let terminal = FormatPostings::new(journal, options, session.today, style, output);
        let mut chain =
            compose_posting_chain(journal, options, session.today, Box::new(terminal), false);
        match style {
            OutputStyle::Prices | OutputStyle::PricesDb => {
                walk_commodities(journal, &mut |view| chain.item(view))?;
            }
            _ => walk_journal(journal, &mut |view| chain.item(view))?,
        }
        chain.flush()
    }

    fn accounts_report(&mut self) -> Result<(), ReportError> {
        {
            let Self {
                session,
                options,
                output,
            } = self;
            sum_all_accounts(&mut session.journal, options, session.today)?;
            let journal = &session.journal;
            let now = session.today;

            let format = FormatAccounts::new(journal, options, output);
            if let Some(display) = options.expr("display") {
                let mut sink =
                    AccountDisplayFilter::new(display.clone(), journal, options, now, format);
                drive_accounts(journal, options, now, &mut sink)?;
                sink.flush()?;
            } else {
                let mut sink = format;
                drive_accounts(journal, options, now, &mut sink)?;
                sink.flush()?;
            }
        }
        self.session.clean_accounts();
        Ok(())
    }

    fn equity_report(&mut self) -> Result<(), ReportError> {
        {
            let Self {
                session,
                options,
                output,
            } = self;
            sum_all_accounts(&mut session.journal, options, session.today)?;
            let journal = &session.journal;

            writeln!(output, "{} Opening Balances", session.today)?;
            walk_accounts(&journal.accounts, &mut |id| {
                let account = journal.accounts.get(id);
                for amount in account.self_total.iter() {
                    if !amount.is_zero() {
                        writeln!(output, "    {:<34} {}", account.full_name.to_string(), amount)?;
                    }
                }
                Ok(())
            })?;
            writeln!(output, "    Equity:Opening Balances")?;
        }
        self.session.clean_accounts();
        Ok(())
    }

    fn stats_report(&mut self) -> Result<(), ReportError> {
        let Self {
            session,
            options,
            output,
        } = self;
        let journal = &session.journal;
        let terminal = GatherStatistics::new(output);
        let mut chain =
            compose_posting_chain(journal, options, session.today, Box::new(terminal), false);
        walk_journal(journal, &mut |view| chain.item(view))?;
        chain.flush()
    }

    /// Run a diagnostic pre-command.
    pub fn run_precommand(&mut self, pre: PreCommand, args: &CallArgs) -> Result<(), ReportError> {
        match pre {
            PreCommand::Args => {
                let predicate = predicate_from_args(args)?;
                writeln!(self.output, "{predicate}")?;
            }
            PreCommand::Eval => {
                for value in args.iter() {
                    writeln!(self.output, "{}", value.as_display_string())?;
                }
            }
            PreCommand::Parse => {
                let rendered: Vec<String> =
                    args.iter().map(tally_core::Value::as_display_string).collect();
                writeln!(self.output, "{}", rendered.join(" "))?;
            }
            PreCommand::Format => {
                let template = self.options.str_value("format").unwrap_or("<default>");
                writeln!(self.output, "{template}")?;
            }
            PreCommand::Period => {
                let period = self.options.str_value("period").unwrap_or("<none>");
                writeln!(self.output, "{period}")?;
            }
            PreCommand::Template => {
                let template = self
                    .options
                    .str_value("register_format")
                    .unwrap_or("<default>");
                writeln!(self.output, "{template}")?;
            }
        }
        Ok(())
    }
}

fn drive_accounts(
    journal: &tally_core::Journal,
    options: &Options,
    now: chrono::NaiveDate,
    sink: &mut dyn AccountSink,
) -> Result<(), ReportError> {
    if let Some(key) = options.expr("sort") {
        let key = key.clone();
        walk_accounts_sorted(
            &journal.accounts,
            &mut |id| {
                let ctx = EvalContext {
                    journal,
                    options,
                    subject: Subject::Account(id),
                    now,
                };
                key.eval(&ctx)
            },
            options.is_set("flat"),
            &mut |id| sink.account(id),
        )
    } else {
        walk_accounts(&journal.accounts, &mut |id| sink.account(id))
    }
}
