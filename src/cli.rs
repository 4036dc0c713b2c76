//! The command-line interface for `tinyc`.
//!
//! Usage (as with any other [`argh`] interface) involves first invoking [`argh::from_env()`], and
//! then processing the resulting data (in this case an instance of [`Cli`]).

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Context;
use argh::FromArgs;
use tracing::debug;

use tinyc::ast::Block;

/// A parser for a small imperative language.
#[derive(Debug, Clone, PartialEq, Eq, FromArgs)]
pub struct Cli {
    /// the subcommand to run
    #[argh(subcommand)]
    cmd: CliSubCommand,
}

impl Cli {
    /// Consumes `self` and processes the given subcommand.
    pub fn handle(self) -> anyhow::Result<()> {
        match self.cmd {
            CliSubCommand::Parse(args) => args.run(),
            CliSubCommand::Check(args) => args.run(),
        }
    }
}

/// The set of the distinct subcommands available to be passed to the [`Cli`].
#[derive(Debug, Clone, PartialEq, Eq, FromArgs)]
#[argh(subcommand)]
enum CliSubCommand {
    /// See [`Parse`].
    Parse(Parse),
    /// See [`Check`].
    Check(Check),
}

/// Parses a program and prints its syntax tree as an s-expression.
#[derive(Debug, Clone, PartialEq, Eq, FromArgs)]
#[argh(subcommand, name = "parse")]
struct Parse {
    /// print the full Rust debug representation of the tree instead
    #[argh(switch)]
    debug: bool,

    /// a path to a source file, or - (the default) for stdin
    #[argh(positional)]
    file: Option<PathBuf>,
}

impl Parse {
    /// Consumes `self`, parsing and printing the given program.
    fn run(self) -> anyhow::Result<()> {
        let program = load(self.file.as_deref())?;

        match self.debug {
            true => println!("{program:#?}"),
            false => println!("{program}"),
        }
        Ok(())
    }
}

/// Checks that a program parses, printing `ok` if it does.
#[derive(Debug, Clone, PartialEq, Eq, FromArgs)]
#[argh(subcommand, name = "check")]
struct Check {
    /// a path to a source file, or - (the default) for stdin
    #[argh(positional)]
    file: Option<PathBuf>,
}

impl Check {
    /// Consumes `self` and checks the given program.
    fn run(self) -> anyhow::Result<()> {
        let program = load(self.file.as_deref())?;
        debug!(statements = program.len(), "program is well-formed");
        println!("ok");
        Ok(())
    }
}

/// Reads and parses the program at `file`, reading stdin when `file` is absent or `-`.
///
/// A parse error is reported on stderr with the offending line quoted before it is
/// returned.
fn load(file: Option<&Path>) -> anyhow::Result<Block> {
    let (name, source) = match file {
        Some(path) if path != Path::new("-") => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            (path.display().to_string(), source)
        }
        _ => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("could not read stdin")?;
            (String::from("<stdin>"), source)
        }
    };

    match tinyc::parse(&source) {
        Ok(program) => Ok(program),
        Err(error) => {
            eprintln!("{}", error.render(&source));
            anyhow::bail!("could not parse {name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Result<Cli, argh::EarlyExit> {
        Cli::from_args(&["tinyc"], args)
    }

    #[test]
    fn check_parse_arguments() {
        assert_eq!(
            cli(&["parse", "--debug", "main.tc"]).unwrap(),
            Cli {
                cmd: CliSubCommand::Parse(Parse {
                    debug: true,
                    file: Some(PathBuf::from("main.tc")),
                })
            }
        );

        assert_eq!(
            cli(&["parse"]).unwrap(),
            Cli {
                cmd: CliSubCommand::Parse(Parse {
                    debug: false,
                    file: None,
                })
            }
        );
    }

    #[test]
    fn check_check_arguments() {
        assert_eq!(
            cli(&["check", "-"]).unwrap(),
            Cli {
                cmd: CliSubCommand::Check(Check {
                    file: Some(PathBuf::from("-")),
                })
            }
        );

        assert!(cli(&["check", "a.tc", "b.tc"]).is_err());
        assert!(cli(&["run", "a.tc"]).is_err());
    }
}
