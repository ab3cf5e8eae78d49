//! Command-line definition and parsed parameters.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("compiscript")
        .about("Compiscript compiler: semantic analysis, TAC and MIPS-32 emission")
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Compiscript source file (.cps)"),
        )
        .arg(
            Arg::new("ast_dump")
                .long("ast-dump")
                .action(ArgAction::SetTrue)
                .help("Write ast.txt (indented AST dump)"),
        )
        .arg(
            Arg::new("ast_dot")
                .long("ast-dot")
                .action(ArgAction::SetTrue)
                .help("Write ast.dot (Graphviz AST)"),
        )
        .arg(
            Arg::new("tac")
                .long("tac")
                .action(ArgAction::SetTrue)
                .help("Write tac.txt (three-address code)"),
        )
        .arg(
            Arg::new("mips")
                .long("mips")
                .action(ArgAction::SetTrue)
                .help("Write out.s (MIPS-32 assembly; implies TAC generation)"),
        )
}

pub struct Params {
    pub source: PathBuf,
    pub ast_dump: bool,
    pub ast_dot: bool,
    pub tac: bool,
    pub mips: bool,
}

impl Params {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            source: matches
                .get_one::<PathBuf>("source")
                .expect("required arg")
                .clone(),
            ast_dump: matches.get_flag("ast_dump"),
            ast_dot: matches.get_flag("ast_dot"),
            tac: matches.get_flag("tac"),
            mips: matches.get_flag("mips"),
        }
    }
}
