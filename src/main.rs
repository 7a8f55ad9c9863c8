use clap::Parser;
use console::Term;
use std::io::Write;

use closure_runner::cli::Cli;
use closure_runner::compiler::{CompilerOptions, ProcessCompiler};
use closure_runner::config::RunConfig;
use closure_runner::runner;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}:\n{}", record.level(), record.args()))
        .filter_level(cli.verbose.log_level_filter())
        .target(env_logger::fmt::Target::Stderr)
        .init();

    let colorize = !cli.no_color && Term::stderr().is_term();
    std::process::exit(exit_code(cli, colorize));
}

fn exit_code(cli: Cli, colorize: bool) -> i32 {
    match RunConfig::from_args(cli.args).and_then(|config| {
        let mut compiler = ProcessCompiler::new(&cli.compiler, CompilerOptions::from(&config));
        runner::run(&config, &mut compiler, &mut std::io::stderr(), colorize)
    }) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            1
        }
    }
}
