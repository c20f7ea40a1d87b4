use anyhow::{Context, Result};
use clap::Parser;

use devctl::cli::{Cli, Command};
use devctl::docker::{self, SystemRunner};
use devctl::report::Console;
use devctl::{CiOptions, Environment, config, logging};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let root = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve the current directory")?,
    };
    let config_path = cli
        .config
        .unwrap_or_else(|| config::default_path(&root));
    let config = config::load(&config_path)?;

    docker::ensure_available(&config.docker)?;

    let env = Environment {
        config,
        root,
        runner: SystemRunner,
        tty: docker::stdin_is_terminal(),
    };
    let mut console = Console::stdout();

    match cli.command {
        Command::Run { install, output } => {
            env.run(&mut console, install.install(), output.verbose())
        }
        Command::Attach { service, command } => {
            env.attach(&mut console, service.as_deref(), &command)
        }
        Command::Ci {
            output,
            install,
            teardown,
            report,
        } => env.ci(
            &mut console,
            CiOptions {
                verbose: output.verbose(),
                install: install.install(),
                teardown: teardown.teardown(),
                report: report.as_deref(),
            },
        ),
        Command::Shutdown { output } => env.shutdown(&mut console, output.verbose()),
    }
}
