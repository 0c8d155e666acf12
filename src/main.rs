use std::path::Path;
use std::process::ExitCode;

use TownesRS::SolitonBVP::TownesSolver::{SolitonError, TownesTask};
use TownesRS::SolitonBVP::soliton_bvp_utils::TownesConfig;
use log::error;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn run() -> Result<(), SolitonError> {
    let mut task = TownesTask::new(TownesConfig::default())?;
    task.solve()?;
    task.postprocessing()?;
    // the six scalars go to stdout first, files afterwards
    task.report()?;
    task.pretty_print_task()?;
    let out_dir = Path::new(".");
    task.save_to_csv(out_dir)?;
    task.plot(out_dir)?;
    Ok(())
}

pub fn main() -> ExitCode {
    // all diagnostics on stderr, stdout is reserved for the report
    let _ = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
