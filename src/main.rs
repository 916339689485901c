use log::*;

mod carriage;
mod carriages;
mod command;
mod error;
mod report;
mod trains;
mod yard;

use command::{parse_command, ParseError, Scanner};
use report::OutputFormat;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "carriagesim", about = "Rail yard carriage simulator.")]
struct Opt {
    /// Read commands from this file instead of standard input
    #[structopt(name = "FILE")]
    #[structopt(parse(from_os_str))]
    file: Option<PathBuf>,

    /// Activate debug mode
    #[structopt(short, long)]
    verbose: bool,

    /// Output format: "text" reproduces the interactive reports,
    /// "json" writes one JSON object per command.
    #[structopt(long, default_value = "text")]
    format: OutputFormat,

    /// Do not print the banner or input prompts.
    #[structopt(long)]
    no_prompt: bool,

    /// Print timing of the session at exit.
    #[structopt(long)]
    profile: bool,
}

fn main() {
    let _h1 = hprof::enter("init");

    let opt = Opt::from_args();
    let level = if opt.verbose {
        if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    } else {
        LevelFilter::Error
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("Could not install logger: {}", e);
    }
    info!("{:#?}", opt);

    let input: Box<dyn BufRead> = match &opt.file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => {
                error!("Could not open {}: {}", path.display(), e);
                return;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };
    drop(_h1);

    if let Err(e) = run(&opt, input) {
        error!("Output failed: {}", e);
    }

    if opt.profile {
        hprof::end_frame();
        hprof::profiler().print_timing();
    }
}

fn run(opt: &Opt, input: Box<dyn BufRead>) -> io::Result<()> {
    let _h = hprof::enter("session");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut prompt: Box<dyn Write> = if opt.no_prompt {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };

    writeln!(prompt, "Welcome to Carriage Simulator")?;
    writeln!(prompt, "All aboard!")?;

    let mut scanner = Scanner::new(input);
    let mut yard = yard::Yard::new();
    loop {
        write!(prompt, "Enter command: ")?;
        prompt.flush()?;

        let command = match parse_command(&mut scanner, &mut prompt) {
            Ok(Some(command)) => command,
            Ok(None) | Err(ParseError::EndOfInput) => break,
            Err(ParseError::Io(e)) => return Err(e),
            Err(e) => {
                warn!("Rejected input: {}", e);
                out.write_all(report::render_parse_error(opt.format, &e).as_bytes())?;
                continue;
            }
        };

        let _c = hprof::enter(command.name());
        debug!("Executing {:?}", command);
        let result = yard.execute(command);
        if let Err(e) = &result {
            warn!("Command rejected: {}", e);
        }
        out.write_all(report::render(opt.format, &result).as_bytes())?;
        out.flush()?;
        trace!("{} trains in the yard", yard.trains().len());
    }

    let released = yard.close();
    info!("Session ended, released {} trains", released);
    writeln!(prompt, "\nGoodbye")?;
    Ok(())
}
