use std::env;
use std::process::ExitCode;

use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use patternlog::{log_fmt, Level, LogStream, StreamFlags};

const DEMO_FORMAT: &str = "[%l] %H:%m:%s, %d/%M/%y (%P) <%c>: %L";

/// Diagnostics from the library go to stderr.
fn init_diagnostics() -> Result<(), Box<dyn std::error::Error>> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("patternlog {l}: {m}{n}")))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;

    log4rs::init_config(config)?;
    Ok(())
}

/// Usage: `patternlog [FORMAT] [MESSAGE...]`
fn main() -> ExitCode {
    if let Err(err) = init_diagnostics() {
        eprintln!("could not set up diagnostics: {err}");
    }

    let mut args = env::args().skip(1);
    let format = args.next().unwrap_or_else(|| DEMO_FORMAT.to_string());
    let message = args.collect::<Vec<_>>().join(" ");

    let stream = match LogStream::create(None, StreamFlags::COLOR) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = stream.set_format(&format) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let result = if message.is_empty() {
        log_fmt!(stream, Level::MESSAGE, "My test message")
            .and_then(|()| log_fmt!(stream, Level::WARNING, "{} levels are built in", 5))
    } else {
        stream.puts(&Level::MESSAGE, &message)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
