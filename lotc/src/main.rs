use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use lotree::decorate::{decorate_json, Context, WallKind};
use lotree::error::{ErrorKind, Result};
use lotree::lo::CompileOptions;
use lotree::value::{Sink, Source};

use crate::config::Config;

mod config;
mod flags;

pub const CONFIG_FILE: &str = "lotc.toml";
pub const DEFAULT_OUTPUT: &str = "json/tutors.json";

pub fn main() -> ExitCode {
    let flags = flags::Lotc::from_env_or_exit();
    init_logging(flags.verbose);

    let result = match flags.subcommand {
        flags::LotcCmd::Compile(cmd) => compile(cmd),
        flags::LotcCmd::Inspect(cmd) => inspect(cmd),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code(e.kind()))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("LOTC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NotFound => 2,
        ErrorKind::Malformed => 3,
        ErrorKind::Io => 4,
        ErrorKind::Internal => 1,
    }
}

fn output_path(cmd: &flags::Compile, config: &Config) -> PathBuf {
    match (&cmd.output, &config.output) {
        (Some(output), _) => output.clone(),
        (None, Some(output)) => cmd.dir.join(output),
        (None, None) => cmd.dir.join(DEFAULT_OUTPUT),
    }
}

fn compile(cmd: flags::Compile) -> Result<()> {
    let config = Config::discover(&cmd.dir)?;
    let mut options = CompileOptions::default();
    options.scan.skip.extend(config.skip.iter().cloned());
    options.build.render_html = cmd.html || config.html;

    let course = lotree::compile(&cmd.dir, &options)?;
    let output = output_path(&cmd, &config);
    output.as_path().write(course.to_json()?)?;

    tracing::info!(output = %output.display(), "wrote compiled course");
    Ok(())
}

fn inspect(cmd: flags::Inspect) -> Result<()> {
    let config = Config::discover_for(&cmd.json)?;
    let json = cmd.json.as_path().read()?;

    let mut ctxt = Context::new(cmd.course_id);
    if let Some(url) = cmd.course_url.or(config.course_url) {
        ctxt = ctxt.with_course_url(url);
    }

    let course = decorate_json(&json, &ctxt)?;
    print!("{}", course.visualize());

    println!();
    for kind in WallKind::ALL {
        match course.walls.get(&kind) {
            Some(entries) => println!("{kind} wall: {}", entries.len()),
            None => println!("{kind} wall: absent"),
        }
    }

    println!("\n{:#?}", course.flags);
    if let Some(week) = &course.current_week {
        println!("current week: {} ({})", week.title, week.date);
    }

    Ok(())
}
