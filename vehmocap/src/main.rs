use clap::Parser;
use miette::Result;
use vehmocap::Cli;

fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    log::debug!("vehmocap {}", vehmocap::VERSION);
    vehmocap::run(args)?;
    Ok(())
}
