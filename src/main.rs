use clap::Parser;

use spanner_gen::cli::Args;
use spanner_gen::config::Config;
use spanner_gen::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose);
    let config = Config::resolve(args.config.as_deref())?;
    let format = args.format.unwrap_or(config.format);
    let output = args.command.run(&config, format)?;
    println!("{}", output);
    Ok(())
}
