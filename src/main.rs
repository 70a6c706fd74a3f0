use log::{debug, info};
use simplelog::{Config as LogConfig, TermLogger, TerminalMode};
use std::fs::File;
use structopt::StructOpt;
use track_overlay::cli::Cli;
use track_overlay::config::{default_config_path, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Cli::from_args();

    // a missing config file is only an error if it was requested explicitly
    let (config, config_notice) = match opt.config_path() {
        Some(path) => (Config::load(&mut File::open(path)?)?, None),
        None => {
            let path = default_config_path();
            if path.exists() {
                (Config::load(&mut File::open(&path)?)?, None)
            } else {
                (
                    Config::default(),
                    Some(format!("No config file found at {:?}, using defaults", path)),
                )
            }
        }
    };

    let level_filter = opt.verbosity(config.log_level());
    TermLogger::init(level_filter, LogConfig::default(), TerminalMode::Mixed)?;
    if let Some(msg) = config_notice {
        info!("{}", msg);
    }
    debug!("Loaded configuration: {:?}", config);

    // execute any subcommands
    opt.execute_subcommand(config)
}
