use anyhow::Result;
use clap::{App, AppSettings, Arg, SubCommand};
use nanosite::build::build_site;
use nanosite::config::Config;
use nanosite::init::setup_site_interactive;
use nanosite::storage::FsStorage;
use std::path::Path;

fn build(config: &Config) -> Result<()> {
    build_site(config, &FsStorage::new())?;
    println!("Generated site.");
    Ok(())
}

fn init(config: &Config) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    setup_site_interactive(config, &mut stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

fn run() -> Result<()> {
    let matches = App::new("nanosite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static site from Markdown pages and posts")
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("directory")
                .short("C")
                .long("directory")
                .value_name("DIR")
                .help("The site's project directory [default: .]")
                .global(true),
        )
        .subcommand(SubCommand::with_name("init").about("Start a new site in this directory."))
        .subcommand(SubCommand::with_name("build").about("Build the site in this directory."))
        .get_matches();

    let (command, command_matches) = matches.subcommand();
    let directory = command_matches
        .and_then(|m| m.value_of("directory"))
        .or_else(|| matches.value_of("directory"))
        .unwrap_or(".");
    let config = Config::from_directory(Path::new(directory))?;
    match command {
        "init" => init(&config),
        "build" => build(&config),
        _ => match config.meta_file.is_file() {
            true => build(&config),
            false => init(&config),
        },
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("nanosite: {:#}", e);
        std::process::exit(1);
    }
}
