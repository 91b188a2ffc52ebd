use std::env;

use clap::{crate_description, crate_name, crate_version, App, AppSettings, Arg, SubCommand};
use wpress::{create, extract, list};

fn main() -> anyhow::Result<()> {
    if env::var_os("RUST_LOG").is_none() {
        // log level not explicitly set by the user
        env::set_var("RUST_LOG", "warn");
    }
    pretty_env_logger::init();

    let arg_archive = Arg::with_name("archive")
        .help("Archive file")
        .required(true)
        .value_name("ARCHIVE");

    let matches = App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("create")
                .about("Create archive")
                .arg(&arg_archive)
                .arg(
                    Arg::with_name("paths")
                        .help("Files and directories to add")
                        .multiple(true)
                        .value_name("PATH"),
                ),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("Extract archive")
                .arg(&arg_archive)
                .arg(
                    Arg::with_name("basedir")
                        .help("Directory to unpack to (defaults to '.')")
                        .required(true)
                        .value_name("DIR")
                        .default_value("."),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("List archive")
                .arg(&arg_archive),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("create") {
        let paths = matches.values_of("paths").into_iter().flatten();
        create(matches.value_of("archive").unwrap(), paths)?;
    } else if let Some(matches) = matches.subcommand_matches("extract") {
        extract(
            matches.value_of("archive").unwrap(),
            matches.value_of("basedir").unwrap(),
        )?;
    } else if let Some(matches) = matches.subcommand_matches("list") {
        for entry in list(matches.value_of("archive").unwrap())? {
            println!("{:>14} {:>12} {}", entry.size, entry.mtime, entry.path);
        }
    }
    Ok(())
}
