use argtree::{Action, Argument, Command, Nargs, ValueSource};

fn main() {
    let parser = Command::new("fileutil")
        .about("Copy files in parallel.")
        .env_prefix("FILEUTIL")
        .config_arg("config")
        .config_env("FILEUTIL_CONFIG")
        .default_config_file("fileutil.toml")
        .add(
            Argument::option("config")
                .short('c')
                .help("The config file to read."),
        )
        .add(
            Argument::option("threads")
                .short('j')
                .default_value("4")
                .help("How many files to copy at once."),
        )
        .add(
            Argument::option("level")
                .short('l')
                .action(Action::Count)
                .help("Increase the log level."),
        )
        .add(Argument::flag("dry-run").negatable(true))
        .add(
            Argument::positional("paths")
                .action(Action::Append)
                .arity(Nargs::AtLeastOne)
                .help("The files to copy, the destination last."),
        )
        .build()
        .expect("Invalid argument parser configuration");

    let matches = parser.parse();
    let threads: usize = matches
        .get("threads")
        .unwrap_or_default()
        .unwrap_or_default();
    let origin = match matches.source("threads") {
        Some(ValueSource::CommandLine) => "command line",
        Some(ValueSource::Environment) => "environment",
        Some(ValueSource::ConfigFile) => "config file",
        _ => "default",
    };

    println!("threads: {threads} (from {origin})");
    println!("log level: {}", matches.get_count("level"));
    println!("dry run: {}", matches.get_flag("dry-run"));
    println!("paths: {:?}", matches.values_of("paths").unwrap_or_default());
}
