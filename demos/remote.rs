use argtree::{ArgGroup, Argument, Command, Validator};

fn main() {
    let parser = Command::new("remote-tool")
        .version("0.4.0")
        .about("Manage the remotes of a repository.")
        .add(
            Argument::flag("verbose")
                .short('v')
                .global(true)
                .help("Print more detail."),
        )
        .allow_subcommand_prefix(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("remote")
                .about("Add, remove and inspect remotes.")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Add a remote.")
                        .add(Argument::positional("name").help("The remote name."))
                        .add(Argument::positional("url").help("The remote url."))
                        .add(
                            Argument::option("port")
                                .short('p')
                                .validate(Validator::range(1u32, 65535))
                                .help("The port to connect on."),
                        )
                        .add(Argument::option("cluster"))
                        .add(Argument::option("user"))
                        .group(
                            ArgGroup::required_together("login").members(vec!["cluster", "user"]),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .visible_alias("rm")
                        .about("Remove a remote.")
                        .add(Argument::positional("name").help("The remote name.")),
                ),
        )
        .build()
        .expect("Invalid argument parser configuration");

    let matches = parser.parse();
    let verbose = matches.get_flag("verbose");

    match matches.subcommand() {
        Some(("remote", remote)) => match remote.subcommand() {
            Some(("add", add)) => {
                let name = add.value_of("name").unwrap_or_default();
                let url = add.value_of("url").unwrap_or_default();
                println!("Adding remote '{name}' at '{url}'.");

                if verbose || add.get_flag("verbose") {
                    let port: Option<u16> = add.get("port").unwrap_or_default();
                    println!("port: {port:?}");
                    println!("login: {:?}", add.value_of("user").zip(add.value_of("cluster")));
                }
            }
            Some(("remove", remove)) => {
                println!(
                    "Removing remote '{}'.",
                    remove.value_of("name").unwrap_or_default()
                );
            }
            _ => unreachable!("impossible - the subcommand is required."),
        },
        _ => unreachable!("impossible - the subcommand is required."),
    }
}
