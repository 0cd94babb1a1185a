use clap::Parser;
use keedavault::cli::commands::list::ListFilter;
use keedavault::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    keedavault::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Init { ref kdf } => commands::init::execute(&cli, kdf),
        Commands::Add(ref args) => commands::add::execute(&cli, args),
        Commands::List {
            ref group,
            ref search,
            ref tag,
            favorites,
            expired,
        } => commands::list::execute(
            &cli,
            &ListFilter {
                group: group.as_deref(),
                search: search.as_deref(),
                tag: tag.as_deref(),
                favorites,
                expired,
            },
        ),
        Commands::Show { ref id, reveal } => commands::show::execute(&cli, id, reveal),
        Commands::Edit(ref args) => commands::edit::execute(&cli, args),
        Commands::Delete {
            ref id,
            force,
            trash,
        } => commands::delete::execute(&cli, id, force, trash),
        Commands::EmptyTrash { force } => commands::empty_trash::execute(&cli, force),
        Commands::Group { ref action } => commands::group::execute(&cli, action),
        Commands::Totp { ref id } => commands::totp::execute(&cli, id),
        Commands::Passwd { ref kdf } => commands::passwd::execute(&cli, kdf),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
