use commands::command_argument_builder;
use deadlink::handlers::handle_scan;
use deadlink_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let code = match chosen_command.subcommand() {
        Some(("scan", primary_command)) => handle_scan(primary_command, quiet).await,
        // No subcommand provided, just show the banner
        None => return,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    std::process::exit(code);
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
