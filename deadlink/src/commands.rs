use crate::CLAP_STYLING;
use clap::{ArgGroup, arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("deadlink")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("deadlink")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Crawl a site (or a list of sites) and check every link found for \
                broken, redirected and unreachable targets.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The root URL of the site to scan")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of site URLs to scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .group(
                    ArgGroup::new("target")
                        .args(["url", "hosts-file"])
                        .required(true)
                        .multiple(false),
                )
                .arg(
                    arg!(-p --"max-pages" <NUM>)
                        .required(false)
                        .help("Maximum number of pages to crawl per site")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("20"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for each page fetch and link probe, in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"delay" <MILLIS>)
                        .required(false)
                        .help("Pause between page fetches, in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("300"),
                )
                .arg(
                    arg!(--"probe-delay" <MILLIS>)
                        .required(false)
                        .help("Pause after each link probe, in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("200"),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM>)
                        .required(false)
                        .help("Number of link probes allowed in flight at once")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("1"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: print to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"include-ok")
                        .required(false)
                        .help("List healthy links in text and markdown reports as well")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
