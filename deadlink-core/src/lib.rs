pub mod crawl;
pub mod report;

use colored::Colorize;

const BANNER: &str = r#"
     _                _ _ _       _
  __| | ___  __ _  __| | (_)_ __ | | __
 / _` |/ _ \/ _` |/ _` | | | '_ \| |/ /
| (_| |  __/ (_| | (_| | | | | | |   <
 \__,_|\___|\__,_|\__,_|_|_|_| |_|_|\_\
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_red().bold());
    println!(
        "  {} {}\n",
        "broken link checker".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
