// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_config, exit_code_for, load_urls_from_file, load_urls_from_source, parse_url_line,
    run_scans, write_report,
};

// Re-export scan functionality from deadlink-core
pub use deadlink_core::crawl::{ScanOptions, ScanReport, execute_scan, execute_scans};
