pub mod logging;

pub use logging::{append_log_line, init_log_file, log_startup, print_session_stats, truncate_text};
