//! User-facing console output.

pub mod console;

pub use console::{print_banner, print_error, print_info, print_success, print_warning};
