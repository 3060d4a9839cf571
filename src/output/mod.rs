mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::RunProgress;
pub use styling::{bright_red, dim, magenta_bold};
pub use summary::print_summary;

/// Prints the banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⏱  gha-timings"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitHub Actions timing export")
    );
}
