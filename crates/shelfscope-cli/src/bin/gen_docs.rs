//! Binary that emits command-line options markdown to stdout.
//!
//! Redirect into `docs/command-line-options.md` to refresh the options reference.

fn main() {
    print!("{}", shelfscope_cli::render_options_markdown());
}
