#![forbid(unsafe_code)]

//! filekeeper — retention sweep CLI entry point.

use filekeeper::core::context::RunContext;

mod cli_app;

fn main() {
    let ctx = match RunContext::detect() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("filekeeper: {e}");
            std::process::exit(2);
        }
    };
    let cli = cli_app::parse(&ctx);
    if let Err(e) = cli_app::run(&cli, &ctx) {
        eprintln!("filekeeper: {e}");
        std::process::exit(e.exit_code());
    }
}
