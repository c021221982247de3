//! Thin entrypoint for the `nbx` binary.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = nbx_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
