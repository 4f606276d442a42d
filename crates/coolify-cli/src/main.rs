//! Entrypoint for the `coolify` binary.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = coolify_cli::run().await;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
