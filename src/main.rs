use clap::Parser;
use lint_svn::{Cli, Output};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match Cli::parse().run().await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Output::default().error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}
