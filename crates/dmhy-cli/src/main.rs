use dmhy_cli::{cli, logging};

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        eprintln!("dmhy: failed to initialize logging: {:#}", err);
    }

    if let Err(err) = cli::run_from_args().await {
        eprintln!("dmhy error: {:#}", err);
        std::process::exit(1);
    }
}
