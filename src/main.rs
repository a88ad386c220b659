use anyhow::Result;
use cli::{Command, Options};
use tracing_subscriber::EnvFilter;

mod cli;
mod cmd;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()>
{
    setup_tracing();

    let options = Options::parse();

    match &options.command {
        Command::Ping(ping_options) =>
            cmd::ping::main(&options, ping_options).await,
        Command::Setkey(setkey_options) =>
            cmd::setkey::main(&options, setkey_options),
    }
}

fn setup_tracing()
{
    let default_filter_str =
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "warn"
        };
    let format = tracing_subscriber::fmt::format()
        .with_target(false);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter_str));
    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .event_format(format)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
