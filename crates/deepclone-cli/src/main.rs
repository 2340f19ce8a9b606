use deepclone_cli::{cli, run, wants_json_logs};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,deepclone=debug"));
    let registry = tracing_subscriber::registry().with(filter);
    if wants_json_logs(&matches) {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    let output = run(&matches).await?;
    print!("{output}");
    Ok(())
}
