use colored::Colorize;
use portwho::{
    cli::Cli,
    commands::{CheckCommand, CheckOptions},
    system::NativeTools,
    utils::{init_tracing, Locale},
    Result,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let detected = Locale::detect();
    let cli = Cli::parse_args(Cli::lang_from_args(std::env::args()).unwrap_or(detected));
    init_tracing(cli.verbose)?;

    let locale = cli.locale(detected);
    let options = CheckOptions::from_cli(cli, locale);

    CheckCommand::execute(&NativeTools::new(), &options).await
}
