use clap::Parser;
use colored::*;
use netstab::*;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let progress = report::console_progress();

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(
            report::ProgressLogWriter::new(progress.clone()),
        )))
        .init();

    let sink = utils::log_sink();

    println!(
        "{} {}",
        "Starting network stability tests for domain:".bold(),
        cli.domain
    );
    println!("{}", "=".repeat(50).blue());

    let diagnostics = runner::Diagnostics::new(runner::SystemProber::new(sink.clone()), sink);
    let mut reporter = report::ConsoleReporter::new(progress);
    let summary = diagnostics
        .run(&cli.domain, &cli.domain_controllers, &mut reporter)
        .await;

    println!();
    print!("{}", report::render_summary(&summary));
    println!("{}", "Network stability tests completed.".green().bold());
}
