use clap::Parser;
use color_eyre::eyre::WrapErr;
use crossterm::{
    execute,
    terminal::{ enable_raw_mode, disable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
};
use iqm::{ api::StackExchangeClient, app::App, config::Cli, ui::run_app };
use std::{ io, panic, sync::Arc, time::Duration };
use tracing::{ error, info };
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tui::{ backend::CrosstermBackend, Terminal };

fn init_logging(cli: &Cli) -> color_eyre::Result<WorkerGuard> {
    let path = cli.log_path();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let file_name = path
        .file_name()
        .ok_or_else(|| color_eyre::eyre::eyre!("log path has no file name: {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(
        tracing_appender::rolling::never(dir, file_name)
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_|
        EnvFilter::new(cli.log_filter())
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(
        Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        })
    );
}

fn main() -> color_eyre::Result<()> {
    let cli = Cli::parse();
    color_eyre::install()?;
    let _guard = init_logging(&cli)?;
    setup_panic_hook();

    let config = cli.config();
    info!(?config, "starting");

    let runtime = tokio::runtime::Runtime::new().wrap_err("failed to start async runtime")?;
    let client = StackExchangeClient::new(&config).wrap_err("failed to build HTTP client")?;
    let app = App::new(
        Arc::new(client),
        runtime.handle().clone(),
        config.page_size,
        config.max_items
    );

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(200);
    let res = run_app(&mut terminal, app, tick_rate);

    restore_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "ui loop failed");
        eprintln!("{:?}", err);
    }

    Ok(())
}
