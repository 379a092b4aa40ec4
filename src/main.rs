use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use monkeysee::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{normalize_username, Config, ConfigStore, FileConfigStore},
    leaderboard::Leaderboard,
    logging,
    provider::{FallbackProvider, StaticProvider, TextProvider, WordListProvider},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::{Mode, TimeLimit},
};

/// timed typing test with a live wpm chart and a leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test in the terminal. Type through an endless stream of words, watch your speed per second on the results chart and compare runs on the leaderboard."
)]
pub struct Cli {
    /// text to type: random words or punctuated prose
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// test length in seconds: 15, 30, 60 or 120
    #[clap(short = 't', long)]
    time: Option<TimeLimit>,

    /// name to record results under
    #[clap(short = 'u', long)]
    username: Option<String>,

    /// custom prompt to use in both modes
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// write logs here instead of the state directory
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Stored settings with any flags given on the command line applied on top
    fn settings(&self, stored: Config) -> Config {
        Config {
            username: self
                .username
                .as_deref()
                .and_then(normalize_username)
                .or(stored.username),
            mode: self.mode.unwrap_or(stored.mode),
            time_limit: self.time.unwrap_or(stored.time_limit),
        }
    }

    fn provider(&self) -> Box<dyn TextProvider> {
        if let Some(prompt) = &self.prompt {
            return Box::new(StaticProvider::new(prompt.clone()));
        }

        match WordListProvider::english() {
            Ok(provider) => Box::new(provider),
            Err(err) => {
                warn!(error = %err, "word list unavailable, using built-in text");
                Box::new(FallbackProvider)
            }
        }
    }

    fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(AppDirs::log_path)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = logging::init(&cli.log_path())?;

    let store = FileConfigStore::new();
    let settings = cli.settings(store.load());
    info!(
        mode = %settings.mode,
        time_limit = settings.time_limit.secs(),
        custom_prompt = cli.prompt.is_some(),
        "starting"
    );

    let mut app = App::new(
        settings,
        cli.provider(),
        Box::new(SystemClock),
        Leaderboard::seeded().shared(),
        Box::new(store),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        // wake early when a session tick falls due before the next redraw
        let event = runner.step_within(app.controller.until_next_tick());
        if app.handle_event(event) == Flow::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use monkeysee::runtime::{AppEvent, TestEventSource};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["monkeysee"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.time, None);
        assert_eq!(cli.username, None);
        assert_eq!(cli.prompt, None);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "monkeysee",
            "-m",
            "competition",
            "-t",
            "60",
            "-u",
            "Neo",
            "-p",
            "follow the white rabbit",
            "--log-file",
            "/tmp/monkeysee.log",
        ]);

        assert_eq!(cli.mode, Some(Mode::Competition));
        assert_eq!(cli.time.map(TimeLimit::secs), Some(60));
        assert_eq!(cli.username.as_deref(), Some("Neo"));
        assert_eq!(cli.prompt.as_deref(), Some("follow the white rabbit"));
        assert_eq!(cli.log_path(), PathBuf::from("/tmp/monkeysee.log"));
    }

    #[test]
    fn test_cli_rejects_unsupported_time() {
        assert!(Cli::try_parse_from(["monkeysee", "--time", "45"]).is_err());
        assert!(Cli::try_parse_from(["monkeysee", "--mode", "zen"]).is_err());
    }

    #[test]
    fn test_flags_override_stored_settings() {
        let stored = Config {
            username: Some("kb_warrior".into()),
            mode: Mode::Casual,
            time_limit: TimeLimit::try_from(120).unwrap(),
        };

        let cli = Cli::parse_from(["monkeysee", "-m", "competition", "-u", "  Trinity "]);
        let settings = cli.settings(stored.clone());
        assert_eq!(settings.username.as_deref(), Some("trinity"));
        assert_eq!(settings.mode, Mode::Competition);
        assert_eq!(settings.time_limit.secs(), 120);

        let cli = Cli::parse_from(["monkeysee", "-u", "   "]);
        assert_eq!(cli.settings(stored.clone()), stored);
    }

    #[test]
    fn test_prompt_flag_uses_custom_text() {
        let cli = Cli::parse_from(["monkeysee", "-p", "Red pill, blue pill."]);
        let mut provider = cli.provider();

        assert_eq!(
            provider.generate_prompt(Mode::Competition).unwrap(),
            "Red pill, blue pill."
        );
    }

    #[test]
    fn test_default_provider_uses_word_list() {
        let cli = Cli::parse_from(["monkeysee"]);
        let mut provider = cli.provider();

        let text = provider.generate_prompt(Mode::Casual).unwrap();
        assert!(!text.trim().is_empty());
    }

    #[test]
    fn test_event_loop_draws_and_quits() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        use monkeysee::clock::ManualClock;

        struct NoopStore;
        impl ConfigStore for NoopStore {
            fn load(&self) -> Config {
                Config::default()
            }
            fn save(&self, _cfg: &Config) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut app = App::new(
            Config {
                username: Some("tester".into()),
                ..Config::default()
            },
            Box::new(StaticProvider::new("hello world")),
            Box::new(ManualClock::default()),
            Leaderboard::seeded().shared(),
            Box::new(NoopStore),
        );

        let (tx, rx) = mpsc::channel();
        for c in "hel".chars() {
            tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
                .unwrap();
        }
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
            .unwrap();

        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        loop {
            terminal
                .draw(|f| f.render_widget(&app, f.area()))
                .unwrap();
            let event = runner.step_within(app.controller.until_next_tick());
            if app.handle_event(event) == Flow::Quit {
                break;
            }
        }

        assert_eq!(app.controller.input().as_string(), "hel");
        assert!(app.controller.is_running());
    }
}
