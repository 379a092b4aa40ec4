//! Key handling and view switching on top of the session controller.
//!
//! The app owns no timing of its own: every event it receives is followed by
//! a poll of the controller's tick schedule, so ticks are never starved by a
//! burst of keystrokes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::{normalize_username, Config, ConfigStore, MAX_USERNAME_LEN};
use crate::controller::SessionController;
use crate::leaderboard::SharedLeaderboard;
use crate::provider::TextProvider;
use crate::runtime::AppEvent;

pub type Controller = SessionController<Box<dyn TextProvider>, Box<dyn Clock>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Asking for a username before the first test
    Login,
    /// Typing test, and its results once finished
    Test,
    Leaderboard,
}

/// What the event loop should do after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub controller: Controller,
    pub view: View,
    pub username_draft: String,
    settings: Config,
    store: Box<dyn ConfigStore>,
}

impl App {
    pub fn new(
        settings: Config,
        provider: Box<dyn TextProvider>,
        clock: Box<dyn Clock>,
        leaderboard: SharedLeaderboard,
        store: Box<dyn ConfigStore>,
    ) -> Self {
        let username = settings.username.clone();
        let controller = SessionController::new(
            settings.session(),
            username.clone().unwrap_or_default(),
            provider,
            clock,
            leaderboard,
        );

        Self {
            controller,
            view: if username.is_some() {
                View::Test
            } else {
                View::Login
            },
            username_draft: String::new(),
            settings,
            store,
        }
    }

    pub fn settings(&self) -> &Config {
        &self.settings
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        let flow = match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize | AppEvent::Wake => Flow::Continue,
        };
        self.controller.poll_clock();
        flow
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.view {
            View::Login => self.login_key(key),
            View::Leaderboard => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('b') => self.view = View::Test,
                    KeyCode::Tab => self.restart(),
                    KeyCode::Char('r') if ctrl => self.restart(),
                    _ => {}
                }
                Flow::Continue
            }
            View::Test => self.test_key(key, ctrl),
        }
    }

    fn login_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Enter => self.submit_username(),
            KeyCode::Backspace => {
                self.username_draft.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.username_draft.chars().count() < MAX_USERNAME_LEN {
                    self.username_draft.push(c);
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn submit_username(&mut self) {
        let Some(name) = normalize_username(&self.username_draft) else {
            return;
        };

        debug!(username = %name, "username set");
        self.controller.set_username(name.clone());
        self.settings.username = Some(name);
        self.username_draft.clear();
        self.view = View::Test;
        self.persist();
    }

    fn test_key(&mut self, key: KeyEvent, ctrl: bool) -> Flow {
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Tab => self.restart(),
            KeyCode::Char('r') if ctrl => self.restart(),
            KeyCode::Char('l') if ctrl => self.open_leaderboard(),
            KeyCode::Char('n') if self.controller.is_finished() => {
                self.controller.load_new_test()
            }
            KeyCode::Char('l') if self.controller.is_finished() => {
                self.view = View::Leaderboard
            }
            KeyCode::Up | KeyCode::Down => {
                let mode = self.controller.config().mode.toggled();
                if self.controller.change_mode(mode) {
                    self.persist();
                }
            }
            KeyCode::Left | KeyCode::Right => {
                let current = self.controller.config().time_limit;
                let limit = if key.code == KeyCode::Left {
                    current.prev()
                } else {
                    current.next()
                };
                if self.controller.change_time(limit) {
                    self.persist();
                }
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.controller.push_char(c);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn restart(&mut self) {
        self.controller.restart();
        self.view = View::Test;
    }

    /// Leaving a running test abandons it, so no tick fires off-screen
    fn open_leaderboard(&mut self) {
        if self.controller.is_running() {
            self.controller.restart();
        }
        self.view = View::Leaderboard;
    }

    fn persist(&mut self) {
        self.settings = self.settings.clone().with_session(self.controller.config());
        if let Err(err) = self.store.save(&self.settings) {
            warn!(error = %err, "could not save settings");
        }
    }
}
