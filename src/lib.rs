// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod buffer;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod language;
pub mod leaderboard;
pub mod logging;
pub mod provider;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod ui;
pub mod util;

pub use app::{App, Flow, View};
pub use controller::SessionController;
