//! TUI module
//!
//! Terminal user interface for az9s: the configuration-driven navigation
//! engine plus the per-collection views layered on top of it. Built with
//! ratatui for a K9s-inspired experience.

mod app;
mod error;
mod key;
mod navigation;
mod node;
mod registry;
pub mod views;

pub use app::App;
pub use error::NavError;
pub use key::KeyTrigger;
pub use navigation::{APP_KIND, Dispatch, NavigationEngine, NavigationStack, StackEntry};
pub use node::{ActionOutcome, MountRequest, StatusUpdate, ViewNode};
pub use registry::{Action, ActionRegistry};

use crate::cache::ResourceCache;
use crate::config::Config;
use crate::provider::ResourceProvider;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Run the TUI application
pub async fn run_tui(
    config: Config,
    cache: Arc<ResourceCache>,
    provider: Arc<dyn ResourceProvider>,
) -> Result<()> {
    tracing::debug!("Initializing TUI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let registry = ActionRegistry::from_config(&config.views);
    let ctx = views::ViewContext {
        cache,
        provider,
        console_buffer: config.console.buffer,
    };
    let mut engine = NavigationEngine::new(registry);
    engine.mount_root(Box::new(views::SubscriptionListView::new(ctx)));
    let mut app = App::new(engine);

    tracing::debug!("TUI initialized, entering main loop");
    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
