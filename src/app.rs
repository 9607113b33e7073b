use crate::actions::{dispatch, AppAction, Command};
use crate::effects::{spawn_command, ConsoleBackend};
use crate::state::AppState;
use crate::ui::{draw, events};
use color_eyre::Result;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SPINNER_TICK: Duration = Duration::from_millis(100);

pub struct App {
    state: AppState,
    backend: Arc<dyn ConsoleBackend>,
    tx: UnboundedSender<AppAction>,
    rx: UnboundedReceiver<AppAction>,
    spinner_index: usize,
    last_tick: Instant,
    clipboard: Option<arboard::Clipboard>,
}

impl App {
    pub fn new(state: AppState, backend: Arc<dyn ConsoleBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                warn!("clipboard unavailable: {}", e);
                None
            }
        };

        Self {
            state,
            backend,
            tx,
            rx,
            spinner_index: 0,
            last_tick: Instant::now(),
            clipboard,
        }
    }

    /// Run the terminal loop until the user quits or the login hand-off fires
    ///
    /// Returns the final state so the caller can print its exit message.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<AppState> {
        execute!(std::io::stdout(), EnableBracketedPaste)?;
        let result = self.event_loop(&mut terminal).await;
        if let Err(e) = execute!(std::io::stdout(), DisableBracketedPaste) {
            warn!("failed to disable bracketed paste: {}", e);
        }
        result.map(|()| self.state)
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.apply(AppAction::Start);

        while !self.state.should_quit {
            if self.last_tick.elapsed() > SPINNER_TICK {
                self.spinner_index = (self.spinner_index + 1) % draw::SPINNER.len();
                self.last_tick = Instant::now();
            }

            terminal.draw(|frame| draw::render_app(frame, &self.state, self.spinner_index))?;

            if event::poll(POLL_INTERVAL)? {
                let event = event::read()?;
                if let Some(action) = events::map_event(&self.state, event) {
                    self.apply(action);
                }
            }

            // Outcomes of background commands
            while let Ok(action) = self.rx.try_recv() {
                self.apply(action);
            }

            // Let spawned tasks make progress between frames
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn apply(&mut self, action: AppAction) {
        for command in dispatch(action, &mut self.state) {
            match command {
                Command::CopyToClipboard(text) => self.copy(text),
                command => spawn_command(Arc::clone(&self.backend), command, self.tx.clone()),
            }
        }
    }

    fn copy(&mut self, text: String) {
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match clipboard.set_text(text) {
            Ok(()) => debug!("copied to clipboard"),
            Err(e) => warn!("failed to copy to clipboard: {}", e),
        }
    }
}
