//! Keyboard input forwarded to the store as keypad actions.

use crate::keymap;
use crate::store::StoreTransport;
use crossterm::event::{
    self, Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};
use log::{debug, error, info};
use service_protos::ubo::v1::{action, Action, KeypadKeyPressAction};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Maps key identifiers to keypad actions and dispatches them
#[derive(Clone)]
pub struct InputDispatcher {
    transport: Arc<dyn StoreTransport>,
}

impl InputDispatcher {
    pub fn new(transport: Arc<dyn StoreTransport>) -> Self {
        Self { transport }
    }

    /// Forward one key event.
    ///
    /// Returns whether the key is bound. A failed dispatch is logged and not retried.
    pub async fn on_key(&self, identifier: &str) -> bool {
        let Some(key) = keymap::lookup(identifier) else {
            debug!("Ignoring unbound key {:?}", identifier);
            return false;
        };

        let action = Action {
            action: Some(action::Action::KeypadKeyPressAction(KeypadKeyPressAction {
                key: key as i32,
                time: now_seconds(),
            })),
        };

        match self.transport.dispatch_action(action).await {
            Ok(_) => debug!("⌨️  Dispatched {:?} for {:?}", key, identifier),
            Err(e) => error!("❌ Failed to dispatch {:?}: {}", key, e),
        }
        true
    }
}

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

/// What the terminal reader makes of a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Forward(String),
    Quit,
    Ignore,
}

/// Classify a terminal key event.
///
/// Keys are forwarded on `dispatch_on`: `Release` when the terminal reports
/// event types, `Press` otherwise. Quit keys act on press.
pub fn classify(key: &KeyEvent, dispatch_on: KeyEventKind) -> KeyInput {
    match key.code {
        KeyCode::Char('q') if key.kind == KeyEventKind::Press => KeyInput::Quit,
        KeyCode::Char('c')
            if key.kind == KeyEventKind::Press && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            KeyInput::Quit
        }
        _ if key.kind != dispatch_on => KeyInput::Ignore,
        code => keymap::identifier(code)
            .map(KeyInput::Forward)
            .unwrap_or(KeyInput::Ignore),
    }
}

/// Read keys from the terminal in raw mode and dispatch them until `q` or Ctrl+C.
///
/// The terminal is restored before returning, also when reading fails.
pub async fn run_terminal_input(dispatcher: InputDispatcher) -> std::io::Result<()> {
    enable_raw_mode()?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    let dispatch_on = if enhanced {
        execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
        KeyEventKind::Release
    } else {
        KeyEventKind::Press
    };
    info!("⌨️  Keyboard input active, keys sent on {:?} (q to quit)", dispatch_on);

    let (key_tx, mut key_rx) = unbounded_channel();
    spawn_key_reader(key_tx);

    while let Some(key) = key_rx.recv().await {
        match classify(&key, dispatch_on) {
            KeyInput::Forward(identifier) => {
                dispatcher.on_key(&identifier).await;
            }
            KeyInput::Quit => break,
            KeyInput::Ignore => {}
        }
    }

    if enhanced {
        execute!(std::io::stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    info!("⌨️  Keyboard input stopped");
    Ok(())
}

fn spawn_key_reader(key_tx: UnboundedSender<KeyEvent>) {
    tokio::task::spawn_blocking(move || loop {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(TerminalEvent::Key(key)) => {
                    if key_tx.send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("❌ Failed to read terminal event: {}", e);
                    break;
                }
            },
            Ok(false) => {
                if key_tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                error!("❌ Failed to poll terminal: {}", e);
                break;
            }
        }
    });
}
