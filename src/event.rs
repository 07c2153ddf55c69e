use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const INPUT_POLL: Duration = Duration::from_millis(25);

#[derive(Clone, Debug)]
pub enum Event {
    /// Time to refresh the interface snapshot.
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
}

#[derive(Debug)]
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    _reader: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        // crossterm polling blocks, so it gets a blocking thread.
        let reader = tokio::task::spawn_blocking(move || {
            let mut next_tick = Instant::now() + tick;

            while !sender.is_closed() {
                if let Ok(true) = crossterm::event::poll(INPUT_POLL)
                    && let Ok(evt) = crossterm::event::read()
                {
                    let forwarded = match evt {
                        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                            Some(Event::Key(key))
                        }
                        CrosstermEvent::Resize(x, y) => Some(Event::Resize(x, y)),
                        _ => None,
                    };
                    if let Some(event) = forwarded {
                        let _ = sender.send(event);
                    }
                }

                let now = Instant::now();
                if now >= next_tick {
                    let _ = sender.send(Event::Tick);
                    next_tick = now + tick;
                }
            }
        });

        Self {
            receiver,
            _reader: reader,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| std::io::Error::other("event stream closed").into())
    }
}
