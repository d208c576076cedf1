use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::action::Action;

/// The loop drains at most one forwarded event at a time. Anything read while
/// that slot is taken is folded into a single pending event by [`coalesce`].
const INPUT_CAPACITY: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize,
}

impl Event {
    pub fn is_quit(&self) -> bool {
        matches!(self, Event::Key(key) if Action::from_key(*key) == Action::Quit)
    }
}

/// Something the refresh loop can wait on. `None` ends the loop.
pub trait EventSource {
    fn next(&mut self) -> impl Future<Output = Option<Event>>;
}

/// Merges the refresh timer with keystrokes forwarded by a background reader.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    tick: Interval,
    input_open: bool,
    _task: Option<JoinHandle<()>>,
}

impl EventHandler {
    /// Reads the terminal on a background task.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<Event>(INPUT_CAPACITY);
        let task = tokio::spawn(forward_input(EventStream::new(), tx));
        Self {
            _task: Some(task),
            ..Self::with_input(tick_rate, rx)
        }
    }

    /// Takes input from `rx` instead of the terminal. Once every sender is
    /// gone the handler keeps producing ticks.
    pub fn with_input(tick_rate: Duration, rx: mpsc::Receiver<Event>) -> Self {
        let mut tick = tokio::time::interval(tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The caller has just drawn a fresh frame; skip the immediate tick.
        tick.reset();

        Self {
            rx,
            tick,
            input_open: true,
            _task: None,
        }
    }
}

impl EventSource for EventHandler {
    async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                _ = self.tick.tick() => return Some(Event::Tick),
                maybe_event = self.rx.recv(), if self.input_open => match maybe_event {
                    Some(event) => return Some(event),
                    None => {
                        tracing::warn!("input reader stopped; refreshing on timer only");
                        self.input_open = false;
                    }
                },
            }
        }
    }
}

/// Folds a newly read event into the one still waiting for the loop.
///
/// The newest event wins, except that a pending quit is never displaced by
/// anything but another quit.
pub fn coalesce(pending: Option<Event>, incoming: Event) -> Event {
    match pending {
        Some(pending) if pending.is_quit() && !incoming.is_quit() => pending,
        _ => incoming,
    }
}

fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) => Some(Event::Key(key)),
        CrosstermEvent::Resize(_, _) => Some(Event::Resize),
        _ => None,
    }
}

/// Reads terminal events until the stream fails or the loop goes away.
///
/// Input is drained ahead of sending, so a burst collapses into one pending
/// event before it reaches the channel.
async fn forward_input<S>(input: S, tx: mpsc::Sender<Event>)
where
    S: Stream<Item = io::Result<CrosstermEvent>>,
{
    let mut input = std::pin::pin!(input);
    let mut pending: Option<Event> = None;

    loop {
        tokio::select! {
            biased;
            next = input.next() => match next {
                Some(Ok(raw)) => {
                    let Some(event) = translate(raw) else {
                        continue;
                    };
                    if pending.is_some() {
                        tracing::trace!(?event, "input slot occupied, coalescing");
                    }
                    pending = Some(coalesce(pending.take(), event));
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "keyboard reader lost its input stream");
                    break;
                }
                None => break,
            },
            permit = tx.reserve(), if pending.is_some() => match permit {
                Ok(permit) => {
                    if let Some(event) = pending.take() {
                        permit.send(event);
                    }
                }
                Err(_) => return,
            },
        }
    }

    if let Some(event) = pending {
        let _ = tx.send(event).await;
    }
}

/// Replays a fixed list of events, then ends.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEvents {
    async fn next(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn raw_key(code: KeyCode) -> io::Result<CrosstermEvent> {
        Ok(CrosstermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[tokio::test]
    async fn scripted_events_replay_in_order() {
        let mut events = ScriptedEvents::new([Event::Tick, Event::Resize]);
        assert_eq!(events.next().await, Some(Event::Tick));
        assert_eq!(events.next().await, Some(Event::Resize));
        assert_eq!(events.next().await, None);
    }

    #[test]
    fn newest_event_replaces_pending_one() {
        assert_eq!(coalesce(None, key(KeyCode::Down)), key(KeyCode::Down));
        assert_eq!(
            coalesce(Some(key(KeyCode::Down)), key(KeyCode::Up)),
            key(KeyCode::Up)
        );
        assert_eq!(coalesce(Some(Event::Resize), Event::Tick), Event::Tick);
    }

    #[test]
    fn pending_quit_is_kept() {
        let quit = key(KeyCode::Char('q'));
        assert_eq!(coalesce(Some(quit.clone()), key(KeyCode::Down)), quit);
        assert_eq!(coalesce(Some(quit.clone()), Event::Resize), quit);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(coalesce(Some(quit), ctrl_c.clone()), ctrl_c);
    }

    #[tokio::test]
    async fn burst_of_input_forwards_only_the_quit() {
        let (tx, mut rx) = mpsc::channel(INPUT_CAPACITY);
        let burst = futures::stream::iter([
            raw_key(KeyCode::Down),
            raw_key(KeyCode::Char('q')),
            Ok(CrosstermEvent::FocusGained),
            raw_key(KeyCode::Down),
        ]);
        tokio::spawn(forward_input(burst, tx));

        assert_eq!(rx.recv().await, Some(key(KeyCode::Char('q'))));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn stream_error_still_delivers_pending_event() {
        let (tx, mut rx) = mpsc::channel(INPUT_CAPACITY);
        let failing = futures::stream::iter([
            raw_key(KeyCode::Up),
            Err(io::Error::other("tty gone")),
            raw_key(KeyCode::Down),
        ]);
        tokio::spawn(forward_input(failing, tx));

        assert_eq!(rx.recv().await, Some(key(KeyCode::Up)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn injected_input_is_delivered_before_the_tick() {
        let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
        let mut events = EventHandler::with_input(Duration::from_secs(5), rx);
        tx.send(Event::Resize).await.unwrap();
        assert_eq!(events.next().await, Some(Event::Resize));
        assert_eq!(events.next().await, Some(Event::Tick));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_keeps_ticking() {
        let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
        let mut events = EventHandler::with_input(Duration::from_secs(5), rx);
        drop(tx);

        assert_eq!(events.next().await, Some(Event::Tick));
        assert!(!events.input_open);
        assert_eq!(events.next().await, Some(Event::Tick));
    }
}
