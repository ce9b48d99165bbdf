/*
 *  coordinator.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Event coordinator - timer, button sources and the single draw task
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

use crate::display::controller::PageController;
use crate::error::PagerError;
use crate::input::{EdgeSource, EventSender, InputEvent, SwitchDecoder, SwitchPort};

/// How button presses reach the coordinator
pub enum InputMode {
    /// Read the composite switch value every `interval`
    Polling {
        port: Box<dyn SwitchPort>,
        interval: Duration,
    },
    /// Per-button falling-edge callbacks
    EventDriven { edges: Box<dyn EdgeSource> },
}

impl InputMode {
    fn name(&self) -> &'static str {
        match self {
            InputMode::Polling { .. } => "polling",
            InputMode::EventDriven { .. } => "event driven",
        }
    }
}

/// Funnels the timer and the button source into one channel and drains it
/// from a single task that owns the [`PageController`].
///
/// Nothing else holds the controller while `run` is active, so at most one
/// draw is ever in flight and writes to the panel cannot interleave.
pub struct EventCoordinator {
    controller: PageController,
    decoder: SwitchDecoder,
    tick: Duration,
    events_tx: EventSender,
    events_rx: UnboundedReceiver<InputEvent>,
}

impl EventCoordinator {
    pub fn new(controller: PageController, decoder: SwitchDecoder, tick: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self { controller, decoder, tick, events_tx, events_rx }
    }

    /// Extra producer handle, events sent here are handled like button presses
    pub fn sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    /// Run until `shutdown` turns true (or its sender is dropped).
    ///
    /// Starts with a tick so the panel is lit and page 1 drawn straight away.
    /// On the way out the timer and the button source are stopped first, then
    /// whatever was already queued is handled, and the controller is handed
    /// back. A fatal error ends the loop early and is returned instead.
    pub async fn run(
        self,
        mode: InputMode,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<PageController, PagerError> {
        let Self { mut controller, decoder, tick, events_tx, mut events_rx } = self;
        info!("Event coordinator starting in {} mode, tick every {:?}", mode.name(), tick);

        let (mut edges, poller) = match mode {
            InputMode::EventDriven { mut edges } => {
                edges.listen(decoder, events_tx.clone())?;
                (Some(edges), None)
            }
            InputMode::Polling { port, interval } => {
                (None, Some(spawn_poller(port, interval, decoder, events_tx.clone())))
            }
        };
        let timer = spawn_timer(tick, events_tx.clone());

        let outcome = consume(&mut controller, &mut events_rx, &mut shutdown).await;

        debug!("Stopping timer and input sources");
        timer.abort();
        let _ = timer.await;
        if let Some(poller) = poller {
            poller.abort();
            let _ = poller.await;
        }
        if let Some(edges) = edges.as_mut() {
            edges.stop();
        }
        drop(events_tx);

        outcome?;
        while let Ok(event) = events_rx.try_recv() {
            dispatch(&mut controller, event)?;
        }
        info!("Event coordinator stopped on page {}", controller.current_page());
        Ok(controller)
    }
}

async fn consume(
    controller: &mut PageController,
    events: &mut UnboundedReceiver<InputEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), PagerError> {
    dispatch(controller, InputEvent::Tick)?;
    if *shutdown.borrow() {
        return Ok(());
    }
    let mut held = None;
    loop {
        let event = match held.take() {
            Some(event) => event,
            None => tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Shutdown requested");
                        return Ok(());
                    }
                    continue;
                }
                Some(event) = events.recv() => event,
            },
        };
        let (event, next) = collapse_refreshes(event, events);
        held = next;
        dispatch(controller, event)?;
    }
}

fn is_refresh(event: InputEvent) -> bool {
    matches!(event, InputEvent::Idle | InputEvent::Tick)
}

/// Fold a backlog of queued `Idle`/`Tick` events into one redraw.
///
/// A slow draw (the IP lookup) lets the poller and the timer run ahead; each
/// queued refresh would only repaint the same page again. `Tick` wins over
/// `Idle` since it also sets the backlight. The first button event found is
/// handed back so presses keep their order.
fn collapse_refreshes(
    first: InputEvent,
    events: &mut UnboundedReceiver<InputEvent>,
) -> (InputEvent, Option<InputEvent>) {
    if !is_refresh(first) {
        return (first, None);
    }
    let mut merged = first;
    let mut folded = 0usize;
    let mut next = None;
    while let Ok(event) = events.try_recv() {
        if !is_refresh(event) {
            next = Some(event);
            break;
        }
        if event == InputEvent::Tick {
            merged = InputEvent::Tick;
        }
        folded += 1;
    }
    if folded > 0 {
        debug!("Collapsed {} queued refreshes into {:?}", folded, merged);
    }
    (merged, next)
}

/// Hand one event to the controller; only fatal errors escape
fn dispatch(controller: &mut PageController, event: InputEvent) -> Result<(), PagerError> {
    match controller.handle(event) {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => {
            error!("Fatal error handling {:?}: {}", event, e);
            Err(e)
        }
        Err(e) => {
            error!("Failed handling {:?}: {}", event, e);
            Ok(())
        }
    }
}

fn spawn_timer(tick: Duration, events: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        // first tick one full period after start, the consumer draws on startup
        let mut interval = time::interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if events.send(InputEvent::Tick).is_err() {
                break;
            }
        }
    })
}

fn spawn_poller(
    mut port: Box<dyn SwitchPort>,
    period: Duration,
    decoder: SwitchDecoder,
    events: EventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let value = match port.read_switches() {
                Ok(value) => value,
                Err(e) => {
                    warn!("Switch read failed: {}", e);
                    continue;
                }
            };
            let event = decoder.decode(value);
            if value != 0 {
                debug!("Switch value {} -> {:?}", value, event);
            }
            if events.send(event).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SharedClock};
    use crate::display::components::{ClockPage, StatsPage};
    use crate::display::controller::BacklightWindow;
    use crate::display::drivers::mock::MockDisplay;
    use crate::display::page::{PageContent, PageRegistry};
    use crate::input::mock::{ManualButtons, ScriptedSwitches};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn two_pages(display: &MockDisplay) -> PageController {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let clock: SharedClock = Arc::new(ManualClock::new(start));
        let mut registry = PageRegistry::new();
        registry.register(1, PageContent::Clock(ClockPage::default()));
        registry.register(2, PageContent::Stats(StatsPage::default()));
        PageController::new(Box::new(display.clone()), registry, clock, BacklightWindow::default())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_tick_then_shutdown() {
        let display = MockDisplay::default();
        let coordinator = EventCoordinator::new(two_pages(&display), SwitchDecoder::default(), Duration::from_secs(10));
        let (stop_tx, stop_rx) = watch::channel(false);
        let mode = InputMode::EventDriven { edges: Box::new(ManualButtons::new()) };

        let handle = tokio::spawn(coordinator.run(mode, stop_rx));
        time::sleep(Duration::from_secs(1)).await;
        stop_tx.send(true).unwrap();

        let controller = handle.await.unwrap().unwrap();
        assert_eq!(controller.current_page(), 1);
        let state = display.lock();
        assert_eq!(state.backlight_calls, 1);
        assert_eq!(state.clear_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_events_are_handled() {
        let display = MockDisplay::default();
        let coordinator = EventCoordinator::new(two_pages(&display), SwitchDecoder::default(), Duration::from_secs(10));
        let sender = coordinator.sender();
        let (stop_tx, stop_rx) = watch::channel(false);
        let mode = InputMode::Polling { port: Box::new(ScriptedSwitches::default()), interval: Duration::from_millis(150) };

        let handle = tokio::spawn(coordinator.run(mode, stop_rx));
        sender.send(InputEvent::Right).unwrap();
        time::sleep(Duration::from_millis(50)).await;
        stop_tx.send(true).unwrap();

        let controller = handle.await.unwrap().unwrap();
        assert_eq!(controller.current_page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_backlog_is_collapsed() {
        let display = MockDisplay::default();
        let coordinator = EventCoordinator::new(two_pages(&display), SwitchDecoder::default(), Duration::from_secs(10));
        let sender = coordinator.sender();
        for _ in 0..50 {
            sender.send(InputEvent::Idle).unwrap();
        }
        sender.send(InputEvent::Tick).unwrap();
        sender.send(InputEvent::Right).unwrap();
        for _ in 0..50 {
            sender.send(InputEvent::Idle).unwrap();
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        let mode = InputMode::EventDriven { edges: Box::new(ManualButtons::new()) };

        let handle = tokio::spawn(coordinator.run(mode, stop_rx));
        time::sleep(Duration::from_secs(1)).await;
        stop_tx.send(true).unwrap();

        let controller = handle.await.unwrap().unwrap();
        assert_eq!(controller.current_page(), 2);
        let state = display.lock();
        // startup, folded tick, right, folded idle
        assert_eq!(state.write_count, 4);
        assert_eq!(state.backlight_calls, 2);
    }

    #[test]
    fn test_collapse_keeps_button_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for event in [InputEvent::Tick, InputEvent::Idle, InputEvent::Left, InputEvent::Idle] {
            tx.send(event).unwrap();
        }
        assert_eq!(collapse_refreshes(InputEvent::Idle, &mut rx), (InputEvent::Tick, Some(InputEvent::Left)));
        assert_eq!(collapse_refreshes(InputEvent::Right, &mut rx), (InputEvent::Right, None));
        assert_eq!(collapse_refreshes(InputEvent::Idle, &mut rx), (InputEvent::Idle, None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_shutdown_sender_stops() {
        let display = MockDisplay::default();
        let coordinator = EventCoordinator::new(two_pages(&display), SwitchDecoder::default(), Duration::from_secs(10));
        let (stop_tx, stop_rx) = watch::channel(false);
        let buttons = ManualButtons::new();
        let mode = InputMode::EventDriven { edges: Box::new(buttons.clone()) };

        let handle = tokio::spawn(coordinator.run(mode, stop_rx));
        time::sleep(Duration::from_millis(10)).await;
        assert!(buttons.is_listening());
        drop(stop_tx);

        assert!(handle.await.unwrap().is_ok());
        assert!(!buttons.is_listening());
    }
}
