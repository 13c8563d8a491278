//! Tokio driver for [`RestTimer`].
//!
//! The handle owns the state machine behind one mutex. Each live
//! [`TickSubscription`] gets a single interval task; every tick and every
//! command takes the same lock, so ticks are applied strictly in order and a
//! command never observes a half-applied tick. Commands that end the
//! subscription abort the task and, because the task re-checks the
//! subscription under the lock, no tick lands after the command returns.
//!
//! Events leave the lock through an unbounded channel to a separate effect
//! task that owns the [`EffectDispatcher`]. Sinks run there, so a slow
//! haptic or analytics sink delays only its own deliveries, never the
//! countdown or a command.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::engine::{RestTimer, TickSubscription};
use super::state::TimerState;
use crate::context::WorkoutContext;
use crate::effects::EffectDispatcher;
use crate::error::{CoreError, Result};
use crate::events::TimerEvent;

/// Work for the effect task, in the order it was produced under the lock.
enum Effect {
    Events(Vec<TimerEvent>),
    Context(Option<WorkoutContext>),
    Rating(Option<u8>),
}

struct Shared {
    timer: RestTimer,
    effects: mpsc::UnboundedSender<Effect>,
    ticker: Option<JoinHandle<()>>,
}

impl Shared {
    fn emit(&self, effect: Effect) {
        // the effect task only stops once every sender is gone
        let _ = self.effects.send(effect);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(task) = self.ticker.take() {
            task.abort();
        }
    }
}

/// Cloneable handle to a running rest timer.
#[derive(Clone)]
pub struct RestTimerHandle {
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<TimerEvent>,
    runtime: Handle,
    tick_period: Duration,
}

impl RestTimerHandle {
    /// Wrap `timer`, ticking every `tick_period` once started.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`] when called outside a tokio runtime.
    pub fn new(
        timer: RestTimer,
        dispatcher: EffectDispatcher,
        tick_period: Duration,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        let events = dispatcher.event_sender();
        let effects = spawn_effects(&runtime, dispatcher);
        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                timer,
                effects,
                ticker: None,
            })),
            events,
            runtime,
            tick_period,
        })
    }

    pub fn state(&self) -> TimerState {
        lock(&self.shared).timer.state()
    }

    /// Receive every event the timer emits from now on.
    ///
    /// Events arrive after the effect task has handled them, so a receiver
    /// may briefly lag behind [`state`](Self::state).
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub fn start(&self, custom_time: Option<u32>) {
        self.apply(|t| t.start(custom_time));
    }

    pub fn stop(&self) {
        self.apply(RestTimer::stop);
    }

    pub fn skip(&self) {
        self.apply(RestTimer::skip);
    }

    pub fn adjust(&self, delta_secs: i64) {
        self.apply(|t| t.adjust(delta_secs));
    }

    pub fn reset(&self, new_time: Option<u32>) {
        self.apply(|t| t.reset(new_time));
    }

    pub fn pin_initial_time(&self, initial_time: Option<u32>) {
        self.apply(|t| {
            t.pin_initial_time(initial_time);
            Vec::new()
        });
    }

    /// Attach a 1-10 rating to the next completed or skipped interval.
    pub fn set_performance_rating(&self, rating: Option<u8>) {
        lock(&self.shared).emit(Effect::Rating(rating));
    }

    /// Begin a new rest interval for `context` with a fresh suggestion.
    pub(crate) fn begin_interval(
        &self,
        context: WorkoutContext,
        suggested_time: u32,
        from_history: bool,
    ) {
        self.apply(|t| t.apply_suggestion(suggested_time, from_history));
        // after the reset, so the previous interval's record keeps its own context
        lock(&self.shared).emit(Effect::Context(Some(context)));
    }

    fn apply<F>(&self, op: F)
    where
        F: FnOnce(&mut RestTimer) -> Vec<TimerEvent>,
    {
        let mut shared = lock(&self.shared);
        let before = shared.timer.subscription();
        let events = op(&mut shared.timer);
        let after = shared.timer.subscription();

        if before != after {
            if let Some(task) = shared.ticker.take() {
                task.abort();
            }
            if let Some(subscription) = after {
                shared.ticker = Some(self.spawn_ticker(subscription));
            }
        }
        if !events.is_empty() {
            shared.emit(Effect::Events(events));
        }
    }

    fn spawn_ticker(&self, subscription: TickSubscription) -> JoinHandle<()> {
        let weak: Weak<Mutex<Shared>> = Arc::downgrade(&self.shared);
        let period = self.tick_period;
        self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                let mut guard = lock(&shared);
                let events = guard.timer.tick(subscription);
                let still_live = guard.timer.subscription() == Some(subscription);
                // the handle in `ticker` is ours; detach it rather than abort ourselves
                if !still_live && guard.timer.subscription().is_none() {
                    guard.ticker = None;
                }
                if !events.is_empty() {
                    guard.emit(Effect::Events(events));
                }
                if !still_live {
                    break;
                }
            }
        })
    }
}

/// Run `dispatcher` until the timer is dropped, draining what is queued.
fn spawn_effects(
    runtime: &Handle,
    mut dispatcher: EffectDispatcher,
) -> mpsc::UnboundedSender<Effect> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    runtime.spawn(async move {
        while let Some(effect) = rx.recv().await {
            match effect {
                Effect::Events(events) => dispatcher.dispatch(&events),
                Effect::Context(context) => dispatcher.set_context(context),
                Effect::Rating(rating) => dispatcher.set_performance_rating(rating),
            }
        }
    });
    tx
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
