//! The Elm-architecture loop: [`Model`], [`Effect`], [`Context`], [`Runner`].
//!
//! The runner is single-threaded: every message is handled to completion
//! before the next is taken from the queue, so a model never observes
//! concurrent mutation. Effects are the only way work leaves `update`:
//! one-shot commands run inline and feed their message back into the queue,
//! subscriptions get their own thread and a [`Context`] to watch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use log::trace;

use crate::messages::Msg;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Stop flag shared between the runner and its subscriptions.
///
/// The playback timer and the stdin reader poll [`is_done`](Self::is_done)
/// and return once the runner has shut down.
#[derive(Clone, Debug, Default)]
pub struct Context {
    stopped: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Mark every clone of this context as done.
    #[inline]
    pub fn cancel(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// Work requested by [`Model::update`], executed by the [`Runner`].
pub enum Effect {
    /// Runs inline; a returned message is queued, e.g. a delayed playback
    /// [`Msg::Tick`].
    Cmd(Box<dyn FnOnce() -> Option<Msg> + Send>),
    /// Runs on its own thread and may send any number of messages, e.g. the
    /// line reader feeding user commands.
    Sub(Box<dyn FnOnce(Context, Sender<Msg>) + Send>),
    Batch(Vec<Effect>),
    /// Stop the runner and cancel its subscriptions.
    End,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmd(_) => f.write_str("Cmd"),
            Self::Sub(_) => f.write_str("Sub"),
            Self::Batch(effects) => f.debug_list().entries(effects).finish(),
            Self::End => f.write_str("End"),
        }
    }
}

/// Wrap a closure as an [`Effect::Cmd`].
pub fn cmd(f: impl FnOnce() -> Option<Msg> + Send + 'static) -> Effect {
    Effect::Cmd(Box::new(f))
}

// ---------------------------------------------------------------------------
// Model trait
// ---------------------------------------------------------------------------

/// The application model (Elm architecture).
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Owns a [`Model`] and its message queue.
pub struct Runner<M: Model> {
    model: M,
    ctx: Context,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
}

impl<M: Model> Runner<M> {
    /// Wrap a model with an empty queue.
    pub fn new(model: M) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            model,
            ctx: Context::new(),
            tx,
            rx,
        }
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consume the runner, returning the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// The loop's cancellation token.
    pub fn context(&self) -> Context {
        self.ctx.clone()
    }

    /// Enqueue a message.
    pub fn send(&self, msg: impl Into<Msg>) {
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.tx.send(msg.into());
    }

    /// Whether the loop was stopped by [`Effect::End`] or [`Msg::Quit`].
    pub fn is_stopped(&self) -> bool {
        self.ctx.is_done()
    }

    /// Handle queued messages until the queue is empty or the loop stops.
    ///
    /// Inline commands may enqueue follow-ups, which are handled in the same
    /// call. `observe` runs after every handled message. Returns the number of
    /// messages handled.
    pub fn run_pending(&mut self, mut observe: impl FnMut(&M)) -> usize {
        let mut handled = 0;
        while !self.ctx.is_done() {
            match self.rx.try_recv() {
                Ok(msg) => {
                    self.dispatch(msg);
                    handled += 1;
                    observe(&self.model);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    /// Run the blocking loop.
    ///
    /// 1. Sends `Msg::Init` through the model.
    /// 2. Waits for messages from subscriptions and handles them one by one.
    /// 3. Stops when the model returns `Effect::End` or a `Msg::Quit` has been
    ///    handled.
    pub fn run(&mut self, mut observe: impl FnMut(&M)) {
        self.send(Msg::Init);
        while !self.ctx.is_done() {
            let Ok(msg) = self.rx.recv() else {
                break;
            };
            let quit = matches!(msg, Msg::Quit);
            self.dispatch(msg);
            observe(&self.model);
            if quit {
                self.ctx.cancel();
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        trace!("dispatch {msg:?}");
        if let Some(effect) = self.model.update(msg) {
            self.handle_effect(effect);
        }
    }

    /// Returns `true` if the loop should stop.
    fn handle_effect(&self, effect: Effect) -> bool {
        match effect {
            Effect::End => {
                self.ctx.cancel();
                true
            }
            Effect::Cmd(f) => {
                if let Some(msg) = f() {
                    let _ = self.tx.send(msg);
                }
                false
            }
            Effect::Sub(f) => {
                let ctx = self.ctx.clone();
                let tx = self.tx.clone();
                std::thread::spawn(move || f(ctx, tx));
                false
            }
            Effect::Batch(effects) => {
                for e in effects {
                    if self.handle_effect(e) {
                        return true;
                    }
                }
                false
            }
        }
    }
}
