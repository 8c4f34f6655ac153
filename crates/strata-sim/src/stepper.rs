use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::map::RuntimeMap;

/// Manual-reset gate: stays open until explicitly closed.
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new(open: bool) -> Self {
        Self {
            open: Mutex::new(open),
            cond: Condvar::new(),
        }
    }

    pub fn open(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        *open = true;
        self.cond.notify_all();
    }

    pub fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Close the gate unless `stop` is already raised. The flag is read under
    /// the gate lock, so a concurrent `open` after raising it is never lost.
    pub fn close_unless(&self, stop: &AtomicBool) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if !stop.load(Ordering::Acquire) {
            *open = false;
        }
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the gate is open.
    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        while !*open {
            open = self.cond.wait(open).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// State shared between the owner and the worker thread.
struct Shared {
    gate: Gate,
    stop: AtomicBool,
    synchronized: AtomicBool,
    tick_count: AtomicU64,
}

/// Runs `map_update` on a dedicated thread.
///
/// In synchronized mode the worker closes its gate after every tick and waits
/// for the render side to call [`Stepper::resume`], giving at most one tick
/// per frame. In free mode the gate stays open and the worker ticks as fast as
/// it can. The worker only ever blocks between complete ticks.
pub struct Stepper {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    /// Tick count at the last `lapses()` sample.
    last_sample: u64,
}

impl Stepper {
    pub fn spawn(map: Arc<dyn RuntimeMap>, synchronized: bool) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            gate: Gate::new(!synchronized),
            stop: AtomicBool::new(false),
            synchronized: AtomicBool::new(synchronized),
            tick_count: AtomicU64::new(0),
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("strata-stepper".into())
            .spawn(move || run(map, worker))?;

        log::info!(
            "Stepper started ({} mode)",
            if synchronized { "synchronized" } else { "free" }
        );

        Ok(Self {
            shared,
            handle: Some(handle),
            last_sample: 0,
        })
    }

    /// Let the worker run one more tick (synchronized) or keep running (free).
    pub fn resume(&self) {
        self.shared.gate.open();
    }

    /// Hold the worker at the gate after its current tick.
    pub fn pause(&self) {
        self.shared.gate.close();
    }

    pub fn is_paused(&self) -> bool {
        !self.shared.gate.is_open()
    }

    pub fn set_synchronized(&self, synchronized: bool) {
        self.shared.synchronized.store(synchronized, Ordering::Release);
        if !synchronized {
            self.shared.gate.open();
        }
    }

    pub fn is_synchronized(&self) -> bool {
        self.shared.synchronized.load(Ordering::Acquire)
    }

    /// Completed ticks since spawn.
    pub fn tick_count(&self) -> u64 {
        self.shared.tick_count.load(Ordering::Acquire)
    }

    /// Ticks completed since the previous call.
    pub fn lapses(&mut self) -> u64 {
        let now = self.tick_count();
        let lapses = now - self.last_sample;
        self.last_sample = now;
        lapses
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the worker to exit and wait for it. Safe to call twice.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shared.stop.store(true, Ordering::Release);
        self.shared.gate.open();
        if handle.join().is_err() {
            log::error!("Stepper thread panicked");
        } else {
            log::info!("Stepper stopped after {} ticks", self.tick_count());
        }
    }
}

impl Drop for Stepper {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(map: Arc<dyn RuntimeMap>, shared: Arc<Shared>) {
    loop {
        shared.gate.wait();
        if shared.stop.load(Ordering::Acquire) {
            break;
        }
        map.map_update();
        // The gate is closed before the new count becomes visible.
        if shared.synchronized.load(Ordering::Acquire) {
            shared.gate.close_unless(&shared.stop);
        }
        shared.tick_count.fetch_add(1, Ordering::AcqRel);
    }
}
