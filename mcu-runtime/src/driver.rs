//! Periodic driver
//!
//! Boots a shared chip and executes one cycle per clock tick on a background
//! thread. The tick period is `1 / speed` seconds. A tick that is missed
//! because the host fell behind is dropped rather than replayed, so the
//! driver never runs cycles in a burst.

use crate::chip::Chip;
use crate::error::{Result, RuntimeError};
use crate::state::Fault;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A chip shared between the driver thread and the host
pub type SharedChip = Arc<Mutex<Chip>>;

/// Wrap a chip for use with [`boot`]
pub fn shared(chip: Chip) -> SharedChip {
    Arc::new(Mutex::new(chip))
}

/// Boot `chip` and start executing it at its configured clock speed.
///
/// The first cycle runs one tick after boot.
pub fn boot(chip: &SharedChip) -> Result<Driver> {
    let (tick, run) = {
        let mut guard = chip.lock().map_err(|_| RuntimeError::Poisoned)?;
        guard.boot()?;
        (Duration::from_nanos(guard.config().tick_nanos()), guard.boot_count())
    };

    let stop = Arc::new(AtomicBool::new(false));
    let handle = {
        let chip = Arc::clone(chip);
        let stop = Arc::clone(&stop);
        thread::spawn(move || drive(&chip, &stop, tick, run))
    };
    tracing::debug!("driver started, tick {:?}", tick);

    Ok(Driver {
        chip: Arc::clone(chip),
        stop,
        run,
        handle: Some(handle),
        fault: None,
    })
}

/// Driver thread body. Returns the fault that stopped the chip, if any.
///
/// `run` is the chip's boot count at start; a later boot belongs to another
/// driver and ends this one.
fn drive(chip: &SharedChip, stop: &AtomicBool, tick: Duration, run: u64) -> Option<Fault> {
    let mut deadline = Instant::now() + tick;

    loop {
        loop {
            if stop.load(Ordering::Acquire) {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }

        let Ok(mut guard) = chip.lock() else {
            tracing::warn!("driver stopped: chip lock poisoned");
            return None;
        };
        // Halt may have been requested while we waited for the lock
        if stop.load(Ordering::Acquire) || !guard.is_booted() || guard.boot_count() != run {
            return None;
        }
        if let Err(err) = guard.cycle() {
            return err.fault().cloned();
        }
        if !guard.is_booted() {
            tracing::debug!("driver stopped after {} cycles", guard.cycles());
            return None;
        }
        drop(guard);

        deadline += tick;
        let now = Instant::now();
        if deadline <= now {
            deadline = now + tick;
        }
    }
}

/// Handle to a running driver thread.
///
/// Dropping the handle halts the driver.
#[derive(Debug)]
pub struct Driver {
    chip: SharedChip,
    stop: Arc<AtomicBool>,
    run: u64,
    handle: Option<JoinHandle<Option<Fault>>>,
    fault: Option<Fault>,
}

impl Driver {
    /// Stop the driver and halt the chip.
    ///
    /// Once this returns no further cycle executes. Calling it again is a
    /// no-op. A chip that has since been booted by another driver is left
    /// running.
    pub fn halt(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.as_ref() {
            handle.thread().unpark();
        }
        self.join()?;
        let mut chip = self.chip.lock().map_err(|_| RuntimeError::Poisoned)?;
        if chip.boot_count() == self.run {
            chip.halt();
        }
        Ok(())
    }

    /// Block until the driver stops by itself (BREAK, a fault, or the chip
    /// being halted directly). Returns the fault, if one stopped it.
    pub fn wait(&mut self) -> Result<Option<Fault>> {
        self.join()?;
        Ok(self.fault.clone())
    }

    fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            let fault = handle.join().map_err(|_| RuntimeError::DriverPanicked)?;
            if fault.is_some() {
                self.fault = fault;
            }
        }
        Ok(())
    }

    /// Whether the driver thread is still executing cycles
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Fault that stopped the driver, once joined
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn chip(&self) -> &SharedChip {
        &self.chip
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        if let Err(err) = self.halt() {
            tracing::warn!("driver halt on drop failed: {}", err);
        }
    }
}
