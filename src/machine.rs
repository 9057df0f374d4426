/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! A core wired to a front panel, running on its own thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use crate::bus::{BusLines, Pacing};
use crate::cancel::CancellationToken;
use crate::cpu::Intel8080;
use crate::error::{Error, Result};
use crate::memory::Memory;
use crate::panel::{FrontPanel, PanelPort};

/// The core type an [`Altair`] runs.
pub type Core = Intel8080<PanelPort>;

type Outcome = (Core, Result<()>);

/// How an [`Altair`] is put together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineConfig {
    pub pacing: Pacing,
    /// Initial position of the 16 front panel switches.
    pub switches: u16,
    /// Raise READY before the worker starts instead of powering on stopped.
    pub start_running: bool,
}

/// Owns the worker thread and the operator side of the panel.
///
/// While the worker runs, the core lives on it; it comes back on `reset` and `shutdown`.
pub struct Altair {
    panel: FrontPanel,
    cancel: CancellationToken,
    core: Option<Core>,
    worker: Option<JoinHandle<Outcome>>,
}

impl Altair {

    pub fn new(memory: Memory, config: MachineConfig) -> Altair {
        let lines = Arc::new(BusLines::new());
        let (panel, port) = FrontPanel::new(Arc::clone(&lines), config.switches);
        let mut core = Intel8080::with_lines(memory, port, config.pacing.clock(), lines);
        let cancel = CancellationToken::new();
        core.set_cancellation_token(cancel.clone());
        if config.start_running {
            panel.run();
        }
        Altair { panel, cancel, core: Some(core), worker: None }
    }

    pub fn panel(&self) -> &FrontPanel {
        &self.panel
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    /// Spawns the worker. Does nothing when it already runs.
    pub fn start(&mut self) -> Result<()> {
        let mut core = match self.core.take() {
            Some(core) => core,
            None if self.worker.is_some() => return Ok(()),
            None => return Err(Error::NotRunning),
        };
        let worker = thread::Builder::new()
            .name("intel-8080".to_string())
            .spawn(move || {
                let result = core.run();
                if let Err(ref e) = result {
                    error!("core stopped: {}", e);
                }
                (core, result)
            })
            .map_err(|e| Error::Spawn(e.to_string()))?;
        info!("worker started");
        self.worker = Some(worker);
        Ok(())
    }

    /// Pulls READY low, stops the worker, resets the core and starts a fresh worker.
    ///
    /// Registers, flags and memory survive; the core restarts at address 0 stopped.
    pub fn reset(&mut self) -> Result<()> {
        self.panel.prepare_reset();
        let mut core = if self.worker.is_some() {
            let (core, outcome) = self.join()?;
            if let Err(e) = outcome {
                debug!("reset clears: {}", e);
            }
            core
        } else {
            self.core.take().ok_or(Error::NotRunning)?
        };
        core.reset();
        self.cancel = CancellationToken::new();
        core.set_cancellation_token(self.cancel.clone());
        self.core = Some(core);
        self.start()
    }

    /// Stops the worker for good and hands back the core.
    pub fn shutdown(mut self) -> Result<Core> {
        if self.worker.is_some() {
            let (core, outcome) = self.join()?;
            outcome?;
            Ok(core)
        } else {
            self.core.take().ok_or(Error::NotRunning)
        }
    }

    fn join(&mut self) -> Result<Outcome> {
        let worker = self.worker.take().ok_or(Error::NotRunning)?;
        self.cancel.cancel();
        let outcome = worker.join().map_err(|_| Error::WorkerPanicked)?;
        info!("worker stopped");
        Ok(outcome)
    }
}

impl Drop for Altair {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.join();
        }
    }
}
