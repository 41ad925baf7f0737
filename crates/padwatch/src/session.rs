use std::time::Instant;

use crate::config::SessionConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{PlatformError, QueryError, Result, SessionError};
use crate::platform::{hotplug_channel, HotplugNotice, HotplugReceiver, Platform};
use crate::sampler::{EventBatch, Sampler};
use crate::table::DeviceTable;
use crate::types::{DeviceIndex, DeviceSnapshot};

/// State that only exists between `init` and `shutdown`.
struct Active {
    table: DeviceTable,
    sampler: Sampler,
    hotplug: HotplugReceiver,
    /// Notices drained but not yet applied by a successful detect.
    pending: Vec<HotplugNotice>,
    /// Notices were dropped by a full queue since the last successful detect.
    overflowed: bool,
    epoch: Instant,
}

enum State {
    Uninitialized,
    Active(Active),
}

/// Owns the device table and drives detect and process-events cycles
/// against a [`Platform`].
///
/// Every operation is synchronous and expects to be called from a single
/// control thread. Handlers registered through [`Session::dispatcher`]
/// survive `shutdown` and `init`.
pub struct Session<P: Platform> {
    platform: P,
    config: SessionConfig,
    dispatcher: Dispatcher,
    state: State,
}

impl<P: Platform> Session<P> {
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, SessionConfig::default())
    }

    pub fn with_config(platform: P, config: SessionConfig) -> Self {
        Self {
            platform,
            config,
            dispatcher: Dispatcher::new(),
            state: State::Uninitialized,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Handler registry. Usable in any state.
    pub fn dispatcher(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Allocates the device table and starts the platform.
    pub fn init(&mut self) -> Result<()> {
        if self.is_active() {
            return Err(SessionError::AlreadyInitialized);
        }
        let (tx, rx) = hotplug_channel(self.config.hotplug_capacity);
        self.platform.start(tx)?;

        let sampler =
            Sampler::new(self.config.axis_threshold.max(self.platform.axis_precision()));
        log::debug!("session started, axis threshold {}", sampler.threshold());
        self.state = State::Active(Active {
            table: DeviceTable::new(),
            sampler,
            hotplug: rx,
            pending: Vec::new(),
            overflowed: false,
            epoch: Instant::now(),
        });
        Ok(())
    }

    /// Stops the platform and releases every device. No remove events fire.
    pub fn shutdown(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Uninitialized) {
            State::Uninitialized => Err(SessionError::NotInitialized),
            State::Active(active) => {
                log::debug!("session stopped, releasing {} device(s)", active.table.len());
                drop(active);
                self.platform.stop();
                Ok(())
            }
        }
    }

    /// Number of attached devices; zero while uninitialized.
    pub fn num_devices(&self) -> usize {
        match &self.state {
            State::Active(active) => active.table.len(),
            State::Uninitialized => 0,
        }
    }

    pub fn device_at_index(
        &self,
        index: DeviceIndex,
    ) -> std::result::Result<DeviceSnapshot, QueryError> {
        match &self.state {
            State::Active(active) => active.table.snapshot(index),
            State::Uninitialized => Err(QueryError::NotInitialized),
        }
    }

    /// Snapshots of every attached device in index order.
    pub fn devices(&self) -> Vec<DeviceSnapshot> {
        match &self.state {
            State::Active(active) => active.table.snapshots(),
            State::Uninitialized => Vec::new(),
        }
    }

    /// Reconciles the table against the platform and fires attach/remove events.
    ///
    /// Pending hotplug notices are drained first. A listing failure leaves the
    /// table untouched and keeps the drained notices for the next detect. If
    /// the hotplug queue overflowed, every listed device is reattached.
    pub fn detect_devices(&mut self) -> Result<()> {
        let State::Active(active) = &mut self.state else {
            return Err(SessionError::NotInitialized);
        };

        let before = active.pending.len();
        if active.hotplug.drain_into(&mut active.pending) {
            active.overflowed = true;
        }
        if active.pending.len() > before {
            log::debug!("drained {} hotplug notice(s)", active.pending.len() - before);
        }

        let listed = self.platform.list_devices()?;
        if active.overflowed {
            log::warn!("hotplug notices were lost, reattaching every device");
        }
        let events = active
            .table
            .reconcile(listed, &active.pending, active.overflowed);
        active.pending.clear();
        active.overflowed = false;
        self.dispatcher.dispatch_all(&events);
        Ok(())
    }

    /// Samples every attached device in ascending index order and fires
    /// button and axis events.
    ///
    /// A device that fails to sample is skipped for this cycle; if it is gone
    /// it stays skipped until the next detect reconciles it.
    pub fn process_events(&mut self) -> Result<()> {
        let Self {
            platform,
            dispatcher,
            state,
            ..
        } = self;
        let State::Active(active) = state else {
            return Err(SessionError::NotInitialized);
        };

        platform.begin_cycle();
        let timestamp = active.epoch.elapsed().as_secs_f64();
        let mut batch = EventBatch::new();
        for device in active.table.iter_mut() {
            if device.stale {
                continue;
            }
            batch.clear();
            match active.sampler.sample(platform, device, timestamp, &mut batch) {
                Ok(()) => dispatcher.dispatch_all(&batch),
                Err(PlatformError::DeviceGone(_)) => {
                    log::warn!("device {} gone, skipping until next detect", device.id);
                    device.stale = true;
                }
                Err(e) => {
                    log::warn!("failed to sample {}: {e}", device.id);
                }
            }
        }
        Ok(())
    }
}

impl<P: Platform> Drop for Session<P> {
    fn drop(&mut self) {
        if self.is_active() {
            let _ = self.shutdown();
        }
    }
}
