//! Contract between a session and an OS-specific device backend.
//!
//! A backend answers two questions: which devices are attached right now
//! ([`Platform::list_devices`]) and what a given device reads right now
//! ([`Platform::sample_device`]). Backends that learn about hotplug from a
//! separate OS thread push [`HotplugNotice`]s into the bounded queue handed
//! to them by [`Platform::start`]; the session drains that queue only at the
//! start of a detect cycle, so the device table keeps a single writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::PlatformError;
use crate::types::{RawDeviceInfo, RawSample};

/// Hotplug notification pushed by a backend thread.
#[derive(Debug, Clone, PartialEq)]
pub enum HotplugNotice {
    Attached(RawDeviceInfo),
    Removed(String),
}

impl HotplugNotice {
    pub fn device_id(&self) -> &str {
        match self {
            HotplugNotice::Attached(info) => &info.device_id,
            HotplugNotice::Removed(id) => id,
        }
    }
}

/// Backend half of the hotplug queue.
///
/// Clones share the queue and its overflow flag.
#[derive(Debug, Clone)]
pub struct HotplugSender {
    tx: Sender<HotplugNotice>,
    overflowed: Arc<AtomicBool>,
}

/// Session half of the hotplug queue.
#[derive(Debug)]
pub struct HotplugReceiver {
    rx: Receiver<HotplugNotice>,
    overflowed: Arc<AtomicBool>,
}

/// Creates the bounded hotplug queue.
pub fn hotplug_channel(capacity: usize) -> (HotplugSender, HotplugReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    let overflowed = Arc::new(AtomicBool::new(false));
    (
        HotplugSender {
            tx,
            overflowed: overflowed.clone(),
        },
        HotplugReceiver { rx, overflowed },
    )
}

impl HotplugSender {
    /// Pushes a notice without blocking the backend thread.
    ///
    /// A full queue drops the notice and raises the overflow flag, which makes
    /// the next detect treat every listed device as replugged.
    pub fn push(&self, notice: HotplugNotice) {
        match self.tx.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(notice)) => {
                self.overflowed.store(true, Ordering::Release);
                log::warn!(
                    "hotplug queue full, dropping notice for {}",
                    notice.device_id()
                );
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl HotplugReceiver {
    /// Moves every queued notice into `out`. Returns `true` if notices were
    /// dropped since the previous drain.
    pub fn drain_into(&self, out: &mut Vec<HotplugNotice>) -> bool {
        out.extend(self.rx.try_iter());
        self.overflowed.swap(false, Ordering::AcqRel)
    }
}

/// OS-specific device enumerator and sampler.
pub trait Platform {
    /// Called once by `Session::init`. Backends with an OS hotplug thread keep `hotplug`.
    fn start(&mut self, hotplug: HotplugSender) -> Result<(), PlatformError> {
        let _ = hotplug;
        Ok(())
    }

    /// Called by `Session::shutdown`.
    fn stop(&mut self) {}

    /// Called once at the start of every process-events cycle, before any
    /// device is sampled. Backends that pump an OS event queue do it here so
    /// every device in the cycle reads the same snapshot.
    fn begin_cycle(&mut self) {}

    /// Lists the devices attached right now, in any order.
    fn list_devices(&mut self) -> Result<Vec<RawDeviceInfo>, PlatformError>;

    /// Reads the current axis and button values of a listed device.
    fn sample_device(&mut self, device_id: &str) -> Result<RawSample, PlatformError>;

    /// Smallest axis change the hardware can report. Movements at or below it are noise.
    fn axis_precision(&self) -> f32 {
        0.0
    }
}

impl<P: Platform + ?Sized> Platform for Box<P> {
    fn start(&mut self, hotplug: HotplugSender) -> Result<(), PlatformError> {
        (**self).start(hotplug)
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn begin_cycle(&mut self) {
        (**self).begin_cycle();
    }

    fn list_devices(&mut self) -> Result<Vec<RawDeviceInfo>, PlatformError> {
        (**self).list_devices()
    }

    fn sample_device(&mut self, device_id: &str) -> Result<RawSample, PlatformError> {
        (**self).sample_device(device_id)
    }

    fn axis_precision(&self) -> f32 {
        (**self).axis_precision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(id: &str) -> HotplugNotice {
        HotplugNotice::Removed(id.into())
    }

    #[test]
    fn drain_reports_overflow_once() {
        let (tx, rx) = hotplug_channel(1);
        tx.push(removed("a"));
        tx.push(removed("b"));

        let mut notices = Vec::new();
        assert!(rx.drain_into(&mut notices));
        assert_eq!(notices, [removed("a")]);

        tx.push(removed("c"));
        assert!(!rx.drain_into(&mut notices));
        assert_eq!(notices, [removed("a"), removed("c")]);
    }

    #[test]
    fn push_after_receiver_dropped_is_silent() {
        let (tx, rx) = hotplug_channel(1);
        drop(rx);
        tx.push(removed("a"));
        assert!(!tx.overflowed.load(Ordering::Acquire));
    }
}
