use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::PlatformError;
use crate::platform::{HotplugNotice, HotplugSender, Platform};
use crate::types::{RawDeviceInfo, RawSample};

#[derive(Debug)]
struct VirtualDevice {
    info: RawDeviceInfo,
    sample: RawSample,
    failure: Option<PlatformError>,
}

#[derive(Debug, Default)]
struct Inner {
    devices: Vec<VirtualDevice>,
    hotplug: Option<HotplugSender>,
    list_failure: Option<String>,
    precision: f32,
}

/// In-memory platform whose devices and readings are set by the host.
///
/// Clones share the same state, so a test or a demo thread can keep a handle
/// while a session owns another.
#[derive(Debug, Clone, Default)]
pub struct VirtualPlatform {
    inner: Arc<Mutex<Inner>>,
    calls: Arc<AtomicUsize>,
    cycles: Arc<AtomicUsize>,
}

impl VirtualPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the precision floor reported to sessions started afterwards.
    pub fn with_precision(self, precision: f32) -> Self {
        self.lock().precision = precision;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches a device with a neutral reading. Replaces a device with the same id.
    pub fn plug(&self, info: RawDeviceInfo) {
        let mut inner = self.lock();
        inner.devices.retain(|d| d.info.device_id != info.device_id);
        if let Some(tx) = &inner.hotplug {
            tx.push(HotplugNotice::Attached(info.clone()));
        }
        let sample = RawSample::neutral(info.axis_count, info.button_count);
        inner.devices.push(VirtualDevice {
            info,
            sample,
            failure: None,
        });
    }

    /// Detaches a device. Returns `false` if it was not attached.
    pub fn unplug(&self, device_id: &str) -> bool {
        let mut inner = self.lock();
        let before = inner.devices.len();
        inner.devices.retain(|d| d.info.device_id != device_id);
        let removed = inner.devices.len() != before;
        if removed {
            if let Some(tx) = &inner.hotplug {
                tx.push(HotplugNotice::Removed(device_id.to_string()));
            }
        }
        removed
    }

    pub fn set_axis(&self, device_id: &str, axis: usize, value: f32) -> bool {
        self.with_device(device_id, |d| {
            d.sample.axes.get_mut(axis).map(|v| *v = value).is_some()
        })
    }

    pub fn set_button(&self, device_id: &str, button: usize, pressed: bool) -> bool {
        self.with_device(device_id, |d| {
            d.sample.buttons.get_mut(button).map(|v| *v = pressed).is_some()
        })
    }

    /// Replaces the whole reading, including its shape.
    pub fn set_sample(&self, device_id: &str, sample: RawSample) -> bool {
        self.with_device(device_id, |d| {
            d.sample = sample;
            true
        })
    }

    /// Makes sampling of `device_id` fail with `failure` until cleared with `None`.
    pub fn fail_sampling(&self, device_id: &str, failure: Option<PlatformError>) -> bool {
        self.with_device(device_id, |d| {
            d.failure = failure;
            true
        })
    }

    /// Makes listing fail with a backend error until cleared with `None`.
    pub fn fail_listing(&self, reason: Option<String>) {
        self.lock().list_failure = reason;
    }

    /// Number of `list_devices` and `sample_device` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of process-events cycles begun so far.
    pub fn cycles(&self) -> usize {
        self.cycles.load(Ordering::Relaxed)
    }

    fn with_device(&self, device_id: &str, f: impl FnOnce(&mut VirtualDevice) -> bool) -> bool {
        let mut inner = self.lock();
        inner
            .devices
            .iter_mut()
            .find(|d| d.info.device_id == device_id)
            .is_some_and(f)
    }
}

impl Platform for VirtualPlatform {
    fn start(&mut self, hotplug: HotplugSender) -> Result<(), PlatformError> {
        self.lock().hotplug = Some(hotplug);
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().hotplug = None;
    }

    fn begin_cycle(&mut self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    fn list_devices(&mut self) -> Result<Vec<RawDeviceInfo>, PlatformError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let inner = self.lock();
        if let Some(reason) = &inner.list_failure {
            return Err(PlatformError::Backend(reason.clone()));
        }
        Ok(inner.devices.iter().map(|d| d.info.clone()).collect())
    }

    fn sample_device(&mut self, device_id: &str) -> Result<RawSample, PlatformError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let inner = self.lock();
        let device = inner
            .devices
            .iter()
            .find(|d| d.info.device_id == device_id)
            .ok_or_else(|| PlatformError::DeviceGone(device_id.to_string()))?;
        match &device.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(device.sample.clone()),
        }
    }

    fn axis_precision(&self) -> f32 {
        self.lock().precision
    }
}
