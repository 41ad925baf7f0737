use smallvec::SmallVec;

use crate::error::PlatformError;
use crate::events::Event;
use crate::platform::Platform;
use crate::table::Device;
use crate::types::RawSample;

/// Events produced by one device in one cycle.
pub(crate) type EventBatch = SmallVec<[Event; 8]>;

/// Diffs fresh platform samples against the state stored in the table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sampler {
    threshold: f32,
}

impl Sampler {
    pub(crate) fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
        }
    }

    pub(crate) fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Samples `device` and appends its events to `out`.
    ///
    /// On error the stored state is left untouched and nothing is appended.
    pub(crate) fn sample<P: Platform + ?Sized>(
        &self,
        platform: &mut P,
        device: &mut Device,
        timestamp: f64,
        out: &mut EventBatch,
    ) -> Result<(), PlatformError> {
        let sample = platform.sample_device(&device.id)?;
        self.apply(device, &sample, timestamp, out)
    }

    /// Axis events come first in ascending axis order, then button events in
    /// ascending button order.
    pub(crate) fn apply(
        &self,
        device: &mut Device,
        sample: &RawSample,
        timestamp: f64,
        out: &mut EventBatch,
    ) -> Result<(), PlatformError> {
        validate(device, sample)?;

        for (axis, (stored, raw)) in
            device.axes.iter_mut().zip(sample.axes.iter()).enumerate()
        {
            let value = raw.clamp(-1.0, 1.0);
            let last_value = *stored;
            *stored = value;
            if (value - last_value).abs() > self.threshold {
                out.push(Event::AxisMoved {
                    device_id: device.id.clone(),
                    axis: axis as u32,
                    value,
                    last_value,
                    timestamp,
                });
            }
        }

        for (button, (stored, &pressed)) in
            device.buttons.iter_mut().zip(sample.buttons.iter()).enumerate()
        {
            if *stored == pressed {
                continue;
            }
            *stored = pressed;
            let device_id = device.id.clone();
            let button = button as u32;
            out.push(if pressed {
                Event::ButtonDown {
                    device_id,
                    button,
                    timestamp,
                }
            } else {
                Event::ButtonUp {
                    device_id,
                    button,
                    timestamp,
                }
            });
        }

        Ok(())
    }
}

fn validate(device: &Device, sample: &RawSample) -> Result<(), PlatformError> {
    let malformed = |reason: String| PlatformError::Malformed {
        device_id: device.id.to_string(),
        reason,
    };
    if sample.axes.len() != device.axes.len() {
        return Err(malformed(format!(
            "expected {} axes, got {}",
            device.axes.len(),
            sample.axes.len()
        )));
    }
    if sample.buttons.len() != device.buttons.len() {
        return Err(malformed(format!(
            "expected {} buttons, got {}",
            device.buttons.len(),
            sample.buttons.len()
        )));
    }
    if let Some(axis) = sample.axes.iter().position(|v| !v.is_finite()) {
        return Err(malformed(format!("axis {axis} is not finite")));
    }
    Ok(())
}
