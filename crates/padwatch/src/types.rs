use std::sync::Arc;

/// Opaque device identity shared between the table and emitted events.
pub type DeviceId = Arc<str>;

/// Dense position of an attached device, stable between detect cycles.
pub type DeviceIndex = usize;

/// Device description as reported by a platform listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeviceInfo {
    pub device_id: String,
    pub description: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub axis_count: usize,
    pub button_count: usize,
}

impl RawDeviceInfo {
    pub fn new(
        device_id: impl Into<String>,
        description: impl Into<String>,
        axis_count: usize,
        button_count: usize,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            description: description.into(),
            vendor_id: 0,
            product_id: 0,
            axis_count,
            button_count,
        }
    }

    pub fn with_usb_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }
}

/// One raw reading of every axis and button of a device.
///
/// Axis values are expected in `[-1.0, 1.0]`; lengths must match the counts
/// the device was listed with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSample {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

impl RawSample {
    /// A sample with every axis centered and every button released.
    pub fn neutral(axis_count: usize, button_count: usize) -> Self {
        Self {
            axes: vec![0.0; axis_count],
            buttons: vec![false; button_count],
        }
    }
}

/// Owned copy of a device descriptor and its state at the time of the call.
///
/// Never updated after it is returned; query again for fresh state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub index: DeviceIndex,
    pub device_id: DeviceId,
    pub description: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub axis_states: Vec<f32>,
    pub button_states: Vec<bool>,
}

impl DeviceSnapshot {
    pub fn axis_count(&self) -> usize {
        self.axis_states.len()
    }

    pub fn button_count(&self) -> usize {
        self.button_states.len()
    }
}

impl std::fmt::Display for DeviceSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} ({}) vid=0x{:04x} pid=0x{:04x} axes={} buttons={}",
            self.index,
            self.description,
            self.device_id,
            self.vendor_id,
            self.product_id,
            self.axis_count(),
            self.button_count()
        )
    }
}
