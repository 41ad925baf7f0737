use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::error::QueryError;
use crate::events::Event;
use crate::platform::HotplugNotice;
use crate::types::{DeviceId, DeviceIndex, DeviceSnapshot, RawDeviceInfo};

/// A device owned by the table, with its live state buffers.
#[derive(Debug, Clone)]
pub(crate) struct Device {
    pub(crate) index: DeviceIndex,
    pub(crate) id: DeviceId,
    pub(crate) description: String,
    pub(crate) vendor_id: u16,
    pub(crate) product_id: u16,
    pub(crate) axes: Vec<f32>,
    pub(crate) buttons: Vec<bool>,
    /// The backend reported the device gone since the last detect.
    pub(crate) stale: bool,
}

impl Device {
    pub(crate) fn attach(index: DeviceIndex, info: RawDeviceInfo) -> Self {
        Self {
            index,
            id: Arc::from(info.device_id),
            description: info.description,
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            axes: vec![0.0; info.axis_count],
            buttons: vec![false; info.button_count],
            stale: false,
        }
    }

    /// Whether `info` still describes this device's identity and layout.
    fn matches(&self, info: &RawDeviceInfo) -> bool {
        self.axes.len() == info.axis_count
            && self.buttons.len() == info.button_count
            && self.vendor_id == info.vendor_id
            && self.product_id == info.product_id
    }

    pub(crate) fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            index: self.index,
            device_id: self.id.clone(),
            description: self.description.clone(),
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            axis_states: self.axes.clone(),
            button_states: self.buttons.clone(),
        }
    }
}

/// Dense set of attached devices, addressable by index and by device id.
///
/// Indices only change inside [`DeviceTable::reconcile`].
#[derive(Debug, Default)]
pub(crate) struct DeviceTable {
    devices: Vec<Device>,
    by_id: AHashMap<DeviceId, DeviceIndex>,
}

impl DeviceTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.devices.len()
    }

    pub(crate) fn snapshot(&self, index: DeviceIndex) -> Result<DeviceSnapshot, QueryError> {
        self.devices
            .get(index)
            .map(Device::snapshot)
            .ok_or(QueryError::IndexOutOfRange {
                index,
                count: self.devices.len(),
            })
    }

    pub(crate) fn index_of(&self, device_id: &str) -> Option<DeviceIndex> {
        self.by_id.get(device_id).copied()
    }

    pub(crate) fn snapshots(&self) -> Vec<DeviceSnapshot> {
        self.devices.iter().map(Device::snapshot).collect()
    }

    /// Devices in ascending index order.
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Device> {
        self.devices.iter_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.devices.clear();
        self.by_id.clear();
    }

    /// Reconciles the table against a fresh platform listing.
    ///
    /// Devices missing from `listed` are removed. So are devices whose listing
    /// reports a different layout or USB ids, and devices that the hotplug
    /// `notices` show as removed and attached again (a replug between two
    /// detects). With `resync` set every device counts as replugged, for when
    /// notices were lost. Removed devices that are still listed come back as
    /// new ones. New devices take the lowest free indices in device id order. Holes left over afterwards are closed by shifting the following
    /// devices down, keeping their relative order.
    ///
    /// Returns remove events in ascending former index, then attach events in
    /// ascending new index.
    pub(crate) fn reconcile(
        &mut self,
        listed: Vec<RawDeviceInfo>,
        notices: &[HotplugNotice],
        resync: bool,
    ) -> Vec<Event> {
        let listed = dedup_listing(listed);
        let by_listed_id: AHashMap<&str, &RawDeviceInfo> = listed
            .iter()
            .map(|info| (info.device_id.as_str(), info))
            .collect();
        let replugged = replugged_ids(notices);

        let mut events = Vec::new();
        let mut slots: Vec<Option<Device>> =
            std::mem::take(&mut self.devices).into_iter().map(Some).collect();

        for slot in &mut slots {
            let keep = slot.as_ref().is_some_and(|device| {
                let Some(info) = by_listed_id.get(&*device.id) else {
                    return false;
                };
                if !device.matches(info) {
                    log::debug!("device {} changed layout, reattaching", device.id);
                    return false;
                }
                !resync && !replugged.contains(&*device.id)
            });
            if keep {
                if let Some(device) = slot.as_mut() {
                    device.stale = false;
                }
                continue;
            }
            if let Some(device) = slot.take() {
                log::debug!("device removed - {} index={}", device.id, device.index);
                events.push(Event::Removed {
                    device_id: device.id,
                });
            }
        }
        drop(by_listed_id);

        let kept: AHashSet<DeviceId> = slots.iter().flatten().map(|d| d.id.clone()).collect();
        let mut fresh: Vec<RawDeviceInfo> = listed
            .into_iter()
            .filter(|info| !kept.contains(info.device_id.as_str()))
            .collect();
        fresh.sort_by(|a, b| a.device_id.cmp(&b.device_id));

        let mut fresh_ids = Vec::with_capacity(fresh.len());
        let mut cursor = 0;
        for info in fresh {
            while cursor < slots.len() && slots[cursor].is_some() {
                cursor += 1;
            }
            let device = Device::attach(cursor, info);
            fresh_ids.push(device.id.clone());
            if cursor < slots.len() {
                slots[cursor] = Some(device);
            } else {
                slots.push(Some(device));
            }
        }

        self.devices = slots.into_iter().flatten().collect();
        self.by_id.clear();
        for (index, device) in self.devices.iter_mut().enumerate() {
            device.index = index;
            self.by_id.insert(device.id.clone(), index);
        }

        for id in fresh_ids {
            if let Some(index) = self.index_of(&id) {
                let device = &self.devices[index];
                log::debug!(
                    "device attached - {} id={} index={} vid=0x{:04x} pid=0x{:04x}",
                    device.description,
                    device.id,
                    index,
                    device.vendor_id,
                    device.product_id
                );
                events.push(Event::Attached(device.snapshot()));
            }
        }

        events
    }
}

fn dedup_listing(listed: Vec<RawDeviceInfo>) -> Vec<RawDeviceInfo> {
    let mut seen = AHashSet::with_capacity(listed.len());
    listed
        .into_iter()
        .filter(|info| {
            let first = seen.insert(info.device_id.clone());
            if !first {
                log::warn!("platform listed {} twice, ignoring duplicate", info.device_id);
            }
            first
        })
        .collect()
}

/// Ids that were removed and then attached again, according to `notices`.
fn replugged_ids(notices: &[HotplugNotice]) -> AHashSet<&str> {
    let mut removed = AHashSet::new();
    let mut replugged = AHashSet::new();
    for notice in notices {
        match notice {
            HotplugNotice::Removed(id) => {
                removed.insert(id.as_str());
            }
            HotplugNotice::Attached(info) => {
                if removed.contains(info.device_id.as_str()) {
                    replugged.insert(info.device_id.as_str());
                }
            }
        }
    }
    replugged
}
