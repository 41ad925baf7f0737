use crossbeam_channel::Receiver;

use crate::types::{DeviceId, DeviceSnapshot};

/// Events emitted by a session about device lifecycle and input.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A device has been attached and assigned an index.
    Attached(DeviceSnapshot),
    /// A previously attached device has been removed.
    Removed { device_id: DeviceId },
    /// A button transitioned from released to pressed.
    ButtonDown {
        device_id: DeviceId,
        button: u32,
        timestamp: f64,
    },
    /// A button transitioned from pressed to released.
    ButtonUp {
        device_id: DeviceId,
        button: u32,
        timestamp: f64,
    },
    /// An axis moved; values are normalized to [-1.0, 1.0].
    AxisMoved {
        device_id: DeviceId,
        axis: u32,
        value: f32,
        last_value: f32,
        timestamp: f64,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Attached(_) => EventKind::Attach,
            Event::Removed { .. } => EventKind::Remove,
            Event::ButtonDown { .. } => EventKind::ButtonDown,
            Event::ButtonUp { .. } => EventKind::ButtonUp,
            Event::AxisMoved { .. } => EventKind::AxisMove,
        }
    }

    pub fn device_id(&self) -> &str {
        match self {
            Event::Attached(device) => &device.device_id,
            Event::Removed { device_id }
            | Event::ButtonDown { device_id, .. }
            | Event::ButtonUp { device_id, .. }
            | Event::AxisMoved { device_id, .. } => device_id,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = self.kind().as_str();
        match self {
            Event::Attached(device) => write!(f, "{tag} {device}"),
            Event::Removed { device_id } => write!(f, "{tag} {device_id}"),
            Event::ButtonDown {
                device_id,
                button,
                timestamp,
            }
            | Event::ButtonUp {
                device_id,
                button,
                timestamp,
            } => write!(f, "{tag} {device_id} {button} {timestamp:.3}"),
            Event::AxisMoved {
                device_id,
                axis,
                value,
                last_value,
                timestamp,
            } => write!(
                f,
                "{tag} {device_id} {axis} {value:.4} {last_value:.4} {timestamp:.3}"
            ),
        }
    }
}

/// The five event kinds a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Attach = 0,
    Remove = 1,
    ButtonDown = 2,
    ButtonUp = 3,
    AxisMove = 4,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Attach,
        EventKind::Remove,
        EventKind::ButtonDown,
        EventKind::ButtonUp,
        EventKind::AxisMove,
    ];

    /// Stable tag of the event payload shape.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Attach => "attach",
            EventKind::Remove => "remove",
            EventKind::ButtonDown => "down",
            EventKind::ButtonUp => "up",
            EventKind::AxisMove => "move",
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of event kinds, packed into a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b1_1111)
    }

    /// Create a set from a slice of kinds.
    pub fn new(kinds: &[EventKind]) -> Self {
        let mut set = Self::empty();
        for kind in kinds {
            set.insert(*kind);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, kind: EventKind) {
        self.0 |= kind.bit();
    }

    #[inline]
    pub fn remove(&mut self, kind: EventKind) {
        self.0 &= !kind.bit();
    }

    #[inline]
    pub fn contains(&self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<EventKind> for KindSet {
    fn from(kind: EventKind) -> Self {
        Self(kind.bit())
    }
}

/// Receiving end of a channel subscription.
pub type EventReceiver = Receiver<Event>;
