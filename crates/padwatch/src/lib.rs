//! Device table and event dispatch for gamepads and joysticks.
//!
//! A [`Session`] tracks the devices a [`Platform`] reports, diffs their
//! readings between cycles and delivers attach, remove, button and axis
//! events to handlers registered on its [`Dispatcher`].
//!
//! ```
//! use padwatch::{RawDeviceInfo, Session, VirtualPlatform};
//!
//! let platform = VirtualPlatform::new();
//! platform.plug(RawDeviceInfo::new("pad-0", "Virtual pad", 2, 4));
//!
//! let mut session = Session::new(platform.clone());
//! session.dispatcher().on_attach(|device| {
//!     assert_eq!(device.button_count(), 4);
//! });
//! session.init().unwrap();
//! session.detect_devices().unwrap();
//!
//! platform.set_button("pad-0", 2, true);
//! session.process_events().unwrap();
//! assert!(session.device_at_index(0).unwrap().button_states[2]);
//! ```

mod backend;
mod config;
mod dispatcher;
mod error;
mod events;
mod platform;
mod sampler;
mod session;
mod table;
mod types;

pub use crate::backend::VirtualPlatform;
#[cfg(feature = "sdl2-backend")]
pub use crate::backend::SdlPlatform;
pub use crate::config::SessionConfig;
pub use crate::dispatcher::{Dispatcher, SubscriptionId};
pub use crate::error::{
    ConfigError, HandlerError, PlatformError, QueryError, Result, SessionError,
};
pub use crate::events::{Event, EventKind, EventReceiver, KindSet};
pub use crate::platform::{
    hotplug_channel, HotplugNotice, HotplugReceiver, HotplugSender, Platform,
};
pub use crate::session::Session;
pub use crate::types::{DeviceId, DeviceIndex, DeviceSnapshot, RawDeviceInfo, RawSample};
