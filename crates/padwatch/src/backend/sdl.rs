use ahash::AHashMap;
use sdl2::joystick::Joystick;
use sdl2::{GameControllerSubsystem, JoystickSubsystem, Sdl};

use crate::error::PlatformError;
use crate::platform::Platform;
use crate::types::{RawDeviceInfo, RawSample};

const AXIS_SCALE: f32 = i16::MAX as f32;

struct OpenJoystick {
    joystick: Joystick,
    info: RawDeviceInfo,
}

/// SDL2 joystick backend.
///
/// Device ids are `sdl:<instance id>`; SDL assigns a fresh instance id on
/// every connection, so a replugged pad shows up as a new device. SDL
/// contexts are not `Send`: create and drive this platform on one thread.
pub struct SdlPlatform {
    _sdl: Sdl,
    joysticks: JoystickSubsystem,
    controllers: GameControllerSubsystem,
    open: AHashMap<String, OpenJoystick>,
}

impl SdlPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let sdl = sdl2::init().map_err(PlatformError::Backend)?;
        let joysticks = sdl.joystick().map_err(PlatformError::Backend)?;
        let controllers = sdl.game_controller().map_err(PlatformError::Backend)?;
        Ok(Self {
            _sdl: sdl,
            joysticks,
            controllers,
            open: AHashMap::new(),
        })
    }

    fn describe(&self, index: u32, joystick: &Joystick, device_id: String) -> RawDeviceInfo {
        // Vendor and product ids are only exposed through the controller API.
        let (vendor_id, product_id) = if self.controllers.is_game_controller(index) {
            match self.controllers.open(index) {
                Ok(controller) => (
                    controller.vendor_id().unwrap_or(0),
                    controller.product_id().unwrap_or(0),
                ),
                Err(_) => (0, 0),
            }
        } else {
            (0, 0)
        };
        RawDeviceInfo {
            device_id,
            description: joystick.name(),
            vendor_id,
            product_id,
            axis_count: joystick.num_axes() as usize,
            button_count: joystick.num_buttons() as usize,
        }
    }
}

impl Platform for SdlPlatform {
    fn begin_cycle(&mut self) {
        self.joysticks.update();
    }

    fn list_devices(&mut self) -> Result<Vec<RawDeviceInfo>, PlatformError> {
        self.joysticks.update();
        let count = self
            .joysticks
            .num_joysticks()
            .map_err(PlatformError::Backend)?;

        let mut listed = Vec::with_capacity(count as usize);
        let mut still_open = AHashMap::with_capacity(count as usize);
        for index in 0..count {
            let joystick = match self.joysticks.open(index) {
                Ok(joystick) => joystick,
                Err(e) => {
                    log::warn!("failed to open joystick {index}: {e}");
                    continue;
                }
            };
            let device_id = format!("sdl:{}", joystick.instance_id());
            let entry = match self.open.remove(&device_id) {
                Some(entry) => entry,
                None => {
                    let info = self.describe(index, &joystick, device_id.clone());
                    OpenJoystick { joystick, info }
                }
            };
            listed.push(entry.info.clone());
            still_open.insert(device_id, entry);
        }
        self.open = still_open;
        Ok(listed)
    }

    fn sample_device(&mut self, device_id: &str) -> Result<RawSample, PlatformError> {
        let Some(entry) = self.open.get(device_id) else {
            return Err(PlatformError::DeviceGone(device_id.to_string()));
        };
        if !entry.joystick.attached() {
            return Err(PlatformError::DeviceGone(device_id.to_string()));
        }

        let mut sample = RawSample::neutral(entry.info.axis_count, entry.info.button_count);
        for (axis, value) in sample.axes.iter_mut().enumerate() {
            let raw = entry
                .joystick
                .axis(axis as u32)
                .map_err(|e| PlatformError::Backend(e.to_string()))?;
            *value = (f32::from(raw) / AXIS_SCALE).max(-1.0);
        }
        for (button, pressed) in sample.buttons.iter_mut().enumerate() {
            *pressed = entry
                .joystick
                .button(button as u32)
                .map_err(|e| PlatformError::Backend(e.to_string()))?;
        }
        Ok(sample)
    }

    fn axis_precision(&self) -> f32 {
        1.0 / AXIS_SCALE
    }
}
