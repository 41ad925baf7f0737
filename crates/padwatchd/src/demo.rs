use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver};
use padwatch::{RawDeviceInfo, VirtualPlatform};

const PAD_ID: &str = "virtual:0";
const GUEST_ID: &str = "virtual:1";
const STEP: Duration = Duration::from_millis(100);

fn pad() -> RawDeviceInfo {
    RawDeviceInfo::new(PAD_ID, "Virtual gamepad", 4, 12).with_usb_ids(0x045e, 0x028e)
}

fn guest() -> RawDeviceInfo {
    RawDeviceInfo::new(GUEST_ID, "Virtual joystick", 2, 2)
}

/// A virtual platform with one pad already attached.
pub(crate) fn platform() -> VirtualPlatform {
    let platform = VirtualPlatform::new();
    platform.plug(pad());
    platform
}

/// Scripts the virtual pads until `stop` is closed: the left stick sweeps,
/// button 0 toggles every second and a second device comes and goes.
pub(crate) fn spawn_script(platform: VirtualPlatform, stop: Receiver<()>) -> JoinHandle<()> {
    thread::spawn(move || {
        let ticker = tick(STEP);
        let mut step: u32 = 0;
        loop {
            select! {
                recv(stop) -> _ => break,
                recv(ticker) -> _ => {
                    step = step.wrapping_add(1);
                    let phase = (step % 40) as f32 / 40.0 * std::f32::consts::TAU;
                    platform.set_axis(PAD_ID, 0, (phase.sin() * 100.0).round() / 100.0);
                    platform.set_axis(PAD_ID, 1, (phase.cos() * 100.0).round() / 100.0);
                    platform.set_button(PAD_ID, 0, (step / 10) % 2 == 1);
                    match step % 60 {
                        20 => platform.plug(guest()),
                        50 => {
                            platform.unplug(GUEST_ID);
                        }
                        _ => {}
                    }
                }
            }
        }
    })
}
