use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver};
use padwatch::{KindSet, Platform, Session};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::{print_debug, print_info, print_warning};

/// Runs detect and process-events cycles on the calling thread until `stop` fires.
pub(crate) fn run<P: Platform>(
    session: &mut Session<P>,
    config: &DaemonConfig,
    stop: &Receiver<()>,
) -> Result<(), DaemonError> {
    session.dispatcher().subscribe(KindSet::all(), |event| {
        print_info!("{event}");
        Ok(())
    });

    session.init()?;
    session.detect_devices()?;
    print_info!(
        "padwatchd started with {} device(s). Polling every {}ms, detecting every {}ms.",
        session.num_devices(),
        config.poll_interval_ms,
        config.detect_interval_ms
    );

    let poll = tick(Duration::from_millis(config.poll_interval_ms));
    let detect = tick(Duration::from_millis(config.detect_interval_ms));
    loop {
        select! {
            recv(stop) -> _ => {
                print_debug!("stop requested");
                break;
            }
            recv(detect) -> _ => {
                if let Err(e) = session.detect_devices() {
                    print_warning!("detect failed: {e}");
                }
            }
            recv(poll) -> _ => {
                session.process_events()?;
            }
        }
    }

    session.shutdown()?;
    Ok(())
}

/// Detects once and prints every device.
pub(crate) fn list<P: Platform>(session: &mut Session<P>) -> Result<(), DaemonError> {
    session.init()?;
    session.detect_devices()?;
    let devices = session.devices();
    if devices.is_empty() {
        print_info!("no devices attached");
    }
    for device in devices {
        print_info!("{device}");
    }
    session.shutdown()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;
    use padwatch::{RawDeviceInfo, VirtualPlatform};

    use super::*;

    #[test]
    fn run_stops_on_signal_and_shuts_down() {
        let platform = VirtualPlatform::new();
        platform.plug(RawDeviceInfo::new("a", "Pad", 1, 1));
        let mut session = Session::new(platform);
        let config = DaemonConfig {
            poll_interval_ms: 1,
            detect_interval_ms: 5,
            ..DaemonConfig::default()
        };
        let (tx, rx) = bounded(1);
        tx.send(()).unwrap();

        run(&mut session, &config, &rx).unwrap();
        assert!(!session.is_active());
    }

    #[test]
    fn list_leaves_session_stopped() {
        let platform = VirtualPlatform::new();
        platform.plug(RawDeviceInfo::new("a", "Pad", 1, 1));
        let mut session = Session::new(platform);
        list(&mut session).unwrap();
        assert!(!session.is_active());
    }
}
