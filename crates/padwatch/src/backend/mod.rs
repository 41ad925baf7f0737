//! Platform backends.
//!
//! # Feature flags
//! - **`sdl2-backend`** enables [`SdlPlatform`], built on SDL2 joysticks.
//!
//! [`VirtualPlatform`] is always available. It is scripted by the host and
//! backs tests, benchmarks and the daemon's demo mode.

mod virtual_pad;

#[cfg(feature = "sdl2-backend")]
mod sdl;

pub use virtual_pad::VirtualPlatform;

#[cfg(feature = "sdl2-backend")]
pub use sdl::SdlPlatform;
