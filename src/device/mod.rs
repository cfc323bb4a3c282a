pub mod adb;
pub mod mock;
pub mod types;

pub use adb::{AdbDevice, AdbDeviceConfig};
pub use mock::{DeviceGesture, MockDevice, MockFramebuffer};
pub use types::{DeviceDriver, DeviceError, DeviceKey, DeviceResult};
