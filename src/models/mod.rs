pub mod device;
pub mod session;

pub use device::{ConnectionDetails, Device, DeviceModel};
pub use session::{FocusSample, RawSignalSample, SessionData, EEG_CHANNELS};
