mod error;
mod config;
mod device;
mod cmd;
mod transfer;

// 功能模块
pub mod media;
pub mod session;
pub mod panel;
#[cfg(feature = "gui")]
pub mod gui;
pub mod utils;

#[cfg(test)]
mod testing;

// 导出主要类型
pub use cmd::{CaptureProcess, CommandOutput, CommandRunner, SystemRunner};
pub use config::{ADBConfig, ADBConfigBuilder};
pub use device::{parse_devices, ADBDevice, DeviceStatus, ADB};
pub use error::{ADBError, ADBResult, Severity};
pub use session::{LogSink, RecorderState, ScreenRecorder, StatusSink};

// 便利的预导出模块
pub mod prelude {
    pub use super::{ADB, ADBConfig, ADBConfigBuilder, ADBError, ADBResult};
    pub use super::session::{ScreenRecorder, StatusSink};
}
