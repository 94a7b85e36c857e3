use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::cmd::{CommandRunner, SystemRunner};
use crate::config::ADBConfig;
use crate::error::{ADBError, ADBResult};

/// `devices` 输出中表示设备可用的状态标记
pub const DEVICE_STATE_TOKEN: &str = "device";

/// ADB 设备状态枚举
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Online,
    Offline,
    Unauthorized,
    Other(String),
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "{}", DEVICE_STATE_TOKEN),
            DeviceStatus::Offline => write!(f, "offline"),
            DeviceStatus::Unauthorized => write!(f, "unauthorized"),
            DeviceStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for DeviceStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            DEVICE_STATE_TOKEN => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            "unauthorized" => DeviceStatus::Unauthorized,
            _ => DeviceStatus::Other(s.to_string()),
        }
    }
}

/// `devices` 输出中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ADBDevice {
    pub id: String,
    pub status: DeviceStatus,
    /// 该行是否带有可用状态标记
    pub usable: bool,
}

impl ADBDevice {
    /// 解析一行设备列表，空行返回 None
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let id = parts.next()?.to_string();
        let status = parts.next().map(DeviceStatus::from).unwrap_or(DeviceStatus::Other(String::new()));
        let usable = line.split_whitespace().any(|token| token == DEVICE_STATE_TOKEN);

        Some(Self { id, status, usable })
    }

    pub fn is_online(&self) -> bool {
        self.usable
    }
}

/// 解析 `devices` 的输出，跳过第一行标题
pub fn parse_devices(output: &str) -> Vec<ADBDevice> {
    output
        .lines()
        .skip(1)
        .filter_map(ADBDevice::parse_line)
        .collect()
}

/// ADB 主结构体
#[derive(Clone, Debug)]
pub struct ADB {
    pub config: ADBConfig,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

impl ADB {
    /// 使用系统进程创建 ADB 实例
    pub fn new(config: Option<ADBConfig>) -> Self {
        Self::with_runner(config.unwrap_or_default(), Arc::new(SystemRunner))
    }

    /// 使用自定义的进程启动方式创建实例
    pub fn with_runner(config: ADBConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// 获取外部工具路径
    pub fn adb_path(&self) -> &std::path::PathBuf {
        &self.config.path
    }

    /// 列出设备
    pub fn list_devices(&self) -> ADBResult<Vec<ADBDevice>> {
        let stdout = self.run_checked(&["devices"])?;
        trace!("devices 输出: {}", stdout);

        let devices = parse_devices(&stdout);
        debug!("发现 {} 行设备记录", devices.len());
        Ok(devices)
    }

    /// 检查是否有可用设备
    ///
    /// 命令失败时返回原始错误；没有可用设备时返回 [`ADBError::DeviceNotFound`]。
    pub fn check_device(&self) -> ADBResult<ADBDevice> {
        let devices = self.list_devices()?;

        match devices.into_iter().find(ADBDevice::is_online) {
            Some(device) => {
                info!("使用设备 {} ({})", device.id, device.status);
                Ok(device)
            }
            None => Err(ADBError::DeviceNotFound(format!(
                "{} 没有检测到设备，请检查 USB 连接和调试开关后重试",
                self.config.path.display()
            ))),
        }
    }
}
