use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ADBError, ADBResult};

/// 未设置日志级别时使用的默认过滤条件
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// 工具配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ADBConfig {
    /// 外部工具可执行文件路径
    pub path: PathBuf,
    /// 每条命令前附加的全局参数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_args: Option<Vec<String>>,
    /// 设备上截图的临时路径
    pub screenshot_tmp: String,
    /// 设备上录屏的临时路径
    pub record_tmp: String,
    /// 录制线程检查停止标志的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 结束录制后等待设备写完文件的时间（毫秒）
    pub flush_delay_ms: u64,
    /// 本地输出目录
    pub output_dir: PathBuf,
    /// 日志级别
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for ADBConfig {
    fn default() -> Self {
        ADBConfig {
            path: PathBuf::from("adbb"),
            additional_args: None,
            screenshot_tmp: "/sdcard/tre_screenshot_tmp.png".to_string(),
            record_tmp: "/sdcard/tre_record_tmp.mp4".to_string(),
            poll_interval_ms: 200,
            flush_delay_ms: 1000,
            output_dir: PathBuf::from("."),
            log_level: None,
        }
    }
}

impl ADBConfig {
    pub fn builder() -> ADBConfigBuilder {
        ADBConfigBuilder::default()
    }

    /// 日志默认过滤条件，`RUST_LOG` 可覆盖
    pub fn log_filter(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// 配置构建器
#[derive(Default)]
pub struct ADBConfigBuilder {
    path: Option<PathBuf>,
    additional_args: Option<Vec<String>>,
    screenshot_tmp: Option<String>,
    record_tmp: Option<String>,
    poll_interval_ms: Option<u64>,
    flush_delay_ms: Option<u64>,
    output_dir: Option<PathBuf>,
    log_level: Option<String>,
}

impl ADBConfigBuilder {
    /// 设置外部工具路径
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 添加全局命令行参数
    pub fn add_arg(mut self, arg: &str) -> Self {
        self.additional_args
            .get_or_insert_with(Vec::new)
            .push(arg.to_string());
        self
    }

    pub fn screenshot_tmp(mut self, path: &str) -> Self {
        self.screenshot_tmp = Some(path.to_string());
        self
    }

    pub fn record_tmp(mut self, path: &str) -> Self {
        self.record_tmp = Some(path.to_string());
        self
    }

    /// 设置停止标志轮询间隔
    pub fn poll_interval_ms(mut self, interval: u64) -> Self {
        self.poll_interval_ms = Some(interval);
        self
    }

    /// 设置停止录制后的等待时间
    pub fn flush_delay_ms(mut self, delay: u64) -> Self {
        self.flush_delay_ms = Some(delay);
        self
    }

    /// 设置本地输出目录
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// 设置日志级别
    pub fn log_level(mut self, level: &str) -> Self {
        self.log_level = Some(level.to_string());
        self
    }

    /// 构建并校验配置
    pub fn build(self) -> ADBResult<ADBConfig> {
        let default = ADBConfig::default();

        let config = ADBConfig {
            path: self.path.unwrap_or(default.path),
            additional_args: self.additional_args,
            screenshot_tmp: self.screenshot_tmp.unwrap_or(default.screenshot_tmp),
            record_tmp: self.record_tmp.unwrap_or(default.record_tmp),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(default.poll_interval_ms),
            flush_delay_ms: self.flush_delay_ms.unwrap_or(default.flush_delay_ms),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            log_level: self.log_level,
        };

        if config.poll_interval_ms == 0 {
            return Err(ADBError::ConfigError("轮询间隔必须大于 0".to_string()));
        }
        if config.screenshot_tmp.trim().is_empty() || config.record_tmp.trim().is_empty() {
            return Err(ADBError::ConfigError("设备临时路径不能为空".to_string()));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_falls_back_to_defaults() {
        let config = ADBConfig::builder().path("/opt/adb").build().unwrap();
        assert_eq!(config.path, PathBuf::from("/opt/adb"));
        assert_eq!(config.poll_interval_ms, 200);
        assert_eq!(config.record_tmp, "/sdcard/tre_record_tmp.mp4");
        assert!(config.additional_args.is_none());
    }

    #[test]
    fn builder_collects_args() {
        let config = ADBConfig::builder().add_arg("-s").add_arg("emulator-5554").build().unwrap();
        assert_eq!(
            config.additional_args,
            Some(vec!["-s".to_string(), "emulator-5554".to_string()])
        );
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(ADBConfig::default().log_filter(), "info");
        let config = ADBConfig::builder().log_level("debug").build().unwrap();
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = ADBConfig::builder().poll_interval_ms(0).build().unwrap_err();
        assert!(matches!(err, ADBError::ConfigError(_)));
    }

    #[test]
    fn empty_tmp_path_is_rejected() {
        assert!(ADBConfig::builder().record_tmp("  ").build().is_err());
    }
}
