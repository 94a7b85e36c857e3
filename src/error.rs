use thiserror::Error;

/// 截图/录屏操作相关的错误类型
#[derive(Debug, Error)]
pub enum ADBError {
    /// 无法启动外部工具（例如找不到可执行文件）
    #[error("ADB 命令错误: {0}")]
    CommandError(String),

    /// 设备端命令在 stderr 上报告了错误
    #[error("设备命令失败: {0}")]
    DeviceError(String),

    /// 本地文件操作错误
    #[error("文件操作错误: {0}")]
    FileError(String),

    /// 从设备拉取文件失败
    #[error("拉取失败: {0}")]
    TransferError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 没有检测到可用设备
    #[error("未检测到设备: {0}")]
    DeviceNotFound(String),

    /// 已有录制会话在进行
    #[error("录制已经在进行中")]
    RecordingActive,

    /// 当前没有录制会话
    #[error("当前没有正在进行的录制")]
    NoActiveRecording,
}

/// 错误呈现给用户时的级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl ADBError {
    /// 决定界面层以何种对话框展示该错误
    pub fn severity(&self) -> Severity {
        match self {
            ADBError::DeviceNotFound(_) => Severity::Warning,
            ADBError::RecordingActive | ADBError::NoActiveRecording => Severity::Info,
            _ => Severity::Error,
        }
    }
}

impl From<std::io::Error> for ADBError {
    fn from(error: std::io::Error) -> Self {
        ADBError::FileError(error.to_string())
    }
}

pub type ADBResult<T> = Result<T, ADBError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_error_kind() {
        assert_eq!(ADBError::DeviceNotFound("x".into()).severity(), Severity::Warning);
        assert_eq!(ADBError::RecordingActive.severity(), Severity::Info);
        assert_eq!(ADBError::NoActiveRecording.severity(), Severity::Info);
        assert_eq!(ADBError::CommandError("x".into()).severity(), Severity::Error);
        assert_eq!(ADBError::TransferError("x".into()).severity(), Severity::Error);
    }

    #[test]
    fn io_errors_become_file_errors() {
        let err: ADBError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ADBError::FileError(ref m) if m.contains("gone")));
    }
}
