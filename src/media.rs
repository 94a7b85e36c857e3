use crate::cmd::CaptureProcess;
use crate::device::ADB;
use crate::error::ADBResult;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::path::PathBuf;

/// 截图文件名前缀
pub const SCREENSHOT_PREFIX: &str = "screenshot";
/// 录屏文件名前缀
pub const RECORD_PREFIX: &str = "record";

/// 生成 `<prefix>_YYYYMMDD_HHMMSS.<ext>` 形式的文件名
pub fn capture_file_name(prefix: &str, ext: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), ext)
}

impl ADB {
    /// 本次采集在本地的输出路径
    pub(crate) fn local_output(&self, prefix: &str, ext: &str) -> PathBuf {
        self.config
            .output_dir
            .join(capture_file_name(prefix, ext, Local::now()))
    }

    /// 从设备截图
    ///
    /// 设备端截图、拉取到本地、删除设备临时文件。截图或拉取失败时直接返回错误，
    /// 设备上的临时文件保持原样。不检查设备是否在线，对外只经由
    /// [`ScreenRecorder::take_screenshot`](crate::session::ScreenRecorder::take_screenshot) 调用。
    pub(crate) fn take_screenshot<F>(&self, progress: F) -> ADBResult<PathBuf>
    where
        F: Fn(&str),
    {
        let device_path = self.config.screenshot_tmp.clone();
        let output_path = self.local_output(SCREENSHOT_PREFIX, "png");

        progress("正在设备上截图...");
        self.shell(&["screencap", "-p", &device_path])?;

        progress("正在从设备拉取截图...");
        self.pull(&device_path, &output_path)?;
        self.discard_device_file(&device_path);

        info!("截图已保存到 {}", output_path.display());
        Ok(output_path)
    }

    /// 启动设备录屏，进程会一直运行到被终止（或设备达到时长上限）
    pub fn start_screenrecord(&self) -> ADBResult<Box<dyn CaptureProcess>> {
        let process = self.spawn(&["shell", "screenrecord", &self.config.record_tmp])?;
        debug!("screenrecord 已启动，设备临时文件 {}", self.config.record_tmp);
        Ok(process)
    }
}
