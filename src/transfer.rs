use crate::device::ADB;
use crate::error::{ADBError, ADBResult};
use log::{debug, info, warn};
use std::path::Path;

impl ADB {
    /// 文件拉取
    ///
    /// 调用失败或 stderr 非空都视为传输失败，不重试。
    pub fn pull(&self, device_path: &str, local_path: &Path) -> ADBResult<()> {
        let local = local_path.to_string_lossy();
        info!("开始从设备拉取文件: {} -> {}", device_path, local);

        let output = self.run(&["pull", device_path, &local])?;
        if !output.stderr.is_empty() {
            return Err(ADBError::TransferError(output.stderr));
        }

        debug!("成功拉取文件 {} 到 {}", device_path, local);
        Ok(())
    }

    /// 删除设备上的文件
    pub fn remove_device_file(&self, device_path: &str) -> ADBResult<()> {
        self.shell(&["rm", device_path])?;
        debug!("已删除设备临时文件: {}", device_path);
        Ok(())
    }

    /// 删除设备上的临时文件，失败只记录日志
    pub(crate) fn discard_device_file(&self, device_path: &str) {
        if let Err(e) = self.remove_device_file(device_path) {
            warn!("删除设备临时文件 {} 失败: {}", device_path, e);
        }
    }
}
