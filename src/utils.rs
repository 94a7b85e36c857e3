use crate::error::{ADBError, ADBResult};
use log::debug;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 按固定间隔轮询，直到条件成立或超时
///
/// 条件在超时前成立返回 `true`，否则返回 `false`。
pub fn wait_with_polling<F>(timeout: Duration, interval: Duration, mut condition_fn: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();

    loop {
        if condition_fn() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(interval);
    }
}

/// 按固定间隔轮询，直到条件成立（不设超时）
pub fn poll_until<F>(interval: Duration, mut condition_fn: F)
where
    F: FnMut() -> bool,
{
    while !condition_fn() {
        std::thread::sleep(interval);
    }
}

/// 将当前工作目录切换到可执行文件所在目录，输出文件都写在这里
pub fn enter_install_dir() -> ADBResult<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .map(PathBuf::from)
        .ok_or_else(|| ADBError::FileError(format!("无法确定安装目录: {}", exe.display())))?;

    std::env::set_current_dir(&dir)?;
    debug!("工作目录已切换到 {}", dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn polling_stops_once_condition_holds() {
        let calls = Cell::new(0);
        let ok = wait_with_polling(Duration::from_secs(5), Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            calls.get() == 3
        });
        assert!(ok);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn polling_gives_up_after_timeout() {
        let ok = wait_with_polling(Duration::from_millis(20), Duration::from_millis(5), || false);
        assert!(!ok);
    }

    #[test]
    fn poll_until_returns_when_condition_flips() {
        let calls = Cell::new(0);
        poll_until(Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            calls.get() >= 4
        });
        assert_eq!(calls.get(), 4);
    }
}
