use crate::device::ADB;
use crate::error::{ADBError, ADBResult};
use log::{debug, trace, warn};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

// 发送 SIGTERM 后等待进程自行退出的时间
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// 一次同步命令调用的输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// 进程退出码（被信号终止时为 None）
    pub code: Option<i32>,
}

/// 长时间运行的采集进程（例如 screenrecord）
pub trait CaptureProcess: Send {
    fn id(&self) -> u32;

    /// 请求进程结束并回收它
    fn terminate(&mut self) -> io::Result<()>;
}

/// 启动外部进程的方式
///
/// 默认实现是 [`SystemRunner`]，直接调用操作系统。
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// 同步执行并收集输出
    fn output(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput>;

    /// 启动进程但不等待
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn CaptureProcess>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        })
    }

    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn CaptureProcess>> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Box::new(child))
    }
}

impl CaptureProcess for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn terminate(&mut self) -> io::Result<()> {
        // 设备可能已经因时长上限自行结束录制
        if self.try_wait()?.is_some() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            // 先给 SIGTERM，让设备端有机会正常收尾
            let _ = Command::new("kill")
                .args(["-TERM", &self.id().to_string()])
                .output();

            let exited = crate::utils::wait_with_polling(
                TERMINATE_GRACE,
                Duration::from_millis(20),
                || matches!(self.try_wait(), Ok(Some(_))),
            );
            if exited {
                return Ok(());
            }
        }

        if let Err(e) = self.kill() {
            // InvalidInput 表示进程已经退出
            if e.kind() != io::ErrorKind::InvalidInput {
                return Err(e);
            }
        }
        self.wait()?;
        Ok(())
    }
}

impl ADB {
    /// 组装参数：全局附加参数在前，命令参数在后
    fn build_args(&self, args: &[&str]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len());

        if let Some(additional_args) = &self.config.additional_args {
            full.extend(additional_args.iter().cloned());
        }
        full.extend(args.iter().map(|a| a.to_string()));

        full
    }

    /// 执行外部工具命令，返回去除首尾空白的 stdout 和 stderr
    ///
    /// 只有调用本身失败（找不到程序等）才返回错误，不重试，不设超时。
    pub fn run(&self, args: &[&str]) -> ADBResult<CommandOutput> {
        let full = self.build_args(args);
        debug!("执行 {} {:?}", self.config.path.display(), full);

        let output = self
            .runner
            .output(&self.config.path, &full)
            .map_err(|e| {
                ADBError::CommandError(format!(
                    "无法执行 {}: {}",
                    self.config.path.display(),
                    e
                ))
            })?;

        let output = CommandOutput {
            stdout: output.stdout.trim().to_string(),
            stderr: output.stderr.trim().to_string(),
            code: output.code,
        };

        trace!("命令 {:?} 输出: {}", args, output.stdout);
        if output.code.is_some_and(|c| c != 0) && output.stderr.is_empty() {
            warn!("命令 {:?} 退出码 {:?}，但 stderr 为空", args, output.code);
        }

        Ok(output)
    }

    /// 执行命令，stderr 非空即视为设备端失败
    pub fn run_checked(&self, args: &[&str]) -> ADBResult<String> {
        let output = self.run(args)?;

        if !output.stderr.is_empty() {
            return Err(ADBError::DeviceError(output.stderr));
        }

        Ok(output.stdout)
    }

    /// 在设备上执行 shell 命令
    pub fn shell(&self, command: &[&str]) -> ADBResult<String> {
        let mut args = Vec::with_capacity(command.len() + 1);
        args.push("shell");
        args.extend_from_slice(command);
        self.run_checked(&args)
    }

    /// 启动命令但不等待完成
    pub fn spawn(&self, args: &[&str]) -> ADBResult<Box<dyn CaptureProcess>> {
        let full = self.build_args(args);

        let process = self
            .runner
            .spawn(&self.config.path, &full)
            .map_err(|e| {
                ADBError::CommandError(format!(
                    "无法启动 {}: {}",
                    self.config.path.display(),
                    e
                ))
            })?;

        debug!("已启动进程 {} : {:?}", process.id(), full);
        Ok(process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ADBConfig;
    use crate::testing::FakeRunner;
    use std::sync::Arc;

    #[test]
    fn run_trims_streams_and_prepends_global_args() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond("shell", "  hello \n", "");
        let config = ADBConfig::builder().add_arg("-s").add_arg("abc").build().unwrap();
        let adb = ADB::with_runner(config, runner.clone());

        let out = adb.run(&["shell", "echo", "hello"]).unwrap();
        assert_eq!(out.stdout, "hello");
        assert_eq!(runner.calls(), vec![vec!["-s", "abc", "shell", "echo", "hello"]]);
    }

    #[test]
    fn missing_binary_is_a_command_error() {
        let runner = Arc::new(FakeRunner::new());
        runner.fail_invocations();
        let adb = ADB::with_runner(ADBConfig::default(), runner);

        let err = adb.run(&["devices"]).unwrap_err();
        assert!(matches!(err, ADBError::CommandError(_)));
    }

    #[test]
    fn stderr_output_fails_checked_commands() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond("shell", "", "screencap: permission denied\n");
        let adb = ADB::with_runner(ADBConfig::default(), runner);

        let err = adb.shell(&["screencap", "-p", "/sdcard/x.png"]).unwrap_err();
        assert!(matches!(err, ADBError::DeviceError(ref m) if m == "screencap: permission denied"));
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let config = ADBConfig::builder()
            .path("/nonexistent/definitely-not-adb")
            .build()
            .unwrap();
        let adb = ADB::new(Some(config));

        assert!(matches!(adb.run(&["devices"]), Err(ADBError::CommandError(_))));
        assert!(matches!(adb.spawn(&["shell"]), Err(ADBError::CommandError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn child_terminate_stops_a_running_process() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        child.terminate().unwrap();
        assert!(child.try_wait().unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn child_terminate_tolerates_exited_process() {
        let mut child = Command::new("true").spawn().unwrap();
        child.wait().unwrap();
        assert!(child.terminate().is_ok());
    }
}
