//! 录屏会话协调
//!
//! 状态机：`Idle → Recording → Stopping → Idle`。同一时刻最多一个录制线程。
//! 录制标志由界面线程写、录制线程读；录制线程在标志变为 false 后结束设备端
//! 录屏，拉取文件并清理设备上的临时文件。

use crate::cmd::CaptureProcess;
use crate::device::ADB;
use crate::error::{ADBError, ADBResult};
use crate::media::RECORD_PREFIX;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 状态文字的接收方，可能在任意线程上被调用
pub trait StatusSink: Send + Sync {
    fn set_status(&self, text: &str);
}

/// 只写日志的状态接收方
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn set_status(&self, _text: &str) {}
}

fn report(sink: &dyn StatusSink, text: &str) {
    info!("{}", text);
    sink.set_status(text);
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    /// 已请求停止，录制线程仍在收尾（终止进程、拉取、清理）
    Stopping,
}

/// 截图与录屏的控制器
///
/// 启动时创建一次，交给界面层使用。
pub struct ScreenRecorder {
    adb: Arc<ADB>,
    recording: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    sink: Arc<dyn StatusSink>,
}

impl ScreenRecorder {
    pub fn new(adb: ADB, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            adb: Arc::new(adb),
            recording: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            sink,
        }
    }

    pub fn adb(&self) -> &ADB {
        &self.adb
    }

    fn status(&self, text: &str) {
        report(self.sink.as_ref(), text);
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> RecorderState {
        if self.recording.load(Ordering::SeqCst) {
            return RecorderState::Recording;
        }

        match self.lock_worker().as_ref() {
            Some(handle) if !handle.is_finished() => RecorderState::Stopping,
            _ => RecorderState::Idle,
        }
    }

    /// 开始录屏
    ///
    /// 已有会话（录制中或收尾中）时返回 [`ADBError::RecordingActive`]，状态不变。
    pub fn start_recording(&self) -> ADBResult<()> {
        let mut worker = self.lock_worker();

        if self.recording.load(Ordering::SeqCst)
            || worker.as_ref().is_some_and(|h| !h.is_finished())
        {
            return Err(ADBError::RecordingActive);
        }
        if let Some(finished) = worker.take() {
            let _ = finished.join();
        }

        self.adb.check_device()?;

        self.recording.store(true, Ordering::SeqCst);

        // 录制线程先创建好，再启动设备录屏，进程一旦存在就一定有线程负责终止它
        let session = RecordingSession {
            adb: self.adb.clone(),
            recording: self.recording.clone(),
            sink: self.sink.clone(),
            output_path: self.adb.local_output(RECORD_PREFIX, "mp4"),
        };
        let (handoff, pending) = mpsc::sync_channel::<Box<dyn CaptureProcess>>(1);

        let handle = thread::Builder::new()
            .name("screenrecord".to_string())
            .spawn(move || {
                if let Ok(process) = pending.recv() {
                    session.run(process);
                }
            })
            .map_err(|e| self.abort_start(ADBError::CommandError(format!("无法创建录制线程: {}", e))))?;

        self.status(&format!(
            "正在启动 {} screenrecord...",
            self.adb.adb_path().display()
        ));

        let process = match self.adb.start_screenrecord() {
            Ok(process) => process,
            Err(e) => {
                drop(handoff);
                let _ = handle.join();
                return Err(self.abort_start(e));
            }
        };

        if let Err(mpsc::SendError(mut process)) = handoff.send(process) {
            // 录制线程已提前退出
            if let Err(e) = process.terminate() {
                warn!("终止 screenrecord 进程 {} 失败: {}", process.id(), e);
            }
            let _ = handle.join();
            return Err(self.abort_start(ADBError::CommandError("录制线程意外退出".to_string())));
        }

        *worker = Some(handle);
        self.status("录制: 进行中");
        Ok(())
    }

    /// 启动失败时复位录制标志并报告原因
    fn abort_start(&self, error: ADBError) -> ADBError {
        self.recording.store(false, Ordering::SeqCst);
        self.status(&format!("启动录制失败: {}", error));
        error
    }

    /// 停止录屏
    ///
    /// 没有进行中的录制时返回 [`ADBError::NoActiveRecording`]，不触发任何收尾步骤。
    pub fn stop_recording(&self) -> ADBResult<()> {
        if self
            .recording
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ADBError::NoActiveRecording);
        }

        self.status("录制: 正在停止...");
        Ok(())
    }

    /// 截图，在调用线程上同步完成
    pub fn take_screenshot(&self) -> ADBResult<PathBuf> {
        self.adb.check_device()?;

        let path = self.adb.take_screenshot(|text| self.status(text))?;

        self.status(&format!("截图已保存: {}", display_name(&path)));
        Ok(path)
    }

    /// 等待录制线程结束（如果有）
    pub fn wait_idle(&self) {
        let handle = self.lock_worker().take();

        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("录制线程异常退出");
            }
        }
    }
}

/// 录制线程持有的会话数据
struct RecordingSession {
    adb: Arc<ADB>,
    recording: Arc<AtomicBool>,
    sink: Arc<dyn StatusSink>,
    output_path: PathBuf,
}

impl RecordingSession {
    fn run(self, mut process: Box<dyn CaptureProcess>) {
        let config = &self.adb.config;
        let sink = self.sink.as_ref();

        crate::utils::poll_until(Duration::from_millis(config.poll_interval_ms), || {
            !self.recording.load(Ordering::SeqCst)
        });

        report(sink, "正在停止录制，请稍候...");
        if let Err(e) = process.terminate() {
            warn!("终止 screenrecord 进程 {} 失败: {}", process.id(), e);
        }
        thread::sleep(Duration::from_millis(config.flush_delay_ms));

        report(sink, "正在从设备拉取视频...");
        match self.adb.pull(&config.record_tmp, &self.output_path) {
            Ok(()) => report(sink, &format!("录制已保存: {}", display_name(&self.output_path))),
            Err(e) => report(sink, &e.to_string()),
        }

        self.adb.discard_device_file(&config.record_tmp);
    }
}
