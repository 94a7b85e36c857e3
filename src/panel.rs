//! 控制面板的共用部分和终端版面板
//!
//! 所有界面状态只在交互线程上修改。录制线程的状态更新经 [`ChannelSink`] 以
//! [`PanelEvent`] 的形式进入通道，由界面线程取出处理。窗口版见 `gui` 模块；
//! [`ControlPanel`] 是终端版，键盘输入也走同一个通道。

use crate::device::ADB;
use crate::error::{ADBError, Severity};
use crate::session::{RecorderState, ScreenRecorder, StatusSink};
use log::debug;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// 面板上的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartRecording,
    StopRecording,
    TakeScreenshot,
    Quit,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::StartRecording,
        Action::StopRecording,
        Action::TakeScreenshot,
        Action::Quit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Action::StartRecording => "1",
            Action::StopRecording => "2",
            Action::TakeScreenshot => "3",
            Action::Quit => "q",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::StartRecording => "▶ 开始录制",
            Action::StopRecording => "⏹ 停止录制",
            Action::TakeScreenshot => "📸 截图",
            Action::Quit => "退出",
        }
    }

    /// 解析一行输入，大小写和首尾空白不敏感
    pub fn parse(input: &str) -> Option<Action> {
        let input = input.trim().to_lowercase();
        Action::ALL
            .into_iter()
            .find(|a| a.key() == input || (*a == Action::Quit && input == "quit"))
    }
}

/// 进入面板事件通道的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Input(String),
    Status(String),
    InputClosed,
}

/// 把状态更新转发到面板事件通道
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<PanelEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<PanelEvent>) -> Self {
        Self { tx }
    }
}

impl StatusSink for ChannelSink {
    fn set_status(&self, text: &str) {
        // 面板已关闭时丢弃
        let _ = self.tx.send(PanelEvent::Status(text.to_string()));
    }
}

/// 在后台线程逐行读取输入并送入事件通道
pub fn spawn_input_reader<R>(reader: R, tx: Sender<PanelEvent>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("panel-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(PanelEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(PanelEvent::InputClosed);
        })
}

/// 阻塞式提示框
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn from_error(error: &ADBError, tool: &str) -> Self {
        let severity = error.severity();
        let title = match severity {
            Severity::Error => format!("{} 错误", tool),
            Severity::Warning => "没有设备".to_string(),
            Severity::Info => "提示".to_string(),
        };

        Self {
            severity,
            title,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "错误",
            Severity::Warning => "警告",
            Severity::Info => "提示",
        };
        write!(f, "[{}] {}: {}", tag, self.title, self.message)
    }
}

/// 面板标题里使用的工具名
pub fn tool_name(adb: &ADB) -> String {
    adb.adb_path()
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "ADB".to_string())
}

/// 执行一个面板操作，失败时返回需要展示的提示框
pub fn apply_action(recorder: &ScreenRecorder, action: Action, tool: &str) -> Option<Dialog> {
    debug!("面板操作: {:?}", action);

    let result = match action {
        Action::StartRecording => recorder.start_recording(),
        Action::StopRecording => recorder.stop_recording(),
        Action::TakeScreenshot => recorder.take_screenshot().map(|_| ()),
        Action::Quit => Ok(()),
    };

    result.err().map(|e| Dialog::from_error(&e, tool))
}

/// 取出通道里已到达的事件，返回其中最新的状态文字
///
/// 窗口版在界面线程的定时回调里调用，不会阻塞。
pub fn drain_status(events: &Receiver<PanelEvent>) -> Option<String> {
    events
        .try_iter()
        .filter_map(|event| match event {
            PanelEvent::Status(text) => Some(text),
            _ => None,
        })
        .last()
}

/// 窗口关闭前结束进行中的录制，并等待文件拉取完成
///
/// 返回是否有会话需要收尾。
pub fn finish_session(recorder: &ScreenRecorder) -> bool {
    if recorder.state() == RecorderState::Idle {
        return false;
    }

    let _ = recorder.stop_recording();
    recorder.wait_idle();
    true
}

/// 终端版控制面板：三个操作和一行状态
pub struct ControlPanel<'a, W: Write> {
    recorder: &'a ScreenRecorder,
    events: Receiver<PanelEvent>,
    out: W,
    tool: String,
    status: String,
}

impl<'a, W: Write> ControlPanel<'a, W> {
    pub fn new(recorder: &'a ScreenRecorder, events: Receiver<PanelEvent>, out: W) -> Self {
        let tool = tool_name(recorder.adb());

        Self {
            recorder,
            events,
            out,
            tool,
            status: "就绪。".to_string(),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// 处理事件直到用户退出或输入结束
    pub fn run(&mut self) -> io::Result<()> {
        self.render_menu()?;
        self.render_status()?;

        while let Ok(event) = self.events.recv() {
            match event {
                PanelEvent::Status(text) => self.set_status(text)?,
                PanelEvent::Input(line) => match Action::parse(&line) {
                    Some(Action::Quit) => break,
                    Some(action) => self.dispatch(action)?,
                    None if line.trim().is_empty() => {}
                    None => self.render_menu()?,
                },
                PanelEvent::InputClosed => break,
            }
        }

        self.shutdown()
    }

    fn dispatch(&mut self, action: Action) -> io::Result<()> {
        match apply_action(self.recorder, action, &self.tool) {
            Some(dialog) => self.show_dialog(&dialog),
            None => Ok(()),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        if self.recorder.state() != RecorderState::Idle {
            writeln!(self.out, "等待录制收尾...")?;
            finish_session(self.recorder);
        }

        while let Ok(event) = self.events.try_recv() {
            if let PanelEvent::Status(text) = event {
                self.set_status(text)?;
            }
        }

        self.out.flush()
    }

    fn set_status(&mut self, text: String) -> io::Result<()> {
        self.status = text;
        self.render_status()
    }

    fn render_menu(&mut self) -> io::Result<()> {
        writeln!(self.out, "{} 屏幕工具", self.tool)?;
        for action in Action::ALL {
            writeln!(self.out, "  [{}] {}", action.key(), action.label())?;
        }
        self.out.flush()
    }

    fn render_status(&mut self) -> io::Result<()> {
        writeln!(self.out, "状态: {}", self.status)?;
        self.out.flush()
    }

    fn show_dialog(&mut self, dialog: &Dialog) -> io::Result<()> {
        writeln!(self.out, "{}", dialog)?;
        self.out.flush()
    }
}
