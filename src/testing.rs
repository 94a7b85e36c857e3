//! 测试用的进程替身，不会真正启动外部工具。

use crate::cmd::{CaptureProcess, CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Debug, Default)]
struct Journal {
    calls: Vec<Vec<String>>,
    spawned: Vec<Vec<String>>,
    events: Vec<String>,
    terminated_at: Vec<Instant>,
}

/// 按子命令返回预设输出的 [`CommandRunner`]
///
/// 成功的 `pull` 会在目标路径写一个小文件，模拟真实工具的效果。
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: Mutex<HashMap<Vec<String>, (String, String)>>,
    journal: Arc<Mutex<Journal>>,
    fail_all: AtomicBool,
    fail_spawn: AtomicBool,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为包含 `command`（按空白切分后连续出现）的调用预设输出，最长匹配优先
    pub fn respond(&self, command: &str, stdout: &str, stderr: &str) {
        let key = command.split_whitespace().map(String::from).collect();
        self.responses
            .lock()
            .unwrap()
            .insert(key, (stdout.to_string(), stderr.to_string()));
    }

    /// 预设一台在线设备
    pub fn with_device(self) -> Self {
        self.respond("devices", "List of devices attached\nemulator-5554\tdevice\n", "");
        self
    }

    /// 所有调用都像找不到程序一样失败
    pub fn fail_invocations(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// 只有启动长时间进程失败
    pub fn fail_spawn(&self) {
        self.fail_spawn.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.journal.lock().unwrap().calls.clone()
    }

    pub fn spawned(&self) -> Vec<Vec<String>> {
        self.journal.lock().unwrap().spawned.clone()
    }

    /// 按发生顺序记录的 `run:<args>` / `spawn` / `terminate`
    pub fn events(&self) -> Vec<String> {
        self.journal.lock().unwrap().events.clone()
    }

    pub fn terminations(&self) -> Vec<Instant> {
        self.journal.lock().unwrap().terminated_at.clone()
    }

    fn lookup(&self, args: &[String]) -> (String, String) {
        let responses = self.responses.lock().unwrap();
        responses
            .iter()
            .filter(|(key, _)| !key.is_empty() && args.windows(key.len()).any(|w| w == key.as_slice()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, out)| out.clone())
            .unwrap_or_default()
    }

    fn not_found() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "No such file or directory (os error 2)")
    }
}

impl CommandRunner for FakeRunner {
    fn output(&self, _program: &Path, args: &[String]) -> io::Result<CommandOutput> {
        {
            let mut journal = self.journal.lock().unwrap();
            journal.calls.push(args.to_vec());
            journal.events.push(format!("run:{}", args.join(" ")));
        }

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(Self::not_found());
        }

        let (stdout, stderr) = self.lookup(args);

        if args.first().map(String::as_str) == Some("pull") && stderr.is_empty() {
            if let Some(dst) = args.last() {
                std::fs::write(dst, b"fake capture")?;
            }
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            code: Some(0),
        })
    }

    fn spawn(&self, _program: &Path, args: &[String]) -> io::Result<Box<dyn CaptureProcess>> {
        {
            let mut journal = self.journal.lock().unwrap();
            journal.spawned.push(args.to_vec());
            journal.events.push("spawn".to_string());
        }

        if self.fail_all.load(Ordering::SeqCst) || self.fail_spawn.load(Ordering::SeqCst) {
            return Err(Self::not_found());
        }

        Ok(Box::new(FakeProcess {
            journal: self.journal.clone(),
        }))
    }
}

struct FakeProcess {
    journal: Arc<Mutex<Journal>>,
}

impl CaptureProcess for FakeProcess {
    fn id(&self) -> u32 {
        4242
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut journal = self.journal.lock().unwrap();
        journal.terminated_at.push(Instant::now());
        journal.events.push("terminate".to_string());
        Ok(())
    }
}
