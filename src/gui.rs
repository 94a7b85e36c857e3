//! GTK 窗口版控制面板
//!
//! 三个按钮加一行状态标签。录制线程的状态更新经 [`ChannelSink`](crate::panel::ChannelSink)
//! 进入通道，由主循环上的定时回调取出后写入标签，工作线程从不直接接触控件。

use gtk::prelude::*;
use gtk::{glib, Align, Application, ApplicationWindow, Button, Label, Orientation};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::error::Severity;
use crate::panel::{self, Action, Dialog, PanelEvent};
use crate::session::ScreenRecorder;

const APP_ID: &str = "com.laterinc.AdbScreenKit";

// 主循环检查状态通道的间隔
const STATUS_REFRESH: Duration = Duration::from_millis(50);

/// 启动窗口并运行到窗口关闭
pub fn run(recorder: ScreenRecorder, events: Receiver<PanelEvent>) -> glib::ExitCode {
    let app = Application::builder().application_id(APP_ID).build();

    let recorder = Rc::new(recorder);
    let events = RefCell::new(Some(events));

    app.connect_activate(move |app| {
        // 只会激活一次；重复激活时把已有窗口提到前台
        match events.borrow_mut().take() {
            Some(events) => build_ui(app, recorder.clone(), events),
            None => {
                if let Some(window) = app.active_window() {
                    window.present();
                }
            }
        }
    });

    // 不解析命令行参数
    app.run_with_args::<&str>(&[])
}

fn build_ui(app: &Application, recorder: Rc<ScreenRecorder>, events: Receiver<PanelEvent>) {
    let tool = panel::tool_name(recorder.adb());

    let window = ApplicationWindow::builder()
        .application(app)
        .title(format!("{} 屏幕工具", tool))
        .default_width(320)
        .default_height(210)
        .resizable(false)
        .build();

    let layout = gtk::Box::new(Orientation::Vertical, 4);
    layout.set_margin_top(8);
    layout.set_margin_bottom(10);
    layout.set_margin_start(12);
    layout.set_margin_end(12);

    let title = Label::new(None);
    title.set_markup(&format!(
        "<span size=\"large\" weight=\"bold\">{} 屏幕工具</span>",
        glib::markup_escape_text(&tool)
    ));
    title.set_margin_bottom(4);
    layout.append(&title);

    for action in [Action::StartRecording, Action::StopRecording, Action::TakeScreenshot] {
        let button = Button::with_label(action.label());
        button.set_width_request(200);
        button.set_halign(Align::Center);
        match action {
            Action::StartRecording => button.add_css_class("suggested-action"),
            Action::StopRecording => button.add_css_class("destructive-action"),
            _ => {}
        }

        let recorder = recorder.clone();
        let window = window.clone();
        let tool = tool.clone();
        button.connect_clicked(move |_| {
            if let Some(dialog) = panel::apply_action(&recorder, action, &tool) {
                show_dialog(&window, &dialog);
            }
        });

        layout.append(&button);
    }

    let status = Label::new(Some("就绪。"));
    status.set_margin_top(10);
    status.add_css_class("dim-label");
    status.set_wrap(true);
    layout.append(&status);

    glib::timeout_add_local(STATUS_REFRESH, move || {
        if let Some(text) = panel::drain_status(&events) {
            status.set_text(&text);
        }
        glib::ControlFlow::Continue
    });

    window.connect_close_request(move |_| {
        // 关闭前把进行中的录制收尾，避免丢文件
        panel::finish_session(&recorder);
        glib::Propagation::Proceed
    });

    window.set_child(Some(&layout));
    window.present();
}

fn show_dialog(window: &ApplicationWindow, dialog: &Dialog) {
    let alert = gtk::AlertDialog::builder()
        .modal(true)
        .message(dialog.title.as_str())
        .detail(dialog.message.as_str())
        .build();

    if dialog.severity == Severity::Error {
        log::error!("{}", dialog);
    }

    alert.show(Some(window));
}
