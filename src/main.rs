use adb_screen_kit::panel::ChannelSink;
use adb_screen_kit::prelude::*;
use log::{error, info};
use std::sync::{mpsc, Arc};

fn main() {
    let config = ADBConfig::default();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    if let Err(e) = run(config) {
        error!("{}", e);
    }
}

fn run(config: ADBConfig) -> ADBResult<()> {
    let dir = adb_screen_kit::utils::enter_install_dir()?;
    info!("输出目录: {}", dir.display());

    let (tx, rx) = mpsc::channel();
    let recorder = ScreenRecorder::new(ADB::new(Some(config)), Arc::new(ChannelSink::new(tx.clone())));

    #[cfg(feature = "gui")]
    {
        drop(tx);
        let _ = adb_screen_kit::gui::run(recorder, rx);
    }

    #[cfg(not(feature = "gui"))]
    {
        use adb_screen_kit::panel::{spawn_input_reader, ControlPanel};
        use std::io::{self, BufReader};

        spawn_input_reader(BufReader::new(io::stdin()), tx)?;
        ControlPanel::new(&recorder, rx, io::stdout().lock()).run()?;
    }

    Ok(())
}
