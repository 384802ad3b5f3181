// src/main.rs
mod config;
mod console;
mod drivers;
mod engine;
mod types;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Sender};
use std::thread;
use anyhow::Result;
use log::{debug, info, warn};
use config::{AppConfig, DEFAULT_CONFIG_PATH};
use drivers::frequency::EPOCH;
use types::*;
// 读取标准输入，转成命令；输入结束只停止读取，引擎继续运行
fn spawn_console(tx_cmd: Sender<EngineCommand>, default_mode: ConnectionMode) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        console::forward_commands(stdin.lock(), &tx_cmd, default_mode);
    });
}
// 入口函数
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load_or_create(&config_path)?;
    info!(
        "inoscope starting ({:?}, port {} @ {} baud)",
        config.connection.mode, config.connection.port_name, config.connection.baud_rate
    );
    let (tx, rx) = channel();
    let (tx_cmd, rx_cmd) = channel();
    let mode = config.connection.mode;
    let engine = engine::spawn_thread(config.connection, config.acquisition, tx, rx_cmd);
    tx_cmd.send(EngineCommand::Connect(mode))?;
    tx_cmd.send(EngineCommand::Start)?;
    // 保留一个发送端，stdin 关闭后引擎也不会因通道断开而退出
    spawn_console(tx_cmd.clone(), mode);
    // 电压读数跟随最新样本，频率读数每个计数周期打印一次
    let mut latest_mv = (0.0, 0.0);
    for msg in rx {
        match msg {
            EngineMessage::Log(text) => info!("{text}"),
            EngineMessage::Status { connected, running } => {
                info!("connected: {connected}, running: {running}")
            }
            EngineMessage::Sample(update) => {
                latest_mv = (
                    update.latest_a0_voltage * 1000.0,
                    update.latest_a1_voltage * 1000.0,
                );
                debug!(
                    "A0 {:.2} mV, A1 {:.2} mV, {} samples, viewport {:?}",
                    latest_mv.0,
                    latest_mv.1,
                    update.display_series_a0.len(),
                    update.viewport
                );
            }
            EngineMessage::Frequency(update) => {
                let (a0_hz, a1_hz) = update.hz(EPOCH);
                info!(
                    "Voltage A0: {:.2} mV  A1: {:.2} mV | Frequency A0: {a0_hz} Hz  A1: {a1_hz} Hz",
                    latest_mv.0, latest_mv.1
                );
            }
            EngineMessage::TransportFault(e) => warn!("transport: {e}"),
            EngineMessage::ConfigRejected(e) => warn!("config rejected: {e}"),
        }
    }
    drop(tx_cmd);
    engine.join().ok();
    info!("bye");
    Ok(())
}
