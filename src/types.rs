// src/types.rs
use serde::{Deserialize, Serialize};
use crate::drivers::{ConfigUpdate, FrequencyUpdate, SampleUpdate};

// 连接模式
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    #[default]
    Simulation,
    Serial,
    // 回放录好的文本采样文件
    Replay,
}

// 控制台发给后台的命令
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCommand {
    Connect(ConnectionMode),
    Disconnect,
    Start,
    Stop,
    Configure(ConfigUpdate),
    Shutdown,
}

// 后台发给前台的消息
#[derive(Clone, Debug)]
pub enum EngineMessage {
    Log(String),
    Status { connected: bool, running: bool },
    Sample(SampleUpdate),
    Frequency(FrequencyUpdate),
    TransportFault(String),
    ConfigRejected(String),
}
