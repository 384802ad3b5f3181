// src/console.rs
// 文本控制台：把操作员输入翻译成引擎命令
use std::io::BufRead;
use std::sync::mpsc::Sender;
use anyhow::{anyhow, Context, Result};
use log::info;
use crate::drivers::ConfigUpdate;
use crate::types::{ConnectionMode, EngineCommand};

pub const HELP: &str = "\
commands:
  connect [sim|serial|replay] open the transport (default: configured mode)
  disconnect | start | stop | clear
  quit                   stop the engine (closing stdin does not)
  scale <1-100>          input scale
  mult <x>               amplitude multiplier (0.1 .. 8.0)
  time <x>               time scale (sampling interval = 50 ms / x)
  autoscroll on|off
  speed <1-100>          scroll speed
  amp <x>                display amplitude factor";

/// `Ok(None)` for blank input.
pub fn parse_command(input: &str, default_mode: ConnectionMode) -> Result<Option<EngineCommand>> {
    let mut words = input.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "connect" => EngineCommand::Connect(match arg {
            None => default_mode,
            Some("sim") | Some("simulation") => ConnectionMode::Simulation,
            Some("serial") => ConnectionMode::Serial,
            Some("replay") => ConnectionMode::Replay,
            Some(other) => return Err(anyhow!("unknown connection mode {other:?}")),
        }),
        "disconnect" => EngineCommand::Disconnect,
        "start" => EngineCommand::Start,
        "stop" => EngineCommand::Stop,
        "clear" => EngineCommand::Configure(ConfigUpdate::ClearHistory),
        "quit" | "exit" => EngineCommand::Shutdown,
        "scale" => EngineCommand::Configure(ConfigUpdate::InputScale(number(verb, arg)?)),
        "mult" => EngineCommand::Configure(ConfigUpdate::AmplitudeMultiplier(number(verb, arg)?)),
        "time" => EngineCommand::Configure(ConfigUpdate::TimeScale(number(verb, arg)?)),
        "speed" => EngineCommand::Configure(ConfigUpdate::ScrollSpeed(number(verb, arg)?)),
        "amp" => EngineCommand::Configure(ConfigUpdate::DisplayAmplitudeFactor(number(verb, arg)?)),
        "autoscroll" => EngineCommand::Configure(ConfigUpdate::AutoScroll(match arg {
            Some("on") | Some("true") | Some("1") => true,
            Some("off") | Some("false") | Some("0") => false,
            _ => return Err(anyhow!("autoscroll expects on|off")),
        })),
        other => return Err(anyhow!("unknown command {other:?}")),
    };
    Ok(Some(cmd))
}

/// Forwards operator input until it runs out or the engine is gone. Only an
/// explicit `quit` stops the engine; running out of input does not.
pub fn forward_commands(input: impl BufRead, tx_cmd: &Sender<EngineCommand>, default_mode: ConnectionMode) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        match parse_command(&line, default_mode) {
            Ok(Some(cmd)) => {
                if tx_cmd.send(cmd).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{e:#}\n{HELP}"),
        }
    }
    info!("console input closed; send `quit` or stop the process to exit");
}

fn number<T>(verb: &str, arg: Option<&str>) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = arg.ok_or_else(|| anyhow!("{verb} needs a value"))?;
    raw.parse()
        .with_context(|| format!("{verb}: {raw:?} is not a valid number"))
}
