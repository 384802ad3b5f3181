// src/engine.rs
// 单线程协作式调度：采样节拍 + 频率计数节拍，二者永不并发
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};
use crate::config::ConnectionSettings;
use crate::drivers::{
    AcquisitionConfig, AcquisitionPipeline, ConfigUpdate, LineSource, ManualSource,
    SerialLineSource, SimulatedSource,
};
use crate::types::*;

/// Upper bound on how long the loop sleeps while idle.
const IDLE_WAIT: Duration = Duration::from_millis(50);
const FAULT_REPORT_EVERY: u64 = 100;

type BoxedSource = Box<dyn LineSource + Send>;

/// Fixed-rate deadline tracker. A ticker that falls behind re-anchors on
/// `now` instead of firing a burst of catch-up ticks.
#[derive(Clone, Copy, Debug)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.next = now + interval;
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

pub struct Engine {
    tx: Sender<EngineMessage>,
    connection: ConnectionSettings,
    acquisition: AcquisitionConfig,
    pipeline: Option<AcquisitionPipeline<BoxedSource>>,
    running: bool,
    consecutive_faults: u64,
    sample_ticker: Ticker,
    epoch_ticker: Ticker,
}

impl Engine {
    pub fn new(
        connection: ConnectionSettings,
        acquisition: AcquisitionConfig,
        tx: Sender<EngineMessage>,
        now: Instant,
    ) -> Self {
        Self {
            tx,
            connection,
            sample_ticker: Ticker::new(acquisition.sampling_interval(), now),
            epoch_ticker: Ticker::new(crate::drivers::frequency::EPOCH, now),
            acquisition,
            pipeline: None,
            running: false,
            consecutive_faults: 0,
        }
    }

    fn send(&self, msg: EngineMessage) {
        self.tx.send(msg).ok();
    }

    fn report_status(&self) {
        self.send(EngineMessage::Status {
            connected: self.pipeline.is_some(),
            running: self.running,
        });
    }

    /// Replaces the current transport. The pipeline starts with an empty
    /// history but keeps the current configuration.
    pub fn attach(&mut self, source: BoxedSource) {
        match AcquisitionPipeline::new(source, self.acquisition) {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                self.consecutive_faults = 0;
            }
            Err(e) => error!("failed to build pipeline: {e}"),
        }
        self.report_status();
    }

    fn connect(&mut self, mode: ConnectionMode) {
        let source: BoxedSource = match mode {
            ConnectionMode::Simulation => Box::new(SimulatedSource::new(rand::random())),
            ConnectionMode::Serial => {
                let ConnectionSettings {
                    port_name,
                    baud_rate,
                    ..
                } = &self.connection;
                match SerialLineSource::open(port_name, *baud_rate) {
                    Ok(source) => Box::new(source),
                    Err(e) => {
                        warn!("cannot open {port_name}: {e}");
                        // 串口打不开时列出可用端口，方便改配置
                        let ports = crate::drivers::serial::available_port_names();
                        self.send(EngineMessage::Log(format!(
                            "Connect failed ({e}); available ports: {ports:?}"
                        )));
                        self.report_status();
                        return;
                    }
                }
            }
            ConnectionMode::Replay => {
                let path = &self.connection.replay_file;
                match std::fs::read_to_string(path) {
                    Ok(raw) => {
                        let mut source = ManualSource::new(raw.lines());
                        source.close();
                        Box::new(source)
                    }
                    Err(e) => {
                        warn!("cannot read {}: {e}", path.display());
                        self.send(EngineMessage::Log(format!(
                            "Replay failed: {}: {e}",
                            path.display()
                        )));
                        self.report_status();
                        return;
                    }
                }
            }
        };
        info!("connected ({mode:?})");
        self.send(EngineMessage::Log(format!("Connected ({mode:?})")));
        self.attach(source);
    }

    /// Returns `false` once the engine should exit.
    pub fn handle(&mut self, cmd: EngineCommand, now: Instant) -> bool {
        match cmd {
            EngineCommand::Connect(mode) => self.connect(mode),
            EngineCommand::Disconnect => {
                if let Some(pipeline) = self.pipeline.take() {
                    let stats = pipeline.stats();
                    info!(
                        "disconnected after {} samples ({} malformed, {} transport errors)",
                        stats.accepted, stats.malformed, stats.transport_errors
                    );
                }
                self.running = false;
                self.report_status();
            }
            EngineCommand::Start => {
                if self.pipeline.is_none() {
                    self.send(EngineMessage::Log("Not connected".to_owned()));
                    return true;
                }
                if !self.running {
                    self.running = true;
                    if let Some(pipeline) = self.pipeline.as_mut() {
                        pipeline.reset_epoch();
                    }
                    self.sample_ticker
                        .set_interval(self.acquisition.sampling_interval(), now);
                    self.epoch_ticker
                        .set_interval(self.epoch_ticker.interval(), now);
                }
                self.report_status();
            }
            EngineCommand::Stop => {
                self.running = false;
                self.report_status();
            }
            EngineCommand::Configure(update) => self.configure(update, now),
            EngineCommand::Shutdown => {
                info!("engine shutting down");
                return false;
            }
        }
        true
    }

    fn configure(&mut self, update: ConfigUpdate, now: Instant) {
        let result = match &mut self.pipeline {
            Some(pipeline) => pipeline.apply(update).map(|_| *pipeline.config()),
            None => {
                let mut next = self.acquisition;
                next.apply(update).map(|_| next)
            }
        };
        match result {
            Ok(config) => {
                let interval = config.sampling_interval();
                if interval != self.sample_ticker.interval() {
                    debug!("sampling interval now {interval:?}");
                    self.sample_ticker.set_interval(interval, now);
                }
                self.acquisition = config;
            }
            Err(e) => {
                warn!("rejected {update:?}: {e}");
                self.send(EngineMessage::ConfigRejected(e.to_string()));
            }
        }
    }

    /// Runs whichever ticks are due at `now`; sampling always goes first.
    pub fn step(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        let Some(pipeline) = self.pipeline.as_mut() else {
            return;
        };
        if self.sample_ticker.poll(now) {
            match pipeline.sample_tick() {
                Ok(Some(update)) => {
                    self.consecutive_faults = 0;
                    self.tx.send(EngineMessage::Sample(update)).ok();
                }
                Ok(None) => {}
                Err(e) => {
                    // 持续断开时只周期性上报，避免刷屏
                    if self.consecutive_faults % FAULT_REPORT_EVERY == 0 {
                        warn!("sample tick failed: {e}");
                        self.tx.send(EngineMessage::TransportFault(e.to_string())).ok();
                    }
                    self.consecutive_faults += 1;
                }
            }
        }
        if self.epoch_ticker.poll(now) {
            let update = pipeline.epoch_tick();
            self.tx.send(EngineMessage::Frequency(update)).ok();
        }
    }

    pub fn next_wake(&self, now: Instant) -> Duration {
        if !self.running {
            return IDLE_WAIT;
        }
        self.sample_ticker
            .remaining(now)
            .min(self.epoch_ticker.remaining(now))
            .min(IDLE_WAIT)
    }
}

pub fn spawn_thread(
    connection: ConnectionSettings,
    acquisition: AcquisitionConfig,
    tx: Sender<EngineMessage>,
    rx_cmd: Receiver<EngineCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tx.send(EngineMessage::Log("Acquisition engine ready.".to_owned())).ok();
        let mut engine = Engine::new(connection, acquisition, tx, Instant::now());
        loop {
            // 1. 先处理命令，保证每个节拍看到一致的配置
            loop {
                match rx_cmd.try_recv() {
                    Ok(cmd) => {
                        if !engine.handle(cmd, Instant::now()) {
                            return;
                        }
                    }
                    Err(std::sync::mpsc::TryRecvError::Empty) => break,
                    Err(std::sync::mpsc::TryRecvError::Disconnected) => return,
                }
            }

            // 2. 到期的节拍
            let now = Instant::now();
            engine.step(now);

            // 3. 等到下一个节拍，期间有命令则提前醒来
            match rx_cmd.recv_timeout(engine.next_wake(Instant::now())) {
                Ok(cmd) => {
                    if !engine.handle(cmd, Instant::now()) {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    })
}
