// src/drivers/mod.rs
// 采集核心：解析、校准、缓存、过零计数、滚动窗口
pub mod buffer;
pub mod calibration;
pub mod error;
pub mod frequency;
pub mod parser;
pub mod pipeline;
pub mod serial;
pub mod settings;
pub mod source;
pub mod viewport;
// 公开导出这些模块里的结构体，方便外部调用
pub use buffer::{BoundedHistory, DisplaySeries};
pub use calibration::CalibrationConfig;
pub use error::ScopeError;
pub use pipeline::{AcquisitionPipeline, FrequencyUpdate, PipelineStats, SampleUpdate};
pub use serial::SerialLineSource;
pub use settings::{AcquisitionConfig, ConfigUpdate, DisplaySettings};
pub use source::{LineSource, ManualSource, SimulatedSource};
pub use viewport::ViewportRange;
