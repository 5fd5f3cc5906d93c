//! Device configuration for local inference.

use std::fmt;
use std::str::FromStr;

use crate::ClassifierError;

/// Compute device for local inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution (default).
    #[default]
    Cpu,

    /// CUDA GPU execution. Requires the `cuda` feature at session build time.
    Cuda {
        /// GPU device ID (0-indexed).
        device_id: u32,
    },
}

impl Device {
    pub fn cuda(device_id: u32) -> Self {
        Self::Cuda { device_id }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Self::Cuda { .. })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda { device_id } => write!(f, "cuda:{device_id}"),
        }
    }
}

/// Parses `cpu`, `cuda` (device 0) and `cuda:<index>`.
impl FromStr for Device {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda { device_id: 0 }),
            other => other
                .strip_prefix("cuda:")
                .and_then(|index| index.parse::<u32>().ok())
                .map(Self::cuda)
                .ok_or_else(|| {
                    ClassifierError::Configuration(format!(
                        "invalid device '{other}', expected cpu, cuda or cuda:<index>"
                    ))
                }),
        }
    }
}
