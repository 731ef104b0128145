use std::fmt;

use clap::ValueEnum;

/// Execution target for inference.
///
/// `Auto` lets the backend pick whatever it considers best for the host;
/// the remaining variants pin a specific accelerator (or the CPU).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Device {
    Auto,
    Cpu,
    Cuda,
    Metal,
}

impl Device {
    /// The default device for the current host.
    ///
    /// Apple-silicon hosts default to Metal; everything else defaults to
    /// letting the backend decide.
    pub fn host_default() -> Self {
        default_device_for(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Whether this device names a specific accelerator (as opposed to the
    /// CPU or "backend's choice"). Only accelerator requests are eligible
    /// for the device-fallback step during backend acquisition.
    pub fn is_accelerator(self) -> bool {
        matches!(self, Device::Cuda | Device::Metal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Auto => "auto",
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Metal => "metal",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure function of host info so the policy is testable without `cfg` tricks.
fn default_device_for(os: &str, arch: &str) -> Device {
    if os == "macos" && arch == "aarch64" {
        Device::Metal
    } else {
        Device::Auto
    }
}

/// Numeric representation used internally by the backend during inference.
///
/// The ordering of the fallback ladder matters: we retry from the requested
/// (or device-default) type towards increasingly conservative choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ComputeType {
    Int8,
    #[value(name = "int8_float16")]
    Int8Float16,
    #[value(name = "int8_float32")]
    Int8Float32,
    Float16,
    Float32,
}

impl ComputeType {
    /// The default compute type for a device.
    ///
    /// GPU devices get float16 for speed; CPU-ish devices get int8_float32,
    /// which is more widely supported than int8_float16.
    pub fn default_for(device: Device) -> Self {
        match device {
            Device::Metal | Device::Cuda => ComputeType::Float16,
            Device::Auto | Device::Cpu => ComputeType::Int8Float32,
        }
    }

    /// The retry ladder used when the caller did not pin a compute type,
    /// ordered from fastest to most conservative. The resolver skips
    /// whichever rung was already attempted.
    pub fn fallback_ladder() -> [ComputeType; 3] {
        [
            ComputeType::Int8Float16,
            ComputeType::Int8Float32,
            ComputeType::Float32,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComputeType::Int8 => "int8",
            ComputeType::Int8Float16 => "int8_float16",
            ComputeType::Int8Float32 => "int8_float32",
            ComputeType::Float16 => "float16",
            ComputeType::Float32 => "float32",
        }
    }
}

impl fmt::Display for ComputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
