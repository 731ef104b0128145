//! Backend acquisition with device and compute-type fallback.
//!
//! Loading a model can fail for reasons the user can do nothing about at the
//! requested settings (accelerator not compiled in, compute type not
//! supported) and for reasons that are simply fatal (missing model file).
//! This module classifies load failures into a tagged kind and walks an
//! explicit, linear fallback ladder:
//!
//! 1. Try the requested device with the requested (or device-default)
//!    compute type.
//! 2. Device-unsupported → fall back to `auto` and retry.
//! 3. Compute-type-unsupported → retry increasingly conservative compute
//!    types, but only when the caller did not pin one explicitly.
//! 4. A pinned-but-rejected compute type fails immediately as
//!    `PrecisionRejected`; nothing is silently substituted.
//! 5. Anything unclassifiable is fatal immediately, never guessed into a
//!    fallback path.

use tracing::{info, warn};

use crate::backend::{BackendLoader, LoadError, LoadRequest};
use crate::device::{ComputeType, Device};
use crate::error::{Error, Result};

/// What the caller asked for. `compute: None` means "use device defaults and
/// allow fallback"; `Some(_)` pins the compute type for the whole ladder.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    pub model: String,
    pub device: Device,
    pub compute: Option<ComputeType>,
    pub threads: usize,
}

/// How a load failure is interpreted by the fallback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    DeviceUnsupported,
    ComputeUnsupported,
    Other,
}

/// Classify a backend error message.
///
/// Best-effort: we match case-insensitive substrings against the text the
/// backend produced. Unrecognized text is `Other` and treated as fatal.
fn classify(message: &str, device: Device, compute: ComputeType) -> FailureClass {
    let msg = message.to_lowercase();

    if msg.contains(compute.as_str()) || msg.contains("compute type") {
        return FailureClass::ComputeUnsupported;
    }

    let device_named = device.is_accelerator() && msg.contains(device.as_str());
    if msg.contains("unsupported device") || msg.contains("mps") || device_named {
        return FailureClass::DeviceUnsupported;
    }

    FailureClass::Other
}

/// Acquire a usable backend, retrying across the fallback ladder.
///
/// On success returns the handle and the compute type actually used, which
/// may differ from the request when fallback kicked in.
pub fn acquire<L: BackendLoader>(
    loader: &L,
    req: &AcquireRequest,
) -> Result<(L::Backend, ComputeType)> {
    let pinned = req.compute;
    let device = req.device;
    let compute = pinned.unwrap_or_else(|| ComputeType::default_for(device));

    let first_err = match try_load(loader, req, device, compute) {
        Ok(backend) => return Ok((backend, compute)),
        Err(err) => err,
    };

    match classify(&first_err.message, device, compute) {
        FailureClass::DeviceUnsupported if device.is_accelerator() => {
            warn!(
                device = %device,
                error = %first_err,
                "device rejected by backend, falling back to auto"
            );
            acquire_on_device(loader, req, Device::Auto, pinned)
        }
        FailureClass::ComputeUnsupported => match pinned {
            Some(requested) => Err(Error::PrecisionRejected {
                requested,
                message: first_err.message,
            }),
            None => retry_compute_ladder(loader, req, device, compute, first_err),
        },
        _ => Err(Error::BackendUnavailable(first_err.message)),
    }
}

/// Retry on a fallback device, preserving a pinned compute type if the caller
/// set one and recomputing device defaults otherwise.
fn acquire_on_device<L: BackendLoader>(
    loader: &L,
    req: &AcquireRequest,
    device: Device,
    pinned: Option<ComputeType>,
) -> Result<(L::Backend, ComputeType)> {
    let compute = pinned.unwrap_or_else(|| ComputeType::default_for(device));

    let err = match try_load(loader, req, device, compute) {
        Ok(backend) => {
            info!(device = %device, compute = %compute, "backend loaded after device fallback");
            return Ok((backend, compute));
        }
        Err(err) => err,
    };

    if classify(&err.message, device, compute) == FailureClass::ComputeUnsupported {
        if let Some(requested) = pinned {
            return Err(Error::PrecisionRejected {
                requested,
                message: err.message,
            });
        }
        return retry_compute_ladder(loader, req, device, compute, err);
    }

    Err(Error::BackendUnavailable(err.message))
}

/// Walk the compute-type retry ladder. `already_tried` is skipped so we
/// never repeat the attempt that brought us here.
fn retry_compute_ladder<L: BackendLoader>(
    loader: &L,
    req: &AcquireRequest,
    device: Device,
    already_tried: ComputeType,
    first_err: LoadError,
) -> Result<(L::Backend, ComputeType)> {
    warn!(
        compute = %already_tried,
        error = %first_err,
        "compute type rejected by backend, retrying conservative alternatives"
    );

    let mut last_err = first_err;
    for compute in ComputeType::fallback_ladder() {
        if compute == already_tried {
            continue;
        }
        match try_load(loader, req, device, compute) {
            Ok(backend) => {
                info!(device = %device, compute = %compute, "backend loaded after compute-type fallback");
                return Ok((backend, compute));
            }
            Err(err) => last_err = err,
        }
    }

    Err(Error::BackendUnavailable(last_err.message))
}

fn try_load<L: BackendLoader>(
    loader: &L,
    req: &AcquireRequest,
    device: Device,
    compute: ComputeType,
) -> std::result::Result<L::Backend, LoadError> {
    info!(model = %req.model, device = %device, compute = %compute, "loading backend");
    loader.load(&LoadRequest {
        model: &req.model,
        device,
        compute,
        threads: req.threads,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use super::*;
    use crate::backend::{Backend, RunInfo, SegmentStream};
    use crate::opts::DecodeOpts;
    use crate::segments::Segment;

    /// A backend that records what it was loaded with and yields nothing.
    #[derive(Debug)]
    struct FakeBackend {
        device: Device,
        compute: ComputeType,
    }

    struct EmptyStream;

    impl SegmentStream for EmptyStream {
        fn next_segment(&mut self) -> Result<Option<Segment>> {
            Ok(None)
        }
    }

    impl Backend for FakeBackend {
        type Stream = EmptyStream;

        fn transcribe(
            &mut self,
            _audio: &Path,
            _opts: &DecodeOpts,
        ) -> Result<(Self::Stream, RunInfo)> {
            Ok((EmptyStream, RunInfo::default()))
        }
    }

    /// Scripted loader: rejects according to a policy and records attempts.
    struct FakeLoader {
        attempts: RefCell<Vec<(Device, ComputeType)>>,
        policy: fn(Device, ComputeType) -> std::result::Result<(), String>,
    }

    impl FakeLoader {
        fn new(policy: fn(Device, ComputeType) -> std::result::Result<(), String>) -> Self {
            Self {
                attempts: RefCell::new(Vec::new()),
                policy,
            }
        }
    }

    impl BackendLoader for FakeLoader {
        type Backend = FakeBackend;

        fn load(&self, req: &LoadRequest<'_>) -> std::result::Result<FakeBackend, LoadError> {
            self.attempts.borrow_mut().push((req.device, req.compute));
            (self.policy)(req.device, req.compute)
                .map(|()| FakeBackend {
                    device: req.device,
                    compute: req.compute,
                })
                .map_err(LoadError::new)
        }
    }

    fn request(device: Device, compute: Option<ComputeType>) -> AcquireRequest {
        AcquireRequest {
            model: "small".to_string(),
            device,
            compute,
            threads: 0,
        }
    }

    #[test]
    fn first_attempt_success_uses_device_default_compute() -> anyhow::Result<()> {
        let loader = FakeLoader::new(|_, _| Ok(()));
        let (backend, compute) = acquire(&loader, &request(Device::Metal, None))?;

        assert_eq!(backend.device, Device::Metal);
        assert_eq!(compute, ComputeType::Float16);
        assert_eq!(loader.attempts.borrow().len(), 1);
        Ok(())
    }

    #[test]
    fn metal_rejection_falls_back_to_auto() -> anyhow::Result<()> {
        let loader = FakeLoader::new(|device, _| match device {
            Device::Metal => Err("unsupported device: metal".to_string()),
            _ => Ok(()),
        });

        let (backend, compute) = acquire(&loader, &request(Device::Metal, None))?;

        assert_eq!(backend.device, Device::Auto);
        // Device defaults are recomputed for the fallback device.
        assert_eq!(compute, ComputeType::Int8Float32);
        assert_eq!(
            *loader.attempts.borrow(),
            vec![
                (Device::Metal, ComputeType::Float16),
                (Device::Auto, ComputeType::Int8Float32),
            ]
        );
        Ok(())
    }

    #[test]
    fn device_fallback_preserves_pinned_compute() -> anyhow::Result<()> {
        let loader = FakeLoader::new(|device, _| match device {
            Device::Metal => Err("unsupported device: metal".to_string()),
            _ => Ok(()),
        });

        let (_, compute) = acquire(
            &loader,
            &request(Device::Metal, Some(ComputeType::Float32)),
        )?;

        assert_eq!(compute, ComputeType::Float32);
        assert_eq!(
            *loader.attempts.borrow(),
            vec![
                (Device::Metal, ComputeType::Float32),
                (Device::Auto, ComputeType::Float32),
            ]
        );
        Ok(())
    }

    #[test]
    fn compute_rejection_walks_the_ladder() -> anyhow::Result<()> {
        let loader = FakeLoader::new(|_, compute| match compute {
            ComputeType::Float32 => Ok(()),
            other => Err(format!("compute type {} is not supported", other.as_str())),
        });

        let (backend, compute) = acquire(&loader, &request(Device::Cpu, None))?;

        assert_eq!(backend.compute, ComputeType::Float32);
        assert_eq!(compute, ComputeType::Float32);
        // The default attempt is not repeated when the ladder reaches it.
        assert_eq!(
            *loader.attempts.borrow(),
            vec![
                (Device::Cpu, ComputeType::Int8Float32),
                (Device::Cpu, ComputeType::Int8Float16),
                (Device::Cpu, ComputeType::Float32),
            ]
        );
        Ok(())
    }

    #[test]
    fn pinned_compute_rejection_fails_without_substitution() {
        let loader = FakeLoader::new(|_, compute| {
            Err(format!("compute type {} is not supported", compute.as_str()))
        });

        let err = acquire(
            &loader,
            &request(Device::Cpu, Some(ComputeType::Int8Float16)),
        )
        .unwrap_err();

        match err {
            Error::PrecisionRejected { requested, .. } => {
                assert_eq!(requested, ComputeType::Int8Float16);
            }
            other => panic!("expected PrecisionRejected, got {other:?}"),
        }
        // Exactly one attempt: no substitute compute types were tried.
        assert_eq!(loader.attempts.borrow().len(), 1);
    }

    #[test]
    fn unclassified_failure_is_fatal_immediately() {
        let loader = FakeLoader::new(|_, _| Err("model file missing".to_string()));

        let err = acquire(&loader, &request(Device::Cpu, None)).unwrap_err();

        assert!(matches!(err, Error::BackendUnavailable(_)));
        assert_eq!(loader.attempts.borrow().len(), 1);
    }

    #[test]
    fn exhausted_ladder_reports_backend_unavailable() {
        let loader = FakeLoader::new(|_, compute| {
            Err(format!("compute type {} is not supported", compute.as_str()))
        });

        let err = acquire(&loader, &request(Device::Cpu, None)).unwrap_err();

        assert!(matches!(err, Error::BackendUnavailable(_)));
        // Default int8_float32, then the two remaining ladder rungs.
        assert_eq!(loader.attempts.borrow().len(), 3);
    }

    #[test]
    fn classifier_matches_substrings_case_insensitively() {
        assert_eq!(
            classify("Unsupported Device: METAL", Device::Metal, ComputeType::Float16),
            FailureClass::DeviceUnsupported
        );
        assert_eq!(
            classify(
                "int8_float16 is not implemented",
                Device::Cpu,
                ComputeType::Int8Float16
            ),
            FailureClass::ComputeUnsupported
        );
        assert_eq!(
            classify("weights not found", Device::Cpu, ComputeType::Float32),
            FailureClass::Other
        );
        // A CPU request never classifies as device-unsupported just because
        // the message mentions the device name.
        assert_eq!(
            classify("cpu fallback engaged", Device::Cpu, ComputeType::Float32),
            FailureClass::Other
        );
    }
}
