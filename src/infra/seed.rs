// ============================================================
// Infrastructure — Process-wide Seed Control
// ============================================================
// All randomness drawn by this crate comes from two generators,
// each behind its own process-wide lock:
//
//   general — ad-hoc draws (shuffles, sampling, ...)
//   tensor  — values for freshly initialised weight tensors
//
// `set_seed` reseeds both. `set_seed_on` also reseeds the burn
// backend's generator, which drives `Tensor::random`, module
// `init` and dropout. Until seeded, everything starts from OS
// entropy.

use std::sync::{Mutex, MutexGuard, OnceLock};

use burn::tensor::backend::Backend;
use rand::{rngs::StdRng, SeedableRng};

use crate::error::{Result, UtilError};

static GENERAL: OnceLock<Mutex<StdRng>> = OnceLock::new();
static TENSOR: OnceLock<Mutex<StdRng>> = OnceLock::new();

fn stream(cell: &'static OnceLock<Mutex<StdRng>>) -> MutexGuard<'static, StdRng> {
    cell.get_or_init(|| Mutex::new(StdRng::from_entropy()))
        .lock()
        // The generator stays usable even if a draw panicked mid-way
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn reseed_streams(seed: u64) {
    *stream(&GENERAL) = StdRng::seed_from_u64(seed);
    *stream(&TENSOR) = StdRng::seed_from_u64(seed);
}

/// Reseed every random source owned by the crate and return the seed.
///
/// Fails with [`UtilError::MissingSeed`] when called with `None`.
/// Tensors drawn by a burn backend are not covered; use [`set_seed_on`]
/// for those.
///
/// ```ignore
/// set_seed(Some(42))?;
/// let a: u64 = with_rng(|rng| rng.gen());
/// ```
pub fn set_seed(seed: Option<u64>) -> Result<u64> {
    let seed = seed.ok_or(UtilError::MissingSeed)?;
    reseed_streams(seed);
    tracing::info!("Random seed set to {}", seed);
    Ok(seed)
}

/// Like [`set_seed`], and also seeds backend `B` on `device`.
///
/// ```ignore
/// set_seed_on::<NdArray>(Some(42), &NdArrayDevice::Cpu)?;
/// let w = Tensor::<NdArray, 1>::random([8], Distribution::Default, &device);
/// ```
pub fn set_seed_on<B: Backend>(seed: Option<u64>, device: &B::Device) -> Result<u64> {
    let seed = seed.ok_or(UtilError::MissingSeed)?;
    reseed_streams(seed);
    B::seed(device, seed);
    tracing::info!("Random seed set to {} (backend seeded too)", seed);
    Ok(seed)
}

/// Run `f` with exclusive access to the general-purpose generator.
///
/// The stream stays locked while `f` runs, so `f` must not call
/// [`with_rng`], [`set_seed`] or [`set_seed_on`]. Drawing from the
/// tensor stream inside `f` is fine.
pub fn with_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    f(&mut stream(&GENERAL))
}

/// Run `f` with exclusive access to the tensor-initialisation generator.
///
/// `f` must not call [`with_tensor_rng`], [`with_rng`] or either seed
/// function. Nest the tensor stream inside the general one, never the
/// other way round.
pub fn with_tensor_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    f(&mut stream(&TENSOR))
}

/// Serialises tests that reseed and then draw, since the state is shared
/// by every test thread in the binary.
#[cfg(test)]
pub(crate) fn test_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use burn::tensor::{Distribution, Tensor};
    use rand::Rng;
    use std::{sync::mpsc, thread, time::Duration};

    fn two_draws() -> (u64, f64) {
        with_rng(|rng| (rng.gen::<u64>(), rng.gen::<f64>()))
    }

    fn backend_draw(device: &NdArrayDevice) -> Vec<f32> {
        Tensor::<NdArray, 1>::random([6], Distribution::Default, device)
            .into_data()
            .to_vec::<f32>()
            .unwrap()
    }

    #[test]
    fn test_same_seed_same_draws() {
        let _guard = test_lock();

        assert_eq!(set_seed(Some(42)).unwrap(), 42);
        let first = two_draws();

        set_seed(Some(42)).unwrap();
        let second = two_draws();

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let _guard = test_lock();

        set_seed(Some(1)).unwrap();
        let a = two_draws();
        set_seed(Some(2)).unwrap();
        let b = two_draws();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tensor_stream_is_reseeded_too() {
        let _guard = test_lock();

        set_seed(Some(7)).unwrap();
        let a: Vec<u32> = with_tensor_rng(|rng| (0..4).map(|_| rng.gen()).collect());
        set_seed(Some(7)).unwrap();
        let b: Vec<u32> = with_tensor_rng(|rng| (0..4).map(|_| rng.gen()).collect());
        assert_eq!(a, b);
    }

    #[test]
    fn test_backend_random_tensors_repeat_after_reseed() {
        let _guard = test_lock();
        let device = NdArrayDevice::Cpu;

        assert_eq!(set_seed_on::<NdArray>(Some(42), &device).unwrap(), 42);
        let first = backend_draw(&device);
        let first_general = two_draws();

        set_seed_on::<NdArray>(Some(42), &device).unwrap();
        let second = backend_draw(&device);

        assert_eq!(first, second);
        assert_eq!(first_general, two_draws());
    }

    #[test]
    fn test_backend_seed_requires_a_value() {
        let err = set_seed_on::<NdArray>(None, &NdArrayDevice::Cpu).unwrap_err();
        assert!(matches!(err, UtilError::MissingSeed));
    }

    #[test]
    fn test_streams_can_be_used_together() {
        let _guard = test_lock();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mixed = with_rng(|r| r.gen::<u64>() ^ with_tensor_rng(|t| t.gen::<u64>()));
            let init = with_rng(|r| {
                let n = r.gen_range(1..4);
                with_tensor_rng(|t| (0..n).map(|_| t.gen::<u32>()).count())
            });
            tx.send((mixed, init)).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        // Neither stream is left locked afterwards
        assert_eq!(set_seed(Some(3)).unwrap(), 3);
    }

    #[test]
    fn test_missing_seed_is_rejected() {
        let err = set_seed(None).unwrap_err();
        assert!(matches!(err, UtilError::MissingSeed));
    }
}
