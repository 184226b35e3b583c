use rand_core::{CryptoRng, Error, RngCore};

/// This is a dummy RNG for cases when we need a concrete RNG type
/// which does not get used.
///
/// Signature padding is deterministic, so signing hands this to
/// [`pad`](crate::padding::pad) instead of a real generator.
#[derive(Copy, Clone)]
pub(crate) struct DummyRng;

impl RngCore for DummyRng {
    fn next_u32(&mut self) -> u32 {
        unimplemented!();
    }

    fn next_u64(&mut self) -> u64 {
        unimplemented!();
    }

    fn fill_bytes(&mut self, _: &mut [u8]) {
        unimplemented!();
    }

    fn try_fill_bytes(&mut self, _: &mut [u8]) -> core::result::Result<(), Error> {
        unimplemented!();
    }
}

impl CryptoRng for DummyRng {}
