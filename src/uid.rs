//! Process-wide unique tokens.
//!
//! A `Uid` names things that must never collide: object identities and
//! the capabilities that gate access to hidden slots. Tokens come from a
//! single monotonically increasing counter, so no registry is needed to
//! check for repeats.

use core::fmt;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT: AtomicU64 = AtomicU64::new(1);

/// Opaque, never-repeating token.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Uid(NonZeroU64);

impl Uid {
    /// Mint a fresh token.
    pub fn next() -> Self {
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        match NonZeroU64::new(n) {
            Some(n) => Uid(n),
            // Wrapped around: uniqueness can no longer be guaranteed.
            None => std::process::abort(),
        }
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut n = self.get();
        let mut buf = [0u8; 13];
        let mut i = buf.len();
        while n > 0 {
            i -= 1;
            buf[i] = DIGITS[(n % 36) as usize];
            n /= 36;
        }
        // Digits are ASCII by construction.
        f.write_str(core::str::from_utf8(&buf[i..]).unwrap_or_default())
    }
}
