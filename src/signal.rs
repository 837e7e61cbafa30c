//! External interrupt handling
//!
//! An [`Interrupt`] is the only way to cancel a receiver: it is checked
//! before every poll, and a raised interrupt closes the session.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static SIGINT_RAISED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_signum: libc::c_int) {
    SIGINT_RAISED.store(true, Ordering::SeqCst);
}

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    watch_sigint: bool,
}

impl Interrupt {
    /// A flag raised only through [`Interrupt::raise`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a SIGINT handler and return a flag that observes it
    ///
    /// The handler is installed without `SA_RESTART`, so a receive blocked
    /// in the kernel returns `EINTR` instead of waiting out its timeout.
    pub fn on_sigint() -> io::Result<Self> {
        let ret = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut())
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Interrupt {
            flag: Arc::new(AtomicBool::new(false)),
            watch_sigint: true,
        })
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || (self.watch_sigint && SIGINT_RAISED.load(Ordering::SeqCst))
    }
}
