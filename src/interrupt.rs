//! Process-wide interrupt flag for partial-run reporting.
//!
//! On SIGINT the pipeline stops dispatching new documents, drains finished
//! work, and marks the audit partial instead of dying mid-report.
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn flag_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler. The handler only flips an atomic flag;
/// workers notice it between documents.
pub fn install() {
    unsafe {
        libc::signal(libc::SIGINT, flag_interrupt as libc::sighandler_t);
    }
}

/// Whether an interrupt has been requested.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
