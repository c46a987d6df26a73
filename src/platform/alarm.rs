/// Line printed when the whole-run budget runs out.
pub const TIMEOUT_MESSAGE: &str = "UNKNOWN: Execution time too long!\n";

/// Exit code used when the alarm fires.
pub const TIMEOUT_EXIT_CODE: i32 = 3;

#[cfg(unix)]
extern "C" fn on_alarm(_signal: libc::c_int) {
    // Only async-signal-safe calls in here
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            TIMEOUT_MESSAGE.as_ptr() as *const libc::c_void,
            TIMEOUT_MESSAGE.len(),
        );
        libc::_exit(TIMEOUT_EXIT_CODE);
    }
}

/// Abort the process with an UNKNOWN verdict after `seconds`.
/// Returns whether a timer was armed.
#[cfg(unix)]
pub fn install_timeout(seconds: u64) -> bool {
    if seconds == 0 {
        return false;
    }
    let seconds = seconds.min(libc::c_uint::MAX as u64) as libc::c_uint;

    unsafe {
        let handler = on_alarm as extern "C" fn(libc::c_int);
        if libc::signal(libc::SIGALRM, handler as libc::sighandler_t) == libc::SIG_ERR {
            log::warn!("Could not install SIGALRM handler, running without timeout");
            return false;
        }
        libc::alarm(seconds);
    }
    log::debug!("Timeout set to {}s", seconds);
    true
}

#[cfg(not(unix))]
pub fn install_timeout(seconds: u64) -> bool {
    if seconds > 0 {
        log::warn!("Timeouts are not supported on this platform, ignoring --timeout");
    }
    false
}

/// Disarm a pending timeout.
#[cfg(unix)]
pub fn cancel_timeout() {
    unsafe {
        libc::alarm(0);
    }
}

#[cfg(not(unix))]
pub fn cancel_timeout() {}
