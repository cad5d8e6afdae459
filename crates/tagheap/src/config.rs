use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cached process-wide growth switch. `ENV_INIT` runs at most once so the
/// environment is consulted a single time, then only the cache is read.
static GROWTH_DISABLED: AtomicBool = AtomicBool::new(false);
static ENV_INIT: Once = Once::new();

const ENV_KEY: &str = "TAGHEAP_DISABLE_GROWTH";

/// Whether arena growth is disabled process-wide.
///
/// The first call reads `TAGHEAP_DISABLE_GROWTH` from the environment
/// (any value other than empty or `0` disables growth) and caches the
/// result. [`set_growth_disabled`] overrides the cached value.
pub fn growth_disabled() -> bool {
    ENV_INIT.call_once(|| {
        let from_env = match std::env::var_os(ENV_KEY) {
            Some(val) => !val.is_empty() && val != "0",
            None => false,
        };
        GROWTH_DISABLED.store(from_env, Ordering::Relaxed);
    });
    GROWTH_DISABLED.load(Ordering::Relaxed)
}

/// Set the process-wide growth switch, overriding the environment.
/// Call before the first arena is created; arenas sample the switch
/// when they are constructed, not on every allocation.
pub fn set_growth_disabled(disabled: bool) {
    ENV_INIT.call_once(|| {});
    GROWTH_DISABLED.store(disabled, Ordering::Relaxed);
}
