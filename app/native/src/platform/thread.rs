use std::thread;

pub fn spawn_named_thread<F>(name: &str, task: F)
where F: FnOnce() + Send + 'static {
    let thread_name = format!("overnotch-{name}");

    if let Err(err) = thread::Builder::new().name(thread_name.clone()).spawn(task) {
        tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
    }
}

// ============================================================================
// Main Thread Dispatch (macOS GCD)
// ============================================================================

#[cfg(target_os = "macos")]
pub use gcd::{dispatch_on_main, is_main_thread, run_on_main_sync};

#[cfg(target_os = "macos")]
mod gcd {
    use std::ffi::c_void;

    /// Dispatch queue type alias.
    type DispatchQueue = *const c_void;

    #[link(name = "System", kind = "dylib")]
    unsafe extern "C" {
        /// The main dispatch queue (this is the actual symbol, not the macro).
        static _dispatch_main_q: c_void;
        fn dispatch_async_f(
            queue: DispatchQueue,
            context: *mut c_void,
            work: extern "C" fn(*mut c_void),
        );
        fn dispatch_sync_f(
            queue: DispatchQueue,
            context: *mut c_void,
            work: extern "C" fn(*mut c_void),
        );
        fn pthread_main_np() -> i32;
    }

    /// Returns the main dispatch queue.
    fn get_main_queue() -> DispatchQueue { std::ptr::addr_of!(_dispatch_main_q) }

    /// Returns whether the caller runs on the process main thread.
    #[must_use]
    pub fn is_main_thread() -> bool { unsafe { pthread_main_np() != 0 } }

    /// Context for dispatching a closure to the main thread.
    struct DispatchContext<F: FnOnce() + Send + 'static> {
        closure: Option<F>,
    }

    /// C-compatible trampoline function that executes the closure.
    extern "C" fn dispatch_trampoline<F: FnOnce() + Send + 'static>(context: *mut c_void) {
        unsafe {
            let ctx = Box::from_raw(context.cast::<DispatchContext<F>>());
            if let Some(closure) = ctx.closure {
                closure();
            }
        }
    }

    /// Context for a synchronous dispatch that produces a value.
    struct SyncContext<F, R> {
        closure: Option<F>,
        result: Option<R>,
    }

    extern "C" fn sync_trampoline<F: FnOnce() -> R, R>(context: *mut c_void) {
        // SAFETY: the context outlives the dispatch_sync_f call that runs us
        let ctx = unsafe { &mut *context.cast::<SyncContext<F, R>>() };
        if let Some(closure) = ctx.closure.take() {
            ctx.result = Some(closure());
        }
    }

    /// Dispatches a closure to run on the main thread asynchronously.
    ///
    /// Safe to call from any thread. Closures run in submission order.
    pub fn dispatch_on_main<F>(closure: F)
    where F: FnOnce() + Send + 'static {
        let ctx = Box::new(DispatchContext { closure: Some(closure) });
        let ctx_ptr = Box::into_raw(ctx).cast::<c_void>();

        unsafe {
            let main_queue = get_main_queue();
            dispatch_async_f(main_queue, ctx_ptr, dispatch_trampoline::<F>);
        }
    }

    /// Runs a closure on the main thread and waits for its result.
    ///
    /// Runs inline when already on the main thread, so it never deadlocks
    /// against itself. From any other thread it blocks until the main run
    /// loop services the queue.
    pub fn run_on_main_sync<F, R>(closure: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if is_main_thread() {
            return closure();
        }

        let mut ctx = SyncContext { closure: Some(closure), result: None };
        let ctx_ptr = std::ptr::addr_of_mut!(ctx).cast::<c_void>();

        unsafe {
            dispatch_sync_f(get_main_queue(), ctx_ptr, sync_trampoline::<F, R>);
        }

        match ctx.result {
            Some(result) => result,
            None => unreachable!("dispatch_sync_f returned without running the closure"),
        }
    }
}
