use std::fmt;

/// Request-scoped logging interface.
///
/// `ScopeLog` is obtained from [`RequestScope::log`](crate::RequestScope::log)
/// and is lifetime-bound to the scope it came from.
///
/// All log messages automatically include the request ID.
#[derive(Debug, Clone, Copy)]
pub struct ScopeLog<'a> {
    request_id: &'a str,
}

impl<'a> ScopeLog<'a> {
    /// Creates a logger stamped with `request_id`.
    ///
    /// This is `pub(crate)`; only `RequestScope` creates it.
    pub(crate) fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs a warning-level message with request ID.
    ///
    /// Use with `format_args!`:
    /// ```no_run
    /// # use bean_binder::ScopeLog;
    /// # fn example(log: ScopeLog<'_>) {
    /// log.warn(format_args!("resolver for {} failed", "paging.page"));
    /// # }
    /// ```
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a trace-level message with request ID.
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        tracing::trace!(request_id = %self.request_id, "{}", args);
    }
}
