/// Creates a root span based on the provided sampling rate.
/// Sampling is a pre-filter: an unsampled request pays no span
/// collection cost at all rather than being dropped at export.
///
/// # Behavior
/// - If a parent span exists (is active): ALWAYS creates a child span (preserves complete trace)
/// - If no parent exists: Makes sampling decision at the configured rate
///
/// # Returns
/// - Real span if parent exists OR sampling passes
/// - `Span::none()` if no parent and sampling fails
#[macro_export]
macro_rules! sample_or_attach_root_span {
    ($sample_percent:expr, $span_name:literal) => {{
        let current = tracing::Span::current();

        if !current.is_disabled() || rand::random::<f32>() < $sample_percent {
            tracing::info_span!($span_name)
        } else {
            tracing::Span::none()
        }
    }};
    ($sample_percent:expr, $span_name:literal, $($fields:tt)*) => {{
        let current = tracing::Span::current();

        if !current.is_disabled() || rand::random::<f32>() < $sample_percent {
            tracing::info_span!($span_name, $($fields)*)
        } else {
            tracing::Span::none()
        }
    }};
}

/// Creates an INFO-level child span only if the parent span is active
/// (sampled). Returns an **un-entered** `Span` - call `.entered()` or
/// use `.instrument()`.
#[macro_export]
macro_rules! child_span_info {
    ($span_name:literal) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::info_span!($span_name)
        } else {
            ::tracing::Span::none()
        }
    }};
    ($span_name:literal, $($fields:tt)*) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::info_span!($span_name, $($fields)*)
        } else {
            ::tracing::Span::none()
        }
    }};
}

/// Creates a DEBUG-level child span only if the parent span is active
/// (sampled). Returns an **un-entered** `Span`.
#[macro_export]
macro_rules! child_span_debug {
    ($span_name:literal) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::debug_span!($span_name)
        } else {
            ::tracing::Span::none()
        }
    }};
    ($span_name:literal, $($fields:tt)*) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::debug_span!($span_name, $($fields)*)
        } else {
            ::tracing::Span::none()
        }
    }};
}
