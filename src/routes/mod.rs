/// Router Module Index
///
/// Routes are split by access tier and each tier gets its guard as a layer in
/// `create_router`, so a handler can never be mounted without its access check.

/// Routes accessible to everyone: health, published content, contact form, sign-in/up.
pub mod public;

/// Routes that read or change the caller's own session. Anonymous callers allowed.
pub mod session;

/// Routes under `/admin`, wrapped in `guard::require_admin`, plus the super-admin
/// tier wrapped in `guard::require_super_admin`.
pub mod admin;
