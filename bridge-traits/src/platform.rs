//! Marker traits keeping bridge bounds aligned with the host's threading model.
//!
//! Player handles and stop callbacks are created on the UI thread but the
//! coordinator is shared behind an `Arc` and may be reached from whichever
//! thread the host uses to dispatch UI events. Requiring `Send + Sync` through a
//! single marker keeps every bridge trait declaration uniform.

/// Marker trait equivalent to `Send + Sync`.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync + ?Sized {}
