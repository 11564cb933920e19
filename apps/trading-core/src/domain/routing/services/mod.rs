//! Routing domain services.

mod platform_router;

pub use platform_router::PlatformRouter;
