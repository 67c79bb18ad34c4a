//! Rate limiting logic and state management.

mod identity;
mod limiter;
mod window;

pub use identity::ClientKey;
pub use limiter::SlidingWindowLimiter;
pub use window::SlidingWindow;
