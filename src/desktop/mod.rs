// Desktop module - the outside world the harvest loop talks to.
// Window lookup and focus, synthetic keyboard/mouse input and screen capture
// sit behind small traits so the loop can run against a fake in tests.

pub mod system;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

// Re-export the main types for easy access
pub use system::SystemDesktop;
pub use types::{
    Desktop, InputSynthesizer, KeyCode, Press, ScreenCapturer, WindowActivator, WindowHandle,
    WindowLocator,
};
