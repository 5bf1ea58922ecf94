// Library surface for the binary, headless/integration tests and reuse.
pub mod animator;
pub mod app;
pub mod app_dirs;
pub mod assets;
pub mod config;
pub mod duration;
pub mod easing;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod rng;
pub mod runtime;
pub mod ui;
pub mod wheel;

pub use engine::{SpinEngine, SpinObserver, SpinRequest, SpinState};
pub use envelope::EnvelopePresenter;
pub use error::WheelError;
