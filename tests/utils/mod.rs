pub mod builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use builders::{ItemBuilder, RoundPayloadBuilder};
#[allow(unused_imports)]
pub use mocks::SwitchableSubmitter;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
