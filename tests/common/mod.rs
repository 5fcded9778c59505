#![allow(unused_imports)]

pub use taskrunner_test_utils::builders;
pub use taskrunner_test_utils::fake_backend::FakeBackend;
pub use taskrunner_test_utils::recorder::Recorder;
pub use taskrunner_test_utils::{init_tracing, with_timeout};
