//! Subscriber installation
//!
//! Diagnostics always go to stderr; stdout belongs to diff output.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output profile for [`init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines at debug level
    Development,
    /// JSON lines at info level
    Production,
    /// Installs nothing; tests call `init_test_capture()` instead
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_filter(self) -> &'static str {
        match self {
            Profile::Development => "recdiff_core=debug,recdiff_store=debug,recdiff_cli=debug",
            Profile::Production | Profile::Test => {
                "recdiff_core=info,recdiff_store=info,recdiff_cli=info"
            }
        }
    }

    fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_filter()))
    }
}

/// Install the global subscriber for `profile`.
///
/// Only the first successful call has an effect; later calls, including
/// ones made after a test capture was installed, are ignored.
///
/// # Example
///
/// ```
/// use recdiff_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// init(Profile::Development); // no-op
/// ```
pub fn init(profile: Profile) {
    let installed = match profile {
        Profile::Development => tracing_subscriber::fmt()
            .with_env_filter(profile.env_filter())
            .with_writer(std::io::stderr)
            .finish()
            .try_init(),
        Profile::Production => tracing_subscriber::fmt()
            .json()
            .with_env_filter(profile.env_filter())
            .with_writer(std::io::stderr)
            .finish()
            .try_init(),
        Profile::Test => return,
    };
    if installed.is_err() {
        tracing::debug!(?profile, "subscriber already installed");
    }
}
