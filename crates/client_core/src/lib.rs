//! Client-side exchange flow for the TekBot screens: validate a form, guard
//! against double submission, show a pending indicator, call the API, and
//! render exactly one outcome.

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod flow;
pub mod preferences;
pub mod render;
pub mod state;
pub mod transport;
pub mod validation;

pub use config::{load_settings, ClientSettings};
pub use context::{Navigator, Redirect, RenderSink, ScreenContext, StayOnScreen};
pub use controller::{ExchangeController, Submission};
pub use error::{ExchangeError, TransportError};
pub use flow::Flow;
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use render::{render, DisplayMessage, DisplayModel, Presentation, Tone};
pub use state::{ExchangeState, Response};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use validation::{RawInput, ValidationRules};
