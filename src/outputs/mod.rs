//! Output forms of a finished digest.
//!
//! # Submodules
//!
//! - [`download`]: The `.md` file artifact (filename, content type, body)
//! - [`html`]: Markdown → HTML rendering for the result view
//!
//! Both consume the same summary string, so the downloaded file is always the
//! exact text that was rendered.

pub mod download;
pub mod html;
