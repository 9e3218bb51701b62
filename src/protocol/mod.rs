//! Line oriented text protocol spoken between a device and a plotting client. Every generated
//!  line ends with CR LF; received lines are trimmed before they are interpreted.
//!
//! ## Handshake
//!
//! A client links to a device by sending a control line to the device's UDP listen port (or
//!  over the local line channel):
//!
//! ```ascii
//! CONNECT:<client host>:<client receive port>
//! DISCONNECT:<client host>:<client receive port>
//! ```
//!
//! The device acknowledges with the same command, carrying its own address and the client's
//!  receive port:
//!
//! ```ascii
//! CONNECT:<device ip>:<client receive port>\r\n
//! ```
//!
//! Any received line that is not a well-formed control line is passed on to the application.
//!
//! ## Samples
//!
//! ```ascii
//! >name:ts_ms:value[§unit]|g\r\n                  scalar sample
//! >name:ts0:v0;ts1:v1;...[§unit]|g\r\n            batch sample, values with 6 decimal digits
//! ts_ms:text\r\n                                  log line
//! ```

pub mod handshake;
pub mod plot_value;
pub mod sample_format;

pub const NEWLINE: &str = "\r\n";
