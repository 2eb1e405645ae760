mod clipboard;
mod error;
mod options;
mod search;
mod session;

pub mod hex;
pub mod nibble;

pub use clipboard::{new_clipboard, Clipboard, Internal};
pub use error::EditError;
pub use options::{read_config, ClipboardKind, Config, EditMode, Options, PROJECT_CONFIG};
pub use search::find_all;
pub use session::Session;

pub use hexed_buffer::{Buffer, BufferError, BufferObserver};
