pub mod chat;
pub mod notification;
pub mod quote;
pub mod session;
pub mod theme;

pub use chat::ChatMessage;
pub use notification::{Notification, NotificationKind};
pub use quote::{Comment, Quote};
pub use session::Session;
pub use theme::{Theme, THEMES};
