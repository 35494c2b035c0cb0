/// Authenticated identity handed in by the auth collaborator.
///
/// The core never mutates it; a new sign-in produces a new `Session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque stable user identifier.
    pub uid: String,
    /// Display name chosen at sign-up, if any.
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(uid: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name,
        }
    }

    fn uid_prefix(&self, len: usize) -> String {
        self.uid.chars().take(len).collect()
    }

    /// Anonymous handle derived from the uid, used where no profile name exists.
    pub fn handle(&self) -> String {
        format!("User {}", self.uid_prefix(4))
    }

    /// Display name to attribute authored content to.
    pub fn author_name(&self) -> String {
        self.display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.handle())
    }

    /// Sender name stamped on notifications this user triggers.
    pub fn reader_name(&self) -> String {
        format!("Reader {}", self.uid_prefix(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_derives_from_uid_prefix() {
        let session = Session::new("abcd1234", None);
        assert_eq!(session.handle(), "User abcd");
        assert_eq!(session.reader_name(), "Reader abcd");
    }

    #[test]
    fn test_author_name_prefers_display_name() {
        let session = Session::new("abcd1234", Some("Hafiz".to_string()));
        assert_eq!(session.author_name(), "Hafiz");
    }

    #[test]
    fn test_author_name_falls_back_on_blank_display_name() {
        let session = Session::new("abcd1234", Some("   ".to_string()));
        assert_eq!(session.author_name(), "User abcd");
    }

    #[test]
    fn test_short_uid_does_not_panic() {
        let session = Session::new("ab", None);
        assert_eq!(session.handle(), "User ab");
    }
}
