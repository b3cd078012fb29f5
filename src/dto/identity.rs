use uuid::Uuid;

///
/// Authenticated user as supplied by the session provider.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }

    ///
    /// Builds identity from sign-in identifier which is either an email
    /// or a bare index number. Bare index numbers are turned into
    /// an address in `email_domain`.
    ///
    pub fn from_identifier(user_id: Uuid, identifier: &str, email_domain: &str) -> Self {
        let email = match identifier.contains('@') {
            true => identifier.to_string(),
            false => format!("{identifier}@{email_domain}"),
        };

        Self { user_id, email }
    }

    ///
    /// Key used to find the student profile.
    /// It is the index number embedded in the local part of the email.
    ///
    pub fn profile_lookup_key(&self) -> &str {
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(index_number, _)| index_number)
    }
}
