use crate::essentials::*;

/// Who the store acts on behalf of
///
/// Authentication itself happens elsewhere; a session only carries the
/// identifier every row is scoped by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user<T: Into<String>>(id: T) -> Self {
        Self {
            user: Some(id.into()),
        }
    }

    pub fn user_id(&self) -> Result<&str> {
        self.user.as_deref().ok_or(Error::Unauthorized)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn end(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("Ended session of {user}");
        }
    }
}
