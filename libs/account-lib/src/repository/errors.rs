#[derive(Debug)]
pub enum AccountRepositoryError {
    UsernameAlreadyExists,
    EmailAlreadyExists,
    NotFound,
    Sqlx(sqlx::Error),
}

impl std::fmt::Display for AccountRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRepositoryError::UsernameAlreadyExists => write!(f, "username already exists"),
            AccountRepositoryError::EmailAlreadyExists => write!(f, "email already exists"),
            AccountRepositoryError::NotFound => write!(f, "not found"),
            AccountRepositoryError::Sqlx(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AccountRepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccountRepositoryError::UsernameAlreadyExists => None,
            AccountRepositoryError::EmailAlreadyExists => None,
            AccountRepositoryError::NotFound => None,
            AccountRepositoryError::Sqlx(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for AccountRepositoryError {
    fn from(value: sqlx::Error) -> Self {
        map_sqlx_error(value)
    }
}

fn extract_mysql_key_name(msg_lower: &str) -> Option<String> {
    // msg_lower is already lowercased
    let marker = "for key '";
    let start = msg_lower.find(marker)? + marker.len();
    let rest = &msg_lower[start..];
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

pub fn map_sqlx_error(err: sqlx::Error) -> AccountRepositoryError {
    const USER_USERNAME_UNIQUE: &str = "user_username_unique";
    const USER_EMAIL_UNIQUE: &str = "user_email_unique";

    if let sqlx::Error::Database(db_err) = &err {
        // MySQL duplicate key violations typically surface as:
        // - SQLSTATE code: 23000 (integrity constraint violation)
        // - message: "Duplicate entry '...' for key '...'"
        let msg = db_err.message().to_lowercase();
        let is_duplicate_key = db_err.code().as_deref() == Some("23000")
            && msg.contains("duplicate entry")
            && msg.contains("for key");

        if is_duplicate_key {
            // Example message:
            // "Duplicate entry 'foobar' for key 'users.user_username_unique'"
            // We extract the key name between "for key '" and the next "'".
            let key = extract_mysql_key_name(&msg).unwrap_or_default();

            // Prefer deterministic matching on named constraints.
            // MySQL may prefix with table name (e.g., "users.user_email_unique"),
            // so we use `ends_with`.
            if key.ends_with(USER_USERNAME_UNIQUE) || msg.contains(USER_USERNAME_UNIQUE) {
                return AccountRepositoryError::UsernameAlreadyExists;
            }

            if key.ends_with(USER_EMAIL_UNIQUE) || msg.contains(USER_EMAIL_UNIQUE) {
                return AccountRepositoryError::EmailAlreadyExists;
            }
        }
    }

    AccountRepositoryError::Sqlx(err)
}
