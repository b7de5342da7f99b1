//! Authentication hooks for binding a connection to a user.
//!
//! Broadside doesn't issue or check credentials itself. Token
//! verification and account lookup belong to external services, so the
//! server talks to them through two traits:
//!
//! - [`IdentityVerifier`] — turns a bearer token into [`Claims`].
//! - [`UserDirectory`] — confirms the account behind the claims still
//!   exists and supplies its canonical username.
//!
//! [`authenticate`] runs both in order. These are the only awaits before a
//! connection is registered.

use std::future::Future;

use broadside_protocol::UserId;

use crate::{AuthError, Identity};

/// What a verified token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// An account as stored by the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Validates a bearer token.
///
/// # Example
///
/// ```rust
/// use broadside_protocol::UserId;
/// use broadside_session::{AuthError, Claims, IdentityVerifier};
///
/// /// Accepts `<id>:<username>` tokens. Development only.
/// struct PlainTokens;
///
/// impl IdentityVerifier for PlainTokens {
///     async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
///         let (id, name) = token
///             .split_once(':')
///             .ok_or_else(|| AuthError::InvalidToken("expected id:name".into()))?;
///         let id = id
///             .parse()
///             .map_err(|_| AuthError::InvalidToken("id must be a number".into()))?;
///         Ok(Claims {
///             user_id: UserId(id),
///             username: name.to_string(),
///             email: format!("{name}@example.invalid"),
///         })
///     }
/// }
/// ```
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Returns the token's claims, or [`AuthError::InvalidToken`].
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Claims, AuthError>> + Send;
}

/// Looks up user accounts.
pub trait UserDirectory: Send + Sync + 'static {
    /// Returns the account, `Ok(None)` if it doesn't exist, or
    /// [`AuthError::DirectoryUnavailable`] if the lookup itself failed.
    fn find_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<UserRecord>, AuthError>> + Send;
}

/// Verifies `token` and resolves it to an [`Identity`].
///
/// The username comes from the directory, not the token, so a renamed
/// account connects under its current name.
///
/// # Errors
/// - [`AuthError::MissingToken`] if `token` is `None`
/// - whatever the verifier returns for a bad token
/// - [`AuthError::UserNotFound`] if the directory has no such user
pub async fn authenticate<V, D>(
    verifier: &V,
    directory: &D,
    token: Option<&str>,
) -> Result<Identity, AuthError>
where
    V: IdentityVerifier,
    D: UserDirectory,
{
    let token = token.ok_or(AuthError::MissingToken)?;
    let claims = verifier.verify(token).await?;

    let user = directory
        .find_by_id(claims.user_id)
        .await?
        .ok_or(AuthError::UserNotFound(claims.user_id))?;

    Ok(Identity::new(user.id, user.username))
}
