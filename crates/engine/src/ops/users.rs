use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, normalize_required_text};

/// Inputs for [`Engine::register_user`].
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// SHA-256 hex digest of a password.
///
/// Deterministic on purpose: the auth layer looks users up by
/// `(email, password_hash)` in a single query.
pub(crate) fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

impl Engine {
    /// Registers a new user.
    ///
    /// The email is trimmed and lowercased before the uniqueness check; a
    /// duplicate fails with [`EngineError::ExistingKey`].
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<User> {
        let email = normalize_required_text(&cmd.email, "email")?.to_lowercase();
        if !email.contains('@') {
            return Err(EngineError::Validation(format!("invalid email: {email}")));
        }
        let name = normalize_required_text(&cmd.name, "name")?;
        if cmd.password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(email));
        }

        let user = User::new(email, name, hash_password(&cmd.password));
        users::ActiveModel::from(&user).insert(&self.database).await?;

        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Looks a user up by id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(user_id.to_string()))?;
        User::try_from(model)
    }

    /// All registered users, ordered by email.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Email)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Looks a user up by credentials. Returns `None` when the email is
    /// unknown or the password does not match.
    pub async fn user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> ResultEngine<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .filter(users::Column::PasswordHash.eq(hash_password(password)))
            .one(&self.database)
            .await?;
        model.map(User::try_from).transpose()
    }

    /// Fails with [`EngineError::NotFound`] naming the id unless the user
    /// exists.
    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        let found = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?;
        if found.is_none() {
            return Err(EngineError::NotFound(user_id.to_string()));
        }
        Ok(())
    }
}
