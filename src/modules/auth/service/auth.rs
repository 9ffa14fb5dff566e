use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::{
    error::{Error, Result},
    modules::{
        auth::{
            password,
            token::{Claims, TokenIssuer, TokenPair, TokenType},
        },
        user::repository::{CreateUserPayload, Role, UpdateUserPayload, User, UserRepository},
    },
    utils::database,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Clone, Debug)]
pub struct LoginResult {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
    dummy_hash: Arc<OnceCell<String>>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash_password(plain: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash(&plain))
        .await
        .map_err(|err| {
            tracing::error!("Password hashing task failed: {}", err);
            Error::Internal(String::from("Failed to hash password"))
        })?
}

async fn verify_password(plain: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify(&plain, &hash))
        .await
        .map_err(|err| {
            tracing::error!("Password verification task failed: {}", err);
            Error::Internal(String::from("Failed to verify password"))
        })
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self {
            users,
            tokens,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash checked when the email is unknown, so both login failures cost
    /// the same.
    async fn dummy_hash(&self) -> Result<String> {
        self.dummy_hash
            .get_or_try_init(|| hash_password(String::from(DUMMY_PASSWORD)))
            .await
            .cloned()
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let email = normalize_email(&payload.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::AlreadyExists(String::from("Email already in use")));
        }

        let password_hash = hash_password(payload.password).await?;

        self.users
            .create(CreateUserPayload {
                name: payload.name.trim().to_string(),
                email,
                phone: payload.phone.trim().to_string(),
                password_hash,
                role: Role::Customer,
            })
            .await
            .map_err(|err| match err {
                database::Error::Conflict(_) => {
                    Error::AlreadyExists(String::from("Email already in use"))
                }
                err => err.into(),
            })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .filter(|user| user.is_active);

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?,
        };

        let verified = verify_password(password.to_string(), hash).await?;

        let user = match (user, verified) {
            (Some(user), true) => user,
            _ => return Err(Error::Unauthenticated(String::from(INVALID_CREDENTIALS))),
        };

        let tokens = self.tokens.issue_pair(&user)?;
        self.record_login(user.id.clone());

        Ok(LoginResult { user, tokens })
    }

    fn record_login(&self, user_id: String) {
        let users = self.users.clone();

        let _ = tokio::spawn(async move {
            let payload = UpdateUserPayload {
                last_login_at: Some(Utc::now().naive_utc()),
                ..Default::default()
            };

            if let Err(err) = users.update_by_id(&user_id, payload).await {
                tracing::warn!("Failed to record last login for user {}: {}", user_id, err);
            }
        });
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token, TokenType::Access)
    }

    /// Resolves an access token to a live user account.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        self.find_active_user(&claims.sub).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.tokens.verify(refresh_token, TokenType::Refresh)?;
        let user = self.find_active_user(&claims.sub).await?;
        self.tokens.issue_pair(&user)
    }

    async fn find_active_user(&self, id: &str) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| Error::Unauthenticated(String::from("Invalid session token")))
    }
}
