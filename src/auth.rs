use crate::analysts::validate_email;
use crate::errors::{ApiError, ServiceError, ServiceResult};
use crate::models::{
    LoginRequest, LoginResponse, RegisterRequest, RegisteredUser, Session, User,
};
use crate::state::ApiContext;
use tracing::info;

/// Login, registration and the local view of the current session.
pub struct AuthService<'a> {
    ctx: &'a ApiContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ApiContext) -> Self {
        Self { ctx }
    }

    /// Stores the issued session only after the backend accepted the
    /// credentials and the response decoded completely.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::validation("email and password are required"));
        }

        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|err| ServiceError::Decode(err.to_string()))?;
        let response: LoginResponse = self
            .ctx
            .http
            .post("/auth/login", body, None)
            .await
            .and_then(|body| body.json())
            .map_err(credential_error)?;

        let session = Session {
            token: response.access_token,
            user: response.user,
        };
        if session.token.is_empty() {
            return Err(ServiceError::Decode("login response carried no token".to_string()));
        }
        self.ctx.session.save(&session)?;
        info!("logged in as {}", session.user.email);
        Ok(session)
    }

    /// Creates the account; the caller still has to log in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<RegisteredUser> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("name is required"));
        }
        validate_email(email)?;
        if password.is_empty() {
            return Err(ServiceError::validation("password is required"));
        }

        let body = serde_json::to_value(RegisterRequest {
            name,
            email,
            password,
        })
        .map_err(|err| ServiceError::Decode(err.to_string()))?;
        let user: RegisteredUser = self
            .ctx
            .http
            .post("/auth/register", body, None)
            .await
            .and_then(|body| body.json())
            .map_err(credential_error)?;
        info!("registered {email}");
        Ok(user)
    }

    /// Fails when the stored session could not be removed; the caller is
    /// then still logged in.
    pub fn logout(&self) -> ServiceResult<()> {
        self.ctx.session.clear()?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.ctx.session.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.session.is_authenticated()
    }
}

/// On the auth endpoints a 401 means bad credentials, not an expired session.
fn credential_error(err: ApiError) -> ServiceError {
    match err {
        ApiError::Http { message, .. } => ServiceError::Failed(message),
        other => ServiceError::from(other),
    }
}
