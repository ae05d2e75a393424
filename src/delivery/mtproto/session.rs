//! Lazily started user session for the large-file transport.
//!
//! The session is owned by whoever builds the uploader and started on the
//! first upload. Concurrent first uploads wait on the same initialisation.

use async_trait::async_trait;
use grammers_client::{Client, Config, InitParams, SignInError};
use grammers_session::Session;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

use super::error::MtProtoError;

/// Something that can produce an authenticated client.
#[async_trait]
pub trait Connect: Send + Sync {
    type Client: Send + Sync;

    async fn connect(&self) -> Result<Self::Client, MtProtoError>;
}

/// One-time-initialised client handle.
pub struct LazySession<C: Connect> {
    connector: C,
    client: OnceCell<C::Client>,
}

impl<C: Connect> LazySession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            client: OnceCell::new(),
        }
    }

    /// Returns the client, connecting on first use.
    ///
    /// A failed start leaves the cell empty so the next caller tries again.
    pub async fn client(&self) -> Result<&C::Client, MtProtoError> {
        self.client
            .get_or_try_init(|| async {
                log::info!("Starting user session for large-file uploads...");
                let client = self.connector.connect().await?;
                log::info!("User session started successfully");
                Ok(client)
            })
            .await
    }

    pub fn is_started(&self) -> bool {
        self.client.initialized()
    }
}

/// Signs in as a regular user account, reusing a saved session file.
pub struct UserConnector {
    pub api_id: i32,
    pub api_hash: String,
    pub phone_number: String,
    pub two_fa_password: Option<String>,
    pub session_path: PathBuf,
}

impl UserConnector {
    fn load_session(&self) -> Result<Session, MtProtoError> {
        if self.session_path.exists() {
            log::info!("Loading existing session from {:?}", self.session_path);
            Session::load_file(&self.session_path)
                .map_err(|e| MtProtoError::Session(format!("Failed to load session: {}", e)))
        } else {
            log::info!("Creating new session");
            Ok(Session::new())
        }
    }

    async fn sign_in(&self, client: &Client) -> Result<(), MtProtoError> {
        log::info!("Not authorized, requesting login code for {}", self.phone_number);
        let token = client
            .request_login_code(&self.phone_number)
            .await
            .map_err(|e| MtProtoError::SignIn(format!("Failed to request login code: {}", e)))?;

        let code = prompt_login_code().await?;

        match client.sign_in(&token, &code).await {
            Ok(_) => Ok(()),
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = self.two_fa_password.as_deref().ok_or_else(|| {
                    MtProtoError::SignIn("Account has 2FA enabled but TWO_FA_PASSWORD is not set".to_string())
                })?;
                client
                    .check_password(password_token, password.trim())
                    .await
                    .map(|_| ())
                    .map_err(|e| MtProtoError::SignIn(format!("2FA password rejected: {}", e)))
            }
            Err(e) => Err(MtProtoError::SignIn(e.to_string())),
        }
    }
}

#[async_trait]
impl Connect for UserConnector {
    type Client = Client;

    async fn connect(&self) -> Result<Client, MtProtoError> {
        let config = Config {
            session: self.load_session()?,
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            params: InitParams {
                device_model: "audiorelay".to_string(),
                system_version: "1.0".to_string(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                system_lang_code: "en".to_string(),
                lang_code: "en".to_string(),
                ..Default::default()
            },
        };

        log::info!("Connecting to Telegram...");
        let client = Client::connect(config)
            .await
            .map_err(|e| MtProtoError::Session(format!("Failed to connect: {}", e)))?;

        if client.is_authorized().await? {
            log::info!("Already authorized");
        } else {
            self.sign_in(&client).await?;
            save_session(&client, &self.session_path)?;
        }

        Ok(client)
    }
}

fn save_session(client: &Client, session_path: &Path) -> Result<(), MtProtoError> {
    if let Some(parent) = session_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MtProtoError::Session(format!("Failed to create session directory: {}", e)))?;
        }
    }
    // grammers-session 0.5 requires file to exist before saving (uses write, not create)
    if !session_path.exists() {
        std::fs::File::create(session_path)
            .map_err(|e| MtProtoError::Session(format!("Failed to create session file: {}", e)))?;
    }
    client
        .session()
        .save_to_file(session_path)
        .map_err(|e| MtProtoError::Session(format!("Failed to save session: {}", e)))?;
    log::info!("Session saved to {:?}", session_path);
    Ok(())
}

/// Reads the login code Telegram sent to the account, from stdin.
async fn prompt_login_code() -> Result<String, MtProtoError> {
    let code = tokio::task::spawn_blocking(|| {
        use std::io::{BufRead, Write};
        print!("Enter the login code Telegram sent to the uploading account: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok::<_, std::io::Error>(line.trim().to_string())
    })
    .await
    .map_err(|e| MtProtoError::SignIn(format!("Login prompt failed: {}", e)))??;

    if code.is_empty() {
        return Err(MtProtoError::SignIn("Empty login code".to_string()));
    }
    Ok(code)
}
