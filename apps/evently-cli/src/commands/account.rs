//! # Account Commands
//!
//! Sign in and out, registration, profile and password flows. Anything that
//! changes the session is written back to the session file.

use evently_client::protocol::MessageResponse;
use evently_core::forms::{
    ChangePasswordForm, ForgotPasswordForm, LoginForm, ProfileForm, RegisterForm,
    ResetPasswordForm,
};

use crate::cli::{PasswordCommand, ProfileCommand, RegisterArgs};
use crate::context::AppContext;
use crate::error::CliResult;
use crate::render;

pub async fn login(ctx: &AppContext, email: String, password: String) -> CliResult<()> {
    let form = LoginForm { email, password };
    let user = ctx.api.login(&form).await?;
    ctx.persist_session().await?;

    ctx.output
        .emit(&user, || format!("Welcome, {}", user.full_name))
}

pub async fn register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    let form = RegisterForm {
        full_name: args.full_name,
        email: args.email,
        password: args.password,
        confirm_password: args.confirm_password,
        role: args.role,
        phone_number: args.phone_number,
        referral_code: args.referral_code,
    };
    let response = ctx.api.register(&form).await?;

    ctx.output.emit(&response, || {
        message_or(&response, "Account created, you can log in now")
    })
}

pub async fn logout(ctx: &AppContext) -> CliResult<()> {
    ctx.api.logout().await;
    ctx.persist_session().await?;
    ctx.output.message("Logged out")
}

/// Shows the stored user without calling the server.
pub async fn whoami(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.api.session().read().await;
    match session.user() {
        Some(user) => ctx.output.emit(user, || render::user(user)),
        None => ctx.output.emit(&serde_json::Value::Null, || "Not logged in".to_string()),
    }
}

pub async fn profile(ctx: &AppContext, command: ProfileCommand) -> CliResult<()> {
    ctx.require_login().await?;

    let user = match command {
        ProfileCommand::Show => ctx.api.profile().await?,
        ProfileCommand::Update {
            full_name,
            phone_number,
        } => {
            ctx.api
                .update_profile(&ProfileForm {
                    full_name,
                    phone_number,
                })
                .await?
        }
        ProfileCommand::Picture { file } => ctx.api.upload_profile_picture(&file).await?,
    };
    ctx.persist_session().await?;

    ctx.output.emit(&user, || render::user(&user))
}

pub async fn password(ctx: &AppContext, command: PasswordCommand) -> CliResult<()> {
    let (response, fallback) = match command {
        PasswordCommand::Change { old, new, confirm } => {
            ctx.require_login().await?;
            let form = ChangePasswordForm {
                old_password: old,
                new_password: new,
                confirm_password: confirm,
            };
            (ctx.api.change_password(&form).await?, "Password changed")
        }
        PasswordCommand::Forgot { email } => {
            let form = ForgotPasswordForm { email };
            (
                ctx.api.forgot_password(&form).await?,
                "If the address is registered, a reset link is on its way",
            )
        }
        PasswordCommand::Reset {
            token,
            new,
            confirm,
        } => {
            let form = ResetPasswordForm {
                token,
                new_password: new,
                confirm_password: confirm,
            };
            (ctx.api.reset_password(&form).await?, "Password reset, you can log in now")
        }
    };

    ctx.output.emit(&response, || message_or(&response, fallback))
}

/// The server's message, or `fallback` when it sent none.
fn message_or(response: &MessageResponse, fallback: &str) -> String {
    let message = response.message.trim();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context;
    use crate::error::ErrorCode;
    use evently_core::types::Role;

    #[test]
    fn test_message_or() {
        let empty = MessageResponse {
            message: "  ".into(),
            ..Default::default()
        };
        assert_eq!(message_or(&empty, "Password changed"), "Password changed");

        let sent = MessageResponse {
            message: "Check your inbox".into(),
            ..Default::default()
        };
        assert_eq!(message_or(&sent, "fallback"), "Check your inbox");
    }

    #[tokio::test]
    async fn test_logout_removes_session_file() {
        let (ctx, dir) = context(true).await;
        let path = dir.0.join("session.json");
        assert!(path.exists());

        logout(&ctx).await.unwrap();

        assert!(!path.exists());
        assert!(!ctx.api.session().read().await.is_authenticated());
        assert_eq!(ctx.require_login().await.unwrap_err().code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_whoami_works_offline() {
        let (ctx, _dir) = context(true).await;
        whoami(&ctx).await.unwrap();

        let (anonymous, _other) = context(false).await;
        whoami(&anonymous).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_login_keeps_session_untouched() {
        let (ctx, dir) = context(false).await;
        let err = login(&ctx, "not-an-email".into(), "secret".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!ctx.api.session().read().await.is_authenticated());
        assert!(!dir.0.join("session.json").exists());
    }

    #[tokio::test]
    async fn test_register_confirmation_checked_locally() {
        let (ctx, _dir) = context(false).await;
        let args = RegisterArgs {
            full_name: "Budi Santoso".into(),
            email: "budi@example.com".into(),
            password: "rahasia".into(),
            confirm_password: "rahasia!".into(),
            role: Role::Customer,
            phone_number: None,
            referral_code: None,
        };
        let err = register(&ctx, args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Passwords do not match");
    }

    #[tokio::test]
    async fn test_password_change_needs_login() {
        let (ctx, _dir) = context(false).await;
        let command = PasswordCommand::Change {
            old: "old-secret".into(),
            new: "new-secret".into(),
            confirm: "new-secret".into(),
        };
        let err = password(&ctx, command).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_profile_needs_login() {
        let (ctx, _dir) = context(false).await;
        let err = profile(&ctx, ProfileCommand::Show).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
