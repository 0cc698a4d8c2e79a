use chrono::Duration;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, validate_jwt, Claims};
use crate::cli::utils::{output_data, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a Supabase-style access token")]
    Mint {
        #[arg(long, help = "User id (sub claim); random when omitted")]
        user: Option<Uuid>,

        #[arg(long, help = "Email claim")]
        email: Option<String>,

        #[arg(long, default_value_t = 1, help = "Lifetime in hours")]
        ttl_hours: i64,

        #[arg(long, env = "SUPABASE_JWT_SECRET", hide_env_values = true)]
        secret: String,
    },

    #[command(about = "Validate a token and print its claims")]
    Inspect {
        #[arg(help = "JWT")]
        token: String,

        #[arg(long, env = "SUPABASE_JWT_SECRET", hide_env_values = true)]
        secret: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint {
            user,
            email,
            ttl_hours,
            secret,
        } => {
            let user_id = user.unwrap_or_else(Uuid::new_v4);
            let claims = Claims::new(user_id, email, Duration::hours(ttl_hours));
            let token = generate_jwt(&claims, &secret)?;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token minted",
                    Some(json!({ "token": token, "user_id": user_id, "exp": claims.exp })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Inspect { token, secret } => {
            let claims = validate_jwt(&token, &secret)?;
            output_data(&output_format, &claims, || {
                vec![
                    format!("sub:   {}", claims.sub),
                    format!("email: {}", claims.email.as_deref().unwrap_or("-")),
                    format!("aud:   {}", claims.aud),
                    format!("exp:   {}", claims.exp),
                ]
            })
        }
    }
}
