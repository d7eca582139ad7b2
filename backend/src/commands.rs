//! Operator commands
//!
//! Each subcommand maps onto one engine or account security operation.
//! Results are written to the supplied writer so the binary prints to
//! stdout and tests capture into a buffer.

use clap::Subcommand;
use std::io::Write;
use tracing::debug;

use crate::config::Config;
use crate::error::{BackendResult, ConfigError};
use crate::storage::JsonFileStore;
use eventdesk_shared::config::MAX_WINDOW;
use eventdesk_shared::logging::sanitize_log_message;
use eventdesk_shared::utils::{base32, provisioning, secret, totp};
use eventdesk_shared::{AccountSecurity, FixedClock, SystemClock, TimeSource};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a new Base32 shared secret
    Secret,

    /// Print the otpauth:// provisioning URI for a secret
    Uri {
        /// Account label shown in the authenticator app
        #[arg(short, long)]
        account: String,

        /// Base32 shared secret
        #[arg(short, long)]
        secret: String,

        /// Issuer name (defaults to the configured issuer)
        #[arg(short, long)]
        issuer: Option<String>,
    },

    /// Print the current code for a secret
    Code {
        /// Base32 shared secret
        #[arg(short, long)]
        secret: String,

        /// Unix timestamp to use instead of the current time
        #[arg(long)]
        at: Option<u64>,
    },

    /// Check a code against a secret
    Verify {
        /// Base32 shared secret
        #[arg(short, long)]
        secret: String,

        /// Code to check
        #[arg(short, long)]
        code: String,

        /// Unix timestamp to use instead of the current time
        #[arg(long)]
        at: Option<u64>,

        /// Steps accepted either side of the current one (at most 10)
        #[arg(short, long)]
        window: Option<u32>,
    },

    /// Start enrollment for an account (nothing is stored)
    Setup {
        #[arg(short, long)]
        account: String,
    },

    /// Confirm enrollment with the first code and store the secret
    Enable {
        #[arg(short, long)]
        account: String,

        /// Secret printed by `setup`
        #[arg(short, long)]
        secret: String,

        #[arg(short, long)]
        code: String,

        /// Unix timestamp to use instead of the current time
        #[arg(long)]
        at: Option<u64>,
    },

    /// Verify a login code for an enrolled account
    Login {
        #[arg(short, long)]
        account: String,

        #[arg(short, long)]
        code: String,

        /// Unix timestamp to use instead of the current time
        #[arg(long)]
        at: Option<u64>,
    },

    /// Remove the stored secret for an account
    Disable {
        #[arg(short, long)]
        account: String,
    },
}

/// Whether the command's check passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

impl Outcome {
    fn from_bool(accepted: bool) -> Self {
        if accepted {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        }
    }
}

fn clock(at: Option<u64>) -> Box<dyn TimeSource> {
    match at {
        Some(timestamp) => Box::new(FixedClock(timestamp)),
        None => Box::new(SystemClock),
    }
}

fn account_security(
    config: &Config,
    at: Option<u64>,
) -> AccountSecurity<JsonFileStore, Box<dyn TimeSource>> {
    AccountSecurity::with_clock(
        JsonFileStore::new(&config.storage.records_file),
        clock(at),
        config.totp.clone(),
    )
}

/// Run a command, writing its human-readable result to `out`
pub fn execute<W: Write>(
    command: &Command,
    config: &Config,
    out: &mut W,
) -> BackendResult<Outcome> {
    let params = config.totp.params();

    match command {
        Command::Secret => {
            let secret = secret::generate_base32_secret_with_len(config.totp.secret_bytes)?;
            writeln!(out, "{secret}")?;
            Ok(Outcome::Accepted)
        }

        Command::Uri {
            account,
            secret,
            issuer,
        } => {
            let issuer = issuer.as_deref().unwrap_or(&config.totp.issuer);
            let uri = provisioning::provisioning_uri(
                issuer,
                account,
                secret.trim(),
                params.period(),
                params.digits(),
            );
            debug!("Built provisioning URI {}", sanitize_log_message(&uri));
            writeln!(out, "{uri}")?;
            Ok(Outcome::Accepted)
        }

        Command::Code { secret, at } => {
            let now = clock(*at).now_unix();
            let code = totp::code_at(secret, now, &params);
            let remaining = totp::seconds_until_refresh(now, params.period());
            writeln!(out, "{code} (refreshes in {remaining}s)")?;
            Ok(Outcome::Accepted)
        }

        Command::Verify {
            secret,
            code,
            at,
            window,
        } => {
            let params = match window {
                Some(window) if *window > MAX_WINDOW => {
                    return Err(ConfigError::Invalid {
                        field: "window".to_string(),
                        reason: format!("must be at most {MAX_WINDOW} steps, got {window}"),
                    }
                    .into());
                }
                Some(window) => params.with_window(*window),
                None => params,
            };
            let valid = totp::verify(secret, code, &clock(*at), &params);
            writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
            Ok(Outcome::from_bool(valid))
        }

        Command::Setup { account } => {
            let enrollment = account_security(config, None).setup(account)?;
            writeln!(out, "Secret: {}", base32::format_secret(&enrollment.secret))?;
            writeln!(out, "URI:    {}", enrollment.provisioning_uri)?;
            Ok(Outcome::Accepted)
        }

        Command::Enable {
            account,
            secret,
            code,
            at,
        } => {
            let enabled = account_security(config, *at).enable(account, secret, code)?;
            if enabled {
                writeln!(out, "Two-factor authentication enabled for {account}")?;
            } else {
                writeln!(out, "Invalid code; two-factor authentication not enabled")?;
            }
            Ok(Outcome::from_bool(enabled))
        }

        Command::Login { account, code, at } => {
            let valid = account_security(config, *at).verify_login(account, code)?;
            writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
            Ok(Outcome::from_bool(valid))
        }

        Command::Disable { account } => {
            let removed = account_security(config, None).disable(account)?;
            if removed {
                writeln!(out, "Two-factor authentication disabled for {account}")?;
            } else {
                writeln!(out, "{account} was not enrolled")?;
            }
            Ok(Outcome::Accepted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use assert_matches::assert_matches;
    use eventdesk_shared::SharedError;
    use tempfile::{tempdir, TempDir};

    const RFC_SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn test_config() -> (TempDir, Config) {
        let temp_dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.records_file = temp_dir.path().join("two_factor.json");
        (temp_dir, config)
    }

    fn run(command: Command, config: &Config) -> (BackendResult<Outcome>, String) {
        let mut out = Vec::new();
        let result = execute(&command, config, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_secret() {
        let (_dir, config) = test_config();
        let (result, out) = run(Command::Secret, &config);

        assert_eq!(result.unwrap(), Outcome::Accepted);
        let secret = out.trim();
        assert_eq!(secret.len(), 32);
        assert!(base32::is_valid(secret));
    }

    #[test]
    fn test_uri() {
        let (_dir, config) = test_config();
        let (result, out) = run(
            Command::Uri {
                account: "admin@example.com".to_string(),
                secret: RFC_SECRET_B32.to_string(),
                issuer: None,
            },
            &config,
        );

        assert!(result.is_ok());
        assert_eq!(
            out.trim(),
            "otpauth://totp/EventDesk:admin%40example.com?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&issuer=EventDesk&period=30&digits=6"
        );

        let (_, out) = run(
            Command::Uri {
                account: "ops".to_string(),
                secret: "AAAA".to_string(),
                issuer: Some("Box Office".to_string()),
            },
            &config,
        );
        assert!(out.starts_with("otpauth://totp/Box%20Office:ops?"));
    }

    #[test]
    fn test_code() {
        let (_dir, config) = test_config();
        let (result, out) = run(
            Command::Code {
                secret: RFC_SECRET_B32.to_string(),
                at: Some(59),
            },
            &config,
        );

        assert!(result.is_ok());
        assert_eq!(out.trim(), "287082 (refreshes in 1s)");
    }

    #[test]
    fn test_verify() {
        let (_dir, config) = test_config();
        let verify = |code: &str, window: Option<u32>| {
            run(
                Command::Verify {
                    secret: RFC_SECRET_B32.to_string(),
                    code: code.to_string(),
                    at: Some(59),
                    window,
                },
                &config,
            )
        };

        let (result, out) = verify("287082", None);
        assert_eq!(result.unwrap(), Outcome::Accepted);
        assert_eq!(out.trim(), "valid");

        let (result, _) = verify("755224", None);
        assert_eq!(result.unwrap(), Outcome::Accepted);

        let (result, out) = verify("755224", Some(0));
        assert_eq!(result.unwrap(), Outcome::Rejected);
        assert_eq!(out.trim(), "invalid");
    }

    #[test]
    fn test_verify_window_is_capped() {
        let (_dir, config) = test_config();
        // Counter 0 code checked 50 steps later
        let old_code = totp::generate_code(b"12345678901234567890", 0, 6);
        let verify = |window: u32| {
            run(
                Command::Verify {
                    secret: RFC_SECRET_B32.to_string(),
                    code: old_code.clone(),
                    at: Some(1500),
                    window: Some(window),
                },
                &config,
            )
        };

        for window in [11, 50, u32::MAX] {
            let (result, out) = verify(window);
            assert_matches!(
                result,
                Err(BackendError::Config(ConfigError::Invalid { ref field, .. })) if field == "window"
            );
            assert!(result.unwrap_err().is_user_error());
            assert!(out.is_empty());
        }

        let (result, _) = verify(MAX_WINDOW);
        assert_eq!(result.unwrap(), Outcome::Rejected);
    }

    #[test]
    fn test_account_flow() {
        let (_dir, config) = test_config();

        let (result, out) = run(
            Command::Setup {
                account: "admin".to_string(),
            },
            &config,
        );
        assert!(result.is_ok());
        assert!(out.starts_with("Secret: "));
        assert!(out.contains("URI:    otpauth://totp/EventDesk:admin?secret="));
        assert!(!config.storage.records_file.exists());

        let (result, out) = run(
            Command::Enable {
                account: "admin".to_string(),
                secret: RFC_SECRET_B32.to_string(),
                code: "000000".to_string(),
                at: Some(59),
            },
            &config,
        );
        assert_eq!(result.unwrap(), Outcome::Rejected);
        assert!(out.starts_with("Invalid code"));

        let (result, _) = run(
            Command::Enable {
                account: "admin".to_string(),
                secret: RFC_SECRET_B32.to_string(),
                code: "287082".to_string(),
                at: Some(59),
            },
            &config,
        );
        assert_eq!(result.unwrap(), Outcome::Accepted);
        assert!(config.storage.records_file.exists());

        let login = |code: &str| {
            run(
                Command::Login {
                    account: "admin".to_string(),
                    code: code.to_string(),
                    at: Some(59),
                },
                &config,
            )
        };
        assert_eq!(login("359152").0.unwrap(), Outcome::Accepted);
        assert_eq!(login("969429").0.unwrap(), Outcome::Rejected);

        let (result, out) = run(
            Command::Disable {
                account: "admin".to_string(),
            },
            &config,
        );
        assert!(result.is_ok());
        assert_eq!(out.trim(), "Two-factor authentication disabled for admin");

        assert_matches!(
            login("287082").0,
            Err(BackendError::Shared(SharedError::NotEnrolled { .. }))
        );
    }

    #[test]
    fn test_disable_unknown_account() {
        let (_dir, config) = test_config();
        let (result, out) = run(
            Command::Disable {
                account: "ghost".to_string(),
            },
            &config,
        );
        assert!(result.is_ok());
        assert_eq!(out.trim(), "ghost was not enrolled");
    }
}
