//! First-run creation of an administrator account

use common::{
    NewManager, Permissions,
    managers::ManagerRepository,
    password::hash_password,
};
use tracing::{info, warn};

use crate::validation::{validate_email, validate_password};

/// Credentials for the initial administrator
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl BootstrapAdmin {
    /// Read the bootstrap credentials from environment variables
    ///
    /// # Environment Variables
    /// - `BOOTSTRAP_ADMIN_EMAIL`
    /// - `BOOTSTRAP_ADMIN_PASSWORD`
    ///
    /// Returns `None` unless both are set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?;
        let password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?;

        Some(Self { email, password })
    }

    /// Apply the same checks as manager creation
    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }

    fn into_new_manager(self) -> NewManager {
        NewManager {
            first_name: "Administrator".to_string(),
            last_name: "Administrator".to_string(),
            email: self.email,
            password: self.password,
            permissions: Permissions::ADMIN | Permissions::DEFAULT,
        }
    }
}

/// Create the administrator when no manager exists yet.
///
/// Returns true if an account was created.
pub async fn ensure_admin(
    managers: &ManagerRepository,
    admin: BootstrapAdmin,
) -> anyhow::Result<bool> {
    if managers.count().await? > 0 {
        info!("Managers already present, skipping admin bootstrap");
        return Ok(false);
    }

    if let Err(e) = admin.validate() {
        warn!("Refusing to bootstrap admin: {}", e);
        return Ok(false);
    }

    let new_manager = admin.into_new_manager();
    let password_hash = hash_password(&new_manager.password)?;
    let manager = managers.create(&new_manager, &password_hash).await?;

    info!(manager_id = manager.id, "Bootstrapped administrator {}", manager.email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_bootstrap_requires_both_variables() {
        unsafe {
            std::env::set_var("BOOTSTRAP_ADMIN_EMAIL", "root@example.com");
            std::env::remove_var("BOOTSTRAP_ADMIN_PASSWORD");
        }
        assert!(BootstrapAdmin::from_env().is_none());

        unsafe {
            std::env::set_var("BOOTSTRAP_ADMIN_PASSWORD", "change-me-now");
        }
        let admin = BootstrapAdmin::from_env().expect("both variables set");
        assert_eq!(admin.email, "root@example.com");

        let manager = admin.into_new_manager();
        assert!(manager.permissions.contains(Permissions::ADMIN));
        assert!(manager.permissions.contains(Permissions::DEFAULT));

        unsafe {
            std::env::remove_var("BOOTSTRAP_ADMIN_EMAIL");
            std::env::remove_var("BOOTSTRAP_ADMIN_PASSWORD");
        }
    }

    #[test]
    fn test_bootstrap_credentials_are_validated() {
        let admin = |email: &str, password: &str| BootstrapAdmin {
            email: email.to_string(),
            password: password.to_string(),
        };

        assert!(admin("root@example.com", "change-me-now").validate().is_ok());
        assert_eq!(
            admin("not-an-email", "change-me-now").validate(),
            Err("Invalid email format".to_string())
        );
        assert_eq!(
            admin("", "change-me-now").validate(),
            Err("Email is required".to_string())
        );
        assert!(admin("root@example.com", "short").validate().is_err());
    }
}
