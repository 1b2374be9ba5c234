use super::Library;
use super::validation::{normalize_text, normalize_url, validate_email};
use crate::auth::Session;
use crate::error::{Error, Result};
use crate::store::{Provisioned, Store};
use crate::types::{Entity, Profile, now};

/// Partial update; `None` leaves a field as is, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub display_name: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

/// Creates the user for `email` together with its profile, or returns the
/// existing pair. Safe to call on every sign-in.
pub fn provision_user(store: &dyn Store, email: &str) -> Result<Provisioned> {
    let email = validate_email(email)?;
    let provisioned = store.provision_user(&email)?;

    if provisioned.created {
        tracing::info!(user_id = %provisioned.user.id, email = %email, "Provisioned user");
    } else {
        tracing::debug!(user_id = %provisioned.user.id, "User already provisioned");
    }
    Ok(provisioned)
}

impl Library<'_> {
    /// Profiles are readable by any authenticated caller.
    pub fn get_profile(&self, session: &Session, user_id: &str) -> Result<Profile> {
        self.store
            .get_profile_by_user(user_id)?
            .filter(|p| Entity::Profile.read_scope().allows(session.user_id(), &p.user_id))
            .ok_or(Error::Missing(Entity::Profile))
    }

    pub fn get_my_profile(&self, session: &Session) -> Result<Profile> {
        self.get_profile(session, session.user_id())
    }

    pub fn update_profile(
        &self,
        session: &Session,
        owner: &str,
        changes: ProfileChanges,
    ) -> Result<Profile> {
        session.require_owner(owner)?;
        let mut profile = self
            .store
            .get_profile_by_user(owner)?
            .ok_or(Error::Missing(Entity::Profile))?;

        if let Some(display_name) = changes.display_name {
            profile.display_name = normalize_text("Display name", display_name)?;
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = normalize_url("Avatar URL", avatar_url)?;
        }
        profile.updated_at = now();

        self.store.update_profile(&profile).map_err(|e| match e {
            Error::NotFound => Error::Missing(Entity::Profile),
            e => e,
        })?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::Fixture;

    #[test]
    fn test_provision_creates_one_profile_with_email_default() {
        let fx = Fixture::new();

        let first = provision_user(&fx.store, " Alice@Example.com ").unwrap();
        assert!(first.created);
        assert_eq!(first.user.email, "alice@example.com");
        assert_eq!(first.profile.user_id, first.user.id);
        assert_eq!(first.profile.display_name.as_deref(), Some("alice@example.com"));
        assert_eq!(first.profile.avatar_url, None);

        let again = provision_user(&fx.store, "alice@example.com").unwrap();
        assert!(!again.created);
        assert_eq!(again.user.id, first.user.id);
        assert_eq!(again.profile.id, first.profile.id);

        assert!(matches!(
            provision_user(&fx.store, "not-an-email"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_profiles_are_globally_readable() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let bob = fx.user("bob@example.com");
        let lib = fx.library();

        let seen_by_bob = lib.get_profile(&bob, alice.user_id()).unwrap();
        assert_eq!(seen_by_bob, lib.get_my_profile(&alice).unwrap());
        assert!(matches!(
            lib.get_profile(&bob, "nobody"),
            Err(Error::Missing(Entity::Profile))
        ));
    }

    #[test]
    fn test_update_profile_owner_only() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let bob = fx.user("bob@example.com");
        let lib = fx.library();

        let result = lib.update_profile(
            &bob,
            alice.user_id(),
            ProfileChanges {
                display_name: Some(Some("Mallory".to_string())),
                ..ProfileChanges::default()
            },
        );
        assert!(matches!(result, Err(Error::Unauthorized)));

        let updated = lib
            .update_profile(
                &alice,
                alice.user_id(),
                ProfileChanges {
                    display_name: Some(Some("Alice".to_string())),
                    avatar_url: Some(Some("https://cdn.test/alice.png".to_string())),
                },
            )
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Alice"));
        assert_eq!(lib.get_profile(&bob, alice.user_id()).unwrap(), updated);

        // Last writer wins, and null clears.
        let cleared = lib
            .update_profile(
                &alice,
                alice.user_id(),
                ProfileChanges {
                    avatar_url: Some(None),
                    ..ProfileChanges::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.avatar_url, None);
        assert_eq!(cleared.display_name.as_deref(), Some("Alice"));
    }
}
