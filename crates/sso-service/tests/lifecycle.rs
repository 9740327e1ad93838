//! End-to-end account and identity scenarios against the in-memory
//! directory.

use std::sync::Arc;

use sso_directory::{MemoryDirectory, UserDirectory};
use sso_model::attribute::names;
use sso_model::{
    Account, ClientRedirect, Credentials, Identity, IdentityProperty, IdentityState, UpdateMode,
};
use sso_service::{AccountService, Error, IdentityService};

struct Fixture {
    directory: Arc<MemoryDirectory>,
    accounts: AccountService,
    identities: IdentityService,
}

async fn fixture() -> Fixture {
    let directory = Arc::new(MemoryDirectory::new());
    let accounts = AccountService::new(directory.clone());
    let identities = IdentityService::new(directory.clone());
    accounts
        .create_account(&Account::new("ACC1", "ACME").with_locale("cs"))
        .await
        .unwrap();
    Fixture {
        directory,
        accounts,
        identities,
    }
}

async fn record_login(fixture: &Fixture, contact_number: &str) {
    let mut user = fixture
        .identities
        .find_identity(contact_number)
        .await
        .unwrap()
        .unwrap();
    user.attributes
        .set_single(names::LAST_LOGIN, "2024-05-01 10:00:00");
    fixture.directory.update_user(&user).await.unwrap();
}

#[tokio::test]
async fn contact_number_only_creation_derives_username_and_state() {
    let f = fixture().await;
    let created = f
        .identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    assert_eq!(created.username.as_deref(), Some("generated-C1"));
    assert_eq!(created.state, Some(IdentityState::Created));
    assert_eq!(created.has_credentials, Some(false));
    assert_eq!(created.account_number, "ACC1");
    // No explicit locale on the request: the account default applies.
    assert_eq!(created.locale.as_deref(), Some("cs"));
}

#[tokio::test]
async fn explicit_username_is_used_verbatim() {
    let f = fixture().await;
    let created = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_username("jdoe"),
        )
        .await
        .unwrap();

    assert_eq!(created.username.as_deref(), Some("jdoe"));
}

#[tokio::test]
async fn repeated_contact_number_is_a_duplicate() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    let err = f
        .identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    // Even under a fresh username the contact number check fires and
    // points the caller to the stronger key.
    let err = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_username("someone-else"),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nav4Id"));
}

#[tokio::test]
async fn nav4_creation_prefers_nav4_for_username_and_uniqueness() {
    let f = fixture().await;
    let created = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C9")
                .with_nav4_id("N1"),
        )
        .await
        .unwrap();
    assert_eq!(created.username.as_deref(), Some("N1"));

    let err = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C10")
                .with_nav4_id("N1")
                .with_username("other"),
        )
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    // The nav4 path does not check contact-number uniqueness: the same
    // contact number may carry a second identity under a distinct nav4 id.
    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C9")
                .with_nav4_id("N2")
                .with_username("second-for-c9"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn generated_username_upgrades_to_free_email() {
    let f = fixture().await;
    let created = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C2")
                .with_email("jan@acme.example"),
        )
        .await
        .unwrap();

    assert_eq!(created.username.as_deref(), Some("jan@acme.example"));
}

#[tokio::test]
async fn username_upgrade_respects_opt_out_and_taken_emails() {
    let f = fixture().await;
    let kept = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C3")
                .with_email("opted-out@acme.example")
                .keep_generated_username(),
        )
        .await
        .unwrap();
    assert_eq!(kept.username.as_deref(), Some("generated-C3"));

    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C4")
                .with_username("taken@acme.example"),
        )
        .await
        .unwrap();
    let blocked = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C5")
                .with_email("taken@acme.example"),
        )
        .await
        .unwrap();
    assert_eq!(blocked.username.as_deref(), Some("generated-C5"));
}

#[tokio::test]
async fn creation_with_unverified_email_dispatches_verification() {
    let f = fixture().await;
    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_email("jan@acme.example")
                .keep_generated_username(),
        )
        .await
        .unwrap();

    let emails = f.directory.action_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].actions, vec!["VERIFY_EMAIL".to_string()]);
}

#[tokio::test]
async fn verified_flag_is_forced_off_without_email() {
    let f = fixture().await;
    let created = f
        .identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_email_verified(true),
        )
        .await
        .unwrap();

    assert_eq!(created.email_verified, Some(false));
    assert!(f.directory.action_emails().is_empty());
}

#[tokio::test]
async fn credentials_and_login_walk_the_state_machine() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();
    assert_eq!(
        f.identities.get_identity_state("C1").await.unwrap(),
        IdentityState::Created
    );

    f.identities
        .create_credentials("C1", &Credentials::password("Sup3rSecret"))
        .await
        .unwrap();
    assert_eq!(
        f.identities.get_identity_state("C1").await.unwrap(),
        IdentityState::CredentialsCreated
    );

    record_login(&f, "C1").await;
    assert_eq!(
        f.identities.get_identity_state("C1").await.unwrap(),
        IdentityState::Active
    );

    let identity = f.identities.get_identity("C1", true).await.unwrap();
    assert_eq!(identity.has_credentials, Some(true));
    let login_info = identity.login_info.unwrap();
    assert_eq!(login_info.last_login.as_deref(), Some("2024-05-01 10:00:00"));
    assert!(login_info.created.is_some());
}

#[tokio::test]
async fn temporary_password_pins_the_update_action() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    f.identities
        .create_credentials(
            "C1",
            &Credentials::password("Sup3rSecret").temporary(true),
        )
        .await
        .unwrap();
    let actions = f
        .identities
        .required_actions("generated-C1")
        .await
        .unwrap();
    assert!(actions.contains(&"UPDATE_PASSWORD".to_string()));

    f.identities
        .create_credentials("C1", &Credentials::password("An0therSecret"))
        .await
        .unwrap();
    let actions = f
        .identities
        .required_actions("generated-C1")
        .await
        .unwrap();
    assert!(!actions.contains(&"UPDATE_PASSWORD".to_string()));
}

#[tokio::test]
async fn short_password_fails_the_store_policy() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    let err = f
        .identities
        .create_credentials("C1", &Credentials::password("short"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PasswordPolicy));
}

#[tokio::test]
async fn password_reset_requires_a_verified_email() {
    let f = fixture().await;
    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_email("jan@acme.example")
                .keep_generated_username(),
        )
        .await
        .unwrap();

    let err = f
        .identities
        .reset_password_action("C1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmailNotVerified(_)));

    f.identities
        .update_identity(
            "C1",
            &Identity::new("ACC1").with_email_verified(true),
            UpdateMode::Add,
        )
        .await
        .unwrap();

    let redirect = ClientRedirect {
        client_id: "fleet-portal".to_string(),
        redirect_uri: "https://portal.acme.example/welcome".to_string(),
    };
    f.identities
        .reset_password_action("C1", Some(&redirect))
        .await
        .unwrap();

    let emails = f.directory.action_emails();
    let reset = emails.last().unwrap();
    assert_eq!(reset.actions, vec!["UPDATE_PASSWORD".to_string()]);
    assert_eq!(reset.redirect.as_ref().unwrap().client_id, "fleet-portal");
}

#[tokio::test]
async fn phone_patch_modes_differ_on_blank_values() {
    let f = fixture().await;
    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_phone("+420123456789"),
        )
        .await
        .unwrap();

    // ADD with a blank phone leaves the stored value untouched.
    let updated = f
        .identities
        .update_identity("C1", &Identity::new("ACC1").with_phone(""), UpdateMode::Add)
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("+420123456789"));

    // UPDATE with a blank phone clears the attribute.
    let updated = f
        .identities
        .update_identity(
            "C1",
            &Identity::new("ACC1").with_phone(""),
            UpdateMode::Update,
        )
        .await
        .unwrap();
    assert_eq!(updated.phone, None);
}

#[tokio::test]
async fn update_merges_profile_fields_per_mode() {
    let f = fixture().await;
    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C1")
                .with_first_name("Jan")
                .with_last_name("Novak"),
        )
        .await
        .unwrap();

    let updated = f
        .identities
        .update_identity(
            "C1",
            &Identity::new("ACC1").with_first_name("Pavel"),
            UpdateMode::Add,
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Pavel"));
    assert_eq!(updated.last_name.as_deref(), Some("Novak"));
}

#[tokio::test]
async fn compound_search_filters_beyond_the_first_predicate() {
    let f = fixture().await;
    f.identities
        .create_identity(
            &Identity::new("ACC1")
                .with_contact_number("C7")
                .with_note("vip"),
        )
        .await
        .unwrap();
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C8"))
        .await
        .unwrap();

    let found = f
        .identities
        .search(&[
            (IdentityProperty::AttrAccountNumber, "ACC1".to_string()),
            (IdentityProperty::AttrNote, "vip".to_string()),
        ])
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].contact_number.as_deref(), Some("C7"));
}

#[tokio::test]
async fn search_rejects_an_empty_predicate_list() {
    let f = fixture().await;
    let err = f.identities.search(&[]).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn search_can_filter_on_the_derived_credential_flag() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C2"))
        .await
        .unwrap();
    f.identities
        .create_credentials("C2", &Credentials::password("Sup3rSecret"))
        .await
        .unwrap();

    let found = f
        .identities
        .search(&[
            (IdentityProperty::AttrAccountNumber, "ACC1".to_string()),
            (IdentityProperty::AttrHasCredentials, "true".to_string()),
        ])
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].contact_number.as_deref(), Some("C2"));
}

#[tokio::test]
async fn driver_pin_round_trip() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    f.identities.set_driver_pin("C1", "1234").await.unwrap();
    assert_eq!(f.identities.get_driver_pin("C1").await.unwrap(), "1234");

    f.identities.remove_driver_pin("C1").await.unwrap();
    let err = f.identities.get_driver_pin("C1").await.unwrap_err();
    assert!(matches!(err, Error::AttributeNotFound(_)));
}

#[tokio::test]
async fn blocking_toggles_the_locked_view() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    f.identities.block_identity("C1", true).await.unwrap();
    assert!(f.identities.get_identity("C1", false).await.unwrap().locked);

    f.identities.block_identity("C1", false).await.unwrap();
    assert!(!f.identities.get_identity("C1", false).await.unwrap().locked);
}

#[tokio::test]
async fn impersonation_and_logout_reach_the_directory() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    f.identities.impersonate_identity("C1").await.unwrap();
    f.identities.logout_identity("C1").await.unwrap();

    assert_eq!(f.directory.impersonations().len(), 1);
    assert_eq!(f.directory.logouts().len(), 1);
}

#[tokio::test]
async fn brute_force_lockout_is_reported_by_username() {
    let f = fixture().await;
    let created = f
        .identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    assert!(!f
        .identities
        .is_temporarily_locked("generated-C1")
        .await
        .unwrap());

    f.directory
        .set_brute_force_locked(created.identity_id.unwrap(), true);
    assert!(f
        .identities
        .is_temporarily_locked("generated-C1")
        .await
        .unwrap());
    assert!(!f.identities.is_temporarily_locked("nobody").await.unwrap());
}

#[tokio::test]
async fn deletion_resets_the_lifecycle() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();

    f.identities.delete_identity("C1").await.unwrap();
    assert_eq!(
        f.identities.get_identity_state("C1").await.unwrap(),
        IdentityState::NotExists
    );

    let err = f.identities.delete_identity("C1").await.unwrap_err();
    assert!(matches!(err, Error::IdentityNotFound(_)));
}

#[tokio::test]
async fn account_membership_lists_and_filters_identities() {
    let f = fixture().await;
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();
    f.identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C2"))
        .await
        .unwrap();

    let all = f
        .accounts
        .get_account_identities("ACC1", &[])
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let filtered = f
        .accounts
        .get_account_identities("ACC1", &["C2".to_string()])
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].contact_number.as_deref(), Some("C2"));

    f.accounts
        .delete_account_identity("ACC1", "C1")
        .await
        .unwrap();
    let err = f
        .accounts
        .get_account_identity("ACC1", "C1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IdentityNotFound(_)));
}

#[tokio::test]
async fn roles_update_maintains_the_rights_cache() {
    let f = fixture().await;
    f.directory
        .define_role(sso_model::Role::new("ROLE_DRIVER").with_binary_mask("1"));
    f.directory
        .define_role(sso_model::Role::new("ROLE_MANAGER").with_binary_mask("10"));
    let created = f
        .identities
        .create_identity(&Identity::new("ACC1").with_contact_number("C1"))
        .await
        .unwrap();
    let id = created.identity_id.unwrap();

    f.identities
        .update_roles(
            id,
            &["ROLE_DRIVER".to_string(), "ROLE_MANAGER".to_string()],
            UpdateMode::Update,
            None,
        )
        .await
        .unwrap();
    assert!(f.identities.is_active_role("ROLE_DRIVER", "C1").await.unwrap());

    let user = f.identities.find_identity("C1").await.unwrap().unwrap();
    assert_eq!(user.attributes.first(names::BINARY_RIGHTS), Some("11"));

    f.identities
        .update_roles(
            id,
            &["ROLE_DRIVER".to_string(), "ROLE_MANAGER".to_string()],
            UpdateMode::Delete,
            None,
        )
        .await
        .unwrap();
    let user = f.identities.find_identity("C1").await.unwrap().unwrap();
    assert!(!user.attributes.has(names::BINARY_RIGHTS));
}
