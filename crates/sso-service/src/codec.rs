//! Attribute codec between directory entities and domain views.
//!
//! Accounts and identities are stored as plain groups and users whose
//! domain fields live in free-form attributes. The codec owns both
//! directions of that projection plus the merge of partial updates; it is
//! deliberately pure so the encoding rules stay testable without a store.

use sso_model::attribute::names;
use sso_model::{
    patch, patch_attribute, Account, AttributePatch, Group, Identity, LoginInfo, RequiredAction,
    UpdateMode, User,
};

/// Filters a value down to its non-blank form.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decodes an account from its directory group.
///
/// Groups without an `accountNumber` attribute are not accounts and decode
/// to `None`.
#[must_use]
pub fn decode_account(group: &Group) -> Option<Account> {
    let account_number = group.attributes.first(names::ACCOUNT_NUMBER)?;
    let mut account = Account::new(account_number, group.name.clone());
    account.comp_reg_no = group.attributes.first(names::COMP_REG_NO).map(str::to_owned);
    account.contact_email = group
        .attributes
        .first(names::CONTACT_EMAIL)
        .map(str::to_owned);
    account.locale = group.attributes.first(names::LOCALE).map(str::to_owned);
    Some(account)
}

/// Encodes an account as a subgroup of `parent_path`.
#[must_use]
pub fn encode_account(account: &Account, parent_path: &str) -> Group {
    let mut group = Group::new(account.name.clone())
        .with_path(format!("{parent_path}/{}", account.name))
        .with_attribute(names::ACCOUNT_NUMBER, account.account_number.clone());
    if let Some(comp_reg_no) = non_blank(account.comp_reg_no.as_deref()) {
        group.attributes.set_single(names::COMP_REG_NO, comp_reg_no);
    }
    if let Some(contact_email) = non_blank(account.contact_email.as_deref()) {
        group
            .attributes
            .set_single(names::CONTACT_EMAIL, contact_email);
    }
    if let Some(locale) = non_blank(account.locale.as_deref()) {
        group.attributes.set_single(names::LOCALE, locale);
    }
    group
}

/// Decodes the profile and attribute-backed fields of an identity.
///
/// State, the credential flag and login telemetry need extra directory
/// round trips and are filled by the caller.
#[must_use]
pub fn decode_identity(user: &User) -> Identity {
    Identity {
        identity_id: user.id,
        account_number: user
            .attributes
            .first(names::ACCOUNT_NUMBER)
            .unwrap_or_default()
            .to_owned(),
        contact_number: user
            .attributes
            .first(names::CONTACT_NUMBER)
            .map(str::to_owned),
        nav4_id: user.attributes.first(names::NAV4_ID).map(str::to_owned),
        username: Some(user.username.clone()),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        email_verified: Some(user.email_verified),
        phone: user.attributes.first(names::PHONE).map(str::to_owned),
        note: user.attributes.first(names::NOTE).map(str::to_owned),
        locale: user.attributes.first(names::LOCALE).map(str::to_owned),
        locked: !user.enabled,
        state: None,
        has_credentials: None,
        login_info: None,
        no_email_as_username: false,
    }
}

/// Decodes login telemetry from the record and its attributes.
#[must_use]
pub fn decode_login_info(user: &User) -> LoginInfo {
    LoginInfo {
        created: user.created_at,
        last_login: user.attributes.first(names::LAST_LOGIN).map(str::to_owned),
        last_logout: user.attributes.first(names::LAST_LOGOUT).map(str::to_owned),
        last_login_error: user
            .attributes
            .first(names::LAST_LOGIN_ERROR)
            .map(str::to_owned),
    }
}

/// Builds the directory user for a creation request.
///
/// `username` is the resolved effective username; `locale` the resolved
/// locale (the explicit value or the account default). The verified flag
/// is forced off for a blank email, and `VERIFY_EMAIL` is pre-seeded when
/// an unverified email is present.
#[must_use]
pub fn encode_new_identity(identity: &Identity, username: &str, locale: Option<&str>) -> User {
    let mut user = User::new(username);
    user.first_name = identity.first_name.clone();
    user.last_name = identity.last_name.clone();
    user.email = identity.email.clone();
    user.email_verified = identity.email_verified.unwrap_or(false) && user.has_email();
    if user.has_email() && !user.email_verified {
        user.add_required_action(RequiredAction::VerifyEmail.as_str());
    }
    user.attributes
        .set_single(names::ACCOUNT_NUMBER, identity.account_number.clone());
    if let Some(contact_number) = non_blank(identity.contact_number.as_deref()) {
        user.attributes
            .set_single(names::CONTACT_NUMBER, contact_number);
    }
    if let Some(nav4_id) = non_blank(identity.nav4_id.as_deref()) {
        user.attributes.set_single(names::NAV4_ID, nav4_id);
    }
    if let Some(phone) = non_blank(identity.phone.as_deref()) {
        user.attributes.set_single(names::PHONE, phone);
    }
    if let Some(note) = non_blank(identity.note.as_deref()) {
        user.attributes.set_single(names::NOTE, note);
    }
    if let Some(locale) = non_blank(locale) {
        user.attributes.set_single(names::LOCALE, locale);
    }
    user
}

/// Outcome of merging a partial update into a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Whether a verification email must be dispatched after the write.
    pub send_verify_email: bool,
}

/// Merges a partial update into the stored user under the update mode.
///
/// Every mutable field goes through the same three-mode merge. After the
/// merge the `VERIFY_EMAIL` required action is reconciled with the email
/// state, and the outcome reports whether a verification email is due.
pub fn apply_identity_patch(user: &mut User, update: &Identity, mode: UpdateMode) -> PatchOutcome {
    if let Some(username) = non_blank(update.username.as_deref()) {
        user.username = username.to_owned();
    }

    user.first_name = patch(user.first_name.take(), update.first_name.clone(), mode);
    user.last_name = patch(user.last_name.take(), update.last_name.clone(), mode);
    user.email = patch(user.email.take(), update.email.clone(), mode);

    let apply_verified = matches!(mode, UpdateMode::Update) || update.email_verified.is_some();
    if apply_verified {
        user.email_verified = update.email_verified.unwrap_or(false) && user.has_email();
    }
    if !user.has_email() {
        user.email_verified = false;
    }

    // The note merges like a plain field but lives in an attribute.
    let note = patch(
        user.attributes.first(names::NOTE).map(str::to_owned),
        update.note.clone(),
        mode,
    );
    match note {
        Some(value) => user.attributes.set_single(names::NOTE, value),
        None => {
            user.attributes.remove(names::NOTE);
        }
    }

    let removable = [
        (names::PHONE, update.phone.as_deref()),
        (names::LOCALE, update.locale.as_deref()),
    ];
    for (name, value) in removable {
        match patch_attribute(value, mode) {
            AttributePatch::Set(v) => user.attributes.set_single(name, v),
            AttributePatch::Keep => {}
            AttributePatch::Remove => {
                user.attributes.remove(name);
            }
        }
    }

    let needs_verification = user.has_email() && !user.email_verified;
    if needs_verification {
        user.add_required_action(RequiredAction::VerifyEmail.as_str());
    } else {
        user.remove_required_action(RequiredAction::VerifyEmail.as_str());
    }

    PatchOutcome {
        send_verify_email: needs_verification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_user() -> User {
        let mut user = User::new("generated-C1")
            .with_first_name("Jan")
            .with_email("jan@example.com")
            .with_attribute(names::ACCOUNT_NUMBER, "ACC1")
            .with_attribute(names::CONTACT_NUMBER, "C1")
            .with_attribute(names::PHONE, "+420123456789");
        user.email_verified = true;
        user
    }

    #[test]
    fn update_with_blank_phone_clears_the_attribute() {
        let mut user = stored_user();
        let update = Identity::new("ACC1").with_phone("");

        apply_identity_patch(&mut user, &update, UpdateMode::Update);
        assert!(!user.attributes.has(names::PHONE));
    }

    #[test]
    fn add_with_blank_phone_keeps_the_attribute() {
        let mut user = stored_user();
        let update = Identity::new("ACC1");

        apply_identity_patch(&mut user, &update, UpdateMode::Add);
        assert_eq!(user.attributes.first(names::PHONE), Some("+420123456789"));
    }

    #[test]
    fn delete_removes_phone_without_replacement() {
        let mut user = stored_user();
        let update = Identity::new("ACC1");

        apply_identity_patch(&mut user, &update, UpdateMode::Delete);
        assert!(!user.attributes.has(names::PHONE));
    }

    #[test]
    fn add_keeps_profile_fields_on_blank() {
        let mut user = stored_user();
        let update = Identity::new("ACC1").with_last_name("Novak");

        apply_identity_patch(&mut user, &update, UpdateMode::Add);
        assert_eq!(user.first_name.as_deref(), Some("Jan"));
        assert_eq!(user.last_name.as_deref(), Some("Novak"));
    }

    #[test]
    fn verified_flag_never_survives_a_blank_email() {
        let mut user = stored_user();
        let update = Identity::new("ACC1").with_email("").with_email_verified(true);

        apply_identity_patch(&mut user, &update, UpdateMode::Update);
        assert_eq!(user.email, None);
        assert!(!user.email_verified);
        assert!(!user.has_required_action(RequiredAction::VerifyEmail.as_str()));
    }

    #[test]
    fn unverified_email_requires_verification_and_dispatch() {
        let mut user = stored_user();
        let update = Identity::new("ACC1").with_email("new@example.com");

        let outcome = apply_identity_patch(&mut user, &update, UpdateMode::Update);
        assert!(user.has_required_action(RequiredAction::VerifyEmail.as_str()));
        assert!(outcome.send_verify_email);
    }

    #[test]
    fn verifying_the_email_clears_the_action() {
        let mut user = stored_user();
        user.add_required_action(RequiredAction::VerifyEmail.as_str());
        let update = Identity::new("ACC1").with_email_verified(true);

        let outcome = apply_identity_patch(&mut user, &update, UpdateMode::Add);
        assert!(user.email_verified);
        assert!(!user.has_required_action(RequiredAction::VerifyEmail.as_str()));
        assert!(!outcome.send_verify_email);
    }

    #[test]
    fn account_encoding_round_trips() {
        let account = Account::new("ACC1", "ACME")
            .with_comp_reg_no("60255523")
            .with_contact_email("info@acme.example")
            .with_locale("cs");

        let group = encode_account(&account, "/Accounts");
        assert_eq!(group.path.as_deref(), Some("/Accounts/ACME"));

        let decoded = decode_account(&group).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn groups_without_account_number_are_not_accounts() {
        assert!(decode_account(&Group::new("misc")).is_none());
    }

    #[test]
    fn new_identity_encoding_applies_locale_default() {
        let request = Identity::new("ACC1")
            .with_contact_number("C1")
            .with_email("jan@example.com");

        let user = encode_new_identity(&request, "generated-C1", Some("cs"));
        assert_eq!(user.username, "generated-C1");
        assert_eq!(user.attributes.first(names::LOCALE), Some("cs"));
        assert_eq!(user.attributes.first(names::ACCOUNT_NUMBER), Some("ACC1"));
        assert!(!user.email_verified);
        assert!(user.has_required_action(RequiredAction::VerifyEmail.as_str()));
    }

    #[test]
    fn identity_decoding_reads_attributes_and_lock_flag() {
        let mut user = stored_user().with_enabled(false);
        user.id = Some(uuid::Uuid::now_v7());

        let identity = decode_identity(&user);
        assert_eq!(identity.account_number, "ACC1");
        assert_eq!(identity.contact_number.as_deref(), Some("C1"));
        assert_eq!(identity.phone.as_deref(), Some("+420123456789"));
        assert!(identity.locked);
        assert!(identity.state.is_none());
    }
}
