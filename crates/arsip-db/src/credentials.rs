//! Password hashing for [`crate::models::User`] accounts.

use crate::{models::User, Error};
use argon2::{
    password_hash::{self, rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

/// Salted argon2 hash in PHC string form, ready for `users.password_hash`.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(Error::PasswordHash)
}

/// Checks `password` against the user's stored hash. A mismatch is `Ok(false)`;
/// only an unreadable stored hash is an error.
pub fn verify(user: &User, password: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(&user.password_hash).map_err(Error::PasswordHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(Error::PasswordHash(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(password_hash: String) -> User {
        User {
            id: 1,
            username: "admin".to_owned(),
            password_hash,
            full_name: None,
            is_admin: true,
        }
    }

    #[test]
    fn it_verifies_the_password_it_hashed() {
        let user = user_with(hash_password("correct horse battery").unwrap());
        assert!(verify(&user, "correct horse battery").unwrap());
    }

    #[test]
    fn it_reports_a_wrong_password_as_false_rather_than_an_error() {
        let user = user_with(hash_password("correct horse battery").unwrap());
        assert!(!verify(&user, "wrong horse battery").unwrap());
    }

    #[test]
    fn it_salts_every_hash() {
        assert_ne!(
            hash_password("same").unwrap(),
            hash_password("same").unwrap()
        );
    }

    #[test]
    fn it_errors_on_a_corrupt_stored_hash() {
        let user = user_with("not-a-phc-string".to_owned());
        assert!(matches!(verify(&user, "x"), Err(Error::PasswordHash(_))));
    }
}
