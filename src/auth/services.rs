use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use time::{macros::format_description, Date};
use tracing::error;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Ghana mobile numbers: +233 followed by 9 digits.
pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+233[0-9]{9}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

pub fn parse_dob(raw: &str) -> anyhow::Result<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Ok(Date::parse(raw, &format)?)
}

/// Whole years between `dob` and `today`, not counting a birthday
/// that has not been reached yet.
pub fn age_on(dob: Date, today: Date) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month() as u8, today.day()) < (dob.month() as u8, dob.day()) {
        age -= 1;
    }
    age
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod validation_tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn phone_accepts_ghana_format() {
        assert!(is_valid_phone("+233241234567"));
        assert!(is_valid_phone("+233501112223"));
    }

    #[test]
    fn phone_rejects_other_shapes() {
        for bad in [
            "0241234567",
            "+23324123456",
            "+2332412345678",
            "+1241234567",
            "+233 241234567",
            "",
        ] {
            assert!(!is_valid_phone(bad), "accepted {bad:?}");
        }
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("ama@example.com"));
        assert!(!is_valid_email("ama@example"));
        assert!(!is_valid_email("not-an-email"));
    }

    #[test]
    fn dob_parses_iso_dates_only() {
        assert_eq!(parse_dob("2000-05-10").unwrap(), date!(2000 - 05 - 10));
        assert!(parse_dob("10/05/2000").is_err());
        assert!(parse_dob("yesterday").is_err());
    }

    #[test]
    fn age_counts_unreached_birthday() {
        assert_eq!(age_on(date!(2000 - 05 - 10), date!(2015 - 05 - 10)), 15);
        assert_eq!(age_on(date!(2000 - 05 - 10), date!(2015 - 05 - 09)), 14);
        assert_eq!(age_on(date!(2000 - 05 - 10), date!(2015 - 06 - 01)), 15);
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hash_is_never_the_plaintext() {
        let hash = hash_password("hunter22").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("hunter22"));
    }
}
