use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{info, warn};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::models::{NewUser, User};
use crate::store::LeagueDb;

const SCHEME: &str = "pbkdf2-sha256";
const ROUNDS: u32 = 60_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

pub fn sign_up(db: &LeagueDb, account: &NewAccount) -> Result<User> {
    let name = account.name.trim();
    if name.is_empty() {
        bail!("name is required");
    }
    if name.chars().count() > MAX_NAME_LEN {
        bail!("name must be at most {MAX_NAME_LEN} characters");
    }
    if !is_valid_email(&account.email) {
        bail!("invalid email address");
    }
    if account.password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }
    if account.password != account.confirm {
        bail!("passwords must match");
    }
    let password_hash = hash_password(&account.password)?;
    db.add_user(&NewUser {
        name: name.to_string(),
        email: account.email.clone(),
        password_hash,
    })
}

pub fn log_in(db: &LeagueDb, email: &str, password: &str) -> Result<User> {
    let user = db.find_user_by_email(email)?;
    match user {
        Some(user) if verify_password(password, &user.password_hash) => {
            info!("user {} logged in", user.id);
            Ok(user)
        }
        _ => {
            warn!("failed login for {}", email.trim());
            Err(anyhow!("invalid email or password"))
        }
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng()
        .try_fill_bytes(&mut salt)
        .context("generate password salt")?;
    Ok(encode_credential(password, &salt, ROUNDS))
}

/// Malformed credentials never verify.
pub fn verify_password(password: &str, credential: &str) -> bool {
    let Some((salt, rounds, expected)) = decode_credential(credential) else {
        return false;
    };
    let mut key = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, rounds, &mut key);
    constant_time_eq(&key, &expected)
}

fn encode_credential(password: &str, salt: &[u8], rounds: u32) -> String {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut key);
    format!(
        "{SCHEME}${rounds}${}${}",
        BASE64.encode(salt),
        BASE64.encode(key)
    )
}

fn decode_credential(credential: &str) -> Option<(Vec<u8>, u32, Vec<u8>)> {
    let mut parts = credential.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let rounds = parts.next()?.parse::<u32>().ok().filter(|r| *r > 0)?;
    let salt = BASE64.decode(parts.next()?).ok()?;
    let key = BASE64.decode(parts.next()?).ok()?;
    if parts.next().is_some() || key.is_empty() {
        return None;
    }
    Some((salt, rounds, key))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_valid_email(raw: &str) -> bool {
    let s = raw.trim();
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
