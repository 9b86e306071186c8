//! Group invite codes

use rand::Rng;

/// Length of every invite code
pub const INVITE_CODE_LEN: usize = 6;

/// Attempts at finding an unused code before giving up
pub const MAX_INVITE_CODE_ATTEMPTS: usize = 5;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a random code from the uppercase base-36 alphabet
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase a user-supplied code, rejecting anything that cannot
/// be an invite code
pub fn normalize(code: &str) -> Result<String, String> {
    let code = code.trim().to_ascii_uppercase();

    if code.chars().count() != INVITE_CODE_LEN {
        return Err(format!(
            "Invite code must be exactly {} characters",
            INVITE_CODE_LEN
        ));
    }

    if !code.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err("Invite code can only contain letters and numbers".to_string());
    }

    Ok(code)
}
