use crate::models::Account;
use crate::modules::auth::decode_username;

/// Turns raw store lines into accounts, dropping tokens with no readable identity.
pub fn accounts_from_tokens(tokens: &[String]) -> Vec<Account> {
    let mut accounts = Vec::with_capacity(tokens.len());
    for (index, token) in tokens.iter().enumerate() {
        match decode_username(token) {
            Ok(username) => accounts.push(Account::new(username, token.clone())),
            Err(e) => {
                tracing::warn!("Skipping unusable token on line {}: {}", index + 1, e);
            }
        }
    }
    accounts
}
