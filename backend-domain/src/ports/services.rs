/// Password hashing and bearer token handling.
pub trait CredentialService: Send + Sync {
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;
    fn verify_password(&self, password: &str, password_hash: &str) -> anyhow::Result<bool>;
    fn issue_token(&self, user_id: &str) -> anyhow::Result<String>;
    /// Returns the user id carried by a valid, unexpired token.
    fn verify_token(&self, token: &str) -> Option<String>;
}
