use std::fmt::{self, Debug};

/// Identity the process authenticates as. Supplied once and never mutated.
#[derive(Clone, PartialEq)]
pub struct ServiceAccountCredential {
    pub email: String,
    /// PEM encoded PKCS8 RSA private key.
    pub private_key: String,
    pub scopes: Vec<String>,
}

impl ServiceAccountCredential {
    /// Scopes in the form the assertion `scope` claim expects.
    pub fn scope_claim(&self) -> String {
        self.scopes.join(" ")
    }
}

impl Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("email", &self.email)
            .field("private_key", &"<redacted>")
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::test_helpers::mock_credential;

    #[test]
    fn test_scope_claim_is_space_joined() {
        assert_eq!(
            mock_credential().scope_claim(),
            "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly"
        );
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let debug = format!("{:?}", mock_credential());

        assert!(debug.contains("records@test-project.iam.gserviceaccount.com"));
        assert!(!debug.contains("BEGIN PRIVATE KEY"));
    }
}
