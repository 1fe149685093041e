use crate::error::AuthError;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::Sha256;

/// Sign `payload` with RSASSA-PKCS1-v1_5 over SHA-256.
///
/// The key must be a PEM encoded PKCS8 RSA private key (`BEGIN PRIVATE KEY`), which is the
/// form Google service account key files carry.
pub fn sign(payload: &[u8], private_key_pem: &str) -> Result<Vec<u8>, AuthError> {
    let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
        .map_err(|e| AuthError::KeyInvalid(e.to_string()))?;

    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key
        .try_sign(payload)
        .map_err(|e| AuthError::KeyInvalid(format!("signing failed: {}", e)))?;

    Ok(signature.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_helpers::TEST_PRIVATE_KEY;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;

    fn verifying_key() -> VerifyingKey<Sha256> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(TEST_PRIVATE_KEY).unwrap();
        VerifyingKey::<Sha256>::new(private_key.to_public_key())
    }

    #[test]
    fn test_sign_verifies_with_public_key() {
        let payload = b"header.claims";
        let signature = sign(payload, TEST_PRIVATE_KEY).unwrap();

        assert_eq!(signature.len(), 256);
        let signature = Signature::try_from(signature.as_slice()).unwrap();
        assert!(verifying_key().verify(payload, &signature).is_ok());
    }

    #[test]
    fn test_sign_is_deterministic() {
        let first = sign(b"payload", TEST_PRIVATE_KEY).unwrap();
        let second = sign(b"payload", TEST_PRIVATE_KEY).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_signature_does_not_verify_other_payload() {
        let signature = sign(b"payload", TEST_PRIVATE_KEY).unwrap();
        let signature = Signature::try_from(signature.as_slice()).unwrap();

        assert!(verifying_key().verify(b"tampered", &signature).is_err());
    }

    #[test]
    fn test_sign_rejects_garbage_key() {
        let err = sign(b"payload", "not a key").unwrap_err();
        assert!(matches!(err, AuthError::KeyInvalid(_)));
    }

    #[test]
    fn test_sign_rejects_truncated_key() {
        let truncated = &TEST_PRIVATE_KEY[..TEST_PRIVATE_KEY.len() / 2];
        let err = sign(b"payload", truncated).unwrap_err();
        assert!(matches!(err, AuthError::KeyInvalid(_)));
    }
}
