//! Self-signed TLS identity bootstrap.
//!
//! # Responsibilities
//! - Generate an ECDSA P-256 key and a self-signed server certificate
//! - Persist both as PEM, the key readable by the owner only
//! - Leave an existing identity untouched
//!
//! # Design Decisions
//! - The key file is the only freshness marker; certificate expiry is never checked
//! - The key file is written last, so its presence implies a complete pair

use std::fs;
use std::io::Write;
use std::path::Path;

use p256::pkcs8::{DecodePrivateKey, LineEnding};
use rand::rngs::OsRng;
use rand::RngCore;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose, SerialNumber, PKCS_ECDSA_P256_SHA256,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Organization name placed in subject and issuer.
pub const ORGANIZATION: &str = "mkhttps";

/// Lifetime of a freshly generated certificate.
pub const VALIDITY: Duration = Duration::days(3 * 365);

/// Errors raised while creating the identity. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("certificate generation failed: {0}")]
    Generation(#[from] rcgen::Error),

    #[error("private key encoding failed: {0}")]
    KeyEncoding(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What [`ensure_identity`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    /// A new key and certificate were written.
    Created,
    /// The key file already existed; nothing was touched.
    Existing,
}

/// PEM-encoded identity material.
#[derive(Debug, Clone)]
pub struct GeneratedIdentity {
    /// `CERTIFICATE` block.
    pub cert_pem: String,
    /// `EC PRIVATE KEY` (SEC1) block.
    pub key_pem: String,
}

/// Make sure a key and certificate exist at the given paths.
pub fn ensure_identity(
    cert_path: &Path,
    key_path: &Path,
) -> Result<IdentityStatus, IdentityError> {
    if key_path.exists() {
        tracing::debug!(key_path = %key_path.display(), "Using existing keypair");
        return Ok(IdentityStatus::Existing);
    }

    let identity = generate_identity(OffsetDateTime::now_utc())?;
    write_cert(cert_path, &identity.cert_pem)?;
    write_private_key(key_path, &identity.key_pem)?;

    tracing::info!(
        key_path = %key_path.display(),
        cert_path = %cert_path.display(),
        "Created new keypair"
    );
    Ok(IdentityStatus::Created)
}

/// Generate a fresh key and a certificate valid from `not_before` for [`VALIDITY`].
pub fn generate_identity(not_before: OffsetDateTime) -> Result<GeneratedIdentity, IdentityError> {
    let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)?;
    let params = certificate_params(not_before);
    let cert = params.self_signed(&key_pair)?;

    Ok(GeneratedIdentity {
        cert_pem: cert.pem(),
        key_pem: sec1_pem(&key_pair)?,
    })
}

fn certificate_params(not_before: OffsetDateTime) -> CertificateParams {
    let mut params = CertificateParams::default();

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(DnType::OrganizationName, ORGANIZATION);
    params.distinguished_name = distinguished_name;

    params.serial_number = Some(random_serial());
    params.not_before = not_before;
    params.not_after = not_before + VALIDITY;

    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params
}

/// 128 random bits, encoded as a non-negative integer.
fn random_serial() -> SerialNumber {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    SerialNumber::from(bytes.to_vec())
}

/// rcgen serializes PKCS#8; re-encode the same key as a SEC1 `EC PRIVATE KEY` block.
fn sec1_pem(key_pair: &KeyPair) -> Result<String, IdentityError> {
    let secret = p256::SecretKey::from_pkcs8_der(&key_pair.serialize_der())
        .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
    let pem = secret
        .to_sec1_pem(LineEnding::LF)
        .map_err(|e| IdentityError::KeyEncoding(e.to_string()))?;
    Ok(pem.to_string())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IdentityError + '_ {
    move |source| IdentityError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn ensure_parent_exists(path: &Path) -> Result<(), IdentityError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }
    Ok(())
}

fn write_cert(path: &Path, pem: &str) -> Result<(), IdentityError> {
    ensure_parent_exists(path)?;
    fs::write(path, pem.as_bytes()).map_err(io_error(path))
}

fn write_private_key(path: &Path, pem: &str) -> Result<(), IdentityError> {
    ensure_parent_exists(path)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(io_error(path))?;
    file.write_all(pem.as_bytes()).map_err(io_error(path))?;
    file.sync_all().map_err(io_error(path))
}
