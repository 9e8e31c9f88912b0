//! Access URL issuer
//!
//! Builds Azure service SAS URLs for a single blob:
//!
//! ```text
//! string-to-sign = sp \n st \n se \n /blob/{account}/{container}/{blob} \n si \n sip \n spr
//!                  \n sv \n sr \n snapshot \n ses \n rscc \n rscd \n rsce \n rscl \n rsct
//! sig            = base64(HMAC-SHA256(base64-decoded account key, string-to-sign))
//! ```
//!
//! The signature is appended with the other signed fields as a query string.
//! Issuing is a pure function of the credentials, the blob, the permission
//! set and the expiry; nothing is stored.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

pub const SAS_VERSION: &str = "2021-08-06";

const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// Published key of the local storage emulator.
const DEV_ACCOUNT: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Storage account name, signing key and blob endpoint.
#[derive(Clone)]
pub struct AccountCredentials {
    account: String,
    key: Vec<u8>,
    blob_endpoint: Url,
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("account", &self.account)
            .field("blob_endpoint", &self.blob_endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl AccountCredentials {
    pub fn new(account: &str, account_key: &str, blob_endpoint: &str) -> StorageResult<Self> {
        if account.is_empty() {
            return Err(StorageError::Config("account name is empty".into()));
        }
        let key = BASE64
            .decode(account_key.trim())
            .map_err(|e| StorageError::Config(format!("account key is not base64: {}", e)))?;
        let blob_endpoint = Url::parse(blob_endpoint)
            .map_err(|e| StorageError::Config(format!("invalid blob endpoint: {}", e)))?;
        if blob_endpoint.cannot_be_a_base() {
            return Err(StorageError::Config("blob endpoint cannot be a base URL".into()));
        }

        Ok(Self {
            account: account.to_string(),
            key,
            blob_endpoint,
        })
    }

    /// Parse an Azure storage connection string.
    ///
    /// Understands `AccountName`, `AccountKey`, `DefaultEndpointsProtocol`,
    /// `EndpointSuffix`, `BlobEndpoint` and `UseDevelopmentStorage=true`.
    pub fn from_connection_string(connection_string: &str) -> StorageResult<Self> {
        let mut account = None;
        let mut key = None;
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut endpoint = None;
        let mut development = false;

        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                StorageError::Config(format!("malformed connection string segment '{}'", part))
            })?;
            match name {
                "AccountName" => account = Some(value.to_string()),
                "AccountKey" => key = Some(value.to_string()),
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "EndpointSuffix" => suffix = value.to_string(),
                "BlobEndpoint" => endpoint = Some(value.to_string()),
                "UseDevelopmentStorage" => development = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            return Self::new(
                account.as_deref().unwrap_or(DEV_ACCOUNT),
                key.as_deref().unwrap_or(DEV_ACCOUNT_KEY),
                endpoint.as_deref().unwrap_or(DEV_BLOB_ENDPOINT),
            );
        }

        let account = account
            .ok_or_else(|| StorageError::Config("connection string has no AccountName".into()))?;
        let key =
            key.ok_or_else(|| StorageError::Config("connection string has no AccountKey".into()))?;
        let endpoint =
            endpoint.unwrap_or_else(|| format!("{}://{}.blob.{}", protocol, account, suffix));

        Self::new(&account, &key, &endpoint)
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Unsigned URL of a blob.
    pub fn blob_url(&self, container: &str, blob: &str) -> StorageResult<Url> {
        let mut url = self.blob_endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Config("blob endpoint cannot be a base URL".into()))?
            .pop_if_empty()
            .push(container)
            .push(blob);
        Ok(url)
    }

    fn sign(&self, string_to_sign: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    fn allowed_protocols(&self) -> &'static str {
        if self.blob_endpoint.scheme() == "https" {
            "https"
        } else {
            "https,http"
        }
    }
}

/// Permission bits a SAS can grant on a blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobPermissions {
    pub read: bool,
    pub create: bool,
    pub write: bool,
    pub delete: bool,
}

impl BlobPermissions {
    pub const READ: Self = Self { read: true, create: false, write: false, delete: false };
    pub const UPLOAD: Self = Self { read: false, create: true, write: true, delete: false };
    pub const DELETE: Self = Self { read: false, create: false, write: false, delete: true };

    /// Canonical `sp` value; the service requires this letter order.
    pub fn as_sp(&self) -> String {
        let mut sp = String::with_capacity(4);
        for (granted, letter) in [
            (self.read, 'r'),
            (self.create, 'c'),
            (self.write, 'w'),
            (self.delete, 'd'),
        ] {
            if granted {
                sp.push(letter);
            }
        }
        sp
    }

    pub fn from_sp(sp: &str) -> Self {
        Self {
            read: sp.contains('r'),
            create: sp.contains('c'),
            write: sp.contains('w'),
            delete: sp.contains('d'),
        }
    }

    /// Whether every bit in `other` is also granted here.
    pub fn covers(&self, other: &Self) -> bool {
        (!other.read || self.read)
            && (!other.create || self.create)
            && (!other.write || self.write)
            && (!other.delete || self.delete)
    }
}

fn format_expiry(expiry: DateTime<Utc>) -> String {
    expiry.format(EXPIRY_FORMAT).to_string()
}

fn string_to_sign(
    credentials: &AccountCredentials,
    container: &str,
    blob: &str,
    permissions: &str,
    expiry: &str,
    protocols: &str,
) -> String {
    let resource = format!("/blob/{}/{}/{}", credentials.account, container, blob);
    [
        permissions,
        "", // st
        expiry,
        resource.as_str(),
        "", // si
        "", // sip
        protocols,
        SAS_VERSION,
        "b", // sr
        "",  // snapshot
        "",  // ses
        "",  // rscc
        "",  // rscd
        "",  // rsce
        "",  // rscl
        "",  // rsct
    ]
    .join("\n")
}

/// Issue a signed URL for one blob that the service honours until `expiry`.
pub fn issue_access_url(
    credentials: &AccountCredentials,
    container: &str,
    blob: &str,
    permissions: BlobPermissions,
    expiry: DateTime<Utc>,
) -> StorageResult<Url> {
    let sp = permissions.as_sp();
    if sp.is_empty() {
        return Err(StorageError::Config("access URL must grant a permission".into()));
    }
    let se = format_expiry(expiry);
    let spr = credentials.allowed_protocols();
    let sig = credentials.sign(&string_to_sign(credentials, container, blob, &sp, &se, spr));

    let mut url = credentials.blob_url(container, blob)?;
    url.query_pairs_mut()
        .append_pair("sv", SAS_VERSION)
        .append_pair("sr", "b")
        .append_pair("sp", &sp)
        .append_pair("se", &se)
        .append_pair("spr", spr)
        .append_pair("sig", &sig);
    Ok(url)
}

/// Why a signed URL is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("missing or malformed SAS field '{0}'")]
    Malformed(&'static str),

    #[error("signature does not match")]
    BadSignature,

    #[error("access URL expired")]
    Expired,

    #[error("access URL does not grant the requested permission")]
    PermissionDenied,
}

/// Check a signed URL the way the service does: signature over the signed
/// fields, expiry against `now`, and the requested permission.
pub fn verify_access_url(
    credentials: &AccountCredentials,
    url: &Url,
    required: BlobPermissions,
    now: DateTime<Utc>,
) -> Result<(), AccessDenied> {
    let field = |name: &'static str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .ok_or(AccessDenied::Malformed(name))
    };
    let sp = field("sp")?;
    let se = field("se")?;
    let spr = field("spr")?;
    let sig = field("sig")?;
    if field("sv")? != SAS_VERSION || field("sr")? != "b" {
        return Err(AccessDenied::Malformed("sv"));
    }

    // Path is /{prefix...}/{container}/{blob}
    let mut segments: Vec<&str> = url
        .path_segments()
        .ok_or(AccessDenied::Malformed("path"))?
        .collect();
    let blob = segments.pop().ok_or(AccessDenied::Malformed("path"))?;
    let container = segments.pop().ok_or(AccessDenied::Malformed("path"))?;

    let expected = credentials.sign(&string_to_sign(credentials, container, blob, &sp, &se, &spr));
    if !bool::from(expected.as_bytes().ct_eq(sig.as_bytes())) {
        return Err(AccessDenied::BadSignature);
    }

    let expiry = NaiveDateTime::parse_from_str(&se, EXPIRY_FORMAT)
        .map_err(|_| AccessDenied::Malformed("se"))?
        .and_utc();
    if now > expiry {
        return Err(AccessDenied::Expired);
    }

    if !BlobPermissions::from_sp(&sp).covers(&required) {
        return Err(AccessDenied::PermissionDenied);
    }
    Ok(())
}
