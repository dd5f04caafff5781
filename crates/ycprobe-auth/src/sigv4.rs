//! AWS Signature Version 4 request signing.
//!
//! Signing a request takes five steps:
//!
//! 1. Build the canonical request from method, path, query, signed headers and
//!    the payload hash.
//! 2. Build the credential scope `date/region/service/aws4_request`.
//! 3. Build the string to sign from the timestamp, scope and the canonical
//!    request hash.
//! 4. Derive the signing key through the four-step HMAC-SHA256 chain.
//! 5. HMAC the string to sign with that key and hex-encode the result.
//!
//! [`SigV4Signer::sign_get`] runs all of them for a body-less `GET /` and
//! returns the two headers the request has to carry.

use chrono::{DateTime, NaiveDateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::canonical::CanonicalRequest;
use crate::error::AmzDateError;

/// The only algorithm produced by this signer.
pub const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Region of Yandex Object Storage.
pub const YANDEX_REGION: &str = "ru-central1";

/// Service name used in the credential scope for object storage.
pub const S3_SERVICE: &str = "s3";

/// Terminator of every credential scope.
const SCOPE_TERMINATOR: &str = "aws4_request";

const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

type HmacSha256 = Hmac<Sha256>;

/// A `YYYYMMDDThhmmssZ` UTC timestamp.
///
/// One value is created per signed request and reused for the canonical
/// request, the string to sign and the `X-Amz-Date` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmzDate(String);

impl AmzDate {
    /// Format an instant. Only four-digit years are representable.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use ycprobe_auth::sigv4::AmzDate;
    ///
    /// let instant = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
    /// assert_eq!(AmzDate::from_datetime(instant).unwrap().as_str(), "20150830T123600Z");
    /// ```
    pub fn from_datetime(instant: DateTime<Utc>) -> Result<Self, AmzDateError> {
        Self::parse(&instant.format(AMZ_DATE_FORMAT).to_string())
    }

    /// Parse and validate a timestamp string.
    pub fn parse(value: &str) -> Result<Self, AmzDateError> {
        if value.len() != 16 || !value.is_ascii() {
            return Err(AmzDateError(value.to_owned()));
        }
        NaiveDateTime::parse_from_str(value, AMZ_DATE_FORMAT)
            .map_err(|_| AmzDateError(value.to_owned()))?;
        Ok(Self(value.to_owned()))
    }

    /// The full timestamp.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scope date: the first eight characters (`YYYYMMDD`).
    #[must_use]
    pub fn date(&self) -> &str {
        &self.0[..8]
    }
}

impl std::fmt::Display for AmzDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Headers that authenticate a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaderSet {
    /// Value of the `Authorization` header.
    pub authorization: String,
    /// Value of the `X-Amz-Date` header.
    pub amz_date: String,
    /// The bare hex signature embedded in `authorization`.
    pub signature: String,
}

/// Signs requests with a static access key pair.
///
/// # Examples
///
/// ```
/// use secrecy::SecretString;
/// use ycprobe_auth::sigv4::{AmzDate, SigV4Signer};
///
/// let secret = SecretString::from("secret");
/// let signer = SigV4Signer::new("AKID", &secret);
/// let date = AmzDate::parse("20150830T123600Z").unwrap();
/// let headers = signer.sign_get("storage.yandexcloud.net", &date);
/// assert!(headers.authorization.starts_with(
///     "AWS4-HMAC-SHA256 Credential=AKID/20150830/ru-central1/s3/aws4_request, "
/// ));
/// assert_eq!(headers.amz_date, "20150830T123600Z");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SigV4Signer<'a> {
    access_key_id: &'a str,
    secret_key: &'a SecretString,
    region: &'a str,
    service: &'a str,
}

impl<'a> SigV4Signer<'a> {
    /// Create a signer scoped to Yandex Object Storage.
    #[must_use]
    pub fn new(access_key_id: &'a str, secret_key: &'a SecretString) -> Self {
        Self {
            access_key_id,
            secret_key,
            region: YANDEX_REGION,
            service: S3_SERVICE,
        }
    }

    /// Override the region and service of the credential scope.
    #[must_use]
    pub fn with_scope(mut self, region: &'a str, service: &'a str) -> Self {
        self.region = region;
        self.service = service;
        self
    }

    /// The credential scope for `date`.
    #[must_use]
    pub fn credential_scope(&self, date: &AmzDate) -> String {
        credential_scope(date.date(), self.region, self.service)
    }

    /// The canonical request of a body-less `GET /` to `host`.
    #[must_use]
    pub fn canonical_get(&self, host: &str, date: &AmzDate) -> CanonicalRequest {
        CanonicalRequest::new(
            "GET",
            "/",
            &[],
            &[("host", host), ("x-amz-date", date.as_str())],
            &hash_payload(b""),
        )
    }

    /// Sign a body-less `GET /` to `host`.
    #[must_use]
    pub fn sign_get(&self, host: &str, date: &AmzDate) -> SignedHeaderSet {
        let canonical_request = self.canonical_get(host, date);
        self.sign(&canonical_request, date)
    }

    /// Sign an arbitrary canonical request.
    #[must_use]
    pub fn sign(&self, canonical_request: &CanonicalRequest, date: &AmzDate) -> SignedHeaderSet {
        debug!(canonical_request = %canonical_request, "built canonical request");

        let scope = self.credential_scope(date);
        let string_to_sign =
            build_string_to_sign(date.as_str(), &scope, &canonical_request.hash());

        debug!(string_to_sign, "built string to sign");

        let signing_key = derive_signing_key(
            self.secret_key.expose_secret(),
            date.date(),
            self.region,
            self.service,
        );
        let signature = compute_signature(&signing_key, &string_to_sign);

        SignedHeaderSet {
            authorization: build_authorization_header(
                self.access_key_id,
                &scope,
                canonical_request.signed_headers(),
                &signature,
            ),
            amz_date: date.as_str().to_owned(),
            signature,
        }
    }
}

/// Build a credential scope.
///
/// ```
/// use ycprobe_auth::sigv4::credential_scope;
///
/// assert_eq!(
///     credential_scope("20150830", "ru-central1", "s3"),
///     "20150830/ru-central1/s3/aws4_request"
/// );
/// ```
#[must_use]
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{SCOPE_TERMINATOR}")
}

/// Build the SigV4 string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256\n
/// <timestamp>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{SIGNING_ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the SigV4 signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, SCOPE_TERMINATOR.as_bytes())
}

/// Hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Build the `Authorization` header value.
#[must_use]
pub fn build_authorization_header(
    access_key_id: &str,
    credential_scope: &str,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{SIGNING_ALGORITHM} Credential={access_key_id}/{credential_scope}, \
         SignedHeaders={signed_headers}, Signature={signature}"
    )
}

/// Lowercase hex SHA-256 of a payload.
///
/// ```
/// use ycprobe_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
