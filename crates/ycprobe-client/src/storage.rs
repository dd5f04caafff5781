//! Signed object storage probe.
//!
//! Lists buckets with a SigV4-signed `GET /` and classifies the status.

use bytes::Bytes;
use http::StatusCode;
use http::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, warn};
use ycprobe_auth::SignedHeaderSet;

use crate::error::{CredentialFormatError, RemoteError, ValidationError};
use crate::transport::HttpTransport;

/// Object storage host; also the signed `host` header.
pub const STORAGE_HOST: &str = "storage.yandexcloud.net";

/// Name of the signed timestamp header.
pub const AMZ_DATE_HEADER: &str = "x-amz-date";

/// Issues a signed list-buckets request over an [`HttpTransport`].
#[derive(Debug)]
pub struct RequestProbe<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: HttpTransport + ?Sized> RequestProbe<'a, T> {
    /// Create a probe over `transport`.
    #[must_use]
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Build the body-less `GET https://storage.yandexcloud.net/`.
    pub fn build_request(signed: &SignedHeaderSet) -> Result<http::Request<Bytes>, ValidationError> {
        let authorization = HeaderValue::from_str(&signed.authorization)
            .map_err(|_| CredentialFormatError::HeaderValue {
                header: "Authorization",
            })?;
        let amz_date = HeaderValue::from_str(&signed.amz_date).map_err(|_| {
            CredentialFormatError::HeaderValue {
                header: "X-Amz-Date",
            }
        })?;

        http::Request::builder()
            .method(http::Method::GET)
            .uri(format!("https://{STORAGE_HOST}/"))
            .header(AUTHORIZATION, authorization)
            .header(AMZ_DATE_HEADER, amz_date)
            .body(Bytes::new())
            .map_err(|e| ValidationError::StorageAuth(RemoteError::InvalidRequest(e.to_string())))
    }

    /// Send the signed request. Any 2xx passes.
    pub async fn probe(&self, signed: &SignedHeaderSet) -> Result<StatusCode, ValidationError> {
        let request = Self::build_request(signed)?;
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ValidationError::StorageAuth(RemoteError::from(e)))?;

        if response.status.is_success() {
            return Ok(response.status);
        }

        warn!("storage request rejected");
        debug!(status = response.status.as_u16(), "storage request status");
        Err(ValidationError::StorageAuth(RemoteError::Status {
            status: response.status,
            body: response.body_text(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::{TransportError, TransportResponse};

    struct Fixed {
        status: StatusCode,
        seen: Mutex<Vec<http::Request<Bytes>>>,
    }

    #[async_trait]
    impl HttpTransport for Fixed {
        async fn send(
            &self,
            request: http::Request<Bytes>,
        ) -> Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(TransportResponse::new(self.status, "<Error>AccessDenied</Error>"))
        }
    }

    fn fixed(status: StatusCode) -> Fixed {
        Fixed {
            status,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn signed(authorization: &str) -> SignedHeaderSet {
        SignedHeaderSet {
            authorization: authorization.to_owned(),
            amz_date: String::from("20150830T123600Z"),
            signature: String::from("ac78"),
        }
    }

    #[tokio::test]
    async fn test_should_send_signed_get_to_storage_root() {
        let transport = fixed(StatusCode::OK);
        let status = RequestProbe::new(&transport)
            .probe(&signed("AWS4-HMAC-SHA256 Credential=AKID"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);

        let seen = transport.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.method(), http::Method::GET);
        assert_eq!(request.uri(), "https://storage.yandexcloud.net/");
        assert_eq!(
            request.headers()[AUTHORIZATION],
            "AWS4-HMAC-SHA256 Credential=AKID"
        );
        assert_eq!(request.headers()[AMZ_DATE_HEADER], "20150830T123600Z");
        assert!(request.body().is_empty());
    }

    #[tokio::test]
    async fn test_should_classify_forbidden_as_storage_auth() {
        let transport = fixed(StatusCode::FORBIDDEN);
        let err = RequestProbe::new(&transport)
            .probe(&signed("AWS4-HMAC-SHA256 Credential=AKID"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StorageAuth);
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.body(), Some("<Error>AccessDenied</Error>"));
    }

    #[tokio::test]
    async fn test_should_reject_unrepresentable_header_without_sending() {
        let transport = fixed(StatusCode::OK);
        let err = RequestProbe::new(&transport)
            .probe(&signed("AWS4-HMAC-SHA256 Credential=AK\nID"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CredentialFormat);
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_should_name_the_header_that_cannot_be_sent() {
        let mut bad_date = signed("AWS4-HMAC-SHA256 Credential=AKID");
        bad_date.amz_date = String::from("20150830\nT123600Z");
        let err = RequestProbe::<Fixed>::build_request(&bad_date).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CredentialFormat(CredentialFormatError::HeaderValue {
                header: "X-Amz-Date"
            })
        ));

        let err = RequestProbe::<Fixed>::build_request(&signed("AK\rID")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CredentialFormat(CredentialFormatError::HeaderValue {
                header: "Authorization"
            })
        ));
    }

    #[test]
    fn test_should_keep_status_out_of_warnings() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_writer(move || SharedBuffer(Arc::clone(&writer)))
            .finish();

        let transport = fixed(StatusCode::FORBIDDEN);
        tracing::subscriber::with_default(subscriber, || {
            let result = tokio_test::block_on(
                RequestProbe::new(&transport).probe(&signed("AWS4-HMAC-SHA256 Credential=AKID")),
            );
            assert!(result.is_err());
        });

        let logged = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("storage request rejected"));
        assert!(!logged.contains("403"));
        assert!(!logged.contains("AccessDenied"));
    }

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
