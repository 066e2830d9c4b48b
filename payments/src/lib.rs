//! Client for a hosted payment link gateway.
//!
//! Requests are validated locally before anything goes over the wire, and
//! failed calls come back as an [`ApiError`] tagged with an [`ApiErrorKind`]
//! so callers can branch on what went wrong.
//!
//! ```rust,no_run
//! use paylink::{CreateLinkRequest, FeeMode, PaylinkClient, PaymentStatus, ProductInfo};
//!
//! # async fn run() -> paylink::Result<()> {
//! let client = PaylinkClient::new("sk_test_...")?;
//! let request = CreateLinkRequest::new(ProductInfo::new("Gold Pack", 2500))
//!     .with_fee_mode(FeeMode::SplitFee);
//! let link = client.create_payment_link(&request).await?;
//! println!("pay at {}", link.payment_url());
//!
//! let status = client.check_payment(link.reference()).await?;
//! if status.status() == PaymentStatus::Pending {
//!     // poll again later, the link expires 20 minutes after creation
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod errors;
mod models;
mod validation;

pub use client::{ClientConfig, PaylinkClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use errors::{ApiError, ApiErrorKind, Error, Result};
pub use models::{
    CreateLinkRequest, CreateLinkResponse, FeeMode, LinkPayload, PaymentLink, PaymentStatus,
    PaymentStatusData, PaymentStatusResponse, ProductInfo, ResponseMeta, TransactionDetails,
};
pub use validation::{
    validate_create_link, validate_reference, ValidationError, MAX_AMOUNT,
    MAX_DESCRIPTION_LEN, MAX_SUCCESS_MESSAGE_LEN, MAX_TITLE_LEN, MIN_AMOUNT,
};
