use url::Url;

use crate::models::CreateLinkRequest;

pub const MIN_AMOUNT: i64 = 500;
pub const MAX_AMOUNT: i64 = 500_000;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_SUCCESS_MESSAGE_LEN: usize = 500;

/// A request rejected locally, before anything was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Product info is required")]
    MissingProductInfo,
    #[error("Product title is required")]
    BlankTitle,
    #[error("Product title cannot exceed 200 characters")]
    TitleTooLong,
    #[error("Amount must be an integer")]
    NonIntegerAmount,
    #[error("Amount must be at least 500")]
    AmountTooLow,
    #[error("Amount cannot exceed 500,000")]
    AmountTooHigh,
    #[error("Product description cannot exceed 1000 characters")]
    DescriptionTooLong,
    #[error("Fee mode must be one of NO_FEE, SPLIT_FEE, CUSTOMER_FEE (got {0})")]
    InvalidFeeMode(String),
    #[error("Success message cannot exceed 500 characters")]
    SuccessMessageTooLong,
    #[error("Redirect URL must be a valid http or https URL")]
    InvalidRedirectUrl,
    #[error("{0} must be a string")]
    NotText(&'static str),
    #[error("Payment reference is required")]
    BlankReference,
    #[error("Payment reference {0:?} is not valid")]
    InvalidReference(String),
}

/// Checks a link request and returns the first rule it breaks.
///
/// Rules run in this order: product info, title, amount, description, success
/// message, redirect URL. [`CreateLinkRequest::from_json`] follows the same
/// order and slots its type checks in where each field is checked.
pub fn validate_create_link(request: &CreateLinkRequest) -> Result<(), ValidationError> {
    let product = request
        .product_info
        .as_ref()
        .ok_or(ValidationError::MissingProductInfo)?;

    check_title(&product.title)?;
    check_amount(product.amount)?;
    check_description(product.description.as_deref())?;
    check_success_message(request.success_message.as_deref())?;
    check_redirect_url(request.redirect_url.as_deref())
}

pub(crate) fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

pub(crate) fn check_amount(amount: i64) -> Result<(), ValidationError> {
    if amount < MIN_AMOUNT {
        Err(ValidationError::AmountTooLow)
    } else if amount > MAX_AMOUNT {
        Err(ValidationError::AmountTooHigh)
    } else {
        Ok(())
    }
}

pub(crate) fn check_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => {
            Err(ValidationError::DescriptionTooLong)
        }
        _ => Ok(()),
    }
}

pub(crate) fn check_success_message(message: Option<&str>) -> Result<(), ValidationError> {
    match message {
        Some(m) if m.chars().count() > MAX_SUCCESS_MESSAGE_LEN => {
            Err(ValidationError::SuccessMessageTooLong)
        }
        _ => Ok(()),
    }
}

pub(crate) fn check_redirect_url(redirect_url: Option<&str>) -> Result<(), ValidationError> {
    match redirect_url {
        Some(url) if !is_http_url(url) => Err(ValidationError::InvalidRedirectUrl),
        _ => Ok(()),
    }
}

/// References go into the URL path as a single segment, so `.` and `..`
/// are refused along with blank ones.
pub fn validate_reference(reference: &str) -> Result<(), ValidationError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        Err(ValidationError::BlankReference)
    } else if matches!(trimmed, "." | "..") {
        Err(ValidationError::InvalidReference(reference.to_string()))
    } else {
        Ok(())
    }
}

fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
