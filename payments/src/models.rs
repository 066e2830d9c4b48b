use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, ValidationError};

/// The product a payment link charges for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub title: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
impl ProductInfo {
    pub fn new(title: impl Into<String>, amount: i64) -> Self {
        Self {
            title: title.into(),
            amount,
            description: None,
        }
    }
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Which party absorbs the processing fee.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeMode {
    #[default]
    NoFee,
    SplitFee,
    CustomerFee,
}
impl FeeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeMode::NoFee => "NO_FEE",
            FeeMode::SplitFee => "SPLIT_FEE",
            FeeMode::CustomerFee => "CUSTOMER_FEE",
        }
    }
}
impl FromStr for FeeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_FEE" => Ok(FeeMode::NoFee),
            "SPLIT_FEE" => Ok(FeeMode::SplitFee),
            "CUSTOMER_FEE" => Ok(FeeMode::CustomerFee),
            other => Err(ValidationError::InvalidFeeMode(other.to_string())),
        }
    }
}
impl fmt::Display for FeeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
}
impl PaymentStatus {
    /// `Pending` is the only status worth polling again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}
impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Confirmed => "CONFIRMED",
            PaymentStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A request to create a payment link, as handed over by the caller.
///
/// `fee_mode` stays optional here; [`CreateLinkRequest::resolve`] applies the
/// `NO_FEE` default when the request is turned into its wire body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLinkRequest {
    pub product_info: Option<ProductInfo>,
    pub fee_mode: Option<FeeMode>,
    pub success_message: Option<String>,
    pub redirect_url: Option<String>,
}
impl CreateLinkRequest {
    pub fn new(product_info: ProductInfo) -> Self {
        Self {
            product_info: Some(product_info),
            ..Default::default()
        }
    }
    pub fn with_fee_mode(mut self, fee_mode: FeeMode) -> Self {
        self.fee_mode = Some(fee_mode);
        self
    }
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Builds a request from an untyped JSON payload with camelCase keys.
    ///
    /// Every rule of [`crate::validate_create_link`] is applied, in the same
    /// order, with the checks a typed request cannot express (non-integer amount,
    /// unknown fee mode, non-string text fields) raised where their field comes
    /// up. The fee mode is checked between the description and the success
    /// message. The first violation is returned.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let info = match value.get("productInfo") {
            Some(info @ Value::Object(_)) => info,
            _ => return Err(ValidationError::MissingProductInfo),
        };

        let title = match info.get("title") {
            Some(Value::String(title)) => title.clone(),
            _ => return Err(ValidationError::BlankTitle),
        };
        validation::check_title(&title)?;

        let amount = integer_amount(info.get("amount"))?;
        validation::check_amount(amount)?;

        let description = optional_text(info, "description", "Product description")?;
        validation::check_description(description.as_deref())?;

        let fee_mode = match value.get("feeMode") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.parse()?),
            Some(other) => return Err(ValidationError::InvalidFeeMode(other.to_string())),
        };

        let success_message = optional_text(value, "successMessage", "Success message")?;
        validation::check_success_message(success_message.as_deref())?;

        let redirect_url = match value.get("redirectUrl") {
            None | Some(Value::Null) => None,
            Some(Value::String(url)) => Some(url.clone()),
            Some(_) => return Err(ValidationError::InvalidRedirectUrl),
        };
        validation::check_redirect_url(redirect_url.as_deref())?;

        Ok(Self {
            product_info: Some(ProductInfo {
                title,
                amount,
                description,
            }),
            fee_mode,
            success_message,
            redirect_url,
        })
    }

    /// The body that goes over the wire, with the fee mode defaulted.
    ///
    /// Returns `None` when there is no product info to send.
    pub fn resolve(&self) -> Option<LinkPayload<'_>> {
        Some(LinkPayload {
            product_info: self.product_info.as_ref()?,
            fee_mode: self.fee_mode.unwrap_or_default(),
            success_message: self.success_message.as_deref(),
            redirect_url: self.redirect_url.as_deref(),
        })
    }
}

fn optional_text(
    value: &Value,
    key: &str,
    name: &'static str,
) -> Result<Option<String>, ValidationError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::NotText(name)),
    }
}

/// Reads an amount that must hold a whole number. Integral floats such as
/// `1500.0` are taken as integers; integers too large for `i64` are over the
/// maximum rather than non-integers.
fn integer_amount(amount: Option<&Value>) -> Result<i64, ValidationError> {
    let Some(Value::Number(number)) = amount else {
        return Err(ValidationError::NonIntegerAmount);
    };
    if let Some(amount) = number.as_i64() {
        return Ok(amount);
    }
    if number.as_u64().is_some() {
        return Err(ValidationError::AmountTooHigh);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            if f >= i64::MAX as f64 {
                Err(ValidationError::AmountTooHigh)
            } else if f < i64::MIN as f64 {
                Err(ValidationError::AmountTooLow)
            } else {
                Ok(f as i64)
            }
        }
        _ => Err(ValidationError::NonIntegerAmount),
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload<'a> {
    pub product_info: &'a ProductInfo,
    pub fee_mode: FeeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<&'a str>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub request_id: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    pub reference: String,
    pub payment_url: String,
    pub product_info: ProductInfo,
    pub fee_mode: FeeMode,
    #[serde(default)]
    pub sandbox: bool,
    pub created_at: DateTime<Utc>,
    pub success_message: Option<String>,
    pub redirect_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkResponse {
    pub success: bool,
    pub data: PaymentLink,
    pub payment_url: Option<String>,
    pub reference: Option<String>,
    pub meta: Option<ResponseMeta>,
}
impl CreateLinkResponse {
    pub fn payment_url(&self) -> &str {
        self.payment_url.as_deref().unwrap_or(&self.data.payment_url)
    }
    pub fn reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.data.reference)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub transaction_reference: String,
    pub amount: i64,
    pub fee: i64,
    pub net_amount: i64,
    pub payment_method: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusData {
    pub status: PaymentStatus,
    #[serde(default)]
    pub message: String,
    pub reference: String,
    // only sent for CONFIRMED payments
    pub transaction: Option<TransactionDetails>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub data: PaymentStatusData,
    pub meta: Option<ResponseMeta>,
}
impl PaymentStatusResponse {
    pub fn status(&self) -> PaymentStatus {
        self.data.status
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fee_mode_parses_known_values() {
        assert_eq!("SPLIT_FEE".parse::<FeeMode>().unwrap(), FeeMode::SplitFee);
        assert_eq!(
            "no_fee".parse::<FeeMode>().unwrap_err(),
            ValidationError::InvalidFeeMode("no_fee".into())
        );
    }

    #[test]
    fn resolve_defaults_fee_mode() {
        let request = CreateLinkRequest::new(ProductInfo::new("Pack", 1500));
        let body = serde_json::to_value(request.resolve().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "productInfo": { "title": "Pack", "amount": 1500 },
                "feeMode": "NO_FEE"
            })
        );
    }

    #[test]
    fn from_json_rejects_fractional_amount() {
        let value = json!({ "productInfo": { "title": "Pack", "amount": 1500.5 } });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::NonIntegerAmount
        );
    }

    #[test]
    fn from_json_accepts_whole_float_amount() {
        let value = json!({ "productInfo": { "title": "Pack", "amount": 1500.0 } });
        let request = CreateLinkRequest::from_json(&value).unwrap();
        assert_eq!(request.product_info.unwrap().amount, 1500);
    }

    #[test]
    fn from_json_reports_huge_amounts_as_too_high() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 10_000_000_000_000_000_000u64 }
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::AmountTooHigh
        );

        let value = json!({ "productInfo": { "title": "Pack", "amount": 1e30 } });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::AmountTooHigh
        );

        let value = json!({ "productInfo": { "title": "Pack", "amount": -1e30 } });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::AmountTooLow
        );
    }

    #[test]
    fn from_json_rejects_string_amount() {
        let value = json!({ "productInfo": { "title": "Pack", "amount": "1500" } });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::NonIntegerAmount
        );
    }

    #[test]
    fn from_json_rejects_non_string_redirect_url() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500 },
            "redirectUrl": 123
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::InvalidRedirectUrl
        );
    }

    #[test]
    fn from_json_rejects_non_string_success_message() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500 },
            "successMessage": false,
            "redirectUrl": 123
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::NotText("Success message")
        );
    }

    #[test]
    fn from_json_rejects_non_string_description() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500, "description": ["a"] }
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::NotText("Product description")
        );
    }

    #[test]
    fn from_json_null_optionals_are_absent() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500, "description": null },
            "feeMode": null,
            "successMessage": null,
            "redirectUrl": null
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap(),
            CreateLinkRequest::new(ProductInfo::new("Pack", 1500))
        );
    }

    #[test]
    fn from_json_first_violation_wins() {
        let value = json!({ "productInfo": { "title": "", "amount": "abc" } });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::BlankTitle
        );

        let value = json!({
            "productInfo": { "title": "", "amount": 10 },
            "feeMode": "BAD"
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::BlankTitle
        );

        let value = json!({
            "productInfo": { "title": "Pack", "amount": 10 },
            "feeMode": "BAD"
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::AmountTooLow
        );

        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500 },
            "feeMode": "BAD",
            "successMessage": "m".repeat(600)
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::InvalidFeeMode("BAD".into())
        );

        assert_eq!(
            CreateLinkRequest::from_json(&json!({ "feeMode": "BAD" })).unwrap_err(),
            ValidationError::MissingProductInfo
        );
    }

    #[test]
    fn from_json_rejects_unknown_fee_mode() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500 },
            "feeMode": "MERCHANT_FEE"
        });
        assert_eq!(
            CreateLinkRequest::from_json(&value).unwrap_err(),
            ValidationError::InvalidFeeMode("MERCHANT_FEE".into())
        );
    }

    #[test]
    fn from_json_keeps_optional_fields() {
        let value = json!({
            "productInfo": { "title": "Pack", "amount": 1500, "description": "3 items" },
            "successMessage": "Thanks!",
            "redirectUrl": "https://shop.test/done"
        });
        let request = CreateLinkRequest::from_json(&value).unwrap();
        assert_eq!(
            request,
            CreateLinkRequest::new(ProductInfo::new("Pack", 1500).with_description("3 items"))
                .with_success_message("Thanks!")
                .with_redirect_url("https://shop.test/done")
        );
    }

    #[test]
    fn status_response_carries_transaction_when_confirmed() {
        let value = json!({
            "success": true,
            "data": {
                "status": "CONFIRMED",
                "message": "Payment confirmed",
                "reference": "OCPL-ABC123-XYZ9",
                "transaction": {
                    "transactionReference": "TX-1",
                    "amount": 1500,
                    "fee": 30,
                    "netAmount": 1470,
                    "paymentMethod": "MOBILE_MONEY",
                    "completedAt": "2024-01-01T12:00:00Z"
                }
            },
            "meta": { "requestId": "req-9" }
        });
        let response: PaymentStatusResponse = serde_json::from_value(value).unwrap();
        assert!(response.status().is_terminal());
        assert_eq!(response.data.transaction.unwrap().net_amount, 1470);
    }
}
