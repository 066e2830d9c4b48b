use std::{fs, path::Path, time::Duration};

use paylink::{
    ApiErrorKind, CreateLinkRequest, PaylinkClient, PaymentStatus, PaymentStatusResponse,
};
use tracing::info;

use crate::{config::Polling, Error};

pub async fn create(client: &PaylinkClient, request_path: &Path) -> Result<(), Error> {
    let contents = fs::read_to_string(request_path)
        .map_err(|e| format!("Cannot read request file {}: {e}", request_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    let request = CreateLinkRequest::from_json(&value).map_err(paylink::Error::from)?;

    let response = client.create_payment_link(&request).await?;
    info!(reference = response.reference(), "payment link created");

    println!("Reference:   {}", response.reference());
    println!("Payment URL: {}", response.payment_url());
    println!("Fee mode:    {}", response.data.fee_mode);
    if response.data.sandbox {
        println!("Sandbox:     yes");
    }
    Ok(())
}

pub async fn status(client: &PaylinkClient, reference: &str) -> Result<(), Error> {
    let response = client.check_payment(reference).await?;
    print_status(&response);
    Ok(())
}

/// Polls until the payment leaves `PENDING` or the attempts run out.
pub async fn watch(client: &PaylinkClient, reference: &str, polling: &Polling) -> Result<(), Error> {
    let interval = Duration::from_secs(polling.interval_secs.max(1));
    let attempts = polling.max_attempts.max(1);
    for attempt in 1..=attempts {
        let response = client.check_payment(reference).await?;
        if response.status().is_terminal() {
            print_status(&response);
            return Ok(());
        }
        info!(reference, attempt, "payment still pending");
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(format!("Payment {reference} is still pending after {attempts} checks").into())
}

fn print_status(response: &PaymentStatusResponse) {
    let data = &response.data;
    println!("Reference: {}", data.reference);
    println!("Status:    {}", data.status);
    if !data.message.is_empty() {
        println!("Message:   {}", data.message);
    }
    if data.status == PaymentStatus::Confirmed {
        if let Some(tx) = &data.transaction {
            println!("Transaction: {}", tx.transaction_reference);
            println!("Amount:      {} (fee {}, net {})", tx.amount, tx.fee, tx.net_amount);
            println!("Method:      {}", tx.payment_method);
            println!("Completed:   {}", tx.completed_at);
        }
    }
}

/// A user-facing line for a failed command, keyed on the error kind.
pub fn describe(err: &(dyn std::error::Error + Send + Sync + 'static)) -> String {
    let Some(err) = err.downcast_ref::<paylink::Error>() else {
        return format!("Error: {err}");
    };
    let Some(api) = err.api() else {
        return format!("Error: {err}");
    };
    let hint = match api.kind {
        ApiErrorKind::Validation => "the gateway rejected the request",
        ApiErrorKind::Unauthorized => "check the access token",
        ApiErrorKind::NotFound => "no payment with that reference",
        ApiErrorKind::Expired => "the link expired, create a new one",
        ApiErrorKind::Generic => "gateway call failed",
    };
    match &api.request_id {
        Some(id) => format!("Error: {} ({hint}, request id {id})", api.message),
        None => format!("Error: {} ({hint})", api.message),
    }
}
