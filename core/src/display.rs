/// Output formatting: CCX denomination conversion and display helpers.
///
/// CCX uses 6 decimal places. 1 CCX = 1_000_000 atomic units.
use chrono::DateTime;

use crate::mask::AddressMasker;
use crate::summary::SummaryRow;
use crate::wallet::{Transaction, TransactionDirection, Wallet};

pub const ATOMIC_PER_CCX: u64 = 1_000_000;
pub const DECIMALS: usize = 6;
pub const CURRENCY: &str = "CCX";

/// Fixed network fee charged on every send: 0.0001 CCX.
pub const TRANSACTION_FEE: u64 = 100;

const ATOMIC_PER_CENT: i128 = (ATOMIC_PER_CCX / 100) as i128;

/// Two-decimal fixed point, rounded half away from zero.
/// Examples: 100_000_000 -> "100.00", -10_005_000 -> "-10.01"
#[must_use]
pub fn format_amount(units: impl Into<i128>) -> String {
    let units: i128 = units.into();
    let cents = (units.abs() + ATOMIC_PER_CENT / 2) / ATOMIC_PER_CENT;
    let sign = if units < 0 && cents > 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

/// Format a balance for display.
#[must_use]
pub fn format_balance(units: u64, unit: &str) -> String {
    format!("{} {unit}", format_amount(units))
}

/// Exact amount with trailing zeros trimmed, keeping at least two decimals.
/// Examples: 100 -> "0.0001", 1_500_000 -> "1.50"
#[must_use]
pub fn format_exact(units: u64) -> String {
    let whole = units / ATOMIC_PER_CCX;
    let frac = format!("{:0width$}", units % ATOMIC_PER_CCX, width = DECIMALS);
    let trimmed = frac.trim_end_matches('0');
    let frac = if trimmed.len() < 2 {
        &frac[..2]
    } else {
        trimmed
    };
    format!("{whole}.{frac}")
}

/// Format a fee with its currency unit.
#[must_use]
pub fn format_fee(units: u64, unit: &str) -> String {
    format!("{} {unit}", format_exact(units))
}

/// Parse a human-readable CCX amount string into atomic units.
/// Accepts: "10" -> 10_000_000, "1.5" -> 1_500_000, "0.000001" -> 1
#[must_use = "parsing result should be checked"]
pub fn parse_amount(input: &str) -> Result<u64, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    if input.starts_with('-') {
        return Err("Amount must be positive".to_string());
    }

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() > 2 {
        return Err("Invalid amount format. Use CCX units like '1.5' or '0.001'.".to_string());
    }

    if !parts[0].chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid whole part: '{}'", parts[0]));
    }
    let whole: u64 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid whole part: '{}'", parts[0]))?;

    let frac_units = match parts.get(1) {
        // Trailing dot: "1." is treated as "1.0"
        None | Some(&"") => 0,
        Some(frac) if frac.len() > DECIMALS => {
            return Err(format!("Too many decimal places. CCX supports up to {DECIMALS}."));
        }
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("Invalid fractional part: '{frac}'"));
            }
            format!("{frac:0<width$}", width = DECIMALS)
                .parse::<u64>()
                .map_err(|_| format!("Invalid fractional part: '{frac}'"))?
        }
    };

    whole
        .checked_mul(ATOMIC_PER_CCX)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| "Amount too large".to_string())
}

/// Long date for the history list, e.g. "Thursday, October 15, 2026 3:04 PM".
#[must_use]
pub fn format_timestamp(unix_secs: i64) -> String {
    match DateTime::from_timestamp(unix_secs, 0) {
        Some(dt) => dt.format("%A, %B %-d, %Y %-I:%M %p").to_string(),
        None => "-".to_string(),
    }
}

/// One entry of the overview screen's transaction list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRow {
    pub hash: String,
    pub timestamp: String,
    pub amount: String,
    pub address: String,
    pub direction: TransactionDirection,
}

impl TransactionRow {
    pub fn new(tx: &Transaction, unit: &str, masker: &AddressMasker) -> Self {
        Self {
            hash: tx.hash.clone(),
            timestamp: format_timestamp(tx.timestamp),
            amount: format!(
                "{} {unit} (fee: {})",
                format_amount(tx.amount),
                format_exact(tx.fee)
            ),
            address: masker.mask(&tx.address),
            direction: tx.direction,
        }
    }
}

/// History rows in insertion (chronological) order.
#[must_use]
pub fn transaction_rows(wallet: &Wallet, masker: &AddressMasker) -> Vec<TransactionRow> {
    wallet
        .transactions()
        .iter()
        .map(|tx| TransactionRow::new(tx, wallet.unit(), masker))
        .collect()
}

/// Format a list of transaction rows for display.
#[must_use]
pub fn format_transactions(rows: &[TransactionRow]) -> String {
    if rows.is_empty() {
        return "No transactions found.".to_string();
    }

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let dir = match row.direction {
            TransactionDirection::Received => "in ",
            TransactionDirection::Sent => "out",
        };
        lines.push(format!(
            "{dir}  {}  {}  {}  {}",
            row.timestamp, row.address, row.amount, row.hash
        ));
    }
    lines.join("\n")
}

/// Balance header plus history, as shown on the account overview.
#[must_use]
pub fn format_overview(wallet: &Wallet, masker: &AddressMasker) -> String {
    let mut out = format!(
        "  Wallet:  {}\n  Address: {}\n  Balance: {}\n\nTransactions\n",
        wallet.id(),
        masker.mask(wallet.address()),
        format_balance(wallet.balance(), wallet.unit()),
    );
    out.push_str(&format_transactions(&transaction_rows(wallet, masker)));
    out
}

/// Render confirmation summary rows as aligned text.
#[must_use]
pub fn format_summary(rows: &[SummaryRow]) -> String {
    rows.iter()
        .map(|row| format!("  {:<16} {}", format!("{}:", row.title), row.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format balance as JSON.
#[must_use]
pub fn format_balance_json(wallet: &Wallet) -> String {
    serde_json::json!({
        "wallet": wallet.id(),
        "balance_atomic": wallet.balance(),
        "balance": format_amount(wallet.balance()),
        "unit": wallet.unit(),
    })
    .to_string()
}
