//! Transaction display formatting

use crate::models::Transaction;

/// Format a single transaction as a register row, seen from `account_uid`
pub fn format_transaction_row(txn: &Transaction, account_uid: &str) -> String {
    let exported_icon = if txn.exported { "x" } else { " " };
    let transfer_indicator = if txn.is_transfer() { "<> " } else { "" };

    format!(
        "{} {} {:24} {:>16}  {}",
        exported_icon,
        txn.time.format("%Y-%m-%d"),
        truncate(&format!("{}{}", transfer_indicator, txn.name), 24),
        txn.amount_for(account_uid).to_string(),
        txn.uid
    )
}

/// Format an account's transactions as a register
pub fn format_transaction_register(transactions: &[Transaction], account_uid: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:1} {:10} {:24} {:>16}  {}\n",
        "E", "Date", "Name", "Amount", "UID"
    ));
    output.push_str(&"-".repeat(92));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, account_uid));
        output.push('\n');
    }

    output
}

/// Truncate to `max_chars` characters, marking the cut with `...`
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
